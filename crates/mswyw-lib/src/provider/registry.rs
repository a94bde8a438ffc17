//! Registry of named computation units

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::extraction::{KibanaDefaults, KibanaProvider};
use crate::observability::{RunMetrics, StructuredLogger};

/// A computation unit that produces structured data on demand
///
/// Units run with the same trust as the process itself; only register
/// code you would link into the binary anyway.
#[async_trait]
pub trait ParamsProvider: Send + Sync {
    /// Name the unit is resolved by
    fn name(&self) -> &str;

    /// Produce a structured value from the caller's extra arguments
    async fn compute_params(&self, extra_args: &Value) -> Result<Value>;
}

/// Name -> computation unit lookup
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ParamsProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the units shipped with the crate
    pub fn builtin(
        defaults: KibanaDefaults,
        metrics: RunMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self::new().with(Arc::new(KibanaProvider::new(defaults, metrics, logger)))
    }

    /// Register a unit under its own name, replacing any previous one
    pub fn register(&mut self, provider: Arc<dyn ParamsProvider>) {
        tracing::debug!(name = provider.name(), "Registering provider");
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn ParamsProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ParamsProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}
