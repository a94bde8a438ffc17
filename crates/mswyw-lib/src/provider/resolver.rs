//! Descriptor resolution into structured values

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{Descriptor, Fetcher, ProviderRegistry};
use crate::error::{MswywError, Result};

/// Resolves descriptor strings into JSON values
///
/// A matched strategy's failure is final: a file that does not parse or a
/// URL that cannot be fetched is an error, not a cue to try the next
/// interpretation. Only a failed literal parse falls through to the
/// computation unit lookup.
#[derive(Clone)]
pub struct ProviderResolver {
    registry: ProviderRegistry,
    fetcher: Arc<dyn Fetcher>,
}

impl ProviderResolver {
    pub fn new(registry: ProviderRegistry, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Classify and resolve a descriptor
    pub async fn resolve(&self, descriptor: &str, extra_args: &Value) -> Result<Value> {
        let classified = Descriptor::classify(descriptor);
        debug!(descriptor = %descriptor, strategy = classified.kind(), "Resolving descriptor");
        self.resolve_classified(descriptor, classified, extra_args)
            .await
    }

    /// Resolve an already classified descriptor
    pub async fn resolve_classified(
        &self,
        raw: &str,
        descriptor: Descriptor,
        extra_args: &Value,
    ) -> Result<Value> {
        match descriptor {
            Descriptor::FilePath(path) => {
                let origin = path.display().to_string();
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| MswywError::unresolvable(&origin, e))?;
                parse_json(&bytes, &origin)
            }
            Descriptor::Url(url) => {
                let bytes = self.fetcher.fetch(&url).await?;
                parse_json(&bytes, url.as_str())
            }
            Descriptor::Literal(value) => Ok(value),
            Descriptor::ModuleName(name) => {
                let provider = self.registry.get(&name).ok_or_else(|| {
                    MswywError::unresolvable(
                        raw,
                        format!(
                            "not a file, URL, JSON literal or known provider (known: {})",
                            self.registry.names().join(", ")
                        ),
                    )
                })?;
                provider.compute_params(extra_args).await
            }
        }
    }
}

fn parse_json(bytes: &[u8], origin: &str) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| MswywError::malformed(origin, e))
}
