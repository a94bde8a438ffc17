//! The `kibana` computation unit
//!
//! Reads its connection parameters from the provider params blob:
//! `kibana.URL`, `kibana.USER`, `kibana.PASSWORD`, `kibana.APPS`
//! (comma separated) and optionally `kibana.INTERVAL` (minutes).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::client::{BackendConfig, DEFAULT_REQUEST_TIMEOUT};
use super::pipeline::ExtractionPipeline;
use crate::error::{MswywError, Result};
use crate::models::TimeWindow;
use crate::observability::{RunMetrics, StructuredLogger};
use crate::provider::ParamsProvider;

/// Name the unit is registered under
pub const KIBANA_PROVIDER: &str = "kibana";

/// Default observation window in minutes
const DEFAULT_INTERVAL_MINUTES: i64 = 60;

/// Settings used when the provider params leave them out
#[derive(Debug, Clone, Copy)]
pub struct KibanaDefaults {
    pub request_timeout: Duration,
    pub interval_minutes: i64,
}

impl Default for KibanaDefaults {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

/// Runtime metrics provider backed by the extraction pipeline
pub struct KibanaProvider {
    defaults: KibanaDefaults,
    metrics: RunMetrics,
    logger: StructuredLogger,
}

impl KibanaProvider {
    pub fn new(defaults: KibanaDefaults, metrics: RunMetrics, logger: StructuredLogger) -> Self {
        Self {
            defaults,
            metrics,
            logger,
        }
    }

    fn param<'a>(extra_args: &'a Value, key: &str) -> Option<&'a Value> {
        extra_args.get(format!("{KIBANA_PROVIDER}.{key}"))
    }

    /// String parameter; absent or null reads as empty
    fn text_param(extra_args: &Value, key: &str) -> Result<String> {
        match Self::param(extra_args, key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(MswywError::malformed(
                format!("{KIBANA_PROVIDER}.{key}"),
                format!("expected a string, got {other}"),
            )),
        }
    }

    fn interval_minutes(&self, extra_args: &Value) -> Result<i64> {
        let minutes = self.raw_interval(extra_args)?;
        if minutes <= 0 {
            return Err(MswywError::malformed(
                "kibana.INTERVAL",
                format!("expected a positive number of minutes, got {minutes}"),
            ));
        }
        Ok(minutes)
    }

    fn raw_interval(&self, extra_args: &Value) -> Result<i64> {
        match Self::param(extra_args, "INTERVAL") {
            None | Some(Value::Null) => Ok(self.defaults.interval_minutes),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| MswywError::malformed("kibana.INTERVAL", "expected whole minutes")),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|e| MswywError::malformed("kibana.INTERVAL", e)),
            Some(other) => Err(MswywError::malformed(
                "kibana.INTERVAL",
                format!("expected minutes, got {other}"),
            )),
        }
    }
}

/// Split the comma separated app list, dropping blank entries
pub fn app_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl ParamsProvider for KibanaProvider {
    fn name(&self) -> &str {
        KIBANA_PROVIDER
    }

    async fn compute_params(&self, extra_args: &Value) -> Result<Value> {
        let base_url = Self::text_param(extra_args, "URL")?;
        if base_url.is_empty() {
            return Err(MswywError::unresolvable(
                KIBANA_PROVIDER,
                "kibana.URL is missing from the provider params",
            ));
        }

        let apps = app_names(&Self::text_param(extra_args, "APPS")?);
        if apps.is_empty() {
            return Err(MswywError::EmptyAppList);
        }

        let minutes = self.interval_minutes(extra_args)?;
        let window = TimeWindow::ending_now(minutes).map_err(|_| {
            MswywError::malformed("kibana.INTERVAL", format!("{minutes} minutes is out of range"))
        })?;
        let config = BackendConfig::new(
            base_url,
            Self::text_param(extra_args, "USER")?,
            Self::text_param(extra_args, "PASSWORD")?,
        )
        .with_timeout(self.defaults.request_timeout);

        let pipeline = ExtractionPipeline::new(config, self.metrics.clone(), self.logger.clone())?;
        let records = pipeline.extract(&apps, &window).await?;

        serde_json::to_value(records).map_err(|e| MswywError::malformed(KIBANA_PROVIDER, e))
    }
}
