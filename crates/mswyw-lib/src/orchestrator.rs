//! Scoring run orchestration
//!
//! Resolves every input through the provider resolver, feeds the records to
//! the formula engine and returns a report. Any failure aborts the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::coefficients::{CoefficientTable, DEFAULT_COEFFICIENTS};
use crate::error::Result;
use crate::extraction::KIBANA_PROVIDER;
use crate::formula;
use crate::models::{MetricAverages, MetricOverrides, MetricRecord, ScoreResult};
use crate::observability::{RunMetrics, StructuredLogger};
use crate::provider::ProviderResolver;

/// Descriptors and defaults for one scoring run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub code_info_provider: String,
    pub provider_params: String,
    pub runtime_provider: String,
    pub coefficients: String,
    pub overrides: String,
    pub default_metric_value: f64,
}

impl RunRequest {
    pub fn new(code_info_provider: impl Into<String>) -> Self {
        Self {
            code_info_provider: code_info_provider.into(),
            provider_params: "{}".to_string(),
            runtime_provider: KIBANA_PROVIDER.to_string(),
            coefficients: DEFAULT_COEFFICIENTS.to_string(),
            overrides: "{}".to_string(),
            default_metric_value: 0.0,
        }
    }
}

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub instances: Vec<MetricRecord>,
    pub code_info: Value,
    pub coefficients: CoefficientTable,
    pub score: ScoreResult,
    /// Absent when the runtime provider returned no records
    pub averages: Option<MetricAverages>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

pub struct Orchestrator {
    resolver: ProviderResolver,
    metrics: RunMetrics,
    logger: StructuredLogger,
}

impl Orchestrator {
    pub fn new(resolver: ProviderResolver, metrics: RunMetrics, logger: StructuredLogger) -> Self {
        Self {
            resolver,
            metrics,
            logger,
        }
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Execute a run, logging the failure before handing it back
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport> {
        self.logger
            .log_run_started(&request.runtime_provider, &request.code_info_provider);

        match self.execute(request).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.logger.log_run_failed(&e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self, request: &RunRequest) -> Result<RunReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let coefficients = self
            .resolver
            .resolve(&request.coefficients, &Value::Null)
            .await?;
        let coefficients = CoefficientTable::from_value(&coefficients)?;

        let params = self
            .resolver
            .resolve(&request.provider_params, &Value::Null)
            .await?;

        let runtime = self
            .resolver
            .resolve(&request.runtime_provider, &params)
            .await?;
        let instances = MetricRecord::list_from_value(runtime, &request.runtime_provider)?;

        let code_info = self
            .resolver
            .resolve(&request.code_info_provider, &params)
            .await?;

        let overrides = self
            .resolver
            .resolve(&request.overrides, &Value::Null)
            .await?;
        let overrides = MetricOverrides::from_value(&overrides, &request.overrides)?;

        let score = formula::score(
            &instances,
            &coefficients,
            &overrides,
            request.default_metric_value,
        );
        let averages = if instances.is_empty() {
            None
        } else {
            Some(formula::averages(&instances, request.default_metric_value)?)
        };

        self.metrics
            .set_result(instances.len(), score.cost, score.value, score.score);
        self.logger
            .log_score_computed(instances.len(), score.cost, score.value, score.score);

        Ok(RunReport {
            instances,
            code_info,
            coefficients,
            score,
            averages,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: clock.elapsed().as_millis() as u64,
        })
    }
}
