//! Observability infrastructure for scoring runs
//!
//! Provides:
//! - Prometheus metrics (backend request counts/latency, extracted records, score)
//! - Structured logging of run events with tracing

use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::{info, warn};

/// Histogram buckets for backend request latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 4.0];

/// Prometheus metrics for one process
///
/// Each instance owns its own registry, so the binary can write the
/// exposition text after a run and tests never collide on global names.
#[derive(Clone)]
pub struct RunMetrics {
    registry: Registry,
    backend_requests: IntCounterVec,
    backend_request_duration: HistogramVec,
    records_extracted: IntCounter,
    instances: IntGauge,
    score: Gauge,
    cost: Gauge,
    value: Gauge,
}

impl RunMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let backend_requests = IntCounterVec::new(
            Opts::new(
                "mswyw_backend_requests_total",
                "Requests sent to the monitoring backend",
            ),
            &["stage", "outcome"],
        )?;
        let backend_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "mswyw_backend_request_duration_seconds",
                "Time spent waiting on the monitoring backend",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["stage"],
        )?;
        let records_extracted = IntCounter::new(
            "mswyw_records_extracted_total",
            "Metric records assembled from the monitoring backend",
        )?;
        let instances = IntGauge::new("mswyw_instances", "Instances scored in the last run")?;
        let score = Gauge::new("mswyw_score", "Worth score of the last run")?;
        let cost = Gauge::new("mswyw_cost", "Weighted cost of the last run")?;
        let value = Gauge::new("mswyw_value", "Weighted value of the last run")?;

        registry.register(Box::new(backend_requests.clone()))?;
        registry.register(Box::new(backend_request_duration.clone()))?;
        registry.register(Box::new(records_extracted.clone()))?;
        registry.register(Box::new(instances.clone()))?;
        registry.register(Box::new(score.clone()))?;
        registry.register(Box::new(cost.clone()))?;
        registry.register(Box::new(value.clone()))?;

        Ok(Self {
            registry,
            backend_requests,
            backend_request_duration,
            records_extracted,
            instances,
            score,
            cost,
            value,
        })
    }

    /// Record one backend request for a pipeline stage
    pub fn observe_request(&self, stage: &str, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.backend_requests
            .with_label_values(&[stage, outcome])
            .inc();
        self.backend_request_duration
            .with_label_values(&[stage])
            .observe(duration_secs);
    }

    pub fn inc_records_extracted(&self) {
        self.records_extracted.inc();
    }

    /// Publish the outcome of a scoring run
    pub fn set_result(&self, instances: usize, cost: f64, value: f64, score: f64) {
        self.instances.set(instances as i64);
        self.cost.set(cost);
        self.value.set(value);
        self.score.set(score);
    }

    pub fn requests(&self, stage: &str, outcome: &str) -> u64 {
        self.backend_requests
            .with_label_values(&[stage, outcome])
            .get()
    }

    pub fn records_extracted(&self) -> u64 {
        self.records_extracted.get()
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for scoring run events
#[derive(Clone)]
pub struct StructuredLogger {
    run_id: String,
}

impl StructuredLogger {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_run_started(&self, runtime_provider: &str, code_info_provider: &str) {
        info!(
            event = "run_started",
            run_id = %self.run_id,
            runtime_provider = %runtime_provider,
            code_info_provider = %code_info_provider,
            "Scoring run started"
        );
    }

    pub fn log_container_extracted(
        &self,
        app_name: &str,
        container_id: &str,
        agent_name: &str,
        endpoints: usize,
    ) {
        info!(
            event = "container_extracted",
            run_id = %self.run_id,
            app_name = %app_name,
            container_id = %container_id,
            agent_name = %agent_name,
            endpoints = endpoints,
            "Extracted container metrics"
        );
    }

    pub fn log_app_extracted(&self, app_name: &str, containers: usize) {
        if containers == 0 {
            warn!(
                event = "app_extracted",
                run_id = %self.run_id,
                app_name = %app_name,
                containers = 0,
                "No containers found for app"
            );
        } else {
            info!(
                event = "app_extracted",
                run_id = %self.run_id,
                app_name = %app_name,
                containers = containers,
                "Extracted app metrics"
            );
        }
    }

    pub fn log_score_computed(&self, instances: usize, cost: f64, value: f64, score: f64) {
        info!(
            event = "score_computed",
            run_id = %self.run_id,
            instances = instances,
            cost = cost,
            value = value,
            score = score,
            "Computed worth score"
        );
    }

    pub fn log_run_failed(&self, error: &str) {
        warn!(
            event = "run_failed",
            run_id = %self.run_id,
            error = %error,
            "Scoring run failed"
        );
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new(chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string())
    }
}
