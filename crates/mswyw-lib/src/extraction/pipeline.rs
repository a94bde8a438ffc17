//! Per-app, per-container extraction chain

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{ApmClient, BackendConfig, Stage};
use super::responses::{
    container_ids, resource_usage, traffic, ChartsResponse, LocalFilters, ServicesResponse,
};
use crate::error::{MswywError, Result};
use crate::models::{MetricRecord, TimeWindow};
use crate::observability::{RunMetrics, StructuredLogger};

/// Filters requested from the local-filters endpoint
const DISCOVERY_FILTERS: [&str; 3] = ["host", "containerId", "podName"];

/// Assembles metric records from the APM API
///
/// Requests run strictly one after another: each container's traffic query
/// yields the agent name that its chart query needs.
pub struct ExtractionPipeline {
    client: ApmClient,
    metrics: RunMetrics,
    logger: StructuredLogger,
}

impl ExtractionPipeline {
    pub fn new(config: BackendConfig, metrics: RunMetrics, logger: StructuredLogger) -> Result<Self> {
        let client = ApmClient::new(config, metrics.clone())?;
        Ok(Self {
            client,
            metrics,
            logger,
        })
    }

    /// Extract one record per container of every app, in input order
    ///
    /// All or nothing: the first failed request aborts the extraction and
    /// no records are returned.
    pub async fn extract(
        &self,
        app_names: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<MetricRecord>> {
        if app_names.is_empty() {
            return Err(MswywError::EmptyAppList);
        }

        info!(
            apps = app_names.len(),
            start = %window.start_param(),
            end = %window.end_param(),
            "Extracting metrics from APM"
        );

        let mut records = Vec::new();
        for app_name in app_names {
            let app_records = self.extract_app(app_name, window).await?;
            self.logger.log_app_extracted(app_name, app_records.len());
            records.extend(app_records);
        }

        Ok(records)
    }

    async fn extract_app(&self, app_name: &str, window: &TimeWindow) -> Result<Vec<MetricRecord>> {
        let containers = self.discover_containers(app_name, window).await?;
        debug!(app_name = %app_name, containers = containers.len(), "Discovered containers");

        let mut records = Vec::with_capacity(containers.len());
        for container_id in &containers {
            records.push(self.extract_container(app_name, container_id, window).await?);
        }
        Ok(records)
    }

    async fn discover_containers(&self, app_name: &str, window: &TimeWindow) -> Result<Vec<String>> {
        let (start, end) = (window.start_param(), window.end_param());
        let filter_names = json!(DISCOVERY_FILTERS).to_string();
        let url = self.client.endpoint(
            &["ui_filters", "local_filters", "metrics"],
            &[
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("uiFilters", "{}"),
                ("filterNames", filter_names.as_str()),
                ("serviceName", app_name),
            ],
        )?;

        let filters: LocalFilters = self.client.get_json(Stage::Containers, &url).await?;
        Ok(container_ids(&filters))
    }

    async fn extract_container(
        &self,
        app_name: &str,
        container_id: &str,
        window: &TimeWindow,
    ) -> Result<MetricRecord> {
        let (start, end) = (window.start_param(), window.end_param());
        let container_filter = json!({ "containerId": [container_id] }).to_string();

        let kuery = json!({
            "kuery": format!(
                "transaction.type : \"request\" and container.id : \"{container_id}\""
            )
        })
        .to_string();
        let url = self.client.endpoint(
            &["services"],
            &[("start", start.as_str()), ("end", end.as_str()), ("uiFilters", kuery.as_str())],
        )?;
        let services: ServicesResponse = self.client.get_json(Stage::Services, &url).await?;
        let traffic = traffic(&services);

        let url = self.client.endpoint(
            &["services", app_name, "metrics", "charts"],
            &[
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("agentName", traffic.agent_name.as_str()),
                ("uiFilters", container_filter.as_str()),
            ],
        )?;
        let charts: ChartsResponse = self.client.get_json(Stage::Charts, &url).await?;
        let usage = resource_usage(&charts);

        let url = self.client.endpoint(
            &["services", app_name, "transaction_groups"],
            &[
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("transactionType", "request"),
                ("uiFilters", container_filter.as_str()),
            ],
        )?;
        let groups: Vec<Value> = self.client.get_json(Stage::TransactionGroups, &url).await?;

        self.metrics.inc_records_extracted();
        self.logger
            .log_container_extracted(app_name, container_id, &traffic.agent_name, groups.len());

        Ok(MetricRecord {
            mem: Some(usage.mem),
            cpu: Some(usage.cpu),
            epm: Some(traffic.epm),
            rpm: Some(traffic.rpm),
            // No APM endpoint reports apdex directly
            apdex: Some(0.0),
            endpoints: Some(groups.len() as f64),
            lang: Some(traffic.agent_name),
            app_name: Some(app_name.to_string()),
            extra: Default::default(),
        })
    }
}
