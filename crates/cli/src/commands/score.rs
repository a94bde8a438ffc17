//! The scoring run and its report

use anyhow::{Context, Result};
use colored::Colorize;
use mswyw_lib::{
    KibanaDefaults, MetricRecord, Orchestrator, ProviderRegistry, ProviderResolver, RunMetrics,
    RunReport, RunRequest, StructuredLogger, UrlFetcher,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

use crate::config::Settings;
use crate::output::{color_score, format_bytes, format_metric, print_info, print_warning, OutputFormat};

/// Row for the instances table
#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Agent")]
    lang: String,
    #[tabled(rename = "CPU %")]
    cpu: String,
    #[tabled(rename = "Memory")]
    mem: String,
    #[tabled(rename = "RPM")]
    rpm: String,
    #[tabled(rename = "EPM")]
    epm: String,
    #[tabled(rename = "Apdex")]
    apdex: String,
    #[tabled(rename = "Endpoints")]
    endpoints: String,
}

impl From<&MetricRecord> for InstanceRow {
    fn from(record: &MetricRecord) -> Self {
        Self {
            app: record.app_name.clone().unwrap_or_else(|| "-".to_string()),
            lang: match record.lang.as_deref() {
                Some("") | None => "-".to_string(),
                Some(lang) => lang.to_string(),
            },
            cpu: format_metric(record.cpu),
            mem: record
                .mem
                .map(|bytes| format_bytes(bytes.max(0.0) as u64))
                .unwrap_or_else(|| "-".to_string()),
            rpm: format_metric(record.rpm),
            epm: format_metric(record.epm),
            apdex: format_metric(record.apdex),
            endpoints: format_metric(record.endpoints),
        }
    }
}

/// Run the scoring pipeline and print its report
pub async fn run_score(
    request: RunRequest,
    settings: &Settings,
    metrics_file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let metrics = RunMetrics::new().context("Failed to create run metrics")?;
    let logger = StructuredLogger::default();

    let defaults = KibanaDefaults {
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
        interval_minutes: settings.interval_minutes,
    };
    let registry = ProviderRegistry::builtin(defaults, metrics.clone(), logger.clone());
    let resolver = ProviderResolver::new(registry, Arc::new(UrlFetcher::new()?));
    let orchestrator = Orchestrator::new(resolver, metrics, logger);

    let outcome = orchestrator.run(&request).await;

    // Failed runs still leave their request counters behind
    if let Some(path) = metrics_file {
        write_metrics(orchestrator.metrics(), path)?;
        if format == OutputFormat::Table {
            print_info(&format!("Run metrics written to {}", path.display()));
        }
    }

    print_report(&outcome?, format)
}

/// Write the run metrics in Prometheus text format
fn write_metrics(metrics: &RunMetrics, path: &Path) -> Result<()> {
    let text = metrics
        .encode_text()
        .context("Failed to encode run metrics")?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics file {}", path.display()))?;
    debug!(path = %path.display(), "Wrote run metrics");
    Ok(())
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("{}", "mswyw: microservice worth your weight".bold());
            println!("{}", "=".repeat(60));
            println!();

            println!("{}", "Instances".bold());
            if report.instances.is_empty() {
                print_warning("No instances reported by the runtime provider");
            } else {
                let rows: Vec<InstanceRow> = report.instances.iter().map(InstanceRow::from).collect();
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }
            println!("{}", "-".repeat(60));

            println!("Started:      {}", report.started_at.to_rfc3339());
            println!("Finished:     {}", report.finished_at.to_rfc3339());
            println!("Total:        {} ms", report.elapsed_ms);
            println!();

            if let Some(averages) = &report.averages {
                println!("{}", "Averages".bold());
                println!("Apdex:        {:.2}", averages.apdex_avg);
                println!("EPM:          {:.2}", averages.epm_avg);
                println!("RPM:          {:.2}", averages.rpm_avg);
                println!();
            }

            println!("Cost:         {:.2}", report.score.cost);
            println!("Value:        {:.2}", report.score.value);
            println!(
                "{}  {}",
                "mswyw score:".bold(),
                color_score(report.score.score)
            );
            println!("{}", "-".repeat(60));
        }
    }

    Ok(())
}
