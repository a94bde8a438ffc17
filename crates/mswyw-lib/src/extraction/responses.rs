//! APM API response shapes and the values picked out of them

use serde::Deserialize;

const CONTAINER_FILTER: &str = "containerId";

const CPU_CHART: &str = "cpu_usage_chart";
const CPU_SERIES: &str = "processCPUMax";
const MEMORY_CHART: &str = "memory_usage_chart";
const MEMORY_SERIES: &str = "memoryUsedMax";

/// Charts report memory in GiB
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `ui_filters/local_filters` response
#[derive(Debug, Clone, Deserialize)]
pub struct LocalFilters {
    pub items: Vec<FilterItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterItem {
    pub name: String,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterOption {
    pub name: String,
}

/// `services` response filtered to one container
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesResponse {
    pub items: Vec<ServiceItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub transactions_per_minute: Option<f64>,
    #[serde(default)]
    pub errors_per_minute: Option<f64>,
}

/// `metrics/charts` response
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsResponse {
    pub charts: Vec<Chart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    pub key: String,
    #[serde(default)]
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub key: String,
    #[serde(default)]
    pub overall_value: Option<f64>,
}

/// Agent and traffic figures for one container
#[derive(Debug, Clone, PartialEq)]
pub struct Traffic {
    pub agent_name: String,
    pub rpm: f64,
    pub epm: f64,
}

/// Resource usage for one container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    /// 0..100 percentage
    pub cpu: f64,
    /// Bytes, truncated to a whole number
    pub mem: f64,
}

/// Container ids listed under the `containerId` filter
pub fn container_ids(filters: &LocalFilters) -> Vec<String> {
    filters
        .items
        .iter()
        .filter(|item| item.name == CONTAINER_FILTER)
        .flat_map(|item| item.options.iter().map(|o| o.name.clone()))
        .collect()
}

/// Agent name and traffic from the first service item
///
/// An empty item list is not an error: the container simply had no
/// request traffic in the window.
pub fn traffic(services: &ServicesResponse) -> Traffic {
    match services.items.first() {
        Some(item) => Traffic {
            agent_name: item.agent_name.clone().unwrap_or_default(),
            rpm: item.transactions_per_minute.unwrap_or(0.0),
            epm: item.errors_per_minute.unwrap_or(0.0),
        },
        None => Traffic {
            agent_name: String::new(),
            rpm: 0.0,
            epm: 0.0,
        },
    }
}

/// CPU percentage and memory bytes from the resource charts
pub fn resource_usage(charts: &ChartsResponse) -> ResourceUsage {
    let mut usage = ResourceUsage { cpu: 0.0, mem: 0.0 };

    for chart in &charts.charts {
        match chart.key.as_str() {
            CPU_CHART => usage.cpu = series_value(&chart.series, CPU_SERIES) * 100.0,
            MEMORY_CHART => {
                usage.mem = (series_value(&chart.series, MEMORY_SERIES) * BYTES_PER_GIB).trunc()
            }
            _ => {}
        }
    }

    usage
}

/// Overall value of the last series with `key`; absent or null reads as 0
fn series_value(series: &[Series], key: &str) -> f64 {
    series
        .iter()
        .filter(|s| s.key == key)
        .last()
        .and_then(|s| s.overall_value)
        .unwrap_or(0.0)
}
