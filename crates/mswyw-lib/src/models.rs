//! Core data models for worth scoring

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MswywError, Result};

/// Metric names recognized by the formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mem,
    Cpu,
    Epm,
    Apdex,
    Rpm,
    Endpoints,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Mem,
        Metric::Cpu,
        Metric::Epm,
        Metric::Apdex,
        Metric::Rpm,
        Metric::Endpoints,
    ];

    /// Metrics summed into the cost side of the ratio
    pub const COST: [Metric; 3] = [Metric::Mem, Metric::Cpu, Metric::Epm];

    /// Metrics summed into the value side of the ratio
    pub const VALUE: [Metric; 3] = [Metric::Apdex, Metric::Rpm, Metric::Endpoints];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Mem => "mem",
            Metric::Cpu => "cpu",
            Metric::Epm => "epm",
            Metric::Apdex => "apdex",
            Metric::Rpm => "rpm",
            Metric::Endpoints => "endpoints",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics observed for one container of one service over a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Memory in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<f64>,
    /// CPU usage as a 0..100 percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Errors per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epm: Option<f64>,
    /// Requests per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apdex: Option<f64>,
    /// Number of transaction groups seen for the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<f64>,
    /// Detected agent/runtime name
    #[serde(rename = "_lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Application the container belongs to
    #[serde(rename = "_appname", default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Descriptive fields that do not take part in the formula
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MetricRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mem => self.mem,
            Metric::Cpu => self.cpu,
            Metric::Epm => self.epm,
            Metric::Apdex => self.apdex,
            Metric::Rpm => self.rpm,
            Metric::Endpoints => self.endpoints,
        }
    }

    /// Decode the runtime data produced by a provider
    pub fn list_from_value(value: Value, origin: &str) -> Result<Vec<MetricRecord>> {
        if !value.is_array() {
            return Err(MswywError::malformed(
                origin,
                "runtime data must be a list of metric records",
            ));
        }
        serde_json::from_value(value).map_err(|e| MswywError::malformed(origin, e))
    }
}

/// Per-metric values that take precedence over whatever the records carry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricOverrides(BTreeMap<Metric, f64>);

impl MetricOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.0.insert(metric, value);
        self
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse an override object such as `{"mem": 0}`
    pub fn from_value(value: &Value, origin: &str) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| MswywError::malformed(origin, "overrides must be an object"))?;

        let mut overrides = Self::new();
        for (name, raw) in map {
            let metric = Metric::from_name(name).ok_or_else(|| {
                MswywError::malformed(origin, format!("unknown metric {name} in overrides"))
            })?;
            let value = raw.as_f64().ok_or_else(|| {
                MswywError::malformed(origin, format!("override {name} is not a number: {raw}"))
            })?;
            overrides.0.insert(metric, value);
        }
        Ok(overrides)
    }
}

/// Outcome of folding records and coefficients together
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub cost: f64,
    pub value: f64,
    pub score: f64,
}

/// Descriptive means reported next to the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub apdex_avg: f64,
    pub epm_avg: f64,
    pub rpm_avg: f64,
}

/// Observation window used when querying the monitoring backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window of `minutes` ending at the current instant
    pub fn ending_now(minutes: i64) -> Result<Self> {
        Self::ending_at(Utc::now(), minutes)
    }

    /// Window of `minutes` ending at `end`; the interval must be positive
    pub fn ending_at(end: DateTime<Utc>, minutes: i64) -> Result<Self> {
        if minutes <= 0 {
            return Err(MswywError::malformed(
                "interval",
                format!("expected a positive number of minutes, got {minutes}"),
            ));
        }
        let start = TimeDelta::try_minutes(minutes)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                MswywError::malformed("interval", format!("{minutes} minutes is out of range"))
            })?;
        Ok(Self { start, end })
    }

    pub fn start_param(&self) -> String {
        format_timestamp(self.start)
    }

    pub fn end_param(&self) -> String {
        format_timestamp(self.end)
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
