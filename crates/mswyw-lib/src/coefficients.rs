//! Formula coefficient validation
//!
//! A coefficient table weights each metric plus a `total` scaling factor.
//! Tables arrive as loosely typed structured data and are checked here
//! before the formula engine ever sees them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MswywError, Result};
use crate::models::Metric;

/// Keys every table must carry, in the order they are checked
pub const REQUIRED_COEFFICIENTS: [&str; 7] =
    ["total", "apdex", "rpm", "endpoints", "mem", "cpu", "epm"];

/// Coefficients used when none are supplied
pub const DEFAULT_COEFFICIENTS: &str = r#"{"endpoints":100.0,"mem":1.0,"cpu":1000.0,"apdex":1000.0,"rpm":1000.0,"epm":100.0,"total":1000.0}"#;

/// Validated metric weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientTable {
    pub total: f64,
    pub mem: f64,
    pub cpu: f64,
    pub epm: f64,
    pub apdex: f64,
    pub rpm: f64,
    pub endpoints: f64,
}

impl CoefficientTable {
    /// Validate a raw table and convert it into typed weights
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| MswywError::malformed("coefficients", "expected an object"))?;
        validate(map)?;

        let weight = |name: &str| -> Result<f64> {
            map.get(name)
                .and_then(as_real)
                .ok_or_else(|| MswywError::MissingCoefficient {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            total: weight("total")?,
            mem: weight("mem")?,
            cpu: weight("cpu")?,
            epm: weight("epm")?,
            apdex: weight("apdex")?,
            rpm: weight("rpm")?,
            endpoints: weight("endpoints")?,
        })
    }

    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mem => self.mem,
            Metric::Cpu => self.cpu,
            Metric::Epm => self.epm,
            Metric::Apdex => self.apdex,
            Metric::Rpm => self.rpm,
            Metric::Endpoints => self.endpoints,
        }
    }
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self {
            total: 1000.0,
            mem: 1.0,
            cpu: 1000.0,
            epm: 100.0,
            apdex: 1000.0,
            rpm: 1000.0,
            endpoints: 100.0,
        }
    }
}

/// Check a coefficient table for completeness and numeric values
///
/// Presence is checked first for every required key; only then are the
/// values (including any extra keys) checked for being real numbers.
pub fn validate(coefficients: &Map<String, Value>) -> Result<()> {
    if let Some(name) = REQUIRED_COEFFICIENTS
        .iter()
        .find(|name| !coefficients.contains_key(**name))
    {
        return Err(MswywError::MissingCoefficient {
            name: name.to_string(),
        });
    }

    for (name, value) in coefficients {
        if as_real(value).is_none() {
            return Err(MswywError::InvalidCoefficientValue {
                name: name.clone(),
                value: value.to_string(),
            });
        }
    }

    Ok(())
}

/// Numbers and numeric strings count as real numbers
fn as_real(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_table() -> Map<String, Value> {
        match json!({
            "total": 1000, "apdex": 1000, "rpm": 1000, "endpoints": 100,
            "mem": 1, "cpu": 1000, "epm": 100
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_complete_table_validates() {
        assert!(validate(&full_table()).is_ok());
    }

    #[test]
    fn test_each_missing_key_is_reported() {
        for name in REQUIRED_COEFFICIENTS {
            let mut table = full_table();
            table.remove(name);

            match validate(&table) {
                Err(MswywError::MissingCoefficient { name: missing }) => assert_eq!(missing, name),
                other => panic!("expected MissingCoefficient for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        for bad in [json!("lots"), json!(true), json!(null), json!([1]), json!({"v": 1})] {
            let mut table = full_table();
            table.insert("cpu".to_string(), bad.clone());

            match validate(&table) {
                Err(MswywError::InvalidCoefficientValue { name, .. }) => assert_eq!(name, "cpu"),
                other => panic!("expected InvalidCoefficientValue for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut table = full_table();
        table.insert("mem".to_string(), json!("2.5"));

        let parsed = CoefficientTable::from_value(&Value::Object(table)).unwrap();
        assert_eq!(parsed.mem, 2.5);
    }

    #[test]
    fn test_extra_keys_must_be_numeric() {
        let mut table = full_table();
        table.insert("latency".to_string(), json!(3));
        assert!(validate(&table).is_ok());

        table.insert("latency".to_string(), json!("slow"));
        assert!(matches!(
            validate(&table),
            Err(MswywError::InvalidCoefficientValue { .. })
        ));
    }

    #[test]
    fn test_default_literal_matches_default_table() {
        let value: Value = serde_json::from_str(DEFAULT_COEFFICIENTS).unwrap();
        let parsed = CoefficientTable::from_value(&value).unwrap();
        assert_eq!(parsed, CoefficientTable::default());
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = CoefficientTable::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MswywError::MalformedData { .. }));
    }
}
