//! Worth formula
//!
//! Folds metric records into a weighted cost (memory, CPU, errors) and a
//! weighted value (apdex, traffic, endpoints):
//!
//! ```text
//! score = total * value / cost    (0 when cost <= 0)
//! ```

use crate::coefficients::CoefficientTable;
use crate::error::{MswywError, Result};
use crate::models::{Metric, MetricAverages, MetricOverrides, MetricRecord, ScoreResult};

/// Value a metric contributes for one record
///
/// Precedence: override, then the record's own value, then the default.
pub fn resolve_metric(
    metric: Metric,
    record: &MetricRecord,
    overrides: &MetricOverrides,
    default_for_missing: f64,
) -> f64 {
    overrides
        .get(metric)
        .or_else(|| record.get(metric))
        .unwrap_or(default_for_missing)
}

/// Compute cost, value and the final worth score
pub fn score(
    records: &[MetricRecord],
    coefficients: &CoefficientTable,
    overrides: &MetricOverrides,
    default_for_missing: f64,
) -> ScoreResult {
    let weighted_sum = |record: &MetricRecord, metrics: &[Metric]| -> f64 {
        metrics
            .iter()
            .map(|&m| {
                coefficients.weight(m) * resolve_metric(m, record, overrides, default_for_missing)
            })
            .sum::<f64>()
    };

    let (cost, value) = records.iter().fold((0.0, 0.0), |(cost, value), record| {
        (
            cost + weighted_sum(record, &Metric::COST),
            value + weighted_sum(record, &Metric::VALUE),
        )
    });

    let score = if cost <= 0.0 {
        0.0
    } else {
        coefficients.total * (value / cost)
    };

    ScoreResult { cost, value, score }
}

/// Arithmetic means of apdex, epm and rpm across records
pub fn averages(records: &[MetricRecord], default_for_missing: f64) -> Result<MetricAverages> {
    if records.is_empty() {
        return Err(MswywError::EmptyInput);
    }

    let count = records.len() as f64;
    let mean = |metric: Metric| {
        records
            .iter()
            .map(|r| r.get(metric).unwrap_or(default_for_missing))
            .sum::<f64>()
            / count
    };

    Ok(MetricAverages {
        apdex_avg: mean(Metric::Apdex),
        epm_avg: mean(Metric::Epm),
        rpm_avg: mean(Metric::Rpm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MetricRecord {
        MetricRecord {
            mem: Some(10.0),
            cpu: Some(2.0),
            epm: Some(1.0),
            apdex: Some(0.5),
            rpm: Some(100.0),
            endpoints: Some(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_records_score_zero() {
        let result = score(&[], &CoefficientTable::default(), &MetricOverrides::new(), 0.0);
        assert_eq!(result, ScoreResult::default());
    }

    #[test]
    fn test_reference_score() {
        let result = score(
            &[sample_record()],
            &CoefficientTable::default(),
            &MetricOverrides::new(),
            0.0,
        );

        // cost = 1*10 + 1000*2 + 100*1 ; value = 1000*0.5 + 1000*100 + 100*5
        assert_eq!(result.cost, 2110.0);
        assert_eq!(result.value, 101_000.0);
        assert!((result.score - 47_867.298_578).abs() < 1e-3);
    }

    #[test]
    fn test_override_replaces_record_value() {
        let coefficients = CoefficientTable::default();
        let base = score(&[sample_record()], &coefficients, &MetricOverrides::new(), 0.0);
        let overridden = score(
            &[sample_record()],
            &coefficients,
            &MetricOverrides::new().with(Metric::Mem, 0.0),
            0.0,
        );

        assert_eq!(base.cost - overridden.cost, coefficients.mem * 10.0);
        assert_eq!(base.value, overridden.value);
    }

    #[test]
    fn test_default_fills_missing_fields_once() {
        let coefficients = CoefficientTable {
            total: 1.0,
            mem: 1.0,
            cpu: 1.0,
            epm: 1.0,
            apdex: 1.0,
            rpm: 1.0,
            endpoints: 1.0,
        };
        let record = MetricRecord {
            mem: Some(10.0),
            rpm: Some(3.0),
            ..Default::default()
        };

        let result = score(&[record], &coefficients, &MetricOverrides::new(), 5.0);
        // cpu and epm missing on the cost side, apdex and endpoints on the value side
        assert_eq!(result.cost, 10.0 + 5.0 + 5.0);
        assert_eq!(result.value, 3.0 + 5.0 + 5.0);
    }

    #[test]
    fn test_non_positive_cost_scores_zero() {
        let record = MetricRecord {
            rpm: Some(100.0),
            ..Default::default()
        };
        let result = score(
            &[record],
            &CoefficientTable::default(),
            &MetricOverrides::new(),
            0.0,
        );

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.value, 100_000.0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_resolve_metric_precedence() {
        let record = sample_record();
        let overrides = MetricOverrides::new().with(Metric::Cpu, 42.0);

        assert_eq!(resolve_metric(Metric::Cpu, &record, &overrides, 7.0), 42.0);
        assert_eq!(resolve_metric(Metric::Mem, &record, &overrides, 7.0), 10.0);
        assert_eq!(
            resolve_metric(Metric::Mem, &MetricRecord::default(), &overrides, 7.0),
            7.0
        );
    }

    #[test]
    fn test_averages() {
        let records = vec![
            sample_record(),
            MetricRecord {
                apdex: Some(0.0),
                epm: Some(3.0),
                rpm: Some(300.0),
                ..Default::default()
            },
        ];

        let avg = averages(&records, 0.0).unwrap();
        assert_eq!(avg.apdex_avg, 0.25);
        assert_eq!(avg.epm_avg, 2.0);
        assert_eq!(avg.rpm_avg, 200.0);
    }

    #[test]
    fn test_averages_empty_input() {
        assert!(matches!(averages(&[], 0.0), Err(MswywError::EmptyInput)));
    }
}
