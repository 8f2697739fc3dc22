//! Metric maps produced by evaluation cycles and their column view.

use crate::error::MlError;
use std::collections::BTreeMap;

/// Metric name to value, as reported by one evaluation cycle.
pub type MetricMap = BTreeMap<String, f64>;

/// Metric name to its values across cycles, in cycle order.
pub type MetricTable = BTreeMap<String, Vec<f64>>;

/// Rewrite every metric name as `name + suffix`.
pub fn suffixed(metrics: MetricMap, suffix: &str) -> MetricMap {
    if suffix.is_empty() {
        return metrics;
    }
    metrics
        .into_iter()
        .map(|(name, value)| (format!("{name}{suffix}"), value))
        .collect()
}

/// Check that `found` carries exactly the keys of `expected`.
pub(crate) fn check_key_set(
    cycle: usize,
    expected: &MetricMap,
    found: &MetricMap,
) -> Result<(), MlError> {
    if expected.keys().eq(found.keys()) {
        return Ok(());
    }
    Err(MlError::MetricSetMismatch {
        cycle,
        expected: expected.keys().cloned().collect(),
        found: found.keys().cloned().collect(),
    })
}

/// Turn a sequence of per-cycle metric maps into one column per metric.
///
/// Every map must carry the same key set as the first one; columns therefore
/// all have the same length as `results`.
pub fn unpack_results(results: &[MetricMap]) -> Result<MetricTable, MlError> {
    let Some(first) = results.first() else {
        return Ok(MetricTable::new());
    };

    let mut table: MetricTable = first
        .keys()
        .map(|name| (name.clone(), Vec::with_capacity(results.len())))
        .collect();

    for (cycle, metrics) in results.iter().enumerate() {
        check_key_set(cycle, first, metrics)?;
        for (name, value) in metrics {
            if let Some(column) = table.get_mut(name) {
                column.push(*value);
            }
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, f64)]) -> MetricMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_suffixed_rewrites_every_key() {
        let out = suffixed(map(&[("loss", 0.5), ("acc", 0.9)]), "_val");
        assert_eq!(out, map(&[("loss_val", 0.5), ("acc_val", 0.9)]));
    }

    #[test]
    fn test_suffixed_empty_suffix() {
        let input = map(&[("loss", 0.5)]);
        assert_eq!(suffixed(input.clone(), ""), input);
    }

    #[test]
    fn test_unpack_results_columns() {
        let results = vec![
            map(&[("loss", 0.5), ("acc", 0.7)]),
            map(&[("loss", 0.4), ("acc", 0.8)]),
            map(&[("loss", 0.3), ("acc", 0.9)]),
        ];
        let table = unpack_results(&results).unwrap();
        let mut expected = MetricTable::new();
        expected.insert("loss".into(), vec![0.5, 0.4, 0.3]);
        expected.insert("acc".into(), vec![0.7, 0.8, 0.9]);
        assert_eq!(table, expected);
    }

    #[test]
    fn test_unpack_results_empty() {
        assert!(unpack_results(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_results_rejects_new_key() {
        let results = vec![map(&[("loss", 0.5)]), map(&[("loss", 0.4), ("acc", 0.8)])];
        match unpack_results(&results) {
            Err(MlError::MetricSetMismatch { cycle, found, .. }) => {
                assert_eq!(cycle, 1);
                assert_eq!(found, vec!["acc".to_string(), "loss".to_string()]);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unpack_results_rejects_missing_key() {
        let results = vec![map(&[("loss", 0.5), ("acc", 0.7)]), map(&[("loss", 0.4)])];
        assert!(matches!(
            unpack_results(&results),
            Err(MlError::MetricSetMismatch { cycle: 1, .. })
        ));
    }
}
