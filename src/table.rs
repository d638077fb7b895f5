use crate::error::{EvalError, Result};
use std::collections::HashMap;

/// Metric values reported for one query id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryMetrics {
    values: HashMap<String, f64>,
}

impl QueryMetrics {
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores a value, returning the one it replaced (last write wins).
    fn set(&mut self, metric: &str, value: f64) -> Option<f64> {
        self.values.insert(metric.to_string(), value)
    }
}

/// Query id -> metrics, iterated in first-seen order.
///
/// Holds the per-query rows plus the overall row named by `overall_id`.
/// Built once by the parser and only read afterwards.
#[derive(Debug, Clone)]
pub struct MetricTable {
    overall_id: String,
    order: Vec<String>,
    rows: HashMap<String, QueryMetrics>,
}

impl MetricTable {
    pub fn new(overall_id: impl Into<String>) -> Self {
        Self {
            overall_id: overall_id.into(),
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    pub fn overall_id(&self) -> &str {
        &self.overall_id
    }

    /// Registers a query id on first sighting.
    pub fn touch(&mut self, query_id: &str) -> &mut QueryMetrics {
        if !self.rows.contains_key(query_id) {
            self.order.push(query_id.to_string());
        }
        self.rows.entry(query_id.to_string()).or_default()
    }

    /// Records one value, overwriting any earlier value for the same pair.
    pub fn record(&mut self, query_id: &str, metric: &str, value: f64) {
        if let Some(previous) = self.touch(query_id).set(metric, value) {
            log::debug!(
                "Duplicate {} for query {}: {} replaced by {}",
                metric,
                query_id,
                previous,
                value
            );
        }
    }

    pub fn get(&self, query_id: &str) -> Option<&QueryMetrics> {
        self.rows.get(query_id)
    }

    /// Overall row; its absence means the evaluator did not report results.
    pub fn overall(&self) -> Result<&QueryMetrics> {
        self.rows.get(&self.overall_id).ok_or_else(|| EvalError::MissingKey {
            query_id: self.overall_id.clone(),
            metric: None,
        })
    }

    /// Per-query ids (overall row excluded) in input-encounter order.
    pub fn query_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order
            .iter()
            .map(String::as_str)
            .filter(move |id| *id != self.overall_id)
    }

    /// Per-query rows (overall row excluded) in input-encounter order.
    pub fn queries(&self) -> impl Iterator<Item = (&str, &QueryMetrics)> + '_ {
        self.query_ids().filter_map(move |id| self.rows.get(id).map(|row| (id, row)))
    }

    pub fn query_count(&self) -> usize {
        self.query_ids().count()
    }

    /// Number of rows including the overall row.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Looks up a metric that must be present in `row`.
pub fn require(row: &QueryMetrics, query_id: &str, metric: &str) -> Result<f64> {
    row.get(metric).ok_or_else(|| EvalError::MissingKey {
        query_id: query_id.to_string(),
        metric: Some(metric.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_first_sighting() {
        let mut table = MetricTable::new("all");
        table.record("q2", "map", 0.1);
        table.record("all", "map", 0.2);
        table.record("q1", "map", 0.3);
        table.record("q2", "P_10", 0.4);

        let ids: Vec<&str> = table.query_ids().collect();
        assert_eq!(ids, vec!["q2", "q1"]);
        assert_eq!(table.query_count(), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_overwrites() {
        let mut table = MetricTable::new("all");
        table.record("q1", "map", 0.1);
        table.record("q1", "map", 0.9);
        assert_eq!(table.get("q1").unwrap().get("map"), Some(0.9));
        assert_eq!(table.get("q1").unwrap().len(), 1);
    }

    #[test]
    fn test_touch_registers_empty_row() {
        let mut table = MetricTable::new("all");
        table.touch("q1");
        assert!(table.get("q1").unwrap().is_empty());
        assert_eq!(table.query_count(), 1);
    }

    #[test]
    fn test_missing_overall_row() {
        let mut table = MetricTable::new("amean");
        table.record("q1", "ndcg@20", 0.5);
        let err = table.overall().unwrap_err();
        assert!(matches!(
            err,
            EvalError::MissingKey { ref query_id, metric: None } if query_id == "amean"
        ));
    }

    #[test]
    fn test_require_missing_metric() {
        let mut table = MetricTable::new("all");
        table.record("all", "map", 0.2);
        let row = table.overall().unwrap();
        assert_eq!(require(row, "all", "map").unwrap(), 0.2);
        assert!(matches!(
            require(row, "all", "num_rel"),
            Err(EvalError::MissingKey { metric: Some(_), .. })
        ));
    }
}
