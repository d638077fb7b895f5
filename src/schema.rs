//! Metric schemas: what an evaluator prints and how to read it.
//!
//! One engine handles both supported evaluators. Everything that differs
//! between them (field layout, overall-row sentinel, recognized metric names,
//! required totals, per-query columns and their derivations, raw-copy
//! extension, evaluator flags) lives in a [`MetricSchema`] value.

use crate::aggregate::ColumnValue;
use crate::derive::{precision_at_1, recall_at_10};
use std::fmt;

pub const RECIP_RANK: &str = "recip_rank";
pub const NUM_RET: &str = "num_ret";
pub const NUM_REL: &str = "num_rel";
pub const NUM_REL_RET: &str = "num_rel_ret";
pub const P_10: &str = "P_10";
pub const MAP: &str = "map";

pub const NDCG_20: &str = "ndcg@20";
pub const ERR_20: &str = "err@20";

/// Which evaluator produced the output. Selects the summary layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    TrecEval,
    GdEval,
}

/// How one output line splits into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// `metric query_id value`, whitespace separated, no header.
    Whitespace,
    /// A discarded header line, then `run_id,query_id,<columns...>` rows.
    /// The listed metric names map onto the columns after `query_id`.
    Comma { columns: &'static [&'static str] },
}

impl FieldLayout {
    /// Number of fields a data line must split into.
    pub fn field_count(&self) -> usize {
        match self {
            FieldLayout::Whitespace => 3,
            FieldLayout::Comma { columns } => 2 + columns.len(),
        }
    }
}

/// How a per-query column value is obtained from its source metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Reported value, unchanged
    Raw,
    /// 1 or 0 from reciprocal rank
    PrecisionAt1,
    /// precision@10 x 10 (single relevant document per query)
    RecallAt10,
}

impl Derivation {
    pub fn apply(self, value: f64) -> ColumnValue {
        match self {
            Derivation::Raw => ColumnValue::Real(value),
            Derivation::PrecisionAt1 => ColumnValue::Count(precision_at_1(value)),
            Derivation::RecallAt10 => ColumnValue::Real(recall_at_10(value)),
        }
    }
}

/// One per-query value column, written as `<prefix>.<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Metric read from every per-query row
    pub source: &'static str,
    pub derivation: Derivation,
}

/// Declarative description of one evaluator's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSchema {
    pub kind: SchemaKind,
    pub layout: FieldLayout,
    /// Query id of the corpus-level aggregate row.
    pub overall_id: &'static str,
    /// Allow-list of metric names kept by the parser.
    pub metrics: &'static [&'static str],
    /// Metrics that must be present in the overall row.
    pub overall_metrics: &'static [&'static str],
    /// Per-query columns, in the order they are written.
    pub columns: &'static [ColumnSpec],
    /// Extension of the verbatim raw-output copy.
    pub raw_extension: &'static str,
    /// Evaluator flags placed before the qrel and run paths.
    pub tool_flags: &'static [&'static str],
}

const TREC_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "P@1", source: RECIP_RANK, derivation: Derivation::PrecisionAt1 },
    ColumnSpec { name: "recall", source: NUM_REL_RET, derivation: Derivation::Raw },
    ColumnSpec { name: "map", source: MAP, derivation: Derivation::Raw },
    ColumnSpec { name: "recall@10", source: P_10, derivation: Derivation::RecallAt10 },
];

const GDEVAL_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: NDCG_20, source: NDCG_20, derivation: Derivation::Raw },
    ColumnSpec { name: ERR_20, source: ERR_20, derivation: Derivation::Raw },
];

impl MetricSchema {
    /// trec_eval run with `-q`: per-query and `all` rows.
    pub fn trec_eval() -> Self {
        Self {
            kind: SchemaKind::TrecEval,
            layout: FieldLayout::Whitespace,
            overall_id: "all",
            metrics: &[RECIP_RANK, NUM_RET, NUM_REL, NUM_REL_RET, P_10, MAP],
            // P_10 is not printed, but an overall row without it is incomplete
            overall_metrics: &[NUM_REL, NUM_REL_RET, RECIP_RANK, MAP, P_10],
            columns: TREC_COLUMNS,
            raw_extension: "trec_eval",
            tool_flags: &["-q"],
        }
    }

    /// gdeval: CSV with per-query rows and an `amean` row.
    pub fn gdeval() -> Self {
        const CSV_COLUMNS: &[&str] = &[NDCG_20, ERR_20];
        Self {
            kind: SchemaKind::GdEval,
            layout: FieldLayout::Comma { columns: CSV_COLUMNS },
            overall_id: "amean",
            metrics: CSV_COLUMNS,
            overall_metrics: CSV_COLUMNS,
            columns: GDEVAL_COLUMNS,
            raw_extension: "gdeval",
            tool_flags: &[],
        }
    }

    pub fn for_kind(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::TrecEval => Self::trec_eval(),
            SchemaKind::GdEval => Self::gdeval(),
        }
    }

    /// Whether the parser should keep values for this metric name.
    pub fn recognizes(&self, metric: &str) -> bool {
        self.metrics.contains(&metric)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::TrecEval => write!(f, "trec_eval"),
            SchemaKind::GdEval => write!(f, "gdeval"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trec_eval_schema() {
        let schema = MetricSchema::trec_eval();
        assert_eq!(schema.overall_id, "all");
        assert_eq!(schema.layout.field_count(), 3);
        assert!(schema.recognizes("recip_rank"));
        assert!(schema.recognizes("num_rel_ret"));
        assert!(!schema.recognizes("runid"));
        assert!(!schema.recognizes("P_5"));
    }

    #[test]
    fn test_gdeval_schema() {
        let schema = MetricSchema::gdeval();
        assert_eq!(schema.overall_id, "amean");
        assert_eq!(schema.layout.field_count(), 4);
        assert!(schema.recognizes("ndcg@20"));
        assert!(schema.recognizes("err@20"));
        assert_eq!(schema.raw_extension, "gdeval");
        assert!(schema.tool_flags.is_empty());
    }

    #[test]
    fn test_every_column_source_is_recognized() {
        for schema in [MetricSchema::trec_eval(), MetricSchema::gdeval()] {
            for column in schema.columns {
                assert!(schema.recognizes(column.source), "{} not kept", column.source);
            }
            for metric in schema.overall_metrics {
                assert!(schema.recognizes(metric), "{} not kept", metric);
            }
        }
    }

    #[test]
    fn test_derivations() {
        assert_eq!(Derivation::Raw.apply(0.25), ColumnValue::Real(0.25));
        assert_eq!(Derivation::PrecisionAt1.apply(1.0), ColumnValue::Count(1));
        assert_eq!(Derivation::PrecisionAt1.apply(0.5), ColumnValue::Count(0));
        assert_eq!(Derivation::RecallAt10.apply(0.3), ColumnValue::Real(0.3 * 10.0));
    }

    #[test]
    fn test_for_kind_round_trips_kind() {
        assert_eq!(MetricSchema::for_kind(SchemaKind::TrecEval).kind, SchemaKind::TrecEval);
        assert_eq!(MetricSchema::for_kind(SchemaKind::GdEval).kind, SchemaKind::GdEval);
    }
}
