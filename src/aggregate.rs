//! Corpus-level aggregation and the num_rel_ret consistency check.

use crate::error::{EvalError, Result};
use crate::schema::{
    MetricSchema, SchemaKind, ERR_20, MAP, NDCG_20, NUM_REL, NUM_REL_RET, P_10, RECIP_RANK,
};
use crate::table::{require, MetricTable, QueryMetrics};
use std::fmt;

/// Overall numbers for a trec_eval run
#[derive(Debug, Clone, PartialEq)]
pub struct TrecSummary {
    /// num_rel_ret / num_rel from the overall row
    pub recall: f64,
    /// Mean of the derived per-query recall@10
    pub recall_at_10: f64,
    pub query_count: usize,
    /// Queries whose derived precision@1 is 1
    pub got_correct: u32,
    pub precision_at_1: f64,
    /// Reciprocal rank from the overall row
    pub mrr: f64,
    /// MAP from the overall row
    pub map: f64,
}

/// Overall numbers for a gdeval run, taken from the `amean` row
#[derive(Debug, Clone, PartialEq)]
pub struct GdEvalSummary {
    pub ndcg_at_20: f64,
    pub err_at_20: f64,
    pub query_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    TrecEval(TrecSummary),
    GdEval(GdEvalSummary),
}

impl Summary {
    pub fn query_count(&self) -> usize {
        match self {
            Summary::TrecEval(s) => s.query_count,
            Summary::GdEval(s) => s.query_count,
        }
    }
}

/// One cell of a per-query value column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Count(u32),
    Real(f64),
}

impl ColumnValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ColumnValue::Count(v) => f64::from(v),
            ColumnValue::Real(v) => v,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Count(v) => write!(f, "{}", v),
            ColumnValue::Real(v) => {
                // plain decimal notation, never an exponent
                let text = v.to_string();
                if v.is_finite() && !text.contains('.') {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

/// Per-query values of one metric, in table order. Written as `<prefix>.<name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn {
    pub name: &'static str,
    /// Metric the values were read from
    pub source: &'static str,
    pub values: Vec<ColumnValue>,
}

impl ValueColumn {
    pub fn sum(&self) -> f64 {
        self.values.iter().map(|v| v.as_f64()).sum()
    }
}

/// Read-only result of aggregating a validated metric table.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub summary: Summary,
    pub columns: Vec<ValueColumn>,
}

/// Aggregate a parsed table according to its schema.
///
/// Checks the overall row for every metric the schema requires, builds the
/// per-query columns through their derivations, then summarizes.
pub fn aggregate(table: &MetricTable, schema: &MetricSchema) -> Result<EvaluationReport> {
    let overall_id = table.overall_id();
    let overall = table.overall()?;
    for metric in schema.overall_metrics {
        require(overall, overall_id, metric)?;
    }

    let mut columns: Vec<ValueColumn> = schema
        .columns
        .iter()
        .map(|spec| ValueColumn {
            name: spec.name,
            source: spec.source,
            values: Vec::new(),
        })
        .collect();
    for (query_id, row) in table.queries() {
        for (spec, column) in schema.columns.iter().zip(columns.iter_mut()) {
            let value = require(row, query_id, spec.source)?;
            column.values.push(spec.derivation.apply(value));
        }
    }

    let query_count = table.query_count();
    let summary = match schema.kind {
        SchemaKind::TrecEval => {
            Summary::TrecEval(summarize_trec(overall, overall_id, &columns, query_count)?)
        }
        SchemaKind::GdEval => Summary::GdEval(GdEvalSummary {
            ndcg_at_20: require(overall, overall_id, NDCG_20)?,
            err_at_20: require(overall, overall_id, ERR_20)?,
            query_count,
        }),
    };

    Ok(EvaluationReport { summary, columns })
}

fn summarize_trec(
    overall: &QueryMetrics,
    overall_id: &str,
    columns: &[ValueColumn],
    query_count: usize,
) -> Result<TrecSummary> {
    if query_count == 0 {
        return Err(EvalError::Degenerate(
            "no per-query rows in trec_eval output (was it run with -q?)".to_string(),
        ));
    }

    let num_rel = require(overall, overall_id, NUM_REL)?;
    let num_rel_ret = require(overall, overall_id, NUM_REL_RET)?;
    let summed = column_sum(columns, NUM_REL_RET);
    if num_rel_ret != summed {
        return Err(EvalError::Consistency {
            reported: num_rel_ret,
            summed,
        });
    }
    if num_rel == 0.0 {
        return Err(EvalError::Degenerate(
            "num_rel is zero in the overall row, recall is undefined".to_string(),
        ));
    }
    log::debug!(
        "trec_eval: {} queries, num_rel_ret {} matches per-query sum",
        query_count,
        num_rel_ret
    );

    let n = query_count as f64;
    let got_correct = column_sum(columns, RECIP_RANK);
    Ok(TrecSummary {
        recall: num_rel_ret / num_rel,
        recall_at_10: column_sum(columns, P_10) / n,
        query_count,
        got_correct: got_correct as u32,
        precision_at_1: got_correct / n,
        mrr: require(overall, overall_id, RECIP_RANK)?,
        map: require(overall, overall_id, MAP)?,
    })
}

/// Sum of the column built from `source`; 0 when no column reads it.
fn column_sum(columns: &[ValueColumn], source: &str) -> f64 {
    columns
        .iter()
        .find(|c| c.source == source)
        .map(ValueColumn::sum)
        .unwrap_or(0.0)
}
