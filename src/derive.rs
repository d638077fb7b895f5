//! Metrics derived from the ones the evaluator reports directly.

/// Reciprocal rank at or above this counts as a rank-1 hit. Absorbs rounding
/// in the evaluator's own 1/rank output; the next possible value is 0.5.
pub const RANK_ONE_THRESHOLD: f64 = 0.999;

/// Cutoff of the precision metric that recall is derived from.
pub const PRECISION_CUTOFF: f64 = 10.0;

/// Precision@1 (1 or 0) from a query's reciprocal rank.
pub fn precision_at_1(reciprocal_rank: f64) -> u32 {
    if reciprocal_rank >= RANK_ONE_THRESHOLD {
        1
    } else {
        0
    }
}

/// Recall@10 from precision@10.
///
/// Only valid when every query has exactly one relevant document, so that
/// `relevant retrieved in top 10 == precision@10 * 10`. Not checked here.
pub fn recall_at_10(precision_at_10: f64) -> f64 {
    precision_at_10 * PRECISION_CUTOFF
}
