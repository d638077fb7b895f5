use thiserror::Error;

/// Main error type for evalreport
#[derive(Error, Debug)]
pub enum EvalError {
    /// A line did not split into the field count its schema expects
    #[error("wrong-format line: '{line}'")]
    Format { line: String },

    /// A recognized metric carried a value that is not a number
    #[error("invalid metric value '{value}' in line: '{line}'")]
    InvalidValue { line: String, value: String },

    /// The overall row, a query row, or a required metric inside one is absent
    #[error("{}", missing_key_message(.query_id, .metric))]
    MissingKey {
        query_id: String,
        metric: Option<String>,
    },

    /// The tool's own total disagrees with the per-query sum
    #[error(
        "Something is wrong, num. relevant returned reported by trec_eval ({reported}) \
         isn't equal the sum of query-specific values ({summed})"
    )]
    Consistency { reported: f64, summed: f64 },

    /// The external evaluator could not be run or exited non-zero
    #[error("External tool error: {0}")]
    ExternalTool(String),

    /// Nothing to average over
    #[error("Degenerate run: {0}")]
    Degenerate(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn missing_key_message(query_id: &str, metric: &Option<String>) -> String {
    match metric {
        Some(metric) => format!("Missing metric '{}' for query '{}'", metric, query_id),
        None => format!("Missing row for query '{}' in evaluator output", query_id),
    }
}

/// Convenient Result type using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_carries_line() {
        let err = EvalError::Format { line: "P_10 q1".to_string() };
        assert_eq!(err.to_string(), "wrong-format line: 'P_10 q1'");
    }

    #[test]
    fn test_missing_key_display() {
        let row = EvalError::MissingKey { query_id: "all".to_string(), metric: None };
        assert!(row.to_string().contains("'all'"));

        let metric = EvalError::MissingKey {
            query_id: "all".to_string(),
            metric: Some("num_rel".to_string()),
        };
        assert!(metric.to_string().contains("'num_rel'"));
        assert!(metric.to_string().contains("'all'"));
    }

    #[test]
    fn test_consistency_display_names_both_counts() {
        let err = EvalError::Consistency { reported: 8.0, summed: 7.0 };
        let msg = err.to_string();
        assert!(msg.contains("(8)"));
        assert!(msg.contains("(7)"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EvalError = io_err.into();
        assert!(matches!(err, EvalError::Io(_)));
    }
}
