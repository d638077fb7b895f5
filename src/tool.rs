//! Invocation of the external evaluator (trec_eval binary or gdeval script).

use crate::error::{EvalError, Result};
use crate::schema::MetricSchema;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Arguments passed to the evaluator for a schema.
pub fn tool_args(schema: &MetricSchema, qrel: &Path, run: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = schema.tool_flags.iter().map(OsString::from).collect();
    args.push(qrel.as_os_str().to_owned());
    args.push(run.as_os_str().to_owned());
    args
}

/// Run the evaluator to completion and return its standard output.
///
/// A spawn failure or non-zero exit is an [`EvalError::ExternalTool`].
pub fn invoke(schema: &MetricSchema, program: &Path, qrel: &Path, run: &Path) -> Result<String> {
    let args = tool_args(schema, qrel, run);
    log::info!("Running {} {:?}", program.display(), args);

    let output = Command::new(program).args(&args).output().map_err(|e| {
        EvalError::ExternalTool(format!("failed to run {}: {}", program.display(), e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EvalError::ExternalTool(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    log::debug!("{} produced {} bytes", schema.kind, stdout.len());
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trec_eval_args() {
        let args = tool_args(&MetricSchema::trec_eval(), Path::new("q.qrel"), Path::new("r.run"));
        assert_eq!(args, vec![OsString::from("-q"), "q.qrel".into(), "r.run".into()]);
    }

    #[test]
    fn test_gdeval_args() {
        let args = tool_args(&MetricSchema::gdeval(), Path::new("q.qrel"), Path::new("r.run"));
        assert_eq!(args, vec![OsString::from("q.qrel"), "r.run".into()]);
    }

    #[test]
    fn test_missing_program() {
        let err = invoke(
            &MetricSchema::trec_eval(),
            Path::new("/nonexistent/trec_eval_binary"),
            Path::new("q"),
            Path::new("r"),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::ExternalTool(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit() {
        let err = invoke(&MetricSchema::gdeval(), Path::new("false"), Path::new("q"), Path::new("r"))
            .unwrap_err();
        assert!(matches!(err, EvalError::ExternalTool(ref m) if m.contains("exited")));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        // `echo` stands in for the evaluator and prints its arguments
        let out = invoke(&MetricSchema::trec_eval(), Path::new("echo"), Path::new("q"), Path::new("r"))
            .unwrap();
        assert_eq!(out, "-q q r\n");
    }
}
