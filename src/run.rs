//! One evaluation run: evaluator output -> table -> report -> files.
//!
//! All state lives in [`EvaluationRun`], built fresh per invocation.

use crate::aggregate::{aggregate, EvaluationReport};
use crate::error::Result;
use crate::parse::parse_lines;
use crate::report::ReportWriter;
use crate::schema::MetricSchema;
use crate::table::MetricTable;
use crate::tool;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where the evaluator output comes from
#[derive(Debug, Clone)]
pub enum OutputSource {
    /// Run the evaluator at this path against the qrel and run files
    Invoke { program: PathBuf },
    /// Previously captured evaluator output
    Captured { path: PathBuf },
}

/// Parsed evaluator output for one run.
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    schema: MetricSchema,
    raw_lines: Vec<String>,
    table: MetricTable,
}

impl EvaluationRun {
    /// Parse raw evaluator output for the given schema.
    pub fn from_output(schema: MetricSchema, output: &str) -> Result<Self> {
        let raw_lines: Vec<String> = output.lines().map(str::to_string).collect();
        let table = parse_lines(raw_lines.iter().map(String::as_str), &schema)?;
        Ok(Self {
            schema,
            raw_lines,
            table,
        })
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    pub fn table(&self) -> &MetricTable {
        &self.table
    }

    /// Aggregate and cross-check; fails before anything is written.
    pub fn aggregate(&self) -> Result<EvaluationReport> {
        aggregate(&self.table, &self.schema)
    }

    /// Aggregate, then write every artifact under `prefix`.
    pub fn write_reports<W: Write>(&self, prefix: &Path, stdout: &mut W) -> Result<Vec<PathBuf>> {
        let report = self.aggregate()?;
        log::info!(
            "{} queries passed {} aggregation",
            report.summary.query_count(),
            self.schema.kind
        );
        ReportWriter::new(prefix).write_all(
            &report,
            self.schema.raw_extension,
            &self.raw_lines,
            stdout,
        )
    }
}

/// Full pipeline: obtain output, parse, aggregate, validate, report.
pub fn execute<W: Write>(
    schema: MetricSchema,
    source: &OutputSource,
    qrel: &Path,
    run: &Path,
    prefix: &Path,
    stdout: &mut W,
) -> Result<Vec<PathBuf>> {
    let output = match source {
        OutputSource::Invoke { program } => tool::invoke(&schema, program, qrel, run)?,
        OutputSource::Captured { path } => {
            log::info!(
                "Reading captured {} output from {} (qrel {}, run {})",
                schema.kind,
                path.display(),
                qrel.display(),
                run.display()
            );
            std::fs::read_to_string(path)?
        }
    };

    let evaluation = EvaluationRun::from_output(schema, &output)?;
    log::info!(
        "Parsed {} queries from {} output",
        evaluation.table().query_count(),
        evaluation.schema().kind
    );
    evaluation.write_reports(prefix, stdout)
}
