//! Report writer: summary text, raw-output copy and per-query value columns.

use crate::aggregate::{EvaluationReport, GdEvalSummary, Summary, TrecSummary, ValueColumn};
use crate::error::Result;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Render the fixed-label summary text.
pub fn render_summary(summary: &Summary) -> String {
    match summary {
        Summary::TrecEval(s) => render_trec(s),
        Summary::GdEval(s) => render_gdeval(s),
    }
}

fn render_trec(s: &TrecSummary) -> String {
    let mut text = String::new();
    text.push_str(&format!("recall:          {:.6}\n", s.recall));
    text.push_str(&format!("recall@10:       {:.6}\n", s.recall_at_10));
    text.push_str(&format!("# of queries:    {}\n", s.query_count));
    text.push_str(&format!("got correct:     {}\n", s.got_correct));
    text.push_str(&format!("p@1:             {:.6}\n", s.precision_at_1));
    text.push_str(&format!("MRR:             {:.6}\n", s.mrr));
    text.push_str(&format!("MAP:             {:.6}\n", s.map));
    text
}

fn render_gdeval(s: &GdEvalSummary) -> String {
    let mut text = String::new();
    text.push_str(&format!("ndcg@20:          {:.6}\n", s.ndcg_at_20));
    text.push_str(&format!("err@20:           {:.6}\n", s.err_at_20));
    text.push_str(&format!("# of queries:     {}\n", s.query_count));
    text
}

/// `<prefix>.<extension>`, appended rather than replacing any existing extension.
pub fn artifact_path(prefix: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Writes every artifact of one run under a common path prefix.
///
/// Each file is created, written and closed before the next one is opened.
pub struct ReportWriter {
    prefix: PathBuf,
}

impl ReportWriter {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Write the summary to `stdout` and `<prefix>.rep`, the raw copy to
    /// `<prefix>.<raw_extension>`, then one `<prefix>.<column>` per value column.
    /// Returns the paths written, in order.
    pub fn write_all<W: Write>(
        &self,
        report: &EvaluationReport,
        raw_extension: &str,
        raw_lines: &[String],
        stdout: &mut W,
    ) -> Result<Vec<PathBuf>> {
        let text = render_summary(&report.summary);
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;

        let mut written = Vec::with_capacity(2 + report.columns.len());
        written.push(self.write_summary(&text)?);
        written.push(self.write_raw(raw_extension, raw_lines)?);
        for column in &report.columns {
            written.push(self.write_column(column)?);
        }
        log::info!("Wrote {} report files with prefix {}", written.len(), self.prefix.display());
        Ok(written)
    }

    pub fn write_summary(&self, text: &str) -> Result<PathBuf> {
        let path = artifact_path(&self.prefix, "rep");
        std::fs::write(&path, text)?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Raw evaluator output, one line per input line, trailing whitespace trimmed.
    pub fn write_raw(&self, extension: &str, lines: &[String]) -> Result<PathBuf> {
        let path = artifact_path(&self.prefix, extension);
        let mut out = BufWriter::new(File::create(&path)?);
        for line in lines {
            writeln!(out, "{}", line.trim_end())?;
        }
        out.flush()?;
        log::debug!("Wrote {} ({} lines)", path.display(), lines.len());
        Ok(path)
    }

    /// Single tab-separated row, no header.
    pub fn write_column(&self, column: &ValueColumn) -> Result<PathBuf> {
        let path = artifact_path(&self.prefix, column.name);
        let row: Vec<String> = column.values.iter().map(|v| v.to_string()).collect();
        std::fs::write(&path, format!("{}\n", row.join("\t")))?;
        log::debug!("Wrote {} ({} values)", path.display(), row.len());
        Ok(path)
    }
}
