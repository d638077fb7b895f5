//! Line parser: evaluator output text -> [`MetricTable`].

use crate::error::{EvalError, Result};
use crate::schema::{FieldLayout, MetricSchema};
use crate::table::MetricTable;

/// Parse the evaluator's output lines into a metric table.
///
/// Blank lines are skipped. For comma layouts the first non-blank line is a
/// header and is dropped without being checked. Any data line with the wrong
/// number of fields fails the whole parse with [`EvalError::Format`].
/// Metric names outside the schema's allow-list are ignored, but their query
/// id is still registered.
pub fn parse_lines<'a, I>(lines: I, schema: &MetricSchema) -> Result<MetricTable>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = MetricTable::new(schema.overall_id);
    let mut header_pending = matches!(schema.layout, FieldLayout::Comma { .. });

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if header_pending {
            header_pending = false;
            log::debug!("Skipping {} header: {}", schema.kind, line.trim_end());
            continue;
        }
        match schema.layout {
            FieldLayout::Whitespace => parse_whitespace_line(line, schema, &mut table)?,
            FieldLayout::Comma { columns } => {
                parse_comma_line(line, columns, schema, &mut table)?
            }
        }
    }

    log::debug!(
        "Parsed {} rows ({} queries) from {} output",
        table.len(),
        table.query_count(),
        schema.kind
    );
    Ok(table)
}

/// Convenience wrapper over [`parse_lines`] for a whole output buffer.
pub fn parse_output(output: &str, schema: &MetricSchema) -> Result<MetricTable> {
    parse_lines(output.lines(), schema)
}

fn parse_whitespace_line(line: &str, schema: &MetricSchema, table: &mut MetricTable) -> Result<()> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != schema.layout.field_count() {
        return Err(format_error(line));
    }
    let (metric, query_id, value) = (fields[0], fields[1], fields[2]);

    table.touch(query_id);
    if schema.recognizes(metric) {
        table.record(query_id, metric, parse_value(line, value)?);
    } else {
        log::trace!("Ignoring unrecognized metric {} for query {}", metric, query_id);
    }
    Ok(())
}

fn parse_comma_line(
    line: &str,
    columns: &[&str],
    schema: &MetricSchema,
    table: &mut MetricTable,
) -> Result<()> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != schema.layout.field_count() {
        return Err(format_error(line));
    }

    // fields[0] is the run id, which is not kept
    let query_id = fields[1].trim();
    table.touch(query_id);
    for (metric, raw) in columns.iter().zip(&fields[2..]) {
        if schema.recognizes(metric) {
            table.record(query_id, metric, parse_value(line, raw)?);
        } else {
            log::trace!("Ignoring unrecognized column {} for query {}", metric, query_id);
        }
    }
    Ok(())
}

fn parse_value(line: &str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| EvalError::InvalidValue {
        line: line.trim_end().to_string(),
        value: raw.trim().to_string(),
    })
}

fn format_error(line: &str) -> EvalError {
    EvalError::Format { line: line.to_string() }
}
