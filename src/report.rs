//! Plain rendering of ranked results.
//!
//! Consumes the engine's ranked list and recommendation as plain data and
//! writes them as a table, JSON, CSV or TSV. No colour, no terminal control.

use crate::cli::OutputFormat;
use crate::engine::types::{EndpointStats, RunSummary};
use crate::error::Result;
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;

/// Everything one run produces for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Every endpoint, in ranking order
    pub ranked: Vec<EndpointStats>,
    /// The best available endpoints
    pub recommended: Vec<EndpointStats>,
    /// Run-wide totals
    pub summary: RunSummary,
}

impl Report {
    /// Assemble a report from a ranked list and its recommendation.
    #[must_use]
    pub fn new(ranked: Vec<EndpointStats>, recommended: Vec<EndpointStats>) -> Self {
        let summary = RunSummary::from_stats(&ranked);
        Self {
            ranked,
            recommended,
            summary,
        }
    }
}

/// Write `report` to `out` in `format`.
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn render<W: Write>(out: &mut W, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(out, report)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => render_delimited(out, &report.ranked, ',')?,
        OutputFormat::Tsv => render_delimited(out, &report.ranked, '\t')?,
    }
    Ok(())
}

fn latency_cell(stats: &EndpointStats) -> (String, String) {
    match (stats.latency.mean(), stats.latency.min(), stats.latency.max()) {
        (Some(mean), Some(min), Some(max)) => {
            (format!("{mean:.2} ms"), format!("{min:.2}/{max:.2}"))
        }
        _ => (stats.outcome().to_string(), "-/-".to_string()),
    }
}

fn render_table<W: Write>(out: &mut W, report: &Report) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<4} {:<20} {:<18} {:<8} {:<12} {:<15} {:<8} {:<6} {:<8}",
        "#", "Name", "IP", "Region", "Mean", "Min/Max", "Success", "Conn", "Status"
    )?;
    writeln!(out, "{}", "-".repeat(106))?;

    for (idx, s) in report.ranked.iter().enumerate() {
        let (mean, min_max) = latency_cell(s);
        writeln!(
            out,
            "{:<4} {:<20} {:<18} {:<8} {:<12} {:<15} {:<8} {:<6} {:<8}",
            idx + 1,
            s.endpoint.name,
            s.endpoint.address,
            s.endpoint.region_or_unknown(),
            mean,
            min_max,
            format!("{:.0}%", s.success_rate()),
            if s.connectivity { "yes" } else { "no" },
            s.outcome()
        )?;
    }

    writeln!(out)?;
    if report.recommended.is_empty() {
        writeln!(out, "No usable endpoint found")?;
    } else {
        writeln!(out, "Recommended:")?;
        for (idx, s) in report.recommended.iter().enumerate() {
            let (mean, _) = latency_cell(s);
            writeln!(
                out,
                "{}. {} ({}) - {} (success {:.0}%)",
                idx + 1,
                s.endpoint.name,
                s.endpoint.address,
                mean,
                s.success_rate()
            )?;
        }
    }

    let summary = &report.summary;
    writeln!(out)?;
    writeln!(
        out,
        "Total: {}  ok: {} ({:.0}%)  error: {} (timeout: {})",
        summary.total,
        summary.ok,
        summary.ok_rate(),
        summary.error,
        summary.timeout
    )?;
    if let Some(avg) = summary.avg_latency {
        writeln!(out, "Average of means: {avg:.2} ms")?;
    }
    Ok(())
}

/// Quote a field that contains the separator, a quote or a line break.
fn escape_field(field: &str, sep: char) -> Cow<'_, str> {
    if field.contains([sep, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_row<W: Write, S: AsRef<str>>(
    out: &mut W,
    fields: &[S],
    sep: char,
) -> std::io::Result<()> {
    let line: Vec<Cow<'_, str>> = fields
        .iter()
        .map(|f| escape_field(f.as_ref(), sep))
        .collect();
    writeln!(out, "{}", line.join(&sep.to_string()))
}

fn render_delimited<W: Write>(
    out: &mut W,
    ranked: &[EndpointStats],
    sep: char,
) -> std::io::Result<()> {
    let header = [
        "#Rank", "Name", "IP", "Region", "Mean(ms)", "Min(ms)", "Max(ms)", "Success", "Attempts",
        "Connectivity", "Status",
    ];
    write_row(out, &header, sep)?;

    // Unavailable latencies are left empty rather than given a number
    let cell = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
    for (idx, s) in ranked.iter().enumerate() {
        let row = [
            (idx + 1).to_string(),
            s.endpoint.name.clone(),
            s.endpoint.address.clone(),
            s.endpoint.region.clone().unwrap_or_default(),
            cell(s.latency.mean()),
            cell(s.latency.min()),
            cell(s.latency.max()),
            s.success_count.to_string(),
            s.attempts.to_string(),
            s.connectivity.to_string(),
            s.outcome().to_string(),
        ];
        write_row(out, &row, sep)?;
    }
    Ok(())
}
