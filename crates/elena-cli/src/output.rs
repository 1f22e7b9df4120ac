//! Output formatting for planned routes.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use elena_lib::{PathComparison, PathRequest, PathStats};

/// How a planned route is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with waypoints.
    #[default]
    Text,
    /// The route comparison as JSON, as the HTTP service returns it.
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteReport<'a> {
    request: &'a PathRequest,
    #[serde(flatten)]
    comparison: &'a PathComparison,
}

/// Write `comparison` for `request` in the chosen format.
pub fn render<W: Write>(
    out: &mut W,
    format: OutputFormat,
    request: &PathRequest,
    comparison: &PathComparison,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(out, request, comparison),
        OutputFormat::Json => render_json(out, request, comparison),
    }
}

/// Render the comparison as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<W: Write>(
    out: &mut W,
    request: &PathRequest,
    comparison: &PathComparison,
) -> io::Result<()> {
    let report = RouteReport {
        request,
        comparison,
    };
    serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::other)?;
    out.write_all(b"\n")
}

pub fn render_text<W: Write>(
    out: &mut W,
    request: &PathRequest,
    comparison: &PathComparison,
) -> io::Result<()> {
    writeln!(
        out,
        "Route ({} elevation, {}% distance budget, {} graph):",
        request.elevation, request.distance_percent, request.graph
    )?;
    write_stats(out, "route", &comparison.stats.result_path)?;
    write_stats(out, "shortest", &comparison.stats.shortest_path)?;

    if comparison.result == comparison.shortest {
        writeln!(out, "\nNo alternative beat the shortest path.")?;
    }

    writeln!(out, "\nWaypoints:")?;
    let len = comparison.route.len();
    for (i, [lat, lon]) in comparison.route.iter().enumerate() {
        let prefix = if i == 0 {
            '+'
        } else if i + 1 == len {
            '-'
        } else {
            '|'
        };
        writeln!(out, " {prefix} ({lat:.6}, {lon:.6})")?;
    }
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, label: &str, stats: &PathStats) -> io::Result<()> {
    writeln!(
        out,
        "  {label:<9}{} m long, {} m climbed",
        stats.path_length, stats.elevation_gain
    )
}
