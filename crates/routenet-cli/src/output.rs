//! Output formatting for plans and network reports.
//!
//! Renderers return strings so the command handlers decide which stream
//! they go to; failures are written to stderr, everything else to stdout.

use std::fmt;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use routenet_lib::{Plan, PlanFailure};

use crate::commands::inspect::NetworkReport;
use crate::terminal::{format_quantity, format_with_separators, ColorPalette, Glyphs};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tree.
    #[default]
    Text,
    /// Pretty-printed JSON; plans use the service response contract.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Serialize any result as pretty JSON.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output as JSON")
}

/// Render a plan as a tree of traversed segments.
pub fn render_plan_text(plan: &Plan, palette: &ColorPalette, glyphs: &Glyphs) -> String {
    let p = palette;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Plan from {} to {} ({} segments; algorithm: {}; frame: {}; version: {}):",
        plan.start,
        plan.goal,
        plan.segment_count(),
        plan.algorithm,
        plan.frame_id,
        plan.version
    );
    let _ = writeln!(
        out,
        "{}STRT{} {}{}{}",
        p.tag_start, p.reset, p.white_bold, plan.start, p.reset
    );

    let count = plan.segments.len();
    for (i, segment) in plan.segments.iter().enumerate() {
        let branch = if i + 1 == count {
            glyphs.last
        } else {
            glyphs.branch
        };
        let _ = writeln!(
            out,
            " {}{}{} {}SEGM{} {} {} {} {} {}(length {}{}{}, cost {}{}{}){}",
            p.gray,
            branch,
            p.reset,
            p.tag_segment,
            p.reset,
            segment.id,
            segment.start,
            glyphs.arrow,
            segment.end,
            p.gray,
            p.cyan,
            format_quantity(segment.length),
            p.gray,
            p.green,
            format_quantity(segment.cost),
            p.gray,
            p.reset
        );
    }

    let _ = writeln!(
        out,
        "{}GOAL{} {}{}{}",
        p.tag_goal, p.reset, p.white_bold, plan.goal, p.reset
    );
    if plan.is_empty() {
        let _ = writeln!(out, "\nStart and goal coincide; nothing to traverse.");
    }
    let _ = writeln!(out, "\nTotal cost: {}", format_quantity(plan.total_cost));
    let _ = write!(out, "Total length: {}", format_quantity(plan.total_length()));
    out
}

/// Render a failed plan with a hint on what to try next.
pub fn render_failure_text(failure: &PlanFailure, palette: &ColorPalette) -> String {
    let mut message = format!(
        "{}Plan failed ({}){}: {}",
        palette.red,
        failure.kind(),
        palette.reset,
        failure
    );
    let hint = match failure {
        PlanFailure::NoPathToGoal { .. } => Some(
            "Check one-way segments near the goal or inspect the network for disconnected components.",
        ),
        PlanFailure::Timeout { .. } => {
            Some("Raise --timeout-ms or omit it to search without a budget.")
        }
        PlanFailure::GraphUnavailable => Some("Load a route network with --network."),
        PlanFailure::InvalidRequest { .. } | PlanFailure::Internal { .. } => None,
    };
    if let Some(hint) = hint {
        message.push_str(". ");
        message.push_str(hint);
    }
    message
}

/// Render a network report as aligned key/value lines.
pub fn render_report_text(report: &NetworkReport, palette: &ColorPalette) -> String {
    let p = palette;
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{}Route network{}", p.white_bold, p.reset);
    let _ = writeln!(out, "  frame:        {}", summary.frame_id);
    if let Some(id) = &summary.network_id {
        let _ = writeln!(out, "  id:           {}", id);
    }
    let _ = writeln!(
        out,
        "  nodes:        {}",
        format_with_separators(summary.nodes as u64)
    );
    let _ = writeln!(
        out,
        "  segments:     {} ({}{} one-way{}, {} connectors)",
        format_with_separators(summary.segments as u64),
        p.orange,
        format_with_separators(report.one_way_segments as u64),
        p.reset,
        format_with_separators(report.connectors as u64)
    );
    let _ = writeln!(
        out,
        "  total length: {}{}{}",
        p.cyan,
        format_quantity(report.total_length),
        p.reset
    );
    let _ = write!(
        out,
        "  components:   {}",
        format_with_separators(report.components as u64)
    );
    if !report.isolated_nodes.is_empty() {
        let _ = write!(
            out,
            "\n  isolated:     {}",
            report.isolated_nodes.join(", ")
        );
    }
    out
}
