use crate::executor::{OutcomeStatus, RenameReport};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use nu_ansi_term::Color as Ansi;
use serde_json::json;
use std::fmt::Write;
use std::str::FromStr;

/// Report format for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(Self::Summary),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Trait for formatting operation results in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => self.format_summary(),
            OutputFormat::Table => self.format_table(),
            OutputFormat::Json => self.format_json(),
        }
    }
    fn format_summary(&self) -> String;
    fn format_table(&self) -> String;
    fn format_json(&self) -> String;
}

/// Result of a preview (dry-run) operation
#[derive(Debug)]
pub struct PreviewResult {
    pub directory: String,
    pub report: RenameReport,
    pub use_color: bool,
}

/// Result of an apply operation
#[derive(Debug)]
pub struct ApplyResult {
    pub directory: String,
    pub report: RenameReport,
    pub use_color: bool,
}

impl OutputFormatter for PreviewResult {
    fn format_summary(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Preview for '{}':", self.directory).unwrap();
        write_outcome_lines(&mut out, &self.report, self.use_color);
        write_totals(&mut out, &self.report, "would be renamed", self.use_color);
        out
    }

    fn format_table(&self) -> String {
        render_report_table(&self.report, self.use_color)
    }

    fn format_json(&self) -> String {
        report_json("preview", &self.directory, &self.report)
    }
}

impl OutputFormatter for ApplyResult {
    fn format_summary(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Renamed files in '{}':", self.directory).unwrap();
        write_outcome_lines(&mut out, &self.report, self.use_color);
        write_totals(&mut out, &self.report, "renamed", self.use_color);
        out
    }

    fn format_table(&self) -> String {
        render_report_table(&self.report, self.use_color)
    }

    fn format_json(&self) -> String {
        report_json("apply", &self.directory, &self.report)
    }
}

fn status_ansi(status: OutcomeStatus) -> Ansi {
    match status {
        OutcomeStatus::Renamed => Ansi::Green,
        OutcomeStatus::Unchanged => Ansi::DarkGray,
        OutcomeStatus::SkippedCollision => Ansi::Yellow,
        OutcomeStatus::Failed => Ansi::Red,
    }
}

fn write_outcome_lines(out: &mut String, report: &RenameReport, use_color: bool) {
    for outcome in &report.outcomes {
        let status = if use_color {
            status_ansi(outcome.status)
                .paint(outcome.status.to_string())
                .to_string()
        } else {
            outcome.status.to_string()
        };
        match outcome.status {
            OutcomeStatus::Unchanged => {
                writeln!(out, "  {} ({status})", outcome.old_name).unwrap();
            },
            _ => {
                writeln!(out, "  {} -> {} ({status})", outcome.old_name, outcome.new_name).unwrap();
            },
        }
        if let Some(detail) = &outcome.detail {
            writeln!(out, "      {detail}").unwrap();
        }
    }
}

fn write_totals(out: &mut String, report: &RenameReport, renamed_verb: &str, use_color: bool) {
    let failed = report.count(OutcomeStatus::Failed);
    let line = format!(
        "{} {}, {} unchanged, {} skipped, {} failed",
        report.renamed,
        renamed_verb,
        report.count(OutcomeStatus::Unchanged),
        report.count(OutcomeStatus::SkippedCollision),
        failed,
    );
    if use_color && failed > 0 {
        writeln!(out, "{}", Ansi::Red.paint(line)).unwrap();
    } else {
        writeln!(out, "{line}").unwrap();
    }
}

/// Render a report as a table, one row per file
fn render_report_table(report: &RenameReport, use_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if use_color {
        table.enforce_styling();
        table.set_header(vec![
            Cell::new("From").fg(Color::Cyan),
            Cell::new("To").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Detail").fg(Color::Cyan),
        ]);
    } else {
        table.set_header(vec!["From", "To", "Status", "Detail"]);
    }

    for outcome in &report.outcomes {
        let detail = outcome.detail.as_deref().unwrap_or("");
        if use_color {
            let status_color = match outcome.status {
                OutcomeStatus::Renamed => Color::Green,
                OutcomeStatus::Unchanged => Color::DarkGrey,
                OutcomeStatus::SkippedCollision => Color::Yellow,
                OutcomeStatus::Failed => Color::Red,
            };
            table.add_row(vec![
                Cell::new(&outcome.old_name),
                Cell::new(&outcome.new_name),
                Cell::new(outcome.status.to_string()).fg(status_color),
                Cell::new(detail),
            ]);
        } else {
            let status = outcome.status.to_string();
            table.add_row(vec![
                outcome.old_name.as_str(),
                outcome.new_name.as_str(),
                status.as_str(),
                detail,
            ]);
        }
    }

    table.to_string()
}

fn report_json(operation: &str, directory: &str, report: &RenameReport) -> String {
    serde_json::to_string_pretty(&json!({
        "success": true,
        "operation": operation,
        "directory": directory,
        "summary": {
            "total": report.total(),
            "renamed": report.renamed,
            "unchanged": report.count(OutcomeStatus::Unchanged),
            "skipped_collisions": report.count(OutcomeStatus::SkippedCollision),
            "failed": report.count(OutcomeStatus::Failed),
        },
        "outcomes": report.outcomes,
    }))
    .unwrap_or_default()
}
