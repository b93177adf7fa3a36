//! Output formatters for run reports
//!
//! Renders the status tree as indented text, or the whole report as JSON
//! or a one-line summary.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

use crate::models::{RunReport, Status, StatusNode};

const INDENT: &str = "  ";

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Tree,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tree" => Some(OutputFormat::Tree),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    pub fn all() -> &'static [&'static str] {
        &["tree", "json", "json-pretty", "summary"]
    }
}

/// Report formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn with_color(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Format a single run report
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Tree => {
                let mut output = self.format_tree(&report.tree);
                output.push_str(&self.format_footer(report));
                output
            }
            OutputFormat::Json => to_json(report, false),
            OutputFormat::JsonPretty => to_json(report, true),
            OutputFormat::Summary => self.format_brief(report),
        }
    }

    /// Format several reports; JSON output becomes an array
    pub fn format_reports(&self, reports: &[RunReport]) -> String {
        match self.format {
            OutputFormat::Json => to_json(reports, false),
            OutputFormat::JsonPretty => to_json(reports, true),
            OutputFormat::Tree | OutputFormat::Summary => reports
                .iter()
                .map(|r| self.format_report(r))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// One line per node in pre-order, failure details one level deeper
    pub fn format_tree(&self, root: &StatusNode) -> String {
        let mut output = String::new();
        root.walk(&mut |node, depth| self.render_node(&mut output, node, depth));
        output
    }

    fn render_node(&self, output: &mut String, node: &StatusNode, depth: usize) {
        let indent = INDENT.repeat(depth);
        let label = format!("{} {}", node.status.symbol(), node.name);
        let _ = writeln!(output, "{indent}{}", self.paint(node.status, &label));

        if let Some(error) = &node.error {
            let detail_indent = INDENT.repeat(depth + 1);
            for line in error.to_string().lines() {
                let _ = writeln!(output, "{detail_indent}{}", self.paint(Status::Failed, line));
            }
        }
    }

    fn paint(&self, status: Status, text: &str) -> String {
        if !self.colorize {
            return text.to_string();
        }
        let code = match status {
            Status::Passed => "32",
            Status::Failed => "31",
            Status::Running => "33",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn format_footer(&self, report: &RunReport) -> String {
        let mut output = String::new();
        output.push_str("────────────────────────────────────────────────────────────\n");
        let _ = writeln!(output, "{}", report.summary);
        let _ = writeln!(
            output,
            "Pass Rate: {:.1}% | Duration: {}ms{}",
            report.summary.pass_rate(),
            report.duration_ms,
            if report.completed { "" } else { " | INCOMPLETE" }
        );
        output
    }

    fn format_brief(&self, report: &RunReport) -> String {
        let verdict = if report.is_success() {
            self.paint(Status::Passed, "PASS")
        } else if report.completed {
            self.paint(Status::Failed, "FAIL")
        } else {
            self.paint(Status::Running, "INCOMPLETE")
        };
        format!(
            "{verdict} {}: {}/{} passed ({:.1}%) in {}ms",
            report.name(),
            report.summary.passed,
            report.summary.total,
            report.summary.pass_rate(),
            report.duration_ms
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Tree)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.unwrap_or_default()
}

/// Write reports to a file without colour
pub fn write_reports_to_file(
    path: &str,
    reports: &[RunReport],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_reports(reports);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
