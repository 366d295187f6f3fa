//! Output formatters
//!
//! Provides table and JSON output for assignment reports and test listings.

use crate::executor::{AssignmentReport, WorkerAssignment};
use crate::models::ConformanceTest;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
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

    /// Format an assignment report
    pub fn format_report(&self, report: &AssignmentReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        }
    }

    fn format_assignment(&self, assignment: &WorkerAssignment) -> String {
        let outcome = match (&assignment.gateway_class, &assignment.error) {
            (Some(gc), None) => self.paint(&format!("✓ {gc}"), "32"),
            (Some(gc), Some(e)) => self.paint(&format!("! {gc} ({e})"), "33"),
            (None, e) => self.paint(&format!("✗ {}", e.as_deref().unwrap_or("failed")), "31"),
        };

        format!(
            "{:3}. {:32} {}",
            assignment.worker, assignment.test, outcome
        )
    }

    fn format_report_table(&self, report: &AssignmentReport) -> String {
        let mut output = String::new();

        output.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        output.push_str(&format!(
            "  Policy: {} | GatewayClasses: {}\n",
            report.policy,
            report.gateway_classes.join(", ")
        ));
        output.push_str("──────────────────────────────────────────────────────────────────────\n");

        for assignment in &report.assignments {
            output.push_str(&format!("  {}\n", self.format_assignment(assignment)));
        }

        output.push_str("──────────────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "  Workers: {} | Allocated: {} | Failed: {} | Duration: {}ms\n",
            report.workers,
            report.allocated(),
            report.failed(),
            report.duration_ms
        ));
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        output
    }

    /// Format the declared tests
    pub fn format_tests(&self, tests: &[ConformanceTest], detailed: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nConformance Tests ({} total)\n\n", tests.len()));

        for test in tests {
            let features: Vec<_> = test.features.iter().map(|f| f.name()).collect();
            output.push_str(&format!(
                "  {:32} [{}]\n",
                self.paint(&test.short_name, "1"),
                features.join(", ")
            ));
            output.push_str(&format!("      {}\n", test.description));

            if detailed {
                output.push_str(&format!("      Gateway:   {}\n", test.gateway));
                for manifest in &test.manifests {
                    output.push_str(&format!("      Manifest:  {manifest}\n"));
                }
                for route in &test.routes {
                    output.push_str(&format!("      HTTPRoute: {route}\n"));
                }
                for name in test.case_names() {
                    output.push_str(&format!("        - {name}\n"));
                }
            }
            output.push('\n');
        }

        output
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}
