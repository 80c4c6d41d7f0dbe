//! Output formatting for the CLI.

use chrono::NaiveDate;
use colored::*;
use std::path::PathBuf;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use worklog_domain::{NarrativeSource, PathResolver};
use worklog_ingest::DiscoveryReport;
use worklog_pipeline::RunOutcome;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a discovery report as a date-ordered table.
    pub fn format_discovery(&self, report: &DiscoveryReport, missing_only: bool) -> String {
        let mut rows: Vec<(NaiveDate, bool, PathBuf)> = Vec::with_capacity(report.total_expected);
        if !missing_only {
            rows.extend(report.found.iter().map(|f| (f.date, true, f.path.clone())));
        }
        rows.extend(
            report
                .missing
                .iter()
                .filter_map(|p| PathResolver::date_from_path(p).map(|date| (date, false, p.clone()))),
        );
        rows.sort_by_key(|(date, _, _)| *date);

        let footer = format!(
            "{} of {} worklogs found ({} missing)",
            report.found.len(),
            report.total_expected,
            report.missing.len()
        );

        if rows.is_empty() {
            return self.info(&footer);
        }

        let mut builder = Builder::default();
        builder.push_record(vec!["Date".to_string(), "Status".to_string(), "Path".to_string()]);
        for (date, found, path) in rows {
            let status = if found {
                self.colorize("found", "green")
            } else {
                self.colorize("missing", "yellow")
            };
            builder.push_record(vec![date.format("%a %Y-%m-%d").to_string(), status, path.display().to_string()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", table, footer)
    }

    /// Format the result of a summarize run.
    pub fn format_run(&self, outcome: &RunOutcome) -> String {
        let mut lines = Vec::new();

        if !outcome.summaries.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(vec![
                "Period".to_string(),
                "Range".to_string(),
                "Entries".to_string(),
                "Narrative".to_string(),
            ]);
            for summary in &outcome.summaries {
                let source = match &summary.narrative_source {
                    NarrativeSource::Generated { provider } => provider.clone(),
                    NarrativeSource::Fallback { .. } => self.colorize("fallback", "yellow"),
                };
                builder.push_record(vec![
                    summary.period.label(),
                    summary.period.range.to_string(),
                    summary.entry_count.to_string(),
                    source,
                ]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            lines.push(table.to_string());
        }

        lines.push(format!("Run {}: {}", outcome.run_id, outcome.stats.summary()));

        if outcome.cancelled {
            lines.push(self.warning("Run cancelled; no report written"));
        } else if let Some(report) = &outcome.report {
            lines.push(self.success(&format!(
                "Report written to {} ({} bytes)",
                report.path.display(),
                report.size_bytes
            )));
        }
        lines.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
