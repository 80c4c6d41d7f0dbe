//! Markdown rendering of a run
//!
//! Section order is fixed: header, one section per period (chronological),
//! then `## Processing Notes`. Tools downstream parse the headings.

use crate::stats::RunStats;
use chrono::NaiveDateTime;
use std::fmt::Write;
use worklog_domain::{Entities, EntityKind, NarrativeSource, PeriodSummary};

/// Heading that opens the statistics section
pub const NOTES_HEADING: &str = "## Processing Notes";

/// Render the full report document
pub fn render_markdown(
    summaries: &[PeriodSummary],
    stats: &RunStats,
    generated_at: NaiveDateTime,
) -> Result<String, std::fmt::Error> {
    let mut out = String::with_capacity(4096);

    write_header(&mut out, stats, generated_at)?;

    if summaries.is_empty() {
        writeln!(out, "_No entries were extracted for this range._")?;
        writeln!(out)?;
    }
    for summary in summaries {
        write_period(&mut out, summary)?;
    }

    write_notes(&mut out, summaries, stats)?;
    Ok(out)
}

fn write_header(out: &mut String, stats: &RunStats, generated_at: NaiveDateTime) -> std::fmt::Result {
    writeln!(
        out,
        "# {} Worklog Summary: {}",
        stats.granularity.adjective(),
        stats.range
    )?;
    writeln!(out)?;
    writeln!(out, "- **Range:** {} ({} days)", stats.range, stats.range.len_days())?;
    writeln!(out, "- **Granularity:** {}", stats.granularity.as_str())?;
    writeln!(out, "- **Run:** {}", stats.run_id)?;
    writeln!(out, "- **Generated:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(
        out,
        "- **Files:** {} found of {} expected, {} processed",
        stats.files_found, stats.files_expected, stats.processing.processed
    )?;
    writeln!(out)
}

fn write_period(out: &mut String, summary: &PeriodSummary) -> std::fmt::Result {
    let period = &summary.period;
    let partial = if period.is_partial() { ", partial" } else { "" };
    writeln!(out, "## {} ({}{})", period.label(), period.range, partial)?;
    writeln!(out)?;

    let entries = if summary.entry_count == 1 { "entry" } else { "entries" };
    let source = match &summary.narrative_source {
        NarrativeSource::Generated { provider } => format!("narrative by {}", provider),
        NarrativeSource::Fallback { reason } => format!("fallback narrative: {}", reason),
    };
    writeln!(out, "_{} {}, {}_", summary.entry_count, entries, source)?;
    writeln!(out)?;

    writeln!(out, "{}", summary.narrative.trim())?;
    writeln!(out)?;

    for kind in EntityKind::ALL {
        let set = summary.entities.get(kind);
        if set.is_empty() {
            continue;
        }
        writeln!(out, "### {}", kind.label())?;
        writeln!(out)?;
        for name in set.iter() {
            writeln!(out, "- {}", name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_notes(out: &mut String, summaries: &[PeriodSummary], stats: &RunStats) -> std::fmt::Result {
    writeln!(out, "{}", NOTES_HEADING)?;
    writeln!(out)?;

    writeln!(out, "### Files")?;
    writeln!(out)?;
    writeln!(out, "- Expected: {}", stats.files_expected)?;
    writeln!(out, "- Found: {}", stats.files_found)?;
    writeln!(out, "- Missing: {}", stats.missing_dates.len())?;
    writeln!(out, "- Processed: {}", stats.processing.processed)?;
    writeln!(out, "- Skipped (empty): {}", stats.processing.empty())?;
    writeln!(out, "- Skipped (oversized): {}", stats.processing.oversized())?;
    writeln!(out, "- Extracted: {}", stats.files_extracted())?;
    writeln!(out, "- Failed: {}", stats.files_failed())?;
    writeln!(out)?;

    if !stats.missing_dates.is_empty() {
        writeln!(out, "### Missing Dates")?;
        writeln!(out)?;
        for date in &stats.missing_dates {
            writeln!(out, "- {}", date)?;
        }
        writeln!(out)?;
    }

    if !stats.processing.skipped.is_empty() {
        writeln!(out, "### Skipped Files")?;
        writeln!(out)?;
        for skipped in &stats.processing.skipped {
            writeln!(out, "- {}: {}", skipped.date, skipped.reason)?;
        }
        writeln!(out)?;
    }

    if !stats.extraction_failures.is_empty() {
        writeln!(out, "### Extraction Failures")?;
        writeln!(out)?;
        for failure in &stats.extraction_failures {
            writeln!(out, "- {}", failure)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "### Providers")?;
    writeln!(out)?;
    writeln!(
        out,
        "| Provider | Calls | Successes | Failures | Retries | Skipped (open) | Avg latency | Circuit |"
    )?;
    writeln!(out, "|---|---:|---:|---:|---:|---:|---:|---|")?;
    for p in &stats.extraction.providers {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {:.2}s | {} |",
            p.name,
            p.calls,
            p.successes,
            p.failures,
            p.retries,
            p.skipped_open,
            p.avg_latency().as_secs_f64(),
            p.circuit.as_str()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "- Provider calls: {}", stats.extraction.total_calls())?;
    writeln!(out, "- Fallback events: {}", stats.extraction.fallback_events)?;
    writeln!(out, "- Narrative fallbacks: {}", stats.narrative_fallbacks)?;
    writeln!(out)?;

    let mut all = Entities::new();
    for summary in summaries {
        all.merge(&summary.entities);
    }
    writeln!(out, "### Unique Entities")?;
    writeln!(out)?;
    for kind in EntityKind::ALL {
        writeln!(out, "- {}: {}", kind.label(), all.get(kind).len())?;
    }
    writeln!(out)?;

    writeln!(out, "### Timing")?;
    writeln!(out)?;
    writeln!(out, "- Processing: {:.2}s", stats.processing.elapsed.as_secs_f64())?;
    writeln!(out, "- Total elapsed: {:.2}s", stats.elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ExtractionFailure;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;
    use worklog_domain::{DateRange, Granularity, Period};
    use worklog_ingest::{SkipReason, SkippedFile};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn summary(range: &DateRange, day: u32, source: NarrativeSource) -> PeriodSummary {
        let mut entities = Entities::new();
        entities.projects.insert("Atlas");
        entities.participants.insert("Dana");
        PeriodSummary {
            period: Period::containing(d(day), Granularity::Week, range).unwrap(),
            entities,
            narrative: "You shipped the Atlas beta.".to_string(),
            narrative_source: source,
            entry_count: 3,
            entry_dates: vec![d(day)],
            generation_time: Duration::from_millis(5),
        }
    }

    fn stats(range: DateRange) -> RunStats {
        let mut stats = RunStats::new(Uuid::now_v7(), range, Granularity::Week);
        stats.files_found = 12;
        stats.missing_dates = vec![d(6), d(13)];
        stats.processing.total = 12;
        stats.processing.processed = 11;
        stats.processing.skipped = vec![SkippedFile {
            path: PathBuf::from("worklog_2024-01-05.txt"),
            date: d(5),
            reason: SkipReason::Empty,
        }];
        stats
    }

    fn generated_at() -> NaiveDateTime {
        d(15).and_hms_opt(9, 30, 0).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let summaries = vec![
            summary(&range, 2, NarrativeSource::Generated { provider: "primary".into() }),
            summary(&range, 9, NarrativeSource::Fallback { reason: "rate limited".into() }),
        ];
        let doc = render_markdown(&summaries, &stats(range), generated_at()).unwrap();

        assert!(doc.starts_with("# Weekly Worklog Summary: 2024-01-01 to 2024-01-14\n"));
        assert!(doc.contains("- **Files:** 12 found of 14 expected, 11 processed"));
        assert!(doc.contains("- **Generated:** 2024-01-15 09:30:00"));

        let first = doc.find("## Week of 2024-01-01 (2024-01-01 to 2024-01-07)").unwrap();
        let second = doc.find("## Week of 2024-01-08").unwrap();
        let notes = doc.find(NOTES_HEADING).unwrap();
        assert!(first < second && second < notes);

        assert!(doc.contains("_3 entries, narrative by primary_"));
        assert!(doc.contains("_3 entries, fallback narrative: rate limited_"));
        assert!(doc.contains("### Projects\n\n- Atlas\n"));
        assert!(!doc.contains("### Tasks"));
    }

    #[test]
    fn test_processing_notes() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let summaries = vec![summary(&range, 2, NarrativeSource::Generated { provider: "p".into() })];
        let doc = render_markdown(&summaries, &stats(range), generated_at()).unwrap();
        let notes = &doc[doc.find(NOTES_HEADING).unwrap()..];

        assert!(notes.contains("- Missing: 2"));
        assert!(notes.contains("### Missing Dates\n\n- 2024-01-06\n- 2024-01-13\n"));
        assert!(notes.contains("### Skipped Files\n\n- 2024-01-05: empty\n"));
        assert!(notes.contains("- Projects: 1"));
        assert!(notes.contains("- Tasks: 0"));
        assert!(notes.contains("- Fallback events: 0"));
        assert!(!notes.contains("### Extraction Failures"));
    }

    #[test]
    fn test_extraction_failures_name_last_provider() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let mut stats = stats(range);
        stats.extraction_failures = vec![ExtractionFailure::new(
            d(2),
            Some("backup".into()),
            "Server error (503): unavailable",
        )];
        let doc = render_markdown(&[], &stats, generated_at()).unwrap();
        assert!(doc.contains("### Extraction Failures\n\n- 2024-01-02 (backup): Server error (503): unavailable\n"));
    }

    #[test]
    fn test_partial_period_marked() {
        let range = DateRange::new(d(3), d(7)).unwrap();
        let summaries = vec![summary(&range, 3, NarrativeSource::Generated { provider: "p".into() })];
        let doc = render_markdown(&summaries, &stats(range), generated_at()).unwrap();
        assert!(doc.contains("## Week of 2024-01-01 (2024-01-03 to 2024-01-07, partial)"));
    }

    #[test]
    fn test_empty_run() {
        let range = DateRange::new(d(1), d(7)).unwrap();
        let doc = render_markdown(&[], &RunStats::new(Uuid::now_v7(), range, Granularity::Week), generated_at())
            .unwrap();
        assert!(doc.contains("_No entries were extracted for this range._"));
        assert!(doc.contains(NOTES_HEADING));
    }
}
