//! Deterministic narrative used when generation fails

use worklog_domain::{Entities, EntityKind, EntitySet, Granularity, Period};

/// Names listed per kind before collapsing into "and N more"
const LIST_LIMIT: usize = 6;

/// Build a narrative directly from a period's aggregated entities
///
/// The output depends only on its inputs, so reruns over the same data
/// produce the same text.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use worklog_domain::{DateRange, Entities, Granularity, Period};
/// use worklog_summarizer::fallback_narrative;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let range = DateRange::new(day, day).unwrap();
/// let period = Period::containing(day, Granularity::Week, &range).unwrap();
/// let mut entities = Entities::new();
/// entities.projects.insert("Atlas");
///
/// let text = fallback_narrative(&period, &entities, 1);
/// assert!(text.starts_with("During the week of 2024-01-08"));
/// assert!(text.contains("Projects: Atlas."));
/// ```
pub fn fallback_narrative(period: &Period, entities: &Entities, entry_count: usize) -> String {
    let when = match period.granularity {
        Granularity::Week => format!("the week of {}", period.anchor.format("%Y-%m-%d")),
        Granularity::Month => period.label(),
    };
    let entries = if entry_count == 1 { "entry was" } else { "entries were" };

    let mut text = format!(
        "During {} ({}), {} {} logged.",
        when, period.range, entry_count, entries
    );

    // Tasks last: they are the most numerous and least summarizing
    let order = [
        EntityKind::Projects,
        EntityKind::Participants,
        EntityKind::Themes,
        EntityKind::Tasks,
    ];
    for kind in order {
        let set = entities.get(kind);
        if !set.is_empty() {
            text.push_str(&format!(" {}: {}.", kind.label(), join_names(set)));
        }
    }

    if entities.is_empty() {
        text.push_str(" No projects, participants, themes or tasks were extracted.");
    }
    text
}

/// `A`, `A and B`, `A, B and C`, `A, B, ... and 4 more`
fn join_names(set: &EntitySet) -> String {
    let names: Vec<&str> = set.iter().take(LIST_LIMIT).collect();
    let rest = set.len().saturating_sub(LIST_LIMIT);

    if rest > 0 {
        return format!("{} and {} more", names.join(", "), rest);
    }
    match names.split_last() {
        Some((last, init)) if !init.is_empty() => format!("{} and {}", init.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}
