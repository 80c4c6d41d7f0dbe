//! Extracted entities and their normalization rules
//!
//! Entity names coming back from an LLM are noisy: `"J. Smith"`, `"j. smith "`
//! and `"J.  Smith"` all mean the same person. Membership is decided on a
//! normalized key (case-folded, whitespace-collapsed) while the first-seen
//! spelling is kept for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize an entity name into its membership key
///
/// # Examples
///
/// ```
/// use worklog_domain::normalize_entity;
///
/// assert_eq!(normalize_entity("  J.   Smith "), "j. smith");
/// ```
pub fn normalize_entity(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A deduplicated set of entity names
///
/// Iteration order is by normalized key, which keeps reports stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    entries: BTreeMap<String, String>,
}

impl EntitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name; returns `false` when blank or already present
    pub fn insert(&mut self, raw: &str) -> bool {
        let key = normalize_entity(raw);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, collapse_whitespace(raw));
        true
    }

    /// Union `other` into `self`, keeping existing display forms
    pub fn merge(&mut self, other: &EntitySet) {
        for (key, display) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| display.clone());
        }
    }

    /// Whether a name (in any casing/spacing) is present
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(&normalize_entity(raw))
    }

    /// Number of distinct entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display forms in key order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Display forms collected into a vector
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for EntitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = EntitySet::new();
        for item in iter {
            set.insert(item.as_ref());
        }
        set
    }
}

/// The four entity categories extracted from each worklog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Projects worked on
    Projects,
    /// People involved
    Participants,
    /// Concrete tasks
    Tasks,
    /// Recurring themes
    Themes,
}

impl EntityKind {
    /// All kinds in report order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Projects,
        EntityKind::Participants,
        EntityKind::Tasks,
        EntityKind::Themes,
    ];

    /// JSON field name used in extraction responses
    pub fn field_name(&self) -> &'static str {
        match self {
            EntityKind::Projects => "projects",
            EntityKind::Participants => "participants",
            EntityKind::Tasks => "tasks",
            EntityKind::Themes => "themes",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Projects => "Projects",
            EntityKind::Participants => "Participants",
            EntityKind::Tasks => "Tasks",
            EntityKind::Themes => "Themes",
        }
    }
}

/// Entities of all four kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    /// Projects
    pub projects: EntitySet,
    /// Participants
    pub participants: EntitySet,
    /// Tasks
    pub tasks: EntitySet,
    /// Themes
    pub themes: EntitySet,
}

impl Entities {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Set for a given kind
    pub fn get(&self, kind: EntityKind) -> &EntitySet {
        match kind {
            EntityKind::Projects => &self.projects,
            EntityKind::Participants => &self.participants,
            EntityKind::Tasks => &self.tasks,
            EntityKind::Themes => &self.themes,
        }
    }

    /// Mutable set for a given kind
    pub fn get_mut(&mut self, kind: EntityKind) -> &mut EntitySet {
        match kind {
            EntityKind::Projects => &mut self.projects,
            EntityKind::Participants => &mut self.participants,
            EntityKind::Tasks => &mut self.tasks,
            EntityKind::Themes => &mut self.themes,
        }
    }

    /// Union every kind of `other` into `self`
    pub fn merge(&mut self, other: &Entities) {
        for kind in EntityKind::ALL {
            self.get_mut(kind).merge(other.get(kind));
        }
    }

    /// Whether all four sets are empty
    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|k| self.get(*k).is_empty())
    }

    /// Total distinct entities across kinds
    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_entity("Bob"), "bob");
        assert_eq!(normalize_entity(" bob "), "bob");
        assert_eq!(normalize_entity("J.\tSmith\n"), "j. smith");
        assert_eq!(normalize_entity("   "), "");
    }

    #[test]
    fn test_dedup_keeps_first_seen_form() {
        let set: EntitySet = ["J. Smith", "j. smith ", "J.  SMITH"].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.to_vec(), vec!["J. Smith".to_string()]);
    }

    #[test]
    fn test_insert_rejects_blank() {
        let mut set = EntitySet::new();
        assert!(!set.insert("  "));
        assert!(set.is_empty());
    }

    #[test]
    fn test_merge_bob() {
        let mut a: EntitySet = ["Bob"].into_iter().collect();
        let b: EntitySet = ["bob "].into_iter().collect();
        a.merge(&b);
        assert_eq!(a.len(), 1);
        assert!(a.contains("BOB"));
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let a: EntitySet = ["Alpha", "Beta"].into_iter().collect();
        let mut merged = a.clone();
        merged.merge(&a);
        assert_eq!(merged, a);
    }

    #[test]
    fn test_entities_merge_and_total() {
        let mut a = Entities::new();
        a.projects.insert("Apollo");
        a.participants.insert("Alice");

        let mut b = Entities::new();
        b.projects.insert("apollo");
        b.themes.insert("Planning");

        a.merge(&b);
        assert_eq!(a.projects.len(), 1);
        assert_eq!(a.total(), 3);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|k| k.field_name()).collect();
        assert_eq!(names, vec!["projects", "participants", "tasks", "themes"]);
    }
}
