//! Presence-condition equivalence classes.
//!
//! Many components share the same presence condition, so the family
//! expression only needs one free variable per *distinct* condition text,
//! not one per node. Equivalence is textual: `A && B` and `B && A` are
//! distinct classes on purpose.

use std::collections::HashMap;

/// Mapping between raw presence-condition texts and class labels.
///
/// Labels are assigned first-seen-wins in input order (`c0`, `c1`, ...), so
/// identical inputs always produce identical labelings.
#[derive(Debug, Clone, Default)]
pub struct PcClasses {
    labels: HashMap<String, String>,
    // Label -> representative condition, in assignment order.
    representatives: Vec<(String, String)>,
}

impl PcClasses {
    /// Group conditions into classes, one label per distinct text.
    pub fn from_conditions<'a>(conditions: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes = PcClasses::default();
        for condition in conditions {
            if !classes.labels.contains_key(condition) {
                let label = format!("c{}", classes.representatives.len());
                classes.labels.insert(condition.to_string(), label.clone());
                classes
                    .representatives
                    .push((label, condition.to_string()));
            }
        }
        classes
    }

    /// The class label assigned to a condition text, if any.
    pub fn label_of(&self, condition: &str) -> Option<&str> {
        self.labels.get(condition).map(String::as_str)
    }

    /// `(label, representative condition)` pairs in assignment order.
    pub fn representatives(&self) -> impl Iterator<Item = (&str, &str)> {
        self.representatives
            .iter()
            .map(|(label, condition)| (label.as_str(), condition.as_str()))
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.representatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_condition_collapses() {
        let classes = PcClasses::from_conditions(["Sqlite", "Sqlite", "Sqlite"]);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes.label_of("Sqlite"), Some("c0"));
    }

    #[test]
    fn test_distinct_conditions_stay_distinct() {
        let classes = PcClasses::from_conditions(["Sqlite", "Mem", "Sqlite || Mem"]);
        assert_eq!(classes.len(), 3);
        assert_eq!(classes.label_of("Sqlite"), Some("c0"));
        assert_eq!(classes.label_of("Mem"), Some("c1"));
        assert_eq!(classes.label_of("Sqlite || Mem"), Some("c2"));
    }

    #[test]
    fn test_first_seen_wins_numbering() {
        let classes = PcClasses::from_conditions(["B", "A", "B", "A"]);
        assert_eq!(classes.label_of("B"), Some("c0"));
        assert_eq!(classes.label_of("A"), Some("c1"));
        let reps: Vec<_> = classes.representatives().collect();
        assert_eq!(reps, vec![("c0", "B"), ("c1", "A")]);
    }

    #[test]
    fn test_textual_not_semantic() {
        // Logically equivalent, textually distinct.
        let classes = PcClasses::from_conditions(["A && B", "B && A"]);
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn test_unknown_condition() {
        let classes = PcClasses::from_conditions(["A"]);
        assert_eq!(classes.label_of("B"), None);
    }
}
