//! Variability encoding.
//!
//! Builds one expression for the whole product family instead of one model
//! per product. Processing the closure in dependency-first order, each
//! component's raw formula first has every earlier component id spliced in
//! as that component's already-built ITE expression, then is wrapped in its
//! own ITE:
//!
//! ```text
//! ITE(var) = ((var * (formula)) + ((1.0 - var) * 1.0))
//! ```
//!
//! "if the presence indicator is 1, contribute the reliability; otherwise
//! contribute the neutral factor 1.0." The family expression is the root's
//! ITE with every node id replaced by its presence-condition equivalence
//! class label, so its free variables are exactly the class labels.

use std::collections::HashMap;

use crate::component::Component;
use crate::derivation::derive_from_many;
use crate::equivalence::PcClasses;
use crate::error::Error;
use crate::expression::{self, Expression};
use crate::product::Configuration;
use crate::store::ArtifactStore;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace each maximal identifier token for which `lookup` yields a value.
///
/// The scan is single-pass over the input, so replacement text is never
/// rescanned, and matches are whole-word only: substituting `x1` leaves
/// `x10` and `ax1` untouched.
fn substitute_words<'a>(
    expression: &str,
    mut lookup: impl FnMut(&str) -> Option<&'a str>,
) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut rest = expression;
    while let Some(c) = rest.chars().next() {
        if is_word_char(c) {
            let end = rest
                .find(|ch: char| !is_word_char(ch))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            match lookup(word) {
                Some(replacement) => out.push_str(replacement),
                None => out.push_str(word),
            }
            rest = &rest[end..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// Replace whole-word occurrences of `variable` in `expression`.
pub fn substitute(variable: &str, replacement: &str, expression: &str) -> String {
    substitute_words(expression, |word| (word == variable).then_some(replacement))
}

/// Replace whole-word occurrences of every key of `replacements` at once.
pub fn substitute_all(expression: &str, replacements: &HashMap<String, String>) -> String {
    substitute_words(expression, |word| {
        replacements.get(word).map(String::as_str)
    })
}

fn ite(variable: &str, formula: &str) -> String {
    format!("(({variable} * ({formula})) + ((1.0 - {variable}) * 1.0))")
}

/// The family-wide reliability expression.
///
/// Built once per analysis and immutable afterwards; read-only shared state
/// for the product iterator.
#[derive(Debug)]
pub struct FamilyExpression {
    text: String,
    parsed: Expression,
    classes: PcClasses,
    // Parsed representative condition per class, in label order.
    conditions: Vec<(String, Expression)>,
}

impl FamilyExpression {
    /// Encode a dependency-first closure of formula-carrying components.
    ///
    /// An optional artifact store caches per-node ITE expressions keyed by
    /// component id (read-check-compute-write, see [`derive_from_many`]).
    pub fn encode(
        closure: &[Component<String>],
        store: Option<&mut dyn ArtifactStore<String>>,
    ) -> Result<Self, Error> {
        let root_ite = derive_from_many(
            closure,
            |component| component.id().to_string(),
            |variable, formula, prior| Ok(ite(&variable, &substitute_all(formula, prior))),
            store,
        )?;

        let classes =
            PcClasses::from_conditions(closure.iter().map(|c| c.presence_condition()));
        let mut id_to_label = HashMap::new();
        for component in closure {
            let label = classes
                .label_of(component.presence_condition())
                .ok_or_else(|| {
                    Error::UnresolvedCondition(component.presence_condition().to_string())
                })?;
            id_to_label.insert(component.id().to_string(), label.to_string());
        }
        let text = substitute_all(&root_ite, &id_to_label);
        log::debug!(
            "family expression over {} classes, {} chars",
            classes.len(),
            text.len()
        );

        // A malformed family expression is fatal: it is shared by every
        // product evaluation.
        let parsed = expression::parse(&text)?;
        let conditions = classes
            .representatives()
            .map(|(label, condition)| {
                Ok((label.to_string(), expression::parse(condition)?))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(FamilyExpression {
            text,
            parsed,
            classes,
            conditions,
        })
    }

    /// The family expression text, free variables being class labels.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn classes(&self) -> &PcClasses {
        &self.classes
    }

    /// Reliability of the product defined by `configuration`.
    ///
    /// Each class label is bound to the truth value (1.0/0.0) of its
    /// representative presence condition under the configuration's selected
    /// features; the family expression is then evaluated under that binding.
    pub fn evaluate(&self, configuration: &Configuration) -> Result<f64, Error> {
        let mut bindings = HashMap::with_capacity(self.conditions.len());
        for (label, condition) in &self.conditions {
            let mut features = HashMap::new();
            for feature in condition.variables() {
                let selected = configuration.contains(feature);
                features.insert(feature.to_string(), if selected { 1.0 } else { 0.0 });
            }
            let satisfied = condition.evaluate(&features)? != 0.0;
            bindings.insert(label.clone(), if satisfied { 1.0 } else { 0.0 });
        }
        Ok(self.parsed.evaluate(&bindings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str, condition: &str, formula: &str, deps: &[&str]) -> Component<String> {
        Component::new(
            id,
            condition,
            formula.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        )
    }

    fn config(features: &[&str]) -> Configuration {
        Configuration::new(features.iter().copied())
    }

    #[test]
    fn test_substitution_is_whole_word() {
        assert_eq!(
            substitute("x1", "x", "x0 + x1 + x10 + ax1"),
            "x0 + x + x10 + ax1"
        );
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        assert_eq!(substitute("x", "y+1", "x"), "y+1");
        assert_eq!(substitute("x", "y+3", "x + y + 2"), "y+3 + y + 2");
    }

    #[test]
    fn test_substitute_all_single_pass() {
        let replacements = HashMap::from([
            ("a".to_string(), "b * c".to_string()),
            ("b".to_string(), "zzz".to_string()),
        ]);
        // The `b` inserted for `a` is not rescanned; only the original `b`
        // is replaced.
        assert_eq!(substitute_all("a + b", &replacements), "b * c + zzz");
    }

    #[test]
    fn test_neutral_branch() {
        // A single always-present node with constant reliability `p`
        // evaluates to `p` for every configuration.
        let closure = vec![component("A", "true", "0.99", &[])];
        let family = FamilyExpression::encode(&closure, None).unwrap();
        for features in [&[][..], &["A"][..], &["X", "Y"][..]] {
            let value = family.evaluate(&config(features)).unwrap();
            assert!((value - 0.99).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dependency_splicing() {
        // R's formula references A; A's ITE gets spliced in.
        let closure = vec![
            component("A", "Sqlite", "0.9", &[]),
            component("R", "true", "0.8 * A", &["A"]),
        ];
        let family = FamilyExpression::encode(&closure, None).unwrap();
        // Sqlite selected: 0.8 * 0.9; deselected: 0.8 * 1.0.
        let with = family.evaluate(&config(&["Sqlite"])).unwrap();
        let without = family.evaluate(&config(&[])).unwrap();
        assert!((with - 0.72).abs() < 1e-12);
        assert!((without - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_equivalence_collapse_in_free_variables() {
        let shared = vec![
            component("A", "Net", "0.9", &[]),
            component("B", "Net", "0.9 * A", &["A"]),
            component("R", "Net", "0.9 * B", &["B"]),
        ];
        let family = FamilyExpression::encode(&shared, None).unwrap();
        assert_eq!(family.classes().len(), 1);

        let distinct = vec![
            component("A", "Net", "0.9", &[]),
            component("B", "Gui", "0.9 * A", &["A"]),
            component("R", "true", "0.9 * B", &["B"]),
        ];
        let family = FamilyExpression::encode(&distinct, None).unwrap();
        assert_eq!(family.classes().len(), 3);
    }

    #[test]
    fn test_determinism() {
        let closure = vec![
            component("A", "Net", "0.9", &[]),
            component("B", "Gui", "0.99 * A", &["A"]),
            component("R", "true", "0.999 * B * A", &["A", "B"]),
        ];
        let first = FamilyExpression::encode(&closure, None).unwrap();
        let second = FamilyExpression::encode(&closure, None).unwrap();
        assert_eq!(first.text(), second.text());
    }

    #[test]
    fn test_boolean_presence_condition() {
        let closure = vec![
            component("A", "Net && !Offline", "0.9", &[]),
            component("R", "true", "0.8 * A", &["A"]),
        ];
        let family = FamilyExpression::encode(&closure, None).unwrap();
        let on = family.evaluate(&config(&["Net"])).unwrap();
        let off = family.evaluate(&config(&["Net", "Offline"])).unwrap();
        assert!((on - 0.72).abs() < 1e-12);
        assert!((off - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_formula_reference_fails_per_evaluation() {
        // `Q` is neither an earlier node id nor substituted away, so it
        // survives into the family expression and evaluation fails.
        let closure = vec![component("A", "true", "0.9 * Q", &[])];
        let family = FamilyExpression::encode(&closure, None).unwrap();
        assert!(family.evaluate(&config(&[])).is_err());
    }

    #[test]
    fn test_store_reuses_ite_artifacts() {
        use crate::store::MemoryStore;

        let closure = vec![
            component("A", "Sqlite", "0.9", &[]),
            component("R", "true", "0.8 * A", &["A"]),
        ];
        let mut store = MemoryStore::new();
        let fresh = FamilyExpression::encode(&closure, Some(&mut store)).unwrap();
        assert_eq!(store.len(), 2);
        let cached = FamilyExpression::encode(&closure, Some(&mut store)).unwrap();
        assert_eq!(fresh.text(), cached.text());
    }
}
