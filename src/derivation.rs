//! Generic bottom-up derivation over a topologically ordered component list.
//!
//! [`derive_from_many`] folds a dependency-first component list into one
//! derived artifact per node and returns the artifact of the last (root)
//! node. The derivation function sees the artifacts of all earlier nodes,
//! keyed by component id, so it can splice dependencies into its own result.
//!
//! An optional [`ArtifactStore`] adds a read-check-compute-write discipline:
//! before deriving node `i`, probe the store; on a hit, load and reuse the
//! artifact without recomputation or re-persistence; on a miss, compute,
//! persist, then advance. The store is accessed strictly in topological
//! order, one node at a time.

use std::collections::HashMap;

use crate::component::Component;
use crate::error::Error;
use crate::store::ArtifactStore;

/// Fold a dependency-first component list into the root's derived artifact.
///
/// `is_present` supplies the presence value handed to `derive` for each
/// component; `derive(presence, asset, prior)` produces the component's
/// artifact given the artifacts of all earlier components.
///
/// Fails with [`Error::EmptyClosure`] on an empty list; derivation and store
/// errors propagate unchanged.
pub fn derive_from_many<P, A, V, IP, D>(
    components: &[Component<A>],
    mut is_present: IP,
    mut derive: D,
    mut store: Option<&mut dyn ArtifactStore<V>>,
) -> Result<V, Error>
where
    V: Clone,
    IP: FnMut(&Component<A>) -> P,
    D: FnMut(P, &A, &HashMap<String, V>) -> Result<V, Error>,
{
    let mut derived: HashMap<String, V> = HashMap::new();
    let mut last: Option<V> = None;

    for component in components {
        let value = match &mut store {
            Some(store) => {
                if store.has(component.id())? {
                    log::trace!("artifact for `{}` found in store", component.id());
                    store.load(component.id())?
                } else {
                    let presence = is_present(component);
                    let value = derive(presence, component.asset(), &derived)?;
                    store.save(component.id(), &value)?;
                    value
                }
            }
            None => {
                let presence = is_present(component);
                derive(presence, component.asset(), &derived)?
            }
        };
        // Loaded artifacts enter the prior-results map too, so later nodes
        // can reference them.
        derived.insert(component.id().to_string(), value.clone());
        last = Some(value);
    }

    last.ok_or(Error::EmptyClosure)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use crate::store::MemoryStore;

    fn chain() -> Vec<Component<i64>> {
        // C has no dependencies; B depends on C; A depends on B.
        vec![
            Component::new("C", "true", 1, vec![]),
            Component::new("B", "true", 10, vec!["C".to_string()]),
            Component::new("A", "true", 100, vec!["B".to_string()]),
        ]
    }

    fn sum_of_priors(
        _presence: (),
        asset: &i64,
        prior: &HashMap<String, i64>,
    ) -> Result<i64, Error> {
        Ok(asset + prior.values().sum::<i64>())
    }

    #[test]
    fn test_returns_last_derived_value() {
        // C = 1, B = 10 + 1, A = 100 + 11 + 1
        let result = derive_from_many(&chain(), |_| (), sum_of_priors, None).unwrap();
        assert_eq!(result, 112);
    }

    #[test]
    fn test_empty_closure() {
        let components: Vec<Component<i64>> = vec![];
        let result = derive_from_many(&components, |_| (), sum_of_priors, None);
        assert!(matches!(result, Err(Error::EmptyClosure)));
    }

    #[test]
    fn test_presence_policy_sees_component() {
        let components = chain();
        let result = derive_from_many(
            &components,
            |c| c.id().to_string(),
            |presence, _, _| Ok(presence),
            None,
        )
        .unwrap();
        assert_eq!(result, "A");
    }

    #[test]
    fn test_derivation_error_propagates() {
        let result = derive_from_many(
            &chain(),
            |_| (),
            |_, _, _| -> Result<i64, Error> { Err(Error::EmptyClosure) },
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_store_miss_computes_and_persists() {
        let mut store = MemoryStore::new();
        let result =
            derive_from_many(&chain(), |_| (), sum_of_priors, Some(&mut store)).unwrap();
        assert_eq!(result, 112);
        assert_eq!(store.len(), 3);
        assert_eq!(store.load("B").unwrap(), 11);
    }

    #[test]
    fn test_store_hit_skips_derivation() {
        let mut store = MemoryStore::new();
        store.insert("C", 7);
        let derivations = Cell::new(0);
        let result = derive_from_many(
            &chain(),
            |_| (),
            |p, a, prior| {
                derivations.set(derivations.get() + 1);
                sum_of_priors(p, a, prior)
            },
            Some(&mut store),
        )
        .unwrap();
        // C comes from the store and still feeds B and A: B = 10 + 7,
        // A = 100 + 17 + 7.
        assert_eq!(result, 124);
        assert_eq!(derivations.get(), 2);
        // The preloaded artifact was not re-persisted.
        assert_eq!(store.load("C").unwrap(), 7);
    }

    #[test]
    fn test_store_error_surfaces() {
        struct BrokenStore;
        impl ArtifactStore<i64> for BrokenStore {
            fn has(&self, id: &str) -> Result<bool, Error> {
                Err(Error::Store {
                    id: id.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
                })
            }
            fn load(&self, _id: &str) -> Result<i64, Error> {
                unreachable!()
            }
            fn save(&mut self, _id: &str, _asset: &i64) -> Result<(), Error> {
                unreachable!()
            }
        }
        let mut store = BrokenStore;
        let result = derive_from_many(&chain(), |_| (), sum_of_priors, Some(&mut store));
        assert!(matches!(result, Err(Error::Store { .. })));
    }
}
