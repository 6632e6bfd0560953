//! Analysis orchestration.
//!
//! [`ReliabilityAnalyzer`] wires the whole pipeline into one blocking call:
//! transitive closure, per-node reliability formulas from the external
//! feature analyzer, variability encoding, presence-condition equivalence,
//! and product iteration.

use crate::component::Component;
use crate::encoder::FamilyExpression;
use crate::error::Error;
use crate::product::{self, Configuration, ConcurrencyStrategy, ReliabilityResults};
use crate::rdg::{Rdg, RdgNode};
use crate::store::ArtifactStore;

/// External backend producing one raw reliability formula per closure node.
///
/// Formulas are returned as `(id, formula)` pairs aligned by position with
/// the input nodes. Each formula is valid expression-engine input over
/// constants, `+ - * /`, earlier node ids and feature-presence terms.
pub trait FeatureAnalyzer {
    fn reliability_expressions(
        &self,
        nodes: &[&RdgNode],
        strategy: ConcurrencyStrategy,
    ) -> Result<Vec<(String, String)>, Error>;
}

/// Orchestrator of family/product-based reliability analyses.
pub struct ReliabilityAnalyzer<F> {
    feature_analyzer: F,
    store: Option<Box<dyn ArtifactStore<String>>>,
}

impl<F: FeatureAnalyzer> ReliabilityAnalyzer<F> {
    pub fn new(feature_analyzer: F) -> Self {
        ReliabilityAnalyzer {
            feature_analyzer,
            store: None,
        }
    }

    /// Persist per-node ITE artifacts in `store` across runs.
    pub fn with_store(mut self, store: impl ArtifactStore<String> + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Evaluate the reliability of every given product configuration.
    ///
    /// Returns the partial results map plus per-configuration failure
    /// records; cycle errors and family-build errors abort the whole run.
    pub fn evaluate_reliability(
        &mut self,
        rdg: &Rdg,
        root: &str,
        configurations: impl IntoIterator<Item = Configuration>,
        strategy: ConcurrencyStrategy,
    ) -> Result<ReliabilityResults, Error> {
        let closure = rdg.transitive_closure(root)?;
        log::debug!("closure of `{root}`: {} nodes", closure.len());

        let expressions = self
            .feature_analyzer
            .reliability_expressions(&closure, strategy)?;
        let components = aligned_components(&closure, expressions)?;

        let family = FamilyExpression::encode(
            &components,
            self.store
                .as_deref_mut()
                .map(|store| store as &mut dyn ArtifactStore<String>),
        )?;
        log::debug!(
            "family expression built, {} presence-condition classes",
            family.classes().len()
        );

        Ok(product::evaluate_products(&family, configurations, strategy))
    }
}

/// Zip the closure with its formulas, checking positional alignment.
fn aligned_components(
    closure: &[&RdgNode],
    expressions: Vec<(String, String)>,
) -> Result<Vec<Component<String>>, Error> {
    if closure.len() != expressions.len() {
        return Err(Error::MisalignedExpressions {
            expected: format!("{} formulas", closure.len()),
            actual: format!("{} formulas", expressions.len()),
        });
    }
    closure
        .iter()
        .zip(expressions)
        .map(|(node, (id, formula))| {
            if node.id() != id {
                return Err(Error::MisalignedExpressions {
                    expected: node.id().to_string(),
                    actual: id,
                });
            }
            Ok(Component::from_node(node, formula))
        })
        .collect()
}
