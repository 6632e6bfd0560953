//! # reana-rs: family-based reliability analysis for software product lines
//!
//! **`reana-rs`** computes the probabilistic reliability of every member
//! (product) of a software product line from a dependency graph of components
//! annotated with feature-presence conditions and per-component reliability
//! formulas.
//!
//! Instead of rebuilding a reliability model per product, the analyzer builds
//! **one** symbolic expression for the whole family (variability encoding)
//! and evaluates it cheaply per concrete product configuration.
//!
//! ## Pipeline
//!
//! 1. [`rdg`] computes the dependency-first transitive closure of the
//!    analysis root, rejecting cyclic graphs.
//! 2. An external [`analyzer::FeatureAnalyzer`] supplies one raw reliability
//!    formula per closure node.
//! 3. [`encoder`] folds the closure bottom-up (via [`derivation`]) into a
//!    single nested if-then-else expression, then collapses its free
//!    variables to presence-condition [`equivalence`] classes.
//! 4. [`product`] evaluates the family expression once per configuration,
//!    sequentially or across a worker pool.
//!
//! ## Basic usage
//!
//! ```rust
//! use reana_rs::analyzer::{FeatureAnalyzer, ReliabilityAnalyzer};
//! use reana_rs::error::Error;
//! use reana_rs::product::{Configuration, ConcurrencyStrategy};
//! use reana_rs::rdg::{Rdg, RdgNode};
//!
//! // A backend that knows each component's reliability formula.
//! struct Backend;
//! impl FeatureAnalyzer for Backend {
//!     fn reliability_expressions(
//!         &self,
//!         nodes: &[&RdgNode],
//!         _strategy: ConcurrencyStrategy,
//!     ) -> Result<Vec<(String, String)>, Error> {
//!         Ok(nodes
//!             .iter()
//!             .map(|n| (n.id().to_string(), "0.99".to_string()))
//!             .collect())
//!     }
//! }
//!
//! let mut rdg = Rdg::new();
//! rdg.add_node(RdgNode::new("Root")).unwrap();
//!
//! let mut analyzer = ReliabilityAnalyzer::new(Backend);
//! let results = analyzer
//!     .evaluate_reliability(
//!         &rdg,
//!         "Root",
//!         vec![Configuration::default()],
//!         ConcurrencyStrategy::Sequential,
//!     )
//!     .unwrap();
//! assert_eq!(results.get(&Configuration::default()), Some(0.99));
//! ```
//!
//! ## Core components
//!
//! - **[`expression`]**: parsing and evaluation of algebraic/boolean formulas.
//! - **[`rdg`]**: the dependency graph, closure computation, cycle detection.
//! - **[`derivation`]**: the generic bottom-up fold with optional persistent
//!   caching through a [`store::ArtifactStore`].
//! - **[`encoder`]**: variability encoding into the family expression.
//! - **[`product`]**: per-product evaluation and result collection.
//! - **[`analyzer`]**: the orchestrator tying it all together.

pub mod analyzer;
pub mod component;
pub mod derivation;
pub mod encoder;
pub mod equivalence;
pub mod error;
pub mod expression;
pub mod product;
pub mod rdg;
pub mod store;
