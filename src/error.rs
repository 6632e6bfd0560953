use std::io;

use thiserror::Error;

use crate::expression::ExprError;

/// Errors produced by reliability analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// The dependency graph contains a cycle through the named node.
    ///
    /// Raised by closure computation when a node still on the active DFS path
    /// is revisited. Fatal to the whole analysis.
    #[error("cyclic dependency through node `{0}`")]
    CyclicRdg(String),

    /// A dependency references a node id that is not part of the graph.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// Two nodes were registered under the same id.
    #[error("duplicate node `{0}`")]
    DuplicateNode(String),

    /// The derivation fold was given an empty closure.
    #[error("empty transitive closure")]
    EmptyClosure,

    /// The feature analyzer returned formulas out of step with the closure.
    #[error("misaligned reliability expressions: expected `{expected}`, got `{actual}`")]
    MisalignedExpressions { expected: String, actual: String },

    /// A presence condition has no equivalence class assigned.
    #[error("unresolved presence condition `{0}`")]
    UnresolvedCondition(String),

    /// Formula parsing or evaluation failed.
    #[error(transparent)]
    Expression(#[from] ExprError),

    /// The persistent artifact store failed. Never treated as a cache miss.
    #[error("artifact store failure for node `{id}`")]
    Store {
        id: String,
        #[source]
        source: io::Error,
    },
}
