//! Components of an asset base.
//!
//! A [`Component`] is the structural twin of an RDG node carrying a derived
//! asset: the raw reliability formula at first, later whatever artifact a
//! derivation produces. [`Component::fmap`] transforms only the asset,
//! preserving id, presence condition and dependency shape, which makes
//! `Component` a functor over its asset type.

use crate::rdg::RdgNode;

/// A component annotated with an asset of type `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component<T> {
    id: String,
    presence_condition: String,
    asset: T,
    dependencies: Vec<String>,
}

impl<T> Component<T> {
    pub fn new(
        id: impl Into<String>,
        presence_condition: impl Into<String>,
        asset: T,
        dependencies: Vec<String>,
    ) -> Self {
        Component {
            id: id.into(),
            presence_condition: presence_condition.into(),
            asset,
            dependencies,
        }
    }

    /// Attach an asset to an RDG node, mirroring its structure.
    pub fn from_node(node: &RdgNode, asset: T) -> Self {
        Component {
            id: node.id().to_string(),
            presence_condition: node.presence_condition().to_string(),
            asset,
            dependencies: node.dependencies().to_vec(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn presence_condition(&self) -> &str {
        &self.presence_condition
    }

    pub fn asset(&self) -> &T {
        &self.asset
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Map this `Component<T>` into a `Component<U>`, transforming only the
    /// asset.
    pub fn fmap<U, F>(self, mapper: F) -> Component<U>
    where
        F: FnOnce(T) -> U,
    {
        Component {
            id: self.id,
            presence_condition: self.presence_condition,
            asset: mapper(self.asset),
            dependencies: self.dependencies,
        }
    }
}
