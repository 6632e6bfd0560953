//! Reliability Dependency Graph (RDG).
//!
//! An RDG is a directed acyclic graph of components, each annotated with a
//! feature-presence condition. The graph is stored as an id-keyed node table
//! with id-based edge lists, so traversal is a pure graph operation over
//! indexed nodes rather than a walk over live object references.

use std::collections::HashMap;

use crate::error::Error;

/// Presence condition assigned to nodes that are always included.
pub const ALWAYS_PRESENT: &str = "true";

/// A single component in the dependency graph.
///
/// Immutable once added to an [`Rdg`]: id, presence condition and dependency
/// list are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdgNode {
    id: String,
    presence_condition: String,
    dependencies: Vec<String>,
}

impl RdgNode {
    /// Create a node with the default presence condition `"true"`.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_condition(id, ALWAYS_PRESENT)
    }

    /// Create a node with an explicit presence condition.
    pub fn with_condition(id: impl Into<String>, presence_condition: impl Into<String>) -> Self {
        RdgNode {
            id: id.into(),
            presence_condition: presence_condition.into(),
            dependencies: Vec::new(),
        }
    }

    /// Append a dependency on another node, preserving declaration order.
    pub fn add_dependency(&mut self, id: impl Into<String>) {
        self.dependencies.push(id.into());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn presence_condition(&self) -> &str {
        &self.presence_condition
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// DFS node state. `InProgress` marks the active path, so a diamond
/// (revisiting a `Done` node) is fine while a back edge is a cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Id-keyed table of [`RdgNode`]s.
#[derive(Debug, Default)]
pub struct Rdg {
    nodes: Vec<RdgNode>,
    index: HashMap<String, usize>,
}

impl Rdg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Fails on a duplicate id.
    pub fn add_node(&mut self, node: RdgNode) -> Result<(), Error> {
        if self.index.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&RdgNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependency-first (topological) closure of every node reachable from
    /// `root`, each exactly once, every node strictly after all of its
    /// dependencies. The root is therefore last.
    ///
    /// Fails with [`Error::CyclicRdg`] when a node still on the active path
    /// is revisited, and with [`Error::UnknownNode`] on a dangling reference.
    pub fn transitive_closure(&self, root: &str) -> Result<Vec<&RdgNode>, Error> {
        let root_index = *self
            .index
            .get(root)
            .ok_or_else(|| Error::UnknownNode(root.to_string()))?;
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::new();
        self.visit(root_index, &mut marks, &mut order)?;
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        index: usize,
        marks: &mut [Mark],
        order: &mut Vec<&'a RdgNode>,
    ) -> Result<(), Error> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(Error::CyclicRdg(self.nodes[index].id.clone())),
            Mark::Unvisited => {}
        }
        marks[index] = Mark::InProgress;
        for dependency in &self.nodes[index].dependencies {
            let dep_index = *self
                .index
                .get(dependency)
                .ok_or_else(|| Error::UnknownNode(dependency.clone()))?;
            self.visit(dep_index, marks, order)?;
        }
        marks[index] = Mark::Done;
        order.push(&self.nodes[index]);
        Ok(())
    }
}
