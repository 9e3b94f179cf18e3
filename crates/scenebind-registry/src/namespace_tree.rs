//! Namespace Tree - hierarchical storage for one host module's bindings.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `NamespaceData` (bindings at that level, optional docstring)
//! - Edges: `Contains(name)` for sub-namespaces

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use scenebind_core::RegistrationError;

use crate::Binding;

/// Edge types in the namespace graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent namespace contains child namespace.
    /// The String is the child's simple name.
    Contains(String),
}

/// Data stored in each namespace node.
#[derive(Debug, Default, Clone)]
pub struct NamespaceData {
    /// Bindings in this namespace by simple name.
    pub bindings: FxHashMap<String, Binding>,

    /// Docstring shown for the sub-namespace on the host side.
    pub doc: Option<String>,
}

/// The namespace graph of one host module.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    graph: DiGraph<NamespaceData, NamespaceEdge>,
    root: NodeIndex,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::default());
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn get_namespace(&self, node: NodeIndex) -> Option<&NamespaceData> {
        self.graph.node_weight(node)
    }

    /// Find a child namespace by name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph.edges(parent).find_map(|edge| match edge.weight() {
            NamespaceEdge::Contains(child) if child == name => Some(edge.target()),
            _ => None,
        })
    }

    /// Get or create a child namespace.
    pub fn get_or_create_child(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }

        let child = self.graph.add_node(NamespaceData::default());
        self.graph
            .add_edge(parent, child, NamespaceEdge::Contains(name.to_string()));
        child
    }

    /// Get or create a namespace path from root.
    pub fn get_or_create_path<S: AsRef<str>>(&mut self, path: &[S]) -> NodeIndex {
        let mut current = self.root;
        for segment in path {
            current = self.get_or_create_child(current, segment.as_ref());
        }
        current
    }

    /// Get an existing namespace by path, or None if it doesn't exist.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeIndex> {
        let mut current = self.root;
        for segment in path {
            current = self.find_child(current, segment.as_ref())?;
        }
        Some(current)
    }

    pub fn find_parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// Get the simple name of a namespace node.
    pub fn get_namespace_name(&self, node: NodeIndex) -> Option<&str> {
        if node == self.root {
            return None;
        }
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                NamespaceEdge::Contains(name) => Some(name.as_str()),
            })
    }

    /// Get the full namespace path for a node.
    pub fn get_namespace_path(&self, node: NodeIndex) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = node;

        while current != self.root {
            if let Some(name) = self.get_namespace_name(current) {
                path.push(name.to_string());
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Names of the direct sub-namespaces of `node`, in creation order.
    pub fn children(&self, node: NodeIndex) -> Vec<&str> {
        let mut children: Vec<(NodeIndex, &str)> = self
            .graph
            .edges(node)
            .map(|edge| match edge.weight() {
                NamespaceEdge::Contains(name) => (edge.target(), name.as_str()),
            })
            .collect();
        children.sort_by_key(|(index, _)| *index);
        children.into_iter().map(|(_, name)| name).collect()
    }

    /// Set the docstring of the namespace at `path`, creating it if needed.
    pub fn set_doc<S: AsRef<str>>(&mut self, path: &[S], doc: impl Into<String>) {
        let node = self.get_or_create_path(path);
        if let Some(data) = self.graph.node_weight_mut(node) {
            data.doc = Some(doc.into());
        }
    }

    pub fn doc<S: AsRef<str>>(&self, path: &[S]) -> Option<&str> {
        let node = self.get_path(path)?;
        self.graph.node_weight(node)?.doc.as_deref()
    }

    // ========================================================================
    // Binding Registration
    // ========================================================================

    /// Bind `name` in the namespace at `path`.
    ///
    /// Fails with `DuplicateName` if the name is already bound there.
    pub fn bind<S: AsRef<str>>(
        &mut self,
        path: &[S],
        name: &str,
        binding: Binding,
    ) -> Result<(), RegistrationError> {
        let node = self.get_or_create_path(path);
        let qualified = self.qualified_name(node, name);
        let data = self
            .graph
            .node_weight_mut(node)
            .ok_or_else(|| RegistrationError::InvalidNamespace(qualified.clone()))?;

        if data.bindings.contains_key(name) {
            return Err(RegistrationError::DuplicateName(qualified));
        }
        data.bindings.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn get<S: AsRef<str>>(&self, path: &[S], name: &str) -> Option<&Binding> {
        let node = self.get_path(path)?;
        self.graph.node_weight(node)?.bindings.get(name)
    }

    /// Qualified name, relative to the module, of `name` in `node`.
    pub fn qualified_name(&self, node: NodeIndex, name: &str) -> String {
        let path = self.get_namespace_path(node);
        if path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", path.join("::"), name)
        }
    }

    /// Every binding with its namespace path, depth first.
    pub fn walk(&self) -> Vec<(Vec<String>, &str, &Binding)> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let path = self.get_namespace_path(node);
            if let Some(data) = self.graph.node_weight(node) {
                let mut names: Vec<&String> = data.bindings.keys().collect();
                names.sort();
                for name in names {
                    out.push((path.clone(), name.as_str(), &data.bindings[name]));
                }
            }
            stack.extend(self.graph.neighbors(node));
        }
        out
    }

    pub fn binding_count(&self) -> usize {
        self.graph
            .node_weights()
            .map(|data| data.bindings.len())
            .sum()
    }
}
