//! Anchor of a schema: holds the root definition and caches the compiled
//! tree.

use std::sync::Arc;

use tracing::debug;

use super::array::ArrayNodeDefinition;
use super::definition::{Definition, NodeDefinition};
use super::node_builder::NodeRegistry;
use crate::error::Result;
use crate::node::Node;

/// Owns a root definition and compiles it into a shareable [`Node`] tree.
///
/// ```
/// use config_tree::builder::{NodeDefinition, TreeBuilder};
/// use serde_json::json;
///
/// let mut builder = TreeBuilder::new("app");
/// builder.root_node().children(|c| {
///     c.boolean_node("debug").default_false();
/// });
/// let tree = builder.build_tree().unwrap();
/// assert_eq!(tree.finalize(json!({})).unwrap(), json!({"debug": false}));
/// ```
#[derive(Debug)]
pub struct TreeBuilder<D = ArrayNodeDefinition> {
    root: D,
    tree: Option<Arc<Node>>,
}

impl TreeBuilder<ArrayNodeDefinition> {
    /// Starts a tree whose root is an array node.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_root(ArrayNodeDefinition::new(name))
    }
}

impl TreeBuilder<Definition> {
    /// Starts a tree whose root type is looked up by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Runtime` when `node_type` is not registered.
    pub fn with_type(name: &str, node_type: impl AsRef<str>) -> Result<Self> {
        let root = NodeRegistry::new().create(node_type.as_ref(), name)?;
        Ok(Self::with_root(root))
    }
}

impl<D: NodeDefinition> TreeBuilder<D> {
    pub fn with_root(root: D) -> Self {
        Self { root, tree: None }
    }

    /// Mutable access to the root definition. Drops any cached tree.
    pub fn root_node(&mut self) -> &mut D {
        self.tree = None;
        &mut self.root
    }

    pub fn root(&self) -> &D {
        &self.root
    }

    /// Compiles the root definition, once.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` for any mistake in the definitions.
    pub fn build_tree(&mut self) -> Result<Arc<Node>> {
        if let Some(tree) = &self.tree {
            debug!(root = self.root.name(), "using cached configuration tree");
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(self.root.get_node()?);
        debug!(root = self.root.name(), "compiled configuration tree");
        self.tree = Some(Arc::clone(&tree));
        Ok(tree)
    }
}
