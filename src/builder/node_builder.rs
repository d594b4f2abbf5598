//! Registry of node types and the builder that declares children with it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::array::ArrayNodeDefinition;
use super::definition::{Definition, DefinitionVariant, NodeType};
use super::scalar::{
    BooleanNodeDefinition, EnumNodeDefinition, FloatNodeDefinition, IntegerNodeDefinition,
    ScalarNodeDefinition, VariableNodeDefinition,
};
use crate::error::{ConfigError, Result};

/// Creates an empty definition with the given name.
pub type NodeFactory = Arc<dyn Fn(&str) -> Definition + Send + Sync>;

/// Node type names mapped to definition factories. Lookups ignore case.
#[derive(Clone)]
pub struct NodeRegistry {
    factories: IndexMap<String, NodeFactory>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NodeRegistry {
    /// Creates a registry holding the built-in [`NodeType`]s.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
        };
        for node_type in NodeType::ALL {
            registry.register(node_type, Arc::new(move |name: &str| node_type.definition(name)));
        }
        registry
    }

    /// Registers `factory` under `node_type`, replacing any previous one.
    pub fn register(&mut self, node_type: impl AsRef<str>, factory: NodeFactory) {
        self.factories
            .insert(node_type.as_ref().to_lowercase(), factory);
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(&node_type.to_lowercase())
    }

    /// Creates a definition of a registered type.
    ///
    /// Array definitions created here inherit this registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Runtime` when the type is not registered.
    pub fn create(&self, node_type: &str, name: &str) -> Result<Definition> {
        let node_type = node_type.to_lowercase();
        let factory = self.factories.get(&node_type).ok_or_else(|| {
            ConfigError::runtime(format!("The node type \"{}\" is not registered", node_type))
        })?;
        Ok(self.adopt(factory(name)))
    }

    fn adopt(&self, mut definition: Definition) -> Definition {
        if let Some(array) = definition.as_array_mut() {
            array.set_registry(self.clone());
        }
        definition
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares the children of an array definition.
///
/// Obtained through [`ArrayNodeDefinition::children`]; each method appends a
/// child and returns it for further configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    registry: NodeRegistry,
    children: Vec<Definition>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_registry(registry: NodeRegistry) -> Self {
        Self {
            registry,
            children: Vec::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (NodeRegistry, Vec<Definition>) {
        (self.registry, self.children)
    }

    /// Appends a child of a type looked up in the registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Runtime` when `node_type` is not registered.
    pub fn node(&mut self, name: &str, node_type: impl AsRef<str>) -> Result<&mut Definition> {
        let definition = self.registry.create(node_type.as_ref(), name)?;
        let index = self.children.len();
        self.children.push(definition);
        Ok(&mut self.children[index])
    }

    /// Appends a finished definition.
    pub fn append(&mut self, definition: impl Into<Definition>) -> &mut Self {
        self.children.push(definition.into());
        self
    }

    /// Registers a custom factory for `node_type`, used by [`NodeBuilder::node`].
    pub fn set_node_class(&mut self, node_type: impl AsRef<str>, factory: NodeFactory) -> &mut Self {
        self.registry.register(node_type, factory);
        self
    }

    fn push<D: DefinitionVariant>(&mut self, definition: D) -> &mut D {
        let index = self.children.len();
        self.children.push(self.registry.adopt(definition.into()));
        match D::from_definition_mut(&mut self.children[index]) {
            Some(definition) => definition,
            None => unreachable!("definition changed variant when appended"),
        }
    }

    pub fn array_node(&mut self, name: &str) -> &mut ArrayNodeDefinition {
        self.push(ArrayNodeDefinition::new(name))
    }

    pub fn scalar_node(&mut self, name: &str) -> &mut ScalarNodeDefinition {
        self.push(ScalarNodeDefinition::new(name))
    }

    pub fn boolean_node(&mut self, name: &str) -> &mut BooleanNodeDefinition {
        self.push(BooleanNodeDefinition::new(name))
    }

    pub fn integer_node(&mut self, name: &str) -> &mut IntegerNodeDefinition {
        self.push(IntegerNodeDefinition::new(name))
    }

    pub fn float_node(&mut self, name: &str) -> &mut FloatNodeDefinition {
        self.push(FloatNodeDefinition::new(name))
    }

    pub fn enum_node(&mut self, name: &str) -> &mut EnumNodeDefinition {
        self.push(EnumNodeDefinition::new(name))
    }

    pub fn variable_node(&mut self, name: &str) -> &mut VariableNodeDefinition {
        self.push(VariableNodeDefinition::new(name))
    }
}
