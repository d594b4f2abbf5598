//! Definitions of the scalar node family.

use serde_json::Value;

use super::definition::{DefinitionCore, NodeDefinition};
use crate::error::{ConfigError, Result};
use crate::node::{EnumNode, FloatNode, IntegerNode, Node, NodeKind, VariableNode};
use crate::value::strict_equals;

/// Builds a scalar-family node from the shared settings.
fn build_variable_node(core: &DefinitionCore, kind: NodeKind) -> Result<Node> {
    let mut node = Node::new(core.name.clone(), kind)?;
    if let Some(default) = &core.default {
        node.set_default_value(default.clone())?;
    }
    if let Some(variable) = node.variable_node_mut() {
        variable.set_allow_empty_value(core.allow_empty_value);
    }
    core.apply_to(&mut node)?;
    Ok(node)
}

/// Definition of a node accepting any value.
#[derive(Debug, Clone)]
pub struct VariableNodeDefinition {
    core: DefinitionCore,
}

impl VariableNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: DefinitionCore::new(name),
        }
    }
}

impl NodeDefinition for VariableNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, _path: &str) -> Result<Node> {
        build_variable_node(&self.core, NodeKind::Variable(VariableNode::new()))
    }
}

/// Definition of a boolean, number, string or null node.
#[derive(Debug, Clone)]
pub struct ScalarNodeDefinition {
    core: DefinitionCore,
}

impl ScalarNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: DefinitionCore::new(name),
        }
    }
}

impl NodeDefinition for ScalarNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, _path: &str) -> Result<Node> {
        build_variable_node(&self.core, NodeKind::Scalar(VariableNode::new()))
    }
}

/// Definition of a boolean node. A `null` value counts as `true`.
#[derive(Debug, Clone)]
pub struct BooleanNodeDefinition {
    core: DefinitionCore,
}

impl BooleanNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let mut core = DefinitionCore::new(name);
        core.null_equivalent = Value::Bool(true);
        Self { core }
    }
}

impl NodeDefinition for BooleanNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, _path: &str) -> Result<Node> {
        build_variable_node(&self.core, NodeKind::Boolean(VariableNode::new()))
    }
}

/// Definition of an integer node with optional bounds.
#[derive(Debug, Clone)]
pub struct IntegerNodeDefinition {
    core: DefinitionCore,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: DefinitionCore::new(name),
            min: None,
            max: None,
        }
    }

    pub fn min(&mut self, min: i64) -> &mut Self {
        match self.max {
            Some(max) if max < min => self.core.record_error(format!(
                "You cannot define a min({}) as you already have a max({})",
                min, max
            )),
            _ => self.min = Some(min),
        }
        self
    }

    pub fn max(&mut self, max: i64) -> &mut Self {
        match self.min {
            Some(min) if min > max => self.core.record_error(format!(
                "You cannot define a max({}) as you already have a min({})",
                max, min
            )),
            _ => self.max = Some(max),
        }
        self
    }
}

impl NodeDefinition for IntegerNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, _path: &str) -> Result<Node> {
        let kind = NodeKind::Integer(IntegerNode::new(self.min, self.max)?);
        build_variable_node(&self.core, kind)
    }
}

/// Definition of a float node with optional bounds.
#[derive(Debug, Clone)]
pub struct FloatNodeDefinition {
    core: DefinitionCore,
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: DefinitionCore::new(name),
            min: None,
            max: None,
        }
    }

    pub fn min(&mut self, min: f64) -> &mut Self {
        match self.max {
            Some(max) if max < min => self.core.record_error(format!(
                "You cannot define a min({}) as you already have a max({})",
                min, max
            )),
            _ => self.min = Some(min),
        }
        self
    }

    pub fn max(&mut self, max: f64) -> &mut Self {
        match self.min {
            Some(min) if min > max => self.core.record_error(format!(
                "You cannot define a max({}) as you already have a min({})",
                max, min
            )),
            _ => self.max = Some(max),
        }
        self
    }
}

impl NodeDefinition for FloatNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, _path: &str) -> Result<Node> {
        let kind = NodeKind::Float(FloatNode::new(self.min, self.max)?);
        build_variable_node(&self.core, kind)
    }
}

/// Definition of a scalar node restricted to a fixed set of values.
#[derive(Debug, Clone)]
pub struct EnumNodeDefinition {
    core: DefinitionCore,
    values: Option<Vec<Value>>,
}

impl EnumNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: DefinitionCore::new(name),
            values: None,
        }
    }

    /// Sets the permitted values. At least two distinct values are needed.
    pub fn values<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let has_two_distinct = values
            .iter()
            .any(|value| !strict_equals(value, &values[0]));
        if !has_two_distinct {
            self.core
                .record_error("values() must be called with at least two distinct values.");
        }
        self.values = Some(values);
        self
    }
}

impl NodeDefinition for EnumNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, path: &str) -> Result<Node> {
        let values = self.values.clone().ok_or_else(|| {
            ConfigError::definition(format!(
                "You must call values() on enum nodes (at path \"{}\")",
                path
            ))
        })?;
        build_variable_node(&self.core, NodeKind::Enum(EnumNode::new(values)?))
    }
}
