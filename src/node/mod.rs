//! Runtime configuration tree.
//!
//! A [`Node`] enforces type, merge, default and validation policy for one
//! configuration path. Every node runs the same three passes:
//!
//! - `normalize`: key rewriting, normalization closures, equivalence
//!   substitution, type check, then variant-specific reshaping.
//! - `merge`: overwrite check, type check of both sides, then
//!   variant-specific combination.
//! - `finalize`: type check, variant-specific defaulting and constraint
//!   checks, then final validation closures.
//!
//! Nodes hold policy only. Values are passed in and returned, and the path
//! of the value being processed is threaded down the recursion, so a built
//! tree is immutable and can be shared across threads.

mod array;
mod prototyped;
mod scalar;


use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::value::{PATH_SEPARATOR, is_integer, strict_equals, type_name};

pub use array::ArrayNode;
pub use prototyped::{DefaultChildren, PrototypedArrayNode};
pub use scalar::{EnumNode, FloatNode, IntegerNode, VariableNode};

/// Predicate over a configuration value.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Transform applied to a configuration value.
///
/// An error that is a [`ConfigError`] passes through unchanged. Any other
/// error is reported as an invalid configuration at the node's path.
pub type Transform = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Wraps a closure as a [`Transform`].
pub fn transform(f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static) -> Transform {
    Arc::new(f)
}

/// Wraps a closure as a [`Predicate`].
pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Predicate {
    Arc::new(f)
}

/// Default value of a node: a constant or a supplier evaluated on demand.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Supplier(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Creates a default computed each time it is needed.
    pub fn supplier(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultValue::Supplier(Arc::new(f))
    }

    /// Returns the default, calling the supplier if there is one.
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Supplier(supplier) => supplier(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

/// Variant-specific state of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Accepts any value.
    Variable(VariableNode),
    /// Accepts booleans, numbers, strings and null.
    Scalar(VariableNode),
    Boolean(VariableNode),
    Integer(IntegerNode),
    Float(FloatNode),
    Enum(EnumNode),
    /// Mapping with statically declared children.
    Array(ArrayNode),
    /// Collection whose entries all follow one prototype node.
    PrototypedArray(PrototypedArrayNode),
}

/// One element of the configuration tree.
#[derive(Clone)]
pub struct Node {
    name: String,
    required: bool,
    allow_overwrite: bool,
    normalization_closures: Vec<Transform>,
    final_validation_closures: Vec<Transform>,
    equivalent_values: Vec<(Value, Value)>,
    attributes: IndexMap<String, Value>,
    kind: NodeKind,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("allow_overwrite", &self.allow_overwrite)
            .field("normalization_closures", &self.normalization_closures.len())
            .field("final_validation_closures", &self.final_validation_closures.len())
            .field("equivalent_values", &self.equivalent_values)
            .field("attributes", &self.attributes)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Node {
    /// Creates a node of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` if the name contains the path
    /// separator.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Result<Self> {
        let name = name.into();
        if name.contains(PATH_SEPARATOR) {
            return Err(ConfigError::definition(format!(
                "The name must not contain \"{}\", got \"{}\".",
                PATH_SEPARATOR, name
            )));
        }

        Ok(Self {
            name,
            required: false,
            allow_overwrite: true,
            normalization_closures: Vec::new(),
            final_validation_closures: Vec::new(),
            equivalent_values: Vec::new(),
            attributes: IndexMap::new(),
            kind,
        })
    }

    pub fn variable(name: impl Into<String>) -> Result<Self> {
        Self::new(name, NodeKind::Variable(VariableNode::new()))
    }

    pub fn scalar(name: impl Into<String>) -> Result<Self> {
        Self::new(name, NodeKind::Scalar(VariableNode::new()))
    }

    pub fn boolean(name: impl Into<String>) -> Result<Self> {
        Self::new(name, NodeKind::Boolean(VariableNode::new()))
    }

    /// Creates an integer node with optional inclusive bounds.
    pub fn integer(name: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Result<Self> {
        Self::new(name, NodeKind::Integer(IntegerNode::new(min, max)?))
    }

    /// Creates a float node with optional inclusive bounds.
    pub fn float(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        Self::new(name, NodeKind::Float(FloatNode::new(min, max)?))
    }

    /// Creates an enum node. At least two distinct values are required.
    pub fn enumeration(name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        Self::new(name, NodeKind::Enum(EnumNode::new(values)?))
    }

    pub fn array(name: impl Into<String>) -> Result<Self> {
        Self::new(name, NodeKind::Array(ArrayNode::new()))
    }

    /// Creates a prototyped array node applying `prototype` to every entry.
    pub fn prototyped_array(name: impl Into<String>, prototype: Node) -> Result<Self> {
        Self::new(
            name,
            NodeKind::PrototypedArray(PrototypedArrayNode::new(prototype)),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn allows_overwrite(&self) -> bool {
        self.allow_overwrite
    }

    pub fn set_allow_overwrite(&mut self, allow: bool) -> &mut Self {
        self.allow_overwrite = allow;
        self
    }

    /// Registers a normalization closure. Closures run in registration order.
    pub fn add_normalization_closure(&mut self, closure: Transform) -> &mut Self {
        self.normalization_closures.push(closure);
        self
    }

    pub fn set_normalization_closures(&mut self, closures: Vec<Transform>) -> &mut Self {
        self.normalization_closures = closures;
        self
    }

    /// Registers a final validation closure. Closures run in registration
    /// order, each receiving the value returned by the previous one.
    pub fn add_final_validation_closure(&mut self, closure: Transform) -> &mut Self {
        self.final_validation_closures.push(closure);
        self
    }

    pub fn set_final_validation_closures(&mut self, closures: Vec<Transform>) -> &mut Self {
        self.final_validation_closures = closures;
        self
    }

    /// Substitutes `substitute` for values strictly equal to `original`
    /// during normalization.
    pub fn add_equivalent_value(&mut self, original: Value, substitute: Value) -> &mut Self {
        self.equivalent_values.push((original, substitute));
        self
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_attributes(&mut self, attributes: IndexMap<String, Value>) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Documentation text attached to the node.
    pub fn info(&self) -> Option<&str> {
        self.attributes.get("info").and_then(Value::as_str)
    }

    pub fn set_info(&mut self, info: impl Into<String>) -> &mut Self {
        self.set_attribute("info", Value::String(info.into()))
    }

    /// Example value attached to the node.
    pub fn example(&self) -> Option<&Value> {
        self.attributes.get("example")
    }

    pub fn set_example(&mut self, example: Value) -> &mut Self {
        self.set_attribute("example", example)
    }

    /// Shared scalar state, for every variant except the array family.
    pub fn variable_node(&self) -> Option<&VariableNode> {
        match &self.kind {
            NodeKind::Variable(v) | NodeKind::Scalar(v) | NodeKind::Boolean(v) => Some(v),
            NodeKind::Integer(n) => Some(&n.variable),
            NodeKind::Float(n) => Some(&n.variable),
            NodeKind::Enum(n) => Some(&n.variable),
            NodeKind::Array(_) | NodeKind::PrototypedArray(_) => None,
        }
    }

    pub fn variable_node_mut(&mut self) -> Option<&mut VariableNode> {
        match &mut self.kind {
            NodeKind::Variable(v) | NodeKind::Scalar(v) | NodeKind::Boolean(v) => Some(v),
            NodeKind::Integer(n) => Some(&mut n.variable),
            NodeKind::Float(n) => Some(&mut n.variable),
            NodeKind::Enum(n) => Some(&mut n.variable),
            NodeKind::Array(_) | NodeKind::PrototypedArray(_) => None,
        }
    }

    /// Flags shared by the array family.
    pub fn array_node(&self) -> Option<&ArrayNode> {
        match &self.kind {
            NodeKind::Array(a) => Some(a),
            NodeKind::PrototypedArray(p) => Some(&p.array),
            _ => None,
        }
    }

    pub fn array_node_mut(&mut self) -> Option<&mut ArrayNode> {
        match &mut self.kind {
            NodeKind::Array(a) => Some(a),
            NodeKind::PrototypedArray(p) => Some(&mut p.array),
            _ => None,
        }
    }

    pub fn prototyped(&self) -> Option<&PrototypedArrayNode> {
        match &self.kind {
            NodeKind::PrototypedArray(p) => Some(p),
            _ => None,
        }
    }

    pub fn prototyped_mut(&mut self) -> Option<&mut PrototypedArrayNode> {
        match &mut self.kind {
            NodeKind::PrototypedArray(p) => Some(p),
            _ => None,
        }
    }

    /// Declared children of a concrete array node.
    pub fn children(&self) -> Option<&IndexMap<String, Node>> {
        match &self.kind {
            NodeKind::Array(a) => Some(a.children()),
            _ => None,
        }
    }

    /// Prototype of a prototyped array node.
    pub fn prototype(&self) -> Option<&Node> {
        self.prototyped().map(PrototypedArrayNode::prototype)
    }

    /// Adds a declared child.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` when the child is unnamed, when a
    /// child of the same name exists, or when this node is not a concrete
    /// array node.
    pub fn add_child(&mut self, child: Node) -> Result<()> {
        match &mut self.kind {
            NodeKind::Array(a) => a.add_child(child),
            NodeKind::PrototypedArray(_) => Err(ConfigError::definition(
                "A prototyped array node can not have concrete children.",
            )),
            _ => Err(ConfigError::definition(format!(
                "The node \"{}\" can not have children.",
                self.name
            ))),
        }
    }

    /// Sets the default value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` for concrete array nodes, whose
    /// default is composed from their children, and for a prototyped array
    /// default that is not a mapping or sequence.
    pub fn set_default_value(&mut self, default: DefaultValue) -> Result<()> {
        if let Some(variable) = self.variable_node_mut() {
            variable.set_default_value(default);
            return Ok(());
        }

        match &mut self.kind {
            NodeKind::PrototypedArray(p) => p.set_default_value(&self.name, default.resolve()),
            _ => Err(ConfigError::definition(format!(
                "The array node \"{}\" derives its default value from its children.",
                self.name
            ))),
        }
    }

    pub fn has_default_value(&self) -> bool {
        match &self.kind {
            NodeKind::Array(a) => a.has_default_value(),
            NodeKind::PrototypedArray(_) => true,
            _ => self.variable_node().is_some_and(VariableNode::has_default_value),
        }
    }

    /// The value used when the node is absent from the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Runtime` for a concrete array node without
    /// `add_if_not_set`.
    pub fn default_value(&self) -> Result<Value> {
        self.default_value_at(&self.name)
    }

    pub(crate) fn default_value_at(&self, path: &str) -> Result<Value> {
        match &self.kind {
            NodeKind::Array(a) => a.default_value(path),
            NodeKind::PrototypedArray(p) => p.default_value(),
            _ => Ok(self
                .variable_node()
                .map(VariableNode::default_value)
                .unwrap_or(Value::Null)),
        }
    }

    // ========================================================================
    // Processing passes
    // ========================================================================

    /// Normalizes a raw value for this node.
    pub fn normalize(&self, value: Value) -> Result<Value> {
        self.normalize_at(&self.name, value)
    }

    /// Merges two normalized values, `right` taking precedence.
    pub fn merge(&self, left: Value, right: Value) -> Result<Value> {
        self.merge_at(&self.name, left, right)
    }

    /// Finalizes a merged value: fills defaults, checks constraints and runs
    /// the final validation closures.
    pub fn finalize(&self, value: Value) -> Result<Value> {
        self.finalize_at(&self.name, value)
    }

    pub(crate) fn normalize_at(&self, path: &str, value: Value) -> Result<Value> {
        let mut value = match &self.kind {
            NodeKind::Array(a) => a.pre_normalize(value),
            NodeKind::PrototypedArray(p) => p.array.pre_normalize(value),
            _ => value,
        };

        for closure in &self.normalization_closures {
            value = apply_transform(closure, value, path)?;
        }

        for (original, substitute) in &self.equivalent_values {
            if strict_equals(&value, original) {
                value = substitute.clone();
            }
        }

        self.validate_type(path, &value)?;
        self.normalize_value(path, value)
    }

    pub(crate) fn merge_at(&self, path: &str, left: Value, right: Value) -> Result<Value> {
        if !self.allow_overwrite {
            return Err(ConfigError::forbidden_overwrite(
                path,
                format!(
                    "Configuration path \"{}\" cannot be overwritten. You have to define all \
                     options for this path, and any of its sub-paths in one configuration section.",
                    path
                ),
            ));
        }

        self.validate_type(path, &left)?;
        self.validate_type(path, &right)?;
        self.merge_values(path, left, right)
    }

    pub(crate) fn finalize_at(&self, path: &str, value: Value) -> Result<Value> {
        self.validate_type(path, &value)?;
        let mut value = self.finalize_value(path, value)?;

        for closure in &self.final_validation_closures {
            value = apply_transform(closure, value, path)?;
        }

        Ok(value)
    }

    fn validate_type(&self, path: &str, value: &Value) -> Result<()> {
        let expected = match &self.kind {
            NodeKind::Variable(_) => return Ok(()),
            NodeKind::Scalar(_) | NodeKind::Enum(_) if !value.is_array() && !value.is_object() => {
                return Ok(());
            }
            NodeKind::Scalar(_) | NodeKind::Enum(_) => "scalar",
            NodeKind::Boolean(_) if value.is_boolean() => return Ok(()),
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Integer(_) if is_integer(value) => return Ok(()),
            NodeKind::Integer(_) => "integer",
            NodeKind::Float(_) if value.is_number() => return Ok(()),
            NodeKind::Float(_) => "float",
            NodeKind::Array(a) if a.accepts_type(value) => return Ok(()),
            NodeKind::PrototypedArray(p) if p.array.accepts_type(value) => return Ok(()),
            NodeKind::Array(_) | NodeKind::PrototypedArray(_) => "array",
        };

        Err(ConfigError::invalid_type(
            path,
            format!(
                "Invalid type for path \"{}\". Expected {}, but got {}.",
                path,
                expected,
                type_name(value)
            ),
        ))
    }

    fn normalize_value(&self, path: &str, value: Value) -> Result<Value> {
        match &self.kind {
            NodeKind::Array(a) => a.normalize_value(path, value),
            NodeKind::PrototypedArray(p) => p.normalize_value(path, value),
            _ => Ok(value),
        }
    }

    fn merge_values(&self, path: &str, left: Value, right: Value) -> Result<Value> {
        match &self.kind {
            NodeKind::Array(a) => a.merge_values(path, left, right),
            NodeKind::PrototypedArray(p) => p.merge_values(path, left, right),
            _ => Ok(right),
        }
    }

    fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        match &self.kind {
            NodeKind::Variable(v) | NodeKind::Scalar(v) | NodeKind::Boolean(v) => {
                v.finalize_value(path, value)
            }
            NodeKind::Integer(n) => n.finalize_value(path, value),
            NodeKind::Float(n) => n.finalize_value(path, value),
            NodeKind::Enum(n) => n.finalize_value(path, value),
            NodeKind::Array(a) => a.finalize_value(path, value),
            NodeKind::PrototypedArray(p) => p.finalize_value(path, value),
        }
    }
}

/// Runs a user closure, attributing foreign failures to `path`.
pub(crate) fn apply_transform(closure: &Transform, value: Value, path: &str) -> Result<Value> {
    closure(value).map_err(|err| match err.downcast::<ConfigError>() {
        Ok(config_err) => config_err,
        Err(other) => ConfigError::invalid_with_source(
            path,
            format!("Invalid configuration for path \"{}\": {}", path, other),
            other.into(),
        ),
    })
}
