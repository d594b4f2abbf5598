//! Settings shared by every definition and the [`NodeDefinition`] trait that
//! exposes them as a fluent API.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use super::array::ArrayNodeDefinition;
use super::expr::ExprBuilder;
use super::rules::{MergeBuilder, NormalizationBuilder, ValidationBuilder};
use super::scalar::{
    BooleanNodeDefinition, EnumNodeDefinition, FloatNodeDefinition, IntegerNodeDefinition,
    ScalarNodeDefinition, VariableNodeDefinition,
};
use crate::error::{ConfigError, Result};
use crate::node::{DefaultValue, Node};
use crate::value::join_path;

/// Built-in node types known to every [`NodeBuilder`](super::NodeBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Variable,
    Scalar,
    Boolean,
    Integer,
    Float,
    Enum,
    Array,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Variable,
        NodeType::Scalar,
        NodeType::Boolean,
        NodeType::Integer,
        NodeType::Float,
        NodeType::Enum,
        NodeType::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Variable => "variable",
            NodeType::Scalar => "scalar",
            NodeType::Boolean => "boolean",
            NodeType::Integer => "integer",
            NodeType::Float => "float",
            NodeType::Enum => "enum",
            NodeType::Array => "array",
        }
    }

    /// Creates an empty definition of this type.
    pub fn definition(&self, name: &str) -> Definition {
        match self {
            NodeType::Variable => VariableNodeDefinition::new(name).into(),
            NodeType::Scalar => ScalarNodeDefinition::new(name).into(),
            NodeType::Boolean => BooleanNodeDefinition::new(name).into(),
            NodeType::Integer => IntegerNodeDefinition::new(name).into(),
            NodeType::Float => FloatNodeDefinition::new(name).into(),
            NodeType::Enum => EnumNodeDefinition::new(name).into(),
            NodeType::Array => ArrayNodeDefinition::new(name).into(),
        }
    }
}

impl AsRef<str> for NodeType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending settings common to all definitions.
#[derive(Debug, Clone)]
pub struct DefinitionCore {
    pub(crate) name: String,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) required: bool,
    pub(crate) null_equivalent: Value,
    pub(crate) true_equivalent: Value,
    pub(crate) false_equivalent: Value,
    pub(crate) allow_empty_value: bool,
    pub(crate) attributes: IndexMap<String, Value>,
    pub(crate) normalization: Option<NormalizationBuilder>,
    pub(crate) merge: Option<MergeBuilder>,
    pub(crate) validation: Option<ValidationBuilder>,
    /// Mistakes detected while the definition was configured, reported when
    /// it is built.
    pub(crate) errors: Vec<String>,
}

impl DefinitionCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            required: false,
            null_equivalent: Value::Null,
            true_equivalent: Value::Bool(true),
            false_equivalent: Value::Bool(false),
            allow_empty_value: true,
            attributes: IndexMap::new(),
            normalization: None,
            merge: None,
            validation: None,
            errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub(crate) fn allows_false(&self) -> bool {
        self.merge.as_ref().is_some_and(MergeBuilder::allows_false)
    }

    /// Applies the settings every node kind shares: closures, merge policy,
    /// equivalences and the required flag.
    pub(crate) fn apply_to(&self, node: &mut Node) -> Result<()> {
        if let Some(normalization) = &self.normalization {
            node.set_normalization_closures(normalization.closures()?);
        }
        if let Some(merge) = &self.merge {
            node.set_allow_overwrite(merge.allows_overwrite());
        }
        if let Some(validation) = &self.validation {
            node.set_final_validation_closures(validation.closures()?);
        }

        node.add_equivalent_value(Value::Null, self.null_equivalent.clone())
            .add_equivalent_value(Value::Bool(true), self.true_equivalent.clone())
            .add_equivalent_value(Value::Bool(false), self.false_equivalent.clone())
            .set_required(self.required);
        Ok(())
    }
}

/// Fluent authoring API shared by every definition.
///
/// Implementors provide access to their [`DefinitionCore`] and the
/// variant-specific node construction; everything else is provided.
pub trait NodeDefinition {
    fn core(&self) -> &DefinitionCore;

    fn core_mut(&mut self) -> &mut DefinitionCore;

    /// Builds the variant-specific node. `path` is the node's own path and
    /// is only used in definition error messages.
    fn create_node(&self, path: &str) -> Result<Node>;

    fn name(&self) -> &str {
        &self.core().name
    }

    /// Compiles the definition into a standalone node.
    fn get_node(&self) -> Result<Node> {
        self.build_node("")
    }

    /// Compiles the definition into a node placed under `parent_path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` for any mistake recorded while the
    /// definition was configured and for incompatible settings.
    fn build_node(&self, parent_path: &str) -> Result<Node> {
        let core = self.core();
        let path = if core.name.is_empty() {
            parent_path.to_string()
        } else {
            join_path(parent_path, &core.name)
        };

        if let Some(message) = core.errors.first() {
            return Err(ConfigError::definition(format!(
                "{} (at path \"{}\")",
                message, path
            )));
        }

        let mut node = self.create_node(&path)?;
        node.set_attributes(core.attributes.clone());
        Ok(node)
    }

    /// Value used when the node is absent from every configuration.
    fn default_value(&mut self, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default computed each time it is needed.
    fn default_with(&mut self, supplier: impl Fn() -> Value + Send + Sync + 'static) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().default = Some(DefaultValue::supplier(supplier));
        self
    }

    fn default_null(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.default_value(Value::Null)
    }

    fn default_true(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.default_value(true)
    }

    fn default_false(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.default_value(false)
    }

    /// The node must be present once all configurations are merged.
    fn required(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().required = true;
        self
    }

    /// Replaces a `null` value with `value` during normalization.
    fn treat_null_like(&mut self, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().null_equivalent = value.into();
        self
    }

    fn treat_true_like(&mut self, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().true_equivalent = value.into();
        self
    }

    fn treat_false_like(&mut self, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().false_equivalent = value.into();
        self
    }

    /// Rejects empty values (`null`, `false`, `0`, `""`) at finalization.
    /// Scalar nodes only; array definitions report it when built.
    fn cannot_be_empty(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().allow_empty_value = false;
        self
    }

    /// Adds a conditional normalization transform.
    fn before_normalization(&mut self, f: impl FnOnce(&mut ExprBuilder)) -> &mut Self
    where
        Self: Sized,
    {
        self.normalization_rules().before(f);
        self
    }

    /// Adds a conditional final validation rule.
    fn validate(&mut self, f: impl FnOnce(&mut ExprBuilder)) -> &mut Self
    where
        Self: Sized,
    {
        self.validation_rules().rule(f);
        self
    }

    /// Forbids later configurations from overwriting the node.
    fn cannot_be_overwritten(&mut self, deny: bool) -> &mut Self
    where
        Self: Sized,
    {
        self.merge_rules().deny_overwrite(deny);
        self
    }

    fn normalization_rules(&mut self) -> &mut NormalizationBuilder {
        self.core_mut().normalization.get_or_insert_with(Default::default)
    }

    fn merge_rules(&mut self) -> &mut MergeBuilder {
        self.core_mut().merge.get_or_insert_with(Default::default)
    }

    fn validation_rules(&mut self) -> &mut ValidationBuilder {
        self.core_mut().validation.get_or_insert_with(Default::default)
    }

    fn info(&mut self, info: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.attribute("info", Value::String(info.into()))
    }

    fn example(&mut self, example: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.attribute("example", example)
    }

    fn attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().attributes.insert(key.into(), value.into());
        self
    }
}

/// Any definition, as produced by the [`NodeBuilder`](super::NodeBuilder)
/// registry.
#[derive(Debug, Clone)]
pub enum Definition {
    Variable(VariableNodeDefinition),
    Scalar(ScalarNodeDefinition),
    Boolean(BooleanNodeDefinition),
    Integer(IntegerNodeDefinition),
    Float(FloatNodeDefinition),
    Enum(EnumNodeDefinition),
    Array(ArrayNodeDefinition),
}

impl Definition {
    fn inner(&self) -> &dyn NodeDefinition {
        match self {
            Definition::Variable(d) => d,
            Definition::Scalar(d) => d,
            Definition::Boolean(d) => d,
            Definition::Integer(d) => d,
            Definition::Float(d) => d,
            Definition::Enum(d) => d,
            Definition::Array(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn NodeDefinition {
        match self {
            Definition::Variable(d) => d,
            Definition::Scalar(d) => d,
            Definition::Boolean(d) => d,
            Definition::Integer(d) => d,
            Definition::Float(d) => d,
            Definition::Enum(d) => d,
            Definition::Array(d) => d,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNodeDefinition> {
        match self {
            Definition::Array(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_integer_mut(&mut self) -> Option<&mut IntegerNodeDefinition> {
        match self {
            Definition::Integer(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_float_mut(&mut self) -> Option<&mut FloatNodeDefinition> {
        match self {
            Definition::Float(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_enum_mut(&mut self) -> Option<&mut EnumNodeDefinition> {
        match self {
            Definition::Enum(d) => Some(d),
            _ => None,
        }
    }
}

impl NodeDefinition for Definition {
    fn core(&self) -> &DefinitionCore {
        self.inner().core()
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        self.inner_mut().core_mut()
    }

    fn create_node(&self, path: &str) -> Result<Node> {
        self.inner().create_node(path)
    }
}

/// Conversion between a concrete definition and [`Definition`].
pub(crate) trait DefinitionVariant: Into<Definition> {
    fn from_definition_mut(definition: &mut Definition) -> Option<&mut Self>;
}

macro_rules! definition_variant {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Definition {
            fn from(definition: $ty) -> Self {
                Definition::$variant(definition)
            }
        }

        impl DefinitionVariant for $ty {
            fn from_definition_mut(definition: &mut Definition) -> Option<&mut Self> {
                match definition {
                    Definition::$variant(d) => Some(d),
                    _ => None,
                }
            }
        }
    };
}

definition_variant!(Variable, VariableNodeDefinition);
definition_variant!(Scalar, ScalarNodeDefinition);
definition_variant!(Boolean, BooleanNodeDefinition);
definition_variant!(Integer, IntegerNodeDefinition);
definition_variant!(Float, FloatNodeDefinition);
definition_variant!(Enum, EnumNodeDefinition);
definition_variant!(Array, ArrayNodeDefinition);
