//! Definition of array nodes, both concrete (declared children) and
//! prototyped (dynamic entries sharing one prototype).

use indexmap::IndexMap;
use serde_json::{Value, json};

use super::definition::{Definition, DefinitionCore, NodeDefinition};
use super::node_builder::{NodeBuilder, NodeRegistry};
use super::scalar::{
    BooleanNodeDefinition, EnumNodeDefinition, FloatNodeDefinition, IntegerNodeDefinition,
    ScalarNodeDefinition, VariableNodeDefinition,
};
use crate::error::{ConfigError, Result};
use crate::node::{ArrayNode, DefaultChildren, Node, NodeKind, PrototypedArrayNode};

/// Flag added by [`ArrayNodeDefinition::can_be_enabled`] and
/// [`ArrayNodeDefinition::can_be_disabled`].
pub const ENABLED_FLAG: &str = "enabled";

#[derive(Debug, Clone)]
pub struct ArrayNodeDefinition {
    core: DefinitionCore,
    children: IndexMap<String, Definition>,
    prototype: Option<Box<Definition>>,
    registry: NodeRegistry,
    perform_deep_merging: bool,
    ignore_extra_keys: bool,
    at_least_one: bool,
    allow_new_keys: bool,
    key: Option<(String, bool)>,
    add_defaults: bool,
    default_children: Option<DefaultChildren>,
    normalize_keys: bool,
}

impl ArrayNodeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, NodeRegistry::new())
    }

    pub(crate) fn with_registry(name: impl Into<String>, registry: NodeRegistry) -> Self {
        let mut core = DefinitionCore::new(name);
        core.null_equivalent = json!([]);
        core.true_equivalent = json!([]);

        Self {
            core,
            children: IndexMap::new(),
            prototype: None,
            registry,
            perform_deep_merging: true,
            ignore_extra_keys: false,
            at_least_one: false,
            allow_new_keys: true,
            key: None,
            add_defaults: false,
            default_children: None,
            normalize_keys: true,
        }
    }

    pub(crate) fn set_registry(&mut self, registry: NodeRegistry) {
        self.registry = registry;
    }

    /// Declares children through a [`NodeBuilder`].
    ///
    /// ```
    /// use config_tree::builder::{ArrayNodeDefinition, NodeDefinition};
    ///
    /// let mut root = ArrayNodeDefinition::new("app");
    /// root.children(|c| {
    ///     c.scalar_node("name").required();
    ///     c.integer_node("port").default_value(8080);
    /// });
    /// let node = root.get_node().unwrap();
    /// assert_eq!(node.children().unwrap().len(), 2);
    /// ```
    pub fn children(&mut self, f: impl FnOnce(&mut NodeBuilder)) -> &mut Self {
        let mut builder = NodeBuilder::with_registry(self.registry.clone());
        f(&mut builder);
        let (registry, children) = builder.into_parts();
        self.registry = registry;
        for child in children {
            self.append(child);
        }
        self
    }

    /// Adds a finished definition as a child. A second child with the same
    /// name is recorded as a definition error and dropped.
    pub fn append(&mut self, definition: impl Into<Definition>) -> &mut Self {
        let definition = definition.into();
        if self.children.contains_key(definition.name()) {
            self.core.record_error(format!(
                "A child node named \"{}\" already exists.",
                definition.name()
            ));
            return self;
        }
        self.children
            .insert(definition.name().to_string(), definition);
        self
    }

    /// Sets an untyped prototype created from the registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Runtime` when `node_type` is not registered.
    pub fn prototype(&mut self, node_type: impl AsRef<str>) -> Result<&mut Definition> {
        let definition = self.registry.create(node_type.as_ref(), "")?;
        Ok(&mut **self.prototype.insert(Box::new(definition)))
    }

    fn typed_prototype<D: Into<Definition>>(&mut self, mut definition: D, f: impl FnOnce(&mut D)) -> &mut Self {
        f(&mut definition);
        self.prototype = Some(Box::new(definition.into()));
        self
    }

    pub fn array_prototype(&mut self, f: impl FnOnce(&mut ArrayNodeDefinition)) -> &mut Self {
        let definition = ArrayNodeDefinition::with_registry("", self.registry.clone());
        self.typed_prototype(definition, f)
    }

    pub fn scalar_prototype(&mut self, f: impl FnOnce(&mut ScalarNodeDefinition)) -> &mut Self {
        self.typed_prototype(ScalarNodeDefinition::new(""), f)
    }

    pub fn boolean_prototype(&mut self, f: impl FnOnce(&mut BooleanNodeDefinition)) -> &mut Self {
        self.typed_prototype(BooleanNodeDefinition::new(""), f)
    }

    pub fn integer_prototype(&mut self, f: impl FnOnce(&mut IntegerNodeDefinition)) -> &mut Self {
        self.typed_prototype(IntegerNodeDefinition::new(""), f)
    }

    pub fn float_prototype(&mut self, f: impl FnOnce(&mut FloatNodeDefinition)) -> &mut Self {
        self.typed_prototype(FloatNodeDefinition::new(""), f)
    }

    pub fn enum_prototype(&mut self, f: impl FnOnce(&mut EnumNodeDefinition)) -> &mut Self {
        self.typed_prototype(EnumNodeDefinition::new(""), f)
    }

    pub fn variable_prototype(&mut self, f: impl FnOnce(&mut VariableNodeDefinition)) -> &mut Self {
        self.typed_prototype(VariableNodeDefinition::new(""), f)
    }

    /// Fills the node from its children's defaults when it is absent.
    /// Concrete nodes only.
    pub fn add_defaults_if_not_set(&mut self) -> &mut Self {
        self.add_defaults = true;
        self
    }

    /// Synthesizes entries when none are configured. Prototype nodes only.
    pub fn add_default_children_if_none_set(&mut self, children: DefaultChildren) -> &mut Self {
        self.default_children = Some(children);
        self
    }

    pub fn requires_at_least_one_element(&mut self) -> &mut Self {
        self.at_least_one = true;
        self
    }

    /// Every key has to be defined by the first configuration that sets the
    /// node.
    pub fn disallow_new_keys_in_subsequent_configs(&mut self) -> &mut Self {
        self.allow_new_keys = false;
        self
    }

    /// Uses the `name` field of each entry as its key. Prototype nodes only.
    ///
    /// # Arguments
    ///
    /// * `name` - Field holding the key
    /// * `remove_key_item` - Whether the field is stripped from the entry
    pub fn use_attribute_as_key(&mut self, name: impl Into<String>, remove_key_item: bool) -> &mut Self {
        self.key = Some((name.into(), remove_key_item));
        self
    }

    /// Lets a later configuration remove the node by setting it to `false`.
    pub fn can_be_unset(&mut self, allow: bool) -> &mut Self {
        self.merge_rules().allow_unset(allow);
        self
    }

    /// Adds an `enabled` flag, off by default. Setting the node at all turns
    /// it on unless `enabled` is given explicitly.
    pub fn can_be_enabled(&mut self) -> &mut Self {
        self.before_normalization(|expr| {
            expr.if_object().then(|mut value| {
                if let Value::Object(map) = &mut value {
                    map.entry(ENABLED_FLAG).or_insert(Value::Bool(true));
                }
                Ok(value)
            });
        })
        .treat_false_like(json!({ "enabled": false }))
        .treat_true_like(json!({ "enabled": true }))
        .treat_null_like(json!({ "enabled": true }))
        .children(|c| {
            c.boolean_node(ENABLED_FLAG).default_false();
        })
    }

    /// Adds an `enabled` flag, on by default.
    pub fn can_be_disabled(&mut self) -> &mut Self {
        self.treat_false_like(json!({ "enabled": false }))
            .treat_true_like(json!({ "enabled": true }))
            .treat_null_like(json!({ "enabled": true }))
            .children(|c| {
                c.boolean_node(ENABLED_FLAG).default_true();
            })
    }

    /// Later configurations replace the node's value instead of merging
    /// into it.
    pub fn perform_no_deep_merging(&mut self) -> &mut Self {
        self.perform_deep_merging = false;
        self
    }

    /// Silently drops undeclared keys instead of rejecting them.
    pub fn ignore_extra_keys(&mut self) -> &mut Self {
        self.ignore_extra_keys = true;
        self
    }

    /// Whether `-` in keys is rewritten to `_`. Enabled by default.
    pub fn normalize_keys(&mut self, normalize: bool) -> &mut Self {
        self.normalize_keys = normalize;
        self
    }

    fn validate_concrete(&self, path: &str) -> Result<()> {
        let misplaced = if self.key.is_some() {
            Some("->useAttributeAsKey()")
        } else if self.at_least_one {
            Some("->requiresAtLeastOneElement()")
        } else if self.core.default.is_some() {
            Some("->defaultValue()")
        } else if self.default_children.is_some() {
            Some("->addDefaultChildrenIfNoneSet()")
        } else {
            None
        };

        match misplaced {
            Some(method) => Err(ConfigError::definition(format!(
                "{} is not applicable to concrete nodes at path \"{}\"",
                method, path
            ))),
            None => Ok(()),
        }
    }

    fn validate_prototype(&self, path: &str) -> Result<()> {
        if self.add_defaults {
            return Err(ConfigError::definition(format!(
                "->addDefaultsIfNotSet() is not applicable to prototype nodes at path \"{}\"",
                path
            )));
        }
        if !self.children.is_empty() {
            return Err(ConfigError::definition(format!(
                "A prototyped array node can not have concrete children at path \"{}\"",
                path
            )));
        }

        let Some(children) = &self.default_children else {
            return Ok(());
        };
        if self.core.default.is_some() {
            return Err(ConfigError::definition(format!(
                "A default value and default children might not be used together at path \"{}\"",
                path
            )));
        }
        match (children, &self.key) {
            (DefaultChildren::Count(0), _) => Err(ConfigError::definition(format!(
                "->addDefaultChildrenIfNoneSet() needs at least one child at path \"{}\"",
                path
            ))),
            (DefaultChildren::Single | DefaultChildren::Count(_), Some(_)) => {
                Err(ConfigError::definition(format!(
                    "->addDefaultChildrenIfNoneSet() should set default children names as ->useAttributeAsKey() is used at path \"{}\"",
                    path
                )))
            }
            (DefaultChildren::Names(_), None) => Err(ConfigError::definition(format!(
                "->addDefaultChildrenIfNoneSet() might not set default children names as ->useAttributeAsKey() is not used at path \"{}\"",
                path
            ))),
            _ => Ok(()),
        }
    }

    fn configure_array(&self, array: &mut ArrayNode) {
        array.set_allow_new_keys(self.allow_new_keys);
        array.set_perform_deep_merging(self.perform_deep_merging);
        array.set_ignore_extra_keys(self.ignore_extra_keys);
        array.set_normalize_keys(self.normalize_keys);
        array.set_allow_false(self.core.allows_false());
    }

    fn create_concrete_node(&self, path: &str) -> Result<Node> {
        self.validate_concrete(path)?;

        let mut array = ArrayNode::new();
        array.set_add_if_not_set(self.add_defaults);
        self.configure_array(&mut array);

        let mut node = Node::new(self.core.name.clone(), NodeKind::Array(array))?;
        for child in self.children.values() {
            node.add_child(child.build_node(path)?)?;
        }
        Ok(node)
    }

    fn create_prototyped_node(&self, path: &str, prototype: &Definition) -> Result<Node> {
        self.validate_prototype(path)?;

        let mut prototype_node = prototype.build_node(path)?;
        if self.default_children.is_some() {
            if let NodeKind::Array(array) = prototype_node.kind_mut() {
                array.set_add_if_not_set(true);
            }
        }

        let mut prototyped = PrototypedArrayNode::new(prototype_node);
        if let Some((key, remove)) = &self.key {
            prototyped.set_key_attribute(key.clone(), *remove);
        }
        if self.at_least_one {
            prototyped.set_min_number_of_elements(1);
        }
        if let Some(children) = &self.default_children {
            prototyped.set_default_children(children.clone());
        }
        self.configure_array(&mut prototyped.array);

        let mut node = Node::new(self.core.name.clone(), NodeKind::PrototypedArray(prototyped))?;
        if let Some(default) = &self.core.default {
            node.set_default_value(default.clone())?;
        }
        Ok(node)
    }
}

impl NodeDefinition for ArrayNodeDefinition {
    fn core(&self) -> &DefinitionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DefinitionCore {
        &mut self.core
    }

    fn create_node(&self, path: &str) -> Result<Node> {
        if !self.core.allow_empty_value {
            return Err(ConfigError::definition(format!(
                "->cannotBeEmpty() is not applicable to array nodes at path \"{}\"",
                path
            )));
        }
        let mut node = match &self.prototype {
            Some(prototype) => self.create_prototyped_node(path, prototype)?,
            None => self.create_concrete_node(path)?,
        };
        self.core.apply_to(&mut node)?;
        Ok(node)
    }
}
