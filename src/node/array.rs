//! Array node with statically declared children.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use super::Node;
use crate::error::{ConfigError, Result};
use crate::value::{into_entries, into_mapping, is_array_like, join_path};

/// A mapping whose keys are declared up front, each with its own child node.
///
/// Also carries the merge and key policies shared with
/// [`PrototypedArrayNode`](super::PrototypedArrayNode).
#[derive(Debug, Clone)]
pub struct ArrayNode {
    children: IndexMap<String, Node>,
    allow_false: bool,
    allow_new_keys: bool,
    add_if_not_set: bool,
    perform_deep_merging: bool,
    ignore_extra_keys: bool,
    normalize_keys: bool,
}

impl ArrayNode {
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
            allow_false: false,
            allow_new_keys: true,
            add_if_not_set: false,
            perform_deep_merging: true,
            ignore_extra_keys: false,
            normalize_keys: true,
        }
    }

    pub fn children(&self) -> &IndexMap<String, Node> {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: Node) -> Result<()> {
        let name = child.name().to_string();
        if name.is_empty() {
            return Err(ConfigError::definition("Child nodes must be named."));
        }
        if self.children.contains_key(&name) {
            return Err(ConfigError::definition(format!(
                "A child node named \"{}\" already exists.",
                name
            )));
        }
        self.children.insert(name, child);
        Ok(())
    }

    /// Accept `false` as "remove this key" in later configurations.
    pub fn set_allow_false(&mut self, allow: bool) {
        self.allow_false = allow;
    }

    pub fn allows_false(&self) -> bool {
        self.allow_false
    }

    pub fn set_allow_new_keys(&mut self, allow: bool) {
        self.allow_new_keys = allow;
    }

    pub fn allows_new_keys(&self) -> bool {
        self.allow_new_keys
    }

    /// Fill the node from its children's defaults when it is absent.
    pub fn set_add_if_not_set(&mut self, add: bool) {
        self.add_if_not_set = add;
    }

    pub fn set_perform_deep_merging(&mut self, perform: bool) {
        self.perform_deep_merging = perform;
    }

    pub fn performs_deep_merging(&self) -> bool {
        self.perform_deep_merging
    }

    pub fn set_ignore_extra_keys(&mut self, ignore: bool) {
        self.ignore_extra_keys = ignore;
    }

    pub fn set_normalize_keys(&mut self, normalize: bool) {
        self.normalize_keys = normalize;
    }

    pub fn has_default_value(&self) -> bool {
        self.add_if_not_set
    }

    pub(crate) fn default_value(&self, path: &str) -> Result<Value> {
        if !self.has_default_value() {
            return Err(ConfigError::runtime(format!(
                "The node at path \"{}\" has no default value.",
                path
            )));
        }

        let mut defaults = Map::new();
        for (name, child) in &self.children {
            if child.has_default_value() {
                defaults.insert(name.clone(), child.default_value_at(&join_path(path, name))?);
            }
        }
        Ok(Value::Object(defaults))
    }

    pub(crate) fn accepts_type(&self, value: &Value) -> bool {
        is_array_like(value) || (self.allow_false && *value == Value::Bool(false))
    }

    /// Rewrites `foo-bar` keys to `foo_bar` unless `foo_bar` is also present.
    pub(crate) fn pre_normalize(&self, value: Value) -> Value {
        if !self.normalize_keys {
            return value;
        }
        let Value::Object(map) = value else {
            return value;
        };

        let renames: Vec<Option<String>> = map
            .keys()
            .map(|key| {
                if !key.contains('-') || key.contains('_') {
                    return None;
                }
                let normalized = key.replace('-', "_");
                (!map.contains_key(&normalized)).then_some(normalized)
            })
            .collect();

        Value::Object(
            map.into_iter()
                .zip(renames)
                .map(|((key, value), rename)| match rename {
                    Some(normalized) => {
                        trace!(from = %key, to = %normalized, "normalized key");
                        (normalized, value)
                    }
                    None => (key, value),
                })
                .collect(),
        )
    }

    pub(crate) fn normalize_value(&self, path: &str, value: Value) -> Result<Value> {
        if value == Value::Bool(false) {
            return Ok(value);
        }

        let mut remaining = into_mapping(value);
        let mut normalized = Map::new();
        for (name, child) in &self.children {
            let Some(raw) = remaining.shift_remove(name) else {
                continue;
            };
            match child.normalize_at(&join_path(path, name), raw) {
                Ok(value) => {
                    normalized.insert(name.clone(), value);
                }
                Err(err) if err.is_unset_key() => {
                    trace!(path, key = %name, "key unset during normalization");
                }
                Err(err) => return Err(err),
            }
        }

        if !remaining.is_empty() && !self.ignore_extra_keys {
            let keys: Vec<&str> = remaining.keys().map(String::as_str).collect();
            return Err(ConfigError::invalid(
                path,
                format!(
                    "Unrecognized options \"{}\" under \"{}\"",
                    keys.join(","),
                    path
                ),
            ));
        }

        Ok(Value::Object(normalized))
    }

    pub(crate) fn merge_values(&self, path: &str, left: Value, right: Value) -> Result<Value> {
        if right == Value::Bool(false) {
            // finalization removes the key if nothing sets it again
            return Ok(right);
        }
        if left == Value::Bool(false) || !self.perform_deep_merging {
            return Ok(right);
        }

        let mut merged = into_mapping(left);
        for (key, value) in into_entries(right) {
            let Some(slot) = merged.get_mut(&key) else {
                if !self.allow_new_keys {
                    return Err(ConfigError::invalid(
                        path,
                        format!(
                            "You are not allowed to define new elements for path \"{}\". Please \
                             define all elements for this path in one config file. If you are \
                             trying to overwrite an element, make sure you redefine it with the \
                             same name.",
                            path
                        ),
                    ));
                }
                merged.insert(key, value);
                continue;
            };

            let child = self.children.get(&key).ok_or_else(|| {
                ConfigError::runtime("merge() expects a normalized config array.")
            })?;
            let current = std::mem::take(slot);
            *slot = child.merge_at(&join_path(path, &key), current, value)?;
        }

        Ok(Value::Object(merged))
    }

    pub(crate) fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        if value == Value::Bool(false) {
            return Err(ConfigError::unset_key(
                path,
                format!("Unsetting key for path \"{}\", value: false", path),
            ));
        }

        let mut finalized = into_mapping(value);
        for (name, child) in &self.children {
            let child_path = join_path(path, name);
            let Some(current) = finalized.get_mut(name).map(std::mem::take) else {
                if child.is_required() {
                    return Err(ConfigError::invalid(
                        &child_path,
                        format!(
                            "The child node \"{}\" at path \"{}\" must be configured.",
                            name, path
                        ),
                    ));
                }
                if child.has_default_value() {
                    trace!(path = %child_path, "filled default value");
                    finalized.insert(name.clone(), child.default_value_at(&child_path)?);
                }
                continue;
            };

            match child.finalize_at(&child_path, current) {
                Ok(value) => {
                    finalized.insert(name.clone(), value);
                }
                Err(err) if err.is_unset_key() => {
                    trace!(path = %child_path, "removed unset key");
                    finalized.shift_remove(name);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Value::Object(finalized))
    }
}

impl Default for ArrayNode {
    fn default() -> Self {
        Self::new()
    }
}
