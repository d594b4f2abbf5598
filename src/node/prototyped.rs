//! Array node whose entries all follow a single prototype node.
//!
//! Entries are processed through the prototype at the entry's own path
//! (`parent.key`). The prototype is never renamed or otherwise mutated, so
//! concurrent processing of one tree is safe.

use serde_json::{Map, Value};
use tracing::trace;

use super::{ArrayNode, Node};
use crate::error::{ConfigError, Result};
use crate::value::{entry_count, into_entries, into_mapping, is_array_like, join_path, key_from_value};

/// Name of the single entry synthesized by [`DefaultChildren::Single`].
pub const DEFAULT_CHILD_NAME: &str = "defaults";

/// Field that a keyed entry collapses to when it is the only one left.
const COLLAPSE_FIELD: &str = "value";

/// Entries synthesized when a prototyped array is not configured at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultChildren {
    /// One entry named `defaults`.
    Single,
    /// `n` entries.
    Count(usize),
    /// One entry per name. Requires a key attribute.
    Names(Vec<String>),
}

impl DefaultChildren {
    fn names(&self) -> Vec<String> {
        match self {
            DefaultChildren::Single => vec![DEFAULT_CHILD_NAME.to_string()],
            DefaultChildren::Count(n) => (0..*n).map(|i| i.to_string()).collect(),
            DefaultChildren::Names(names) => names.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrototypedArrayNode {
    pub(crate) array: ArrayNode,
    prototype: Box<Node>,
    key_attribute: Option<String>,
    remove_key_attribute: bool,
    min_number_of_elements: usize,
    default_value: Option<Value>,
    default_children: Option<DefaultChildren>,
}

impl PrototypedArrayNode {
    pub fn new(prototype: Node) -> Self {
        Self {
            array: ArrayNode::new(),
            prototype: Box::new(prototype),
            key_attribute: None,
            remove_key_attribute: true,
            min_number_of_elements: 0,
            default_value: None,
            default_children: None,
        }
    }

    pub fn prototype(&self) -> &Node {
        &self.prototype
    }

    pub fn prototype_mut(&mut self) -> &mut Node {
        &mut self.prototype
    }

    /// Promotes the `name` field of each entry to be the entry's key.
    ///
    /// # Arguments
    ///
    /// * `name` - Field holding the key
    /// * `remove` - Whether the field is stripped from the entry afterwards
    pub fn set_key_attribute(&mut self, name: impl Into<String>, remove: bool) {
        self.key_attribute = Some(name.into());
        self.remove_key_attribute = remove;
    }

    pub fn key_attribute(&self) -> Option<&str> {
        self.key_attribute.as_deref()
    }

    pub fn removes_key_attribute(&self) -> bool {
        self.remove_key_attribute
    }

    pub fn set_min_number_of_elements(&mut self, min: usize) {
        self.min_number_of_elements = min;
    }

    pub fn min_number_of_elements(&self) -> usize {
        self.min_number_of_elements
    }

    pub fn set_default_children(&mut self, children: DefaultChildren) {
        self.default_children = Some(children);
    }

    pub fn default_children(&self) -> Option<&DefaultChildren> {
        self.default_children.as_ref()
    }

    pub(crate) fn set_default_value(&mut self, path: &str, value: Value) -> Result<()> {
        if !is_array_like(&value) {
            return Err(ConfigError::definition(format!(
                "{}: the default value of an array node has to be a mapping or a sequence",
                path
            )));
        }
        self.default_value = Some(value);
        Ok(())
    }

    pub(crate) fn default_value(&self) -> Result<Value> {
        let Some(children) = &self.default_children else {
            return Ok(match (&self.default_value, &self.key_attribute) {
                (Some(value), _) => value.clone(),
                (None, Some(_)) => Value::Object(Map::new()),
                (None, None) => Value::Array(Vec::new()),
            });
        };

        let entry = if self.prototype.has_default_value() {
            self.prototype.default_value()?
        } else {
            Value::Object(Map::new())
        };
        let names = children.names();
        trace!(count = names.len(), "synthesized default children");

        Ok(match self.key_attribute {
            Some(_) => Value::Object(
                names
                    .into_iter()
                    .map(|name| (name, entry.clone()))
                    .collect(),
            ),
            None => Value::Array(vec![entry; names.len()]),
        })
    }

    pub(crate) fn normalize_value(&self, path: &str, value: Value) -> Result<Value> {
        if value == Value::Bool(false) {
            return Ok(value);
        }

        let is_mapping = value.is_object();
        let keyed = is_mapping || self.key_attribute.is_some();
        let mut mapping = Map::new();
        let mut sequence = Vec::new();

        for (key, entry) in into_entries(value) {
            let (key, entry) = self.extract_key(path, key, entry, is_mapping)?;
            if self.key_attribute.is_some() && mapping.contains_key(&key) {
                return Err(ConfigError::duplicate_key(
                    path,
                    format!("Duplicate key \"{}\" for path \"{}\".", key, path),
                ));
            }

            let normalized = match self.prototype.normalize_at(&join_path(path, &key), entry) {
                Ok(normalized) => normalized,
                Err(err) if err.is_unset_key() => {
                    trace!(path, key = %key, "entry unset during normalization");
                    continue;
                }
                Err(err) => return Err(err),
            };

            if keyed {
                mapping.insert(key, normalized);
            } else {
                sequence.push(normalized);
            }
        }

        Ok(if keyed {
            Value::Object(mapping)
        } else {
            Value::Array(sequence)
        })
    }

    /// Resolves the key of one entry, applying the key attribute if set.
    fn extract_key(
        &self,
        path: &str,
        key: String,
        entry: Value,
        from_mapping: bool,
    ) -> Result<(String, Value)> {
        let Some(attribute) = &self.key_attribute else {
            return Ok((key, entry));
        };
        if !is_array_like(&entry) {
            return Ok((key, entry));
        }

        let mut fields = match entry {
            Value::Object(fields) if fields.contains_key(attribute) => fields,
            other if from_mapping => return Ok((key, other)),
            _ => {
                return Err(ConfigError::invalid(
                    path,
                    format!(
                        "The attribute \"{}\" must be set for path \"{}\".",
                        attribute, path
                    ),
                ));
            }
        };

        let raw_key = if self.remove_key_attribute {
            fields.shift_remove(attribute).unwrap_or(Value::Null)
        } else {
            fields.get(attribute).cloned().unwrap_or(Value::Null)
        };
        let key = key_from_value(&raw_key).ok_or_else(|| {
            ConfigError::invalid(
                path,
                format!(
                    "The attribute \"{}\" for path \"{}\" must be a scalar, but got {}.",
                    attribute, path, raw_key
                ),
            )
        })?;

        if fields.len() == 1 {
            if let Some(collapsed) = fields.remove(COLLAPSE_FIELD) {
                return Ok((key, collapsed));
            }
        }
        Ok((key, Value::Object(fields)))
    }

    pub(crate) fn merge_values(&self, path: &str, left: Value, right: Value) -> Result<Value> {
        if right == Value::Bool(false) {
            // finalization removes the key if nothing sets it again
            return Ok(right);
        }
        if left == Value::Bool(false) || !self.array.performs_deep_merging() {
            return Ok(right);
        }

        // Un-keyed collections append unless both sides carry their own keys.
        if self.key_attribute.is_none() && !(left.is_object() && right.is_object()) {
            let mut merged: Vec<Value> = into_entries(left).into_iter().map(|(_, v)| v).collect();
            merged.extend(into_entries(right).into_iter().map(|(_, v)| v));
            return Ok(Value::Array(merged));
        }

        let mut merged = into_mapping(left);
        for (key, value) in into_entries(right) {
            let Some(slot) = merged.get_mut(&key) else {
                if !self.array.allows_new_keys() {
                    return Err(ConfigError::invalid(
                        path,
                        format!(
                            "You are not allowed to define new elements for path \"{}\". Please \
                             define all elements for this path in one config file.",
                            path
                        ),
                    ));
                }
                merged.insert(key, value);
                continue;
            };

            let current = std::mem::take(slot);
            *slot = self
                .prototype
                .merge_at(&join_path(path, &key), current, value)?;
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

        let keyed = value.is_object();
        let mut mapping = Map::new();
        let mut sequence = Vec::new();
        for (key, entry) in into_entries(value) {
            let entry_path = join_path(path, &key);
            match self.prototype.finalize_at(&entry_path, entry) {
                Ok(finalized) if keyed => {
                    mapping.insert(key, finalized);
                }
                Ok(finalized) => sequence.push(finalized),
                Err(err) if err.is_unset_key() => {
                    trace!(path = %entry_path, "removed unset entry");
                }
                Err(err) => return Err(err),
            }
        }

        let finalized = if keyed {
            Value::Object(mapping)
        } else {
            Value::Array(sequence)
        };
        if entry_count(&finalized) < self.min_number_of_elements {
            return Err(ConfigError::invalid(
                path,
                format!(
                    "The path \"{}\" should have at least {} element(s) defined.",
                    path, self.min_number_of_elements
                ),
            ));
        }
        Ok(finalized)
    }
}
