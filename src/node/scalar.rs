//! Scalar node variants.
//!
//! The shared state (default value, empty-value policy) lives in
//! [`VariableNode`]; numeric and enum nodes embed it and run its checks
//! before their own.

use serde_json::Value;

use super::DefaultValue;
use crate::error::{ConfigError, Result};
use crate::value::{is_empty_value, strict_equals};

/// State shared by every scalar-family node.
#[derive(Debug, Clone)]
pub struct VariableNode {
    pub(crate) default: Option<DefaultValue>,
    pub(crate) allow_empty_value: bool,
}

impl VariableNode {
    pub fn new() -> Self {
        Self {
            default: None,
            allow_empty_value: true,
        }
    }

    pub fn set_default_value(&mut self, default: DefaultValue) {
        self.default = Some(default);
    }

    pub fn has_default_value(&self) -> bool {
        self.default.is_some()
    }

    /// The default value, or null when none is set.
    pub fn default_value(&self) -> Value {
        self.default
            .as_ref()
            .map(DefaultValue::resolve)
            .unwrap_or(Value::Null)
    }

    pub fn set_allow_empty_value(&mut self, allow: bool) {
        self.allow_empty_value = allow;
    }

    pub fn allows_empty_value(&self) -> bool {
        self.allow_empty_value
    }

    pub(crate) fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        if !self.allow_empty_value && is_empty_value(&value) {
            return Err(ConfigError::invalid(
                path,
                format!(
                    "The path \"{}\" cannot contain an empty value, but got {}.",
                    path, value
                ),
            ));
        }
        Ok(value)
    }
}

impl Default for VariableNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer node with optional inclusive bounds.
#[derive(Debug, Clone)]
pub struct IntegerNode {
    pub(crate) variable: VariableNode,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerNode {
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` if `min > max`.
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ConfigError::definition(format!(
                    "You cannot define a max({}) as you already have a min({})",
                    max, min
                )));
            }
        }

        Ok(Self {
            variable: VariableNode::new(),
            min,
            max,
        })
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub(crate) fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        let value = self.variable.finalize_value(path, value)?;
        let Some(number) = integer_of(&value) else {
            return Ok(value);
        };

        if let Some(min) = self.min.filter(|&min| number < i128::from(min)) {
            return Err(too_small(path, &value, min));
        }
        if let Some(max) = self.max.filter(|&max| number > i128::from(max)) {
            return Err(too_big(path, &value, max));
        }
        Ok(value)
    }
}

/// Float node with optional inclusive bounds.
#[derive(Debug, Clone)]
pub struct FloatNode {
    pub(crate) variable: VariableNode,
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatNode {
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` if `min > max`.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ConfigError::definition(format!(
                    "You cannot define a max({}) as you already have a min({})",
                    max, min
                )));
            }
        }

        Ok(Self {
            variable: VariableNode::new(),
            min,
            max,
        })
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub(crate) fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        let value = self.variable.finalize_value(path, value)?;
        let Some(number) = value.as_f64() else {
            return Ok(value);
        };

        if let Some(min) = self.min.filter(|&min| number < min) {
            return Err(too_small(path, &value, min));
        }
        if let Some(max) = self.max.filter(|&max| number > max) {
            return Err(too_big(path, &value, max));
        }
        Ok(value)
    }
}

/// Scalar node restricted to a fixed set of values.
#[derive(Debug, Clone)]
pub struct EnumNode {
    pub(crate) variable: VariableNode,
    values: Vec<Value>,
}

impl EnumNode {
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` unless `values` holds at least two
    /// distinct values.
    pub fn new(values: Vec<Value>) -> Result<Self> {
        let mut distinct: Vec<&Value> = Vec::new();
        for value in &values {
            if !distinct.iter().any(|seen| strict_equals(seen, value)) {
                distinct.push(value);
            }
        }
        if distinct.len() < 2 {
            return Err(ConfigError::definition(
                "values() must be called with at least two distinct values.",
            ));
        }

        Ok(Self {
            variable: VariableNode::new(),
            values,
        })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn finalize_value(&self, path: &str, value: Value) -> Result<Value> {
        let value = self.variable.finalize_value(path, value)?;
        if !self.values.iter().any(|allowed| strict_equals(allowed, &value)) {
            return Err(ConfigError::invalid(
                path,
                format!(
                    "The value {} is not allowed for path \"{}\". Permissible values: {}",
                    value,
                    path,
                    Value::Array(self.values.clone())
                ),
            ));
        }
        Ok(value)
    }
}

fn integer_of(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
        .or_else(|| value.as_f64().map(|f| f as i128))
}

fn too_small(path: &str, value: &Value, min: impl std::fmt::Display) -> ConfigError {
    ConfigError::invalid(
        path,
        format!(
            "The value {} is too small for path \"{}\". Should be greater than: {}",
            value, path, min
        ),
    )
}

fn too_big(path: &str, value: &Value, max: impl std::fmt::Display) -> ConfigError {
    ConfigError::invalid(
        path,
        format!(
            "The value {} is too big for path \"{}\". Should be less than: {}",
            value, path, max
        ),
    )
}
