//! Conditional transforms: an `if` predicate paired with a `then` action.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::node::{Predicate, Transform, predicate, transform};
use crate::value::strict_equals;

/// Builds one conditional transform `v -> if(v) ? then(v) : v`.
///
/// ```
/// use config_tree::builder::ExprBuilder;
/// use serde_json::json;
///
/// let mut expr = ExprBuilder::new();
/// expr.if_string().then(|v| Ok(json!([v])));
/// let compiled = expr.build().unwrap();
/// assert_eq!(compiled(json!("a")).unwrap(), json!(["a"]));
/// assert_eq!(compiled(json!(1)).unwrap(), json!(1));
/// ```
#[derive(Clone, Default)]
pub struct ExprBuilder {
    if_part: Option<Predicate>,
    then_part: Option<Transform>,
}

impl fmt::Debug for ExprBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprBuilder")
            .field("if_part", &self.if_part.is_some())
            .field("then_part", &self.then_part.is_some())
            .finish()
    }
}

impl ExprBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the action to every value.
    pub fn always(&mut self) -> &mut Self {
        self.if_predicate(|_| true)
    }

    /// Matches the boolean `true`.
    pub fn if_true(&mut self) -> &mut Self {
        self.if_predicate(|v| *v == Value::Bool(true))
    }

    /// Matches values accepted by a custom predicate.
    pub fn if_predicate(&mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> &mut Self {
        self.if_part = Some(predicate(f));
        self
    }

    pub fn if_string(&mut self) -> &mut Self {
        self.if_predicate(Value::is_string)
    }

    pub fn if_null(&mut self) -> &mut Self {
        self.if_predicate(Value::is_null)
    }

    /// Matches mappings and sequences.
    pub fn if_array(&mut self) -> &mut Self {
        self.if_predicate(|v| v.is_array() || v.is_object())
    }

    /// Matches mappings only.
    pub fn if_object(&mut self) -> &mut Self {
        self.if_predicate(Value::is_object)
    }

    /// Matches values strictly equal to one of `values`.
    pub fn if_in_array<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.if_predicate(move |v| values.iter().any(|allowed| strict_equals(allowed, v)))
    }

    /// Matches values strictly equal to none of `values`.
    pub fn if_not_in_array<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.if_predicate(move |v| !values.iter().any(|allowed| strict_equals(allowed, v)))
    }

    pub fn then(
        &mut self,
        f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.then_part = Some(transform(f));
        self
    }

    pub fn then_empty_array(&mut self) -> &mut Self {
        self.then(|_| Ok(Value::Array(Vec::new())))
    }

    pub fn then_empty_object(&mut self) -> &mut Self {
        self.then(|_| Ok(Value::Object(Map::new())))
    }

    /// Rejects the value. `{}` in `message` is replaced by the value as JSON.
    pub fn then_invalid(&mut self, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        self.then(move |v| Err(anyhow::anyhow!(message.replace("{}", &v.to_string()))))
    }

    /// Removes the key holding the value from its parent.
    pub fn then_unset(&mut self) -> &mut Self {
        self.then(|_| Err(ConfigError::unset_key("", "Unsetting key").into()))
    }

    /// Compiles the expression.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Definition` when the `if` or `then` part is
    /// missing.
    pub fn build(&self) -> Result<Transform> {
        let if_part = self
            .if_part
            .clone()
            .ok_or_else(|| ConfigError::definition("You must specify an if part."))?;
        let then_part = self
            .then_part
            .clone()
            .ok_or_else(|| ConfigError::definition("You must specify a then part."))?;

        Ok(transform(move |v| {
            if if_part(&v) { then_part(v) } else { Ok(v) }
        }))
    }

    /// Compiles a list of expressions. Plain closures pass through unchanged.
    pub fn build_expressions(expressions: &[Expression]) -> Result<Vec<Transform>> {
        expressions
            .iter()
            .map(|expression| match expression {
                Expression::Builder(builder) => builder.build(),
                Expression::Closure(closure) => Ok(closure.clone()),
            })
            .collect()
    }
}

/// One entry of a normalization or validation rule list.
#[derive(Clone)]
pub enum Expression {
    Builder(ExprBuilder),
    Closure(Transform),
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Builder(builder) => f.debug_tuple("Builder").field(builder).finish(),
            Expression::Closure(_) => f.write_str("Closure(..)"),
        }
    }
}
