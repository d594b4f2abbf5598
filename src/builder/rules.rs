//! Rule accumulators attached to a definition: merge policy, normalization
//! closures and final validation rules.

use serde_json::Value;

use super::expr::{ExprBuilder, Expression};
use crate::error::Result;
use crate::node::{Transform, transform};

/// Merge policy of a node.
#[derive(Debug, Clone)]
pub struct MergeBuilder {
    allow_false: bool,
    allow_overwrite: bool,
}

impl MergeBuilder {
    pub fn new() -> Self {
        Self {
            allow_false: false,
            allow_overwrite: true,
        }
    }

    /// Lets a later configuration remove the node by setting it to `false`.
    pub fn allow_unset(&mut self, allow: bool) -> &mut Self {
        self.allow_false = allow;
        self
    }

    /// Forbids later configurations from overwriting the node.
    pub fn deny_overwrite(&mut self, deny: bool) -> &mut Self {
        self.allow_overwrite = !deny;
        self
    }

    pub fn allows_false(&self) -> bool {
        self.allow_false
    }

    pub fn allows_overwrite(&self) -> bool {
        self.allow_overwrite
    }
}

impl Default for MergeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Closures run on raw values before type validation.
#[derive(Debug, Clone, Default)]
pub struct NormalizationBuilder {
    before: Vec<Expression>,
}

impl NormalizationBuilder {
    /// Adds a conditional transform configured by `f`.
    pub fn before(&mut self, f: impl FnOnce(&mut ExprBuilder)) -> &mut Self {
        let mut expr = ExprBuilder::new();
        f(&mut expr);
        self.before.push(Expression::Builder(expr));
        self
    }

    /// Adds an unconditional transform.
    pub fn before_fn(
        &mut self,
        f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.before.push(Expression::Closure(transform(f)));
        self
    }

    pub(crate) fn closures(&self) -> Result<Vec<Transform>> {
        ExprBuilder::build_expressions(&self.before)
    }
}

/// Rules run on the finalized value.
#[derive(Debug, Clone, Default)]
pub struct ValidationBuilder {
    rules: Vec<Expression>,
}

impl ValidationBuilder {
    /// Adds a conditional rule configured by `f`.
    pub fn rule(&mut self, f: impl FnOnce(&mut ExprBuilder)) -> &mut Self {
        let mut expr = ExprBuilder::new();
        f(&mut expr);
        self.rules.push(Expression::Builder(expr));
        self
    }

    /// Adds an unconditional rule.
    pub fn rule_fn(
        &mut self,
        f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.rules.push(Expression::Closure(transform(f)));
        self
    }

    pub(crate) fn closures(&self) -> Result<Vec<Transform>> {
        ExprBuilder::build_expressions(&self.rules)
    }
}
