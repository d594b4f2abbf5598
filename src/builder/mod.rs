//! Fluent authoring DSL that compiles into a [`Node`](crate::node::Node)
//! tree.
//!
//! Definitions record settings and report mistakes when the tree is built,
//! so authoring code never has to handle errors mid-chain.

mod array;
mod definition;
mod expr;
mod node_builder;
mod rules;
mod scalar;
mod tree;

#[cfg(test)]
mod tests;

pub use array::{ArrayNodeDefinition, ENABLED_FLAG};
pub use definition::{Definition, DefinitionCore, NodeDefinition, NodeType};
pub use expr::{ExprBuilder, Expression};
pub use node_builder::{NodeBuilder, NodeFactory, NodeRegistry};
pub use rules::{MergeBuilder, NormalizationBuilder, ValidationBuilder};
pub use scalar::{
    BooleanNodeDefinition, EnumNodeDefinition, FloatNodeDefinition, IntegerNodeDefinition,
    ScalarNodeDefinition, VariableNodeDefinition,
};
pub use tree::TreeBuilder;
