//! config-tree: declarative configuration trees.
//!
//! A schema is declared once with the [`builder`] DSL and compiled into a
//! [`Node`] tree. The [`Processor`] then drives raw configuration values
//! (plain [`serde_json::Value`]s from any number of sources) through three
//! passes: normalize each source, merge them in order, and finalize the
//! result against defaults, bounds and validation rules.
//!
//! ```
//! use config_tree::builder::{NodeDefinition, TreeBuilder};
//! use config_tree::Processor;
//! use serde_json::json;
//!
//! let mut builder = TreeBuilder::new("database");
//! builder.root_node().children(|c| {
//!     c.scalar_node("host").required();
//!     c.integer_node("port").max(65535).default_value(5432);
//! });
//! let tree = builder.build_tree().unwrap();
//!
//! let config = Processor::new()
//!     .process(&tree, [json!({"host": "localhost"}), json!({"port": 6543})])
//!     .unwrap();
//! assert_eq!(config, json!({"host": "localhost", "port": 6543}));
//! ```

pub mod builder;
pub mod error;
pub mod loader;
pub mod node;
pub mod processor;
pub mod value;

pub use builder::{NodeDefinition, TreeBuilder};
pub use error::{ConfigError, Result};
pub use node::Node;
pub use processor::{Configuration, Processor};
