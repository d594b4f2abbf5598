//! Drives raw configuration values through a node tree: normalize each
//! source, merge them in order, finalize the result.


use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::builder::{NodeDefinition, TreeBuilder};
use crate::error::{ConfigError, Result};
use crate::loader::{LoadResult, Loader, load_resource};
use crate::node::Node;

/// A configuration schema.
///
/// Implementors describe their tree once; [`Processor::process_configuration`]
/// builds and applies it.
pub trait Configuration {
    type Root: NodeDefinition;

    fn config_tree_builder(&self) -> TreeBuilder<Self::Root>;
}

/// Applies a node tree to a list of raw configurations.
///
/// A processor holds no state, so one instance (and one tree) can serve any
/// number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Processor;

impl Processor {
    pub fn new() -> Self {
        Self
    }

    /// Normalizes every configuration, merges them in order (later ones
    /// win) and finalizes the merged value.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` raised by any of the three passes.
    pub fn process<I>(&self, tree: &Node, configs: I) -> Result<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        let run = || -> Result<Value> {
            let mut current: Option<Value> = None;
            let mut sources = 0usize;
            for config in configs {
                let normalized = tree.normalize(config)?;
                current = Some(match current {
                    Some(merged) => tree.merge(merged, normalized)?,
                    None => normalized,
                });
                sources += 1;
            }

            debug!(root = tree.name(), sources, "merged configuration sources");
            let merged = current.unwrap_or_else(|| Value::Object(Map::new()));
            let finalized = tree.finalize(merged)?;
            debug!(root = tree.name(), "finalized configuration");
            Ok(finalized)
        };

        run().map_err(|err| root_error(tree, err))
    }

    /// Builds the schema's tree and processes `configs` with it.
    pub fn process_configuration<C, I>(&self, configuration: &C, configs: I) -> Result<Value>
    where
        C: Configuration,
        I: IntoIterator<Item = Value>,
    {
        let tree = configuration.config_tree_builder().build_tree()?;
        self.process(&tree, configs)
    }

    /// Processes `configs` and decodes the result into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Decode` with the path of the offending field
    /// when the finalized value does not fit `T`.
    pub fn process_as<T, I>(&self, tree: &Node, configs: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = Value>,
    {
        let value = self.process(tree, configs)?;
        serde_path_to_error::deserialize(value).map_err(|err| ConfigError::Decode {
            path: err.path().to_string(),
            source: err.into_inner(),
        })
    }

    /// Loads each resource through `loader` and processes the results in
    /// order.
    pub fn process_resources<I>(&self, tree: &Node, loader: &dyn Loader, resources: I) -> Result<Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let configs = resources
            .into_iter()
            .map(|resource| load_resource(loader, resource.as_ref(), None))
            .collect::<LoadResult<Vec<_>>>()?;
        debug!(root = tree.name(), sources = configs.len(), "loaded configuration resources");
        self.process(tree, configs)
    }
}

/// Turns an unset signal that reached the root into a validation error; the
/// root has no parent to remove it from.
fn root_error(tree: &Node, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::UnsetKey { .. } => ConfigError::invalid(
            tree.name(),
            format!("The root path \"{}\" cannot be unset.", tree.name()),
        ),
        other => other,
    }
}
