//! Resource loading: turns resource identifiers into raw configuration
//! values.
//!
//! Loaders are chosen through a [`LoaderResolver`]; nested imports go through
//! an [`ImportContext`] that tracks the resources currently being loaded, so
//! circular imports are detected without any shared global state.

mod import;
mod memory;
mod resolver;


use serde_json::Value;
use thiserror::Error;

pub use import::ImportContext;
pub use memory::{FnLoader, MemoryLoader};
pub use resolver::{DelegatingLoader, LoaderResolver};

/// Errors raised while loading resources.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No loader supports the resource.
    #[error("Cannot load resource \"{resource}\".")]
    CannotLoad { resource: String },

    /// The resource is already being loaded further up the import chain.
    #[error(
        "Circular reference detected for resource \"{}\" (\"{}\" > \"{}\").",
        .resource,
        .chain.join("\" > \""),
        .resource
    )]
    CircularReference { resource: String, chain: Vec<String> },

    /// A nested import failed.
    #[error("Cannot import resource \"{resource}\" from \"{source_resource}\".")]
    CannotImport {
        resource: String,
        source_resource: String,
        #[source]
        source: Box<LoadError>,
    },

    /// The loader itself failed.
    #[error("Failed to load resource \"{resource}\": {source}")]
    Failed {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type alias for loader operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Produces the raw configuration value of a resource.
pub trait Loader {
    /// Whether this loader handles `resource`, optionally restricted to a
    /// resource `kind`.
    fn supports(&self, resource: &str, kind: Option<&str>) -> bool;

    /// Loads `resource`. Nested resources are loaded through
    /// [`ImportContext::import`].
    fn load(&self, resource: &str, kind: Option<&str>, imports: &mut ImportContext<'_>) -> LoadResult<Value>;
}

/// Loads a top-level resource through `loader`.
///
/// ```
/// use config_tree::loader::{MemoryLoader, load_resource};
/// use serde_json::json;
///
/// let mut loader = MemoryLoader::new();
/// loader.insert("app", json!({"debug": true}));
/// assert_eq!(load_resource(&loader, "app", None).unwrap(), json!({"debug": true}));
/// ```
///
/// # Errors
///
/// Returns `LoadError::CannotLoad` when `loader` does not support the
/// resource, and any error raised while loading it.
pub fn load_resource(loader: &dyn Loader, resource: &str, kind: Option<&str>) -> LoadResult<Value> {
    ImportContext::new(loader).load(resource, kind)
}
