use serde_json::Value;
use tracing::debug;

use super::{LoadError, LoadResult, Loader};

/// State of one top-level load: the loader used for nested imports and the
/// chain of resources currently in flight.
pub struct ImportContext<'a> {
    loader: &'a dyn Loader,
    loading: Vec<String>,
}

impl<'a> ImportContext<'a> {
    pub fn new(loader: &'a dyn Loader) -> Self {
        Self {
            loader,
            loading: Vec::new(),
        }
    }

    /// Resources being loaded, outermost first.
    pub fn loading(&self) -> &[String] {
        &self.loading
    }

    pub fn is_loading(&self, resource: &str) -> bool {
        self.loading.iter().any(|r| r == resource)
    }

    /// Loads `resource` with the context's loader.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::CircularReference` if `resource` is already in
    /// flight and `LoadError::CannotLoad` if the loader does not support it.
    pub fn load(&mut self, resource: &str, kind: Option<&str>) -> LoadResult<Value> {
        if self.is_loading(resource) {
            debug!(resource, chain = ?self.loading, "circular import detected");
            return Err(LoadError::CircularReference {
                resource: resource.to_string(),
                chain: self.loading.clone(),
            });
        }

        let loader = self.loader;
        if !loader.supports(resource, kind) {
            return Err(LoadError::CannotLoad {
                resource: resource.to_string(),
            });
        }

        self.loading.push(resource.to_string());
        let result = loader.load(resource, kind, self);
        self.loading.pop();
        result
    }

    /// Loads `resource` on behalf of `source_resource`.
    ///
    /// Failures of the loader itself are wrapped in
    /// `LoadError::CannotImport`; resolution and circular-reference errors
    /// pass through unchanged.
    pub fn import(&mut self, resource: &str, kind: Option<&str>, source_resource: &str) -> LoadResult<Value> {
        debug!(resource, source_resource, "importing resource");
        self.load(resource, kind).map_err(|err| match err {
            LoadError::Failed { .. } => LoadError::CannotImport {
                resource: resource.to_string(),
                source_resource: source_resource.to_string(),
                source: Box::new(err),
            },
            other => other,
        })
    }
}
