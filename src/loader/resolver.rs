use serde_json::Value;
use tracing::debug;

use super::{ImportContext, LoadError, LoadResult, Loader};

/// Ordered list of loaders; the first one supporting a resource wins.
#[derive(Default)]
pub struct LoaderResolver {
    loaders: Vec<Box<dyn Loader>>,
}

impl LoaderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loader(&mut self, loader: impl Loader + 'static) -> &mut Self {
        self.loaders.push(Box::new(loader));
        self
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Returns the first loader supporting the resource.
    pub fn resolve(&self, resource: &str, kind: Option<&str>) -> Option<&dyn Loader> {
        let found = self
            .loaders
            .iter()
            .position(|loader| loader.supports(resource, kind));
        debug!(resource, kind, loader = ?found, "resolved loader");
        found.map(|index| self.loaders[index].as_ref())
    }
}

/// Loader that delegates to whichever loader of its resolver supports the
/// resource.
pub struct DelegatingLoader {
    resolver: LoaderResolver,
}

impl DelegatingLoader {
    pub fn new(resolver: LoaderResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &LoaderResolver {
        &self.resolver
    }
}

impl Loader for DelegatingLoader {
    fn supports(&self, resource: &str, kind: Option<&str>) -> bool {
        self.resolver.resolve(resource, kind).is_some()
    }

    fn load(&self, resource: &str, kind: Option<&str>, imports: &mut ImportContext<'_>) -> LoadResult<Value> {
        let loader = self
            .resolver
            .resolve(resource, kind)
            .ok_or_else(|| LoadError::CannotLoad {
                resource: resource.to_string(),
            })?;
        loader.load(resource, kind, imports)
    }
}
