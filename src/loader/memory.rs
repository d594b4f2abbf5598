use indexmap::IndexMap;
use serde_json::Value;

use super::{ImportContext, LoadError, LoadResult, Loader};

/// Serves raw configuration values registered under identifiers.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: IndexMap<String, Value>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: impl Into<String>, value: Value) -> &mut Self {
        self.sources.insert(resource.into(), value);
        self
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

impl Loader for MemoryLoader {
    fn supports(&self, resource: &str, _kind: Option<&str>) -> bool {
        self.sources.contains_key(resource)
    }

    fn load(&self, resource: &str, _kind: Option<&str>, _imports: &mut ImportContext<'_>) -> LoadResult<Value> {
        self.sources
            .get(resource)
            .cloned()
            .ok_or_else(|| LoadError::CannotLoad {
                resource: resource.to_string(),
            })
    }
}

type SupportsFn = Box<dyn Fn(&str, Option<&str>) -> bool + Send + Sync>;
type LoadFn = Box<dyn Fn(&str, &mut ImportContext<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// Loader backed by closures.
///
/// A load closure may import other resources through the context; load
/// errors it propagates keep their kind, anything else becomes
/// `LoadError::Failed`.
pub struct FnLoader {
    supports: SupportsFn,
    load: LoadFn,
}

impl FnLoader {
    pub fn new(
        supports: impl Fn(&str, Option<&str>) -> bool + Send + Sync + 'static,
        load: impl Fn(&str, &mut ImportContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            supports: Box::new(supports),
            load: Box::new(load),
        }
    }
}

impl Loader for FnLoader {
    fn supports(&self, resource: &str, kind: Option<&str>) -> bool {
        (self.supports)(resource, kind)
    }

    fn load(&self, resource: &str, _kind: Option<&str>, imports: &mut ImportContext<'_>) -> LoadResult<Value> {
        (self.load)(resource, imports).map_err(|err| match err.downcast::<LoadError>() {
            Ok(load_error) => load_error,
            Err(source) => LoadError::Failed {
                resource: resource.to_string(),
                source,
            },
        })
    }
}
