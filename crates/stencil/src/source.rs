//! Concrete template sources.
//!
//! [`ManualSource`] holds directly registered templates in memory and is
//! the usual vehicle for tests and inline overrides. [`DirSource`] reads
//! `<root>/<name>.md` files on demand, optionally caching content per name.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::engine::{engine_factory, TemplateType};
use crate::error::TemplateError;
use crate::provider::{TemplateFactory, TemplateSource};

/// Optional per-source content cache keyed by template name.
///
/// Only content is cached; factory lookups never are. The cache mutates
/// under a lock so a source can stay `Sync` while shared across renders.
struct ContentCache {
    enabled: bool,
    entries: Mutex<HashMap<String, String>>,
}

impl ContentCache {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_load(
        &self,
        name: &str,
        load: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        if !self.enabled {
            return load();
        }
        let mut entries = self.entries.lock().unwrap();
        if let Some(content) = entries.get(name) {
            return Some(content.clone());
        }
        let content = load()?;
        entries.insert(name.to_string(), content.clone());
        Some(content)
    }
}

/// In-memory source for directly registered templates.
///
/// Registering the same name twice within one source is a hard error;
/// overriding a name is done by layering another source on the provider,
/// not by silent overwrite here.
#[derive(Default)]
pub struct ManualSource {
    templates: HashMap<String, (String, TemplateFactory)>,
}

impl ManualSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` under `T::NAME`.
    pub fn add_template<T: TemplateType>(
        &mut self,
        content: impl Into<String>,
    ) -> Result<(), TemplateError> {
        self.add_named(T::NAME, content)
    }

    /// Registers `content` under an explicit name.
    pub fn add_named(
        &mut self,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), TemplateError> {
        if self.templates.contains_key(name) {
            return Err(TemplateError::Registration(name.to_string()));
        }
        self.templates
            .insert(name.to_string(), (content.into(), engine_factory(name)));
        Ok(())
    }

    /// Builder-style [`add_template`](Self::add_template).
    pub fn with_template<T: TemplateType>(
        mut self,
        content: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        self.add_template::<T>(content)?;
        Ok(self)
    }
}

impl TemplateSource for ManualSource {
    fn try_get_content(&self, name: &str) -> Option<String> {
        self.templates
            .get(name)
            .map(|(content, _)| content.clone())
    }

    fn try_get_factory(&self, name: &str) -> Option<TemplateFactory> {
        self.templates
            .get(name)
            .map(|(_, factory)| factory.clone())
    }
}

/// File-backed source reading `<root>/<name>.md`.
///
/// Content caching is on by default; with caching off, every lookup
/// re-reads the file, which is useful while iterating on template text.
/// Any name whose file exists gets the default engine factory, so
/// file-backed templates can be referenced by `include`/`if`/`foreach`
/// without code-side registration.
pub struct DirSource {
    root: PathBuf,
    cache: ContentCache,
}

impl DirSource {
    /// Creates a source over `root` with content caching enabled.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_caching(root, true)
    }

    /// Creates a source over `root` with an explicit caching policy.
    pub fn with_caching(root: impl Into<PathBuf>, cache_content: bool) -> Self {
        Self {
            root: root.into(),
            cache: ContentCache::new(cache_content),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.md", name))
    }
}

impl TemplateSource for DirSource {
    fn try_get_content(&self, name: &str) -> Option<String> {
        self.cache
            .get_or_load(name, || std::fs::read_to_string(self.path_for(name)).ok())
    }

    fn try_get_factory(&self, name: &str) -> Option<TemplateFactory> {
        self.path_for(name).is_file().then(|| engine_factory(name))
    }
}
