//! Template sources and the layered provider.
//!
//! A [`TemplateSource`] answers two independent questions about a template
//! name: what is its raw content, and how is a render-capable instance
//! constructed for it. The [`TemplateProvider`] holds an ordered list of
//! sources and resolves names in reverse-registration order, so a source
//! added later (e.g. a test override) shadows earlier ones.
//!
//! The provider itself never caches; content caching, where wanted, lives
//! inside individual sources. Once all sources are registered the provider
//! is shared read-only (`Arc`) across every template built from it.

use std::sync::Arc;

use serde_json::Value;

use crate::error::TemplateError;

/// A render-capable template instance produced by a [`TemplateFactory`].
///
/// Implemented by [`TemplateEngine`](crate::TemplateEngine); custom sources
/// can supply their own implementations for templates that are not backed
/// by parsed directive text.
pub trait Renderable {
    /// Renders against an already-serialized input value.
    fn render_value(&self, input: &Value) -> Result<String, TemplateError>;
}

/// Constructs a boxed renderable bound to the shared provider.
///
/// This is the name-to-instance join point that makes arbitrarily deep
/// recursive composition possible: a directive resolves a name to a
/// factory, the factory receives the same shared provider, and the
/// constructed instance can in turn resolve further names through it.
pub type TemplateFactory =
    Arc<dyn Fn(Arc<TemplateProvider>) -> Result<Box<dyn Renderable>, TemplateError> + Send + Sync>;

/// Capability: given a template name, optionally return its raw content
/// and/or a factory for constructing it.
///
/// The two lookups are independent: a source may serve content for names it
/// has no factory for and vice versa. Sources must not be mutated while
/// shared across concurrent renders; the engine provides no locking for
/// source mutation.
pub trait TemplateSource: Send + Sync {
    /// The raw template text for `name`, if this source has it.
    fn try_get_content(&self, name: &str) -> Option<String>;

    /// A factory constructing `name`'s template instance, if this source
    /// recognizes the name. Factory lookups are never cached at this layer.
    fn try_get_factory(&self, name: &str) -> Option<TemplateFactory>;
}

/// An ordered collection of template sources with last-registered-wins
/// resolution.
#[derive(Default)]
pub struct TemplateProvider {
    sources: Vec<Arc<dyn TemplateSource>>,
}

impl TemplateProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source. Later sources shadow earlier ones on conflict.
    pub fn add_source(&mut self, source: Arc<dyn TemplateSource>) {
        self.sources.push(source);
    }

    /// Builder-style [`add_source`](Self::add_source).
    pub fn with_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.add_source(Arc::new(source));
        self
    }

    /// Finishes registration and makes the provider shareable.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Resolves `name` to content, most recently added source first.
    ///
    /// Absence is not an error here; the caller decides whether a missing
    /// template is fatal.
    pub fn get_content(&self, name: &str) -> Option<String> {
        self.sources
            .iter()
            .rev()
            .find_map(|source| source.try_get_content(name))
    }

    /// Resolves `name` to a factory, most recently added source first.
    pub fn get_factory(&self, name: &str) -> Option<TemplateFactory> {
        self.sources
            .iter()
            .rev()
            .find_map(|source| source.try_get_factory(name))
    }
}
