//! Convenience builder for assembling a provider and rendering by type.
//!
//! [`TemplateBuilder`] collects inline template registrations into a
//! [`ManualSource`] plus any extra sources, then [`build`](TemplateBuilder::build)s
//! a [`Templates`] handle around the shared provider. The manual source is
//! registered first, so extra sources added to the builder shadow inline
//! registrations on name conflicts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::engine::{TemplateEngine, TemplateType};
use crate::error::TemplateError;
use crate::provider::{TemplateProvider, TemplateSource};
use crate::source::ManualSource;

/// Two-phase builder: register everything, then [`build`](Self::build).
#[derive(Default)]
pub struct TemplateBuilder {
    manual: ManualSource,
    extra_sources: Vec<Arc<dyn TemplateSource>>,
}

impl TemplateBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers inline `content` under `T::NAME`.
    pub fn add_manual_template<T: TemplateType>(
        mut self,
        content: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        self.manual.add_template::<T>(content)?;
        Ok(self)
    }

    /// Appends a source; it will shadow inline registrations on conflict.
    pub fn add_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.extra_sources.push(Arc::new(source));
        self
    }

    /// Finishes registration and produces the render handle.
    pub fn build(self) -> Templates {
        let mut provider = TemplateProvider::new();
        provider.add_source(Arc::new(self.manual));
        for source in self.extra_sources {
            provider.add_source(source);
        }
        Templates {
            provider: provider.into_shared(),
            engines: Mutex::new(HashMap::new()),
        }
    }
}

/// A shared provider plus a per-name cache of parsed engines.
///
/// Engines are parsed once on first use and reused across renders; the
/// parsed node sequence is immutable, so cached engines render safely with
/// different inputs.
pub struct Templates {
    provider: Arc<TemplateProvider>,
    engines: Mutex<HashMap<String, Arc<TemplateEngine>>>,
}

impl Templates {
    /// The shared provider, for constructing templates directly.
    pub fn provider(&self) -> Arc<TemplateProvider> {
        Arc::clone(&self.provider)
    }

    /// Renders `T` against `model`.
    pub fn render<T: TemplateType>(&self, model: &T::Model) -> Result<String, TemplateError> {
        let engine = self.engine_for(T::NAME)?;
        let input = serde_json::to_value(model)?;
        engine.render(&input)
    }

    fn engine_for(&self, name: &str) -> Result<Arc<TemplateEngine>, TemplateError> {
        let mut engines = self.engines.lock().unwrap();
        if let Some(engine) = engines.get(name) {
            return Ok(Arc::clone(engine));
        }
        let engine = Arc::new(TemplateEngine::new(name, Arc::clone(&self.provider))?);
        engines.insert(name.to_string(), Arc::clone(&engine));
        Ok(engine)
    }
}
