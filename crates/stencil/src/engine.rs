//! The per-template rendering engine.
//!
//! A [`TemplateEngine`] is bound to one template name and one shared
//! provider. Construction is eager: content is fetched from the provider
//! and parsed immediately, and the node sequence is immutable for the
//! instance's lifetime. Rendering walks the nodes against a
//! [`serde_json::Value`] input, performing no mutation of shared state, so
//! one engine can render concurrently with different inputs.
//!
//! Sub-templates referenced by `if`/`include`/`foreach` directives are
//! resolved through the provider and constructed fresh for each evaluation
//! (and each loop iteration) with the same shared provider, which is what
//! allows deep recursive composition. Nesting is bounded by a render-depth
//! limit so a cyclic include fails with
//! [`TemplateError::RecursionLimit`] instead of overflowing the stack.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::TemplateError;
use crate::node::TemplateNode;
use crate::parse::ParsedTemplate;
use crate::provider::{Renderable, TemplateFactory, TemplateProvider};
use crate::resolve::{format_value, resolve_path, type_name};

/// Maximum sub-template nesting before a render fails with
/// [`TemplateError::RecursionLimit`].
const MAX_RENDER_DEPTH: usize = 64;

thread_local! {
    // Renders are synchronous, so the nesting depth of the current render
    // call is a per-thread counter; concurrent renders on other threads
    // each track their own.
    static RENDER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Associates a template name with its input model type.
///
/// The name doubles as the provider lookup key, so it is what `include`,
/// `if` and `foreach` directives refer to.
pub trait TemplateType {
    /// The name this template is registered and resolved under.
    const NAME: &'static str;

    /// The input model rendered against this template.
    type Model: Serialize;
}

/// A parsed template bound to a shared provider.
pub struct TemplateEngine {
    name: String,
    provider: Arc<TemplateProvider>,
    parsed: ParsedTemplate,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("name", &self.name)
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Fetches `name`'s content from the provider and parses it eagerly.
    ///
    /// Fails with [`TemplateError::ContentNotFound`] when no source has the
    /// name, or with a syntax error from parsing; both are permanent for
    /// this instance.
    pub fn new(name: &str, provider: Arc<TemplateProvider>) -> Result<Self, TemplateError> {
        let content = provider
            .get_content(name)
            .ok_or_else(|| TemplateError::ContentNotFound(name.to_string()))?;
        let parsed = ParsedTemplate::parse(&content)?;
        Ok(Self {
            name: name.to_string(),
            provider,
            parsed,
        })
    }

    /// The name this engine was constructed for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parse result, including any front matter.
    pub fn parsed(&self) -> &ParsedTemplate {
        &self.parsed
    }

    /// Renders the node sequence against an already-serialized input.
    pub fn render(&self, input: &Value) -> Result<String, TemplateError> {
        let mut output = String::new();
        for node in self.parsed.nodes() {
            match node {
                TemplateNode::Text { content } => output.push_str(content),
                TemplateNode::Variable { path } => match resolve_path(input, path)? {
                    Some(value) => output.push_str(&format_value(value)),
                    // Unresolved, not an error: emit the directive verbatim.
                    None => {
                        output.push_str("{{");
                        output.push_str(path);
                        output.push_str("}}");
                    }
                },
                TemplateNode::If {
                    condition_path,
                    template,
                    input_path,
                } => {
                    self.render_if(
                        condition_path,
                        template,
                        input_path.as_deref(),
                        input,
                        &mut output,
                    )?;
                }
                TemplateNode::Include {
                    template,
                    input_path,
                } => {
                    self.render_include(template, input_path.as_deref(), input, &mut output)?;
                }
                TemplateNode::Loop {
                    collection_path,
                    template,
                } => {
                    self.render_loop(collection_path, template, input, &mut output)?;
                }
            }
        }
        Ok(output)
    }

    fn render_if(
        &self,
        condition_path: &str,
        template: &str,
        input_path: Option<&str>,
        input: &Value,
        output: &mut String,
    ) -> Result<(), TemplateError> {
        // Anything other than boolean true (null and non-booleans included)
        // renders nothing; only a failed traversal is an error.
        let condition = resolve_path(input, condition_path)?;
        if !matches!(condition, Some(Value::Bool(true))) {
            return Ok(());
        }
        // Unlike include, an absent input path means "no input".
        let sub_input = match input_path {
            Some(path) => resolve_path(input, path)?.cloned().unwrap_or(Value::Null),
            None => Value::Null,
        };
        let rendered = self.render_sub(template, &sub_input)?;
        output.push_str(&rendered);
        Ok(())
    }

    fn render_include(
        &self,
        template: &str,
        input_path: Option<&str>,
        input: &Value,
        output: &mut String,
    ) -> Result<(), TemplateError> {
        let sub_input = match input_path {
            Some(path) => resolve_path(input, path)?.cloned().unwrap_or(Value::Null),
            None => input.clone(),
        };
        let rendered = self.render_sub(template, &sub_input)?;
        output.push_str(&rendered);
        Ok(())
    }

    fn render_loop(
        &self,
        collection_path: &str,
        template: &str,
        input: &Value,
        output: &mut String,
    ) -> Result<(), TemplateError> {
        match resolve_path(input, collection_path)? {
            Some(Value::Array(items)) => {
                for item in items {
                    let rendered = self.render_sub(template, item)?;
                    output.push_str(&rendered);
                }
            }
            // Associative collections iterate as Key/Value pairs so map
            // entries can be addressed without a dedicated model type.
            Some(Value::Object(entries)) => {
                for (key, value) in entries {
                    let pair = json!({ "Key": key, "Value": value });
                    let rendered = self.render_sub(template, &pair)?;
                    output.push_str(&rendered);
                }
            }
            other => {
                return Err(TemplateError::TypeMismatch(format!(
                    "variable '{}' is not a collection (resolved to {})",
                    collection_path,
                    other.map_or("null", type_name),
                )));
            }
        }
        Ok(())
    }

    /// Resolves `name` to a factory, constructs a fresh instance with the
    /// shared provider, and renders it. Nesting deeper than
    /// [`MAX_RENDER_DEPTH`] fails instead of recursing further.
    fn render_sub(&self, name: &str, input: &Value) -> Result<String, TemplateError> {
        let depth = RENDER_DEPTH.with(|d| d.get());
        if depth >= MAX_RENDER_DEPTH {
            return Err(TemplateError::RecursionLimit {
                template: name.to_string(),
                depth,
            });
        }
        let factory = self
            .provider
            .get_factory(name)
            .ok_or_else(|| TemplateError::SubTemplateNotFound(name.to_string()))?;
        let instance =
            factory(Arc::clone(&self.provider)).map_err(|err| TemplateError::Instantiation {
                template: name.to_string(),
                source: Box::new(err),
            })?;
        RENDER_DEPTH.with(|d| d.set(depth + 1));
        let result = instance
            .render_value(input)
            .map_err(|err| TemplateError::SubRender {
                template: name.to_string(),
                source: Box::new(err),
            });
        RENDER_DEPTH.with(|d| d.set(depth));
        result
    }
}

impl Renderable for TemplateEngine {
    fn render_value(&self, input: &Value) -> Result<String, TemplateError> {
        self.render(input)
    }
}

/// The default factory: constructs a plain [`TemplateEngine`] for `name`.
pub(crate) fn engine_factory(name: &str) -> TemplateFactory {
    let name = name.to_string();
    Arc::new(move |provider| {
        TemplateEngine::new(&name, provider).map(|engine| Box::new(engine) as Box<dyn Renderable>)
    })
}

/// A typed wrapper binding a [`TemplateEngine`] to a [`TemplateType`].
///
/// The model is serialized at the render boundary; path segments in the
/// template match the serialized field names, so models conventionally
/// carry `#[serde(rename_all = "PascalCase")]`.
pub struct Template<T: TemplateType> {
    engine: TemplateEngine,
    _type: PhantomData<T>,
}

impl<T: TemplateType> Template<T> {
    /// Constructs the template for `T::NAME` against the shared provider.
    pub fn new(provider: Arc<TemplateProvider>) -> Result<Self, TemplateError> {
        Ok(Self {
            engine: TemplateEngine::new(T::NAME, provider)?,
            _type: PhantomData,
        })
    }

    /// Serializes the model and renders.
    pub fn render(&self, model: &T::Model) -> Result<String, TemplateError> {
        let input = serde_json::to_value(model)?;
        self.engine.render(&input)
    }

    /// Deserializes the template's front matter, if present.
    pub fn front_matter<D: DeserializeOwned>(&self) -> Result<Option<D>, TemplateError> {
        self.engine.parsed().front_matter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ManualSource;

    fn provider_with(templates: &[(&str, &str)]) -> Arc<TemplateProvider> {
        let mut source = ManualSource::new();
        for (name, content) in templates {
            source.add_named(name, *content).unwrap();
        }
        TemplateProvider::new().with_source(source).into_shared()
    }

    #[test]
    fn test_render_literal() {
        let provider = provider_with(&[("Plain", "no directives here")]);
        let engine = TemplateEngine::new("Plain", provider).unwrap();
        assert_eq!(engine.render(&json!({})).unwrap(), "no directives here");
    }

    #[test]
    fn test_render_variable() {
        let provider = provider_with(&[("Greeting", "Hello, {{Message}}!")]);
        let engine = TemplateEngine::new("Greeting", provider).unwrap();
        let output = engine.render(&json!({"Message": "World"})).unwrap();
        assert_eq!(output, "Hello, World!");
    }

    #[test]
    fn test_unresolved_variable_renders_directive_text() {
        let provider = provider_with(&[("Greeting", "{{A.B.C}}")]);
        let engine = TemplateEngine::new("Greeting", provider).unwrap();
        let output = engine.render(&json!({"A": {"B": null}})).unwrap();
        assert_eq!(output, "{{A.B.C}}");
    }

    #[test]
    fn test_missing_member_is_fatal() {
        let provider = provider_with(&[("Greeting", "{{A.B}}")]);
        let engine = TemplateEngine::new("Greeting", provider).unwrap();
        let err = engine.render(&json!({"A": {"X": 1}})).unwrap_err();
        assert!(matches!(err, TemplateError::PropertyResolution { .. }));
    }

    #[test]
    fn test_content_not_found() {
        let provider = TemplateProvider::new().into_shared();
        let err = TemplateEngine::new("Missing", provider).unwrap_err();
        assert!(matches!(err, TemplateError::ContentNotFound(_)));
    }

    #[test]
    fn test_if_true_renders_sub() {
        let provider = provider_with(&[
            ("Outer", "{{if:Show:Inner:Detail}}"),
            ("Inner", "{{Name}}"),
        ]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine
            .render(&json!({"Show": true, "Detail": {"Name": "Y"}}))
            .unwrap();
        assert_eq!(output, "Y");
    }

    #[test]
    fn test_if_false_renders_nothing() {
        let provider = provider_with(&[("Outer", "{{if:Show:Inner}}"), ("Inner", "body")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine.render(&json!({"Show": false})).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_if_non_boolean_renders_nothing() {
        let provider = provider_with(&[("Outer", "{{if:Show:Inner}}"), ("Inner", "body")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        assert_eq!(engine.render(&json!({"Show": "yes"})).unwrap(), "");
        assert_eq!(engine.render(&json!({"Show": null})).unwrap(), "");
    }

    #[test]
    fn test_if_without_input_passes_no_input() {
        let provider = provider_with(&[("Outer", "{{if:Show:Inner}}"), ("Inner", "static")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine.render(&json!({"Show": true})).unwrap();
        assert_eq!(output, "static");
    }

    #[test]
    fn test_include_passes_current_input() {
        let provider = provider_with(&[("Outer", "{{include:Inner}}"), ("Inner", "{{Message}}")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine.render(&json!({"Message": "hi"})).unwrap();
        assert_eq!(output, "hi");
    }

    #[test]
    fn test_include_with_input_path() {
        let provider = provider_with(&[
            ("Outer", "{{include:Inner:Sub}}"),
            ("Inner", "{{Content}}"),
        ]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine.render(&json!({"Sub": {"Content": "x"}})).unwrap();
        assert_eq!(output, "x");
    }

    #[test]
    fn test_include_this_equals_bare_include() {
        let provider = provider_with(&[
            ("Bare", "{{include:Inner}}"),
            ("This", "{{include:Inner:this}}"),
            ("Inner", "{{Message}}"),
        ]);
        let input = json!({"Message": "same"});
        let bare = TemplateEngine::new("Bare", Arc::clone(&provider)).unwrap();
        let this = TemplateEngine::new("This", provider).unwrap();
        assert_eq!(bare.render(&input).unwrap(), this.render(&input).unwrap());
    }

    #[test]
    fn test_include_bad_input_path_is_fatal() {
        let provider = provider_with(&[("Outer", "{{include:Inner:BadPath}}"), ("Inner", "")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({"Message": "hi"})).unwrap_err();
        assert!(matches!(err, TemplateError::PropertyResolution { .. }));
    }

    #[test]
    fn test_include_unknown_sub_template() {
        let provider = provider_with(&[("Outer", "{{include:Nowhere}}")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::SubTemplateNotFound(_)));
    }

    #[test]
    fn test_loop_over_array() {
        let provider = provider_with(&[("Outer", "{{foreach:Items:Row}}"), ("Row", "[{{Name}}]")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine
            .render(&json!({"Items": [
                {"Name": "a"}, {"Name": "b"}, {"Name": "c"}
            ]}))
            .unwrap();
        assert_eq!(output, "[a][b][c]");
    }

    #[test]
    fn test_loop_over_map_exposes_key_value() {
        let provider = provider_with(&[
            ("Outer", "{{foreach:Settings:Entry}}"),
            ("Entry", "{{Key}}={{Value}};"),
        ]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let output = engine
            .render(&json!({"Settings": {"a": 1, "b": 2}}))
            .unwrap();
        assert_eq!(output, "a=1;b=2;");
    }

    #[test]
    fn test_loop_non_collection_is_fatal() {
        let provider = provider_with(&[("Outer", "{{foreach:Items:Row}}"), ("Row", "")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({"Items": 3})).unwrap_err();
        assert!(matches!(err, TemplateError::TypeMismatch(_)));
    }

    #[test]
    fn test_loop_null_collection_is_fatal() {
        let provider = provider_with(&[("Outer", "{{foreach:Items:Row}}"), ("Row", "")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({"Items": null})).unwrap_err();
        assert!(matches!(err, TemplateError::TypeMismatch(_)));
    }

    #[test]
    fn test_nested_includes_recurse() {
        let provider = provider_with(&[
            ("A", "a({{include:B}})"),
            ("B", "b({{include:C}})"),
            ("C", "{{Message}}"),
        ]);
        let engine = TemplateEngine::new("A", provider).unwrap();
        let output = engine.render(&json!({"Message": "deep"})).unwrap();
        assert_eq!(output, "a(b(deep))");
    }

    #[test]
    fn test_unparseable_sub_template_is_instantiation_error() {
        let provider = provider_with(&[("Outer", "{{include:Bad}}"), ("Bad", "{{include:}}")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({})).unwrap_err();
        match err {
            TemplateError::Instantiation { template, source } => {
                assert_eq!(template, "Bad");
                assert!(matches!(*source, TemplateError::Syntax(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cyclic_include_hits_recursion_limit() {
        let provider = provider_with(&[("Cycle", "loop: {{include:Cycle}}")]);
        let engine = TemplateEngine::new("Cycle", provider).unwrap();
        let err = engine.render(&json!({})).unwrap_err();

        // The limit violation is the innermost cause, wrapped in one
        // SubRender frame per nesting level.
        let mut cause: &(dyn std::error::Error + 'static) = &err;
        while let Some(next) = cause.source() {
            cause = next;
        }
        let leaf = cause.downcast_ref::<TemplateError>().unwrap();
        assert!(matches!(
            leaf,
            TemplateError::RecursionLimit { template, .. } if template == "Cycle"
        ));
    }

    #[test]
    fn test_sub_render_failure_wraps() {
        let provider = provider_with(&[("Outer", "{{include:Inner}}"), ("Inner", "{{Missing}}")]);
        let engine = TemplateEngine::new("Outer", provider).unwrap();
        let err = engine.render(&json!({"Present": 1})).unwrap_err();
        match err {
            TemplateError::SubRender { template, source } => {
                assert_eq!(template, "Inner");
                assert!(matches!(
                    *source,
                    TemplateError::PropertyResolution { .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_typed_template() {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct GreetingModel {
            message: String,
        }

        struct Greeting;
        impl TemplateType for Greeting {
            const NAME: &'static str = "Greeting";
            type Model = GreetingModel;
        }

        let provider = provider_with(&[("Greeting", "{{Message}}")]);
        let template = Template::<Greeting>::new(provider).unwrap();
        let output = template
            .render(&GreetingModel {
                message: "typed".to_string(),
            })
            .unwrap();
        assert_eq!(output, "typed");
    }
}
