//! # Stencil - Minimal Text Templating
//!
//! `stencil` compiles a document of literal text and `{{...}}` directives
//! into a sequence of nodes, then renders those nodes against a typed input
//! model. It supports variable interpolation, conditional inclusion, named
//! sub-template inclusion, and list iteration, with sub-templates resolved
//! by name from a layered set of template sources.
//!
//! ## Directive Syntax
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `{{Path.To.Field}}` | Interpolate a dotted property path |
//! | `{{if:Cond:Sub}}` / `{{if:Cond:Sub:Input}}` | Render `Sub` when `Cond` is `true` |
//! | `{{include:Sub}}` / `{{include:Sub:Input}}` | Always render `Sub` |
//! | `{{foreach:Items:Sub}}` | Render `Sub` once per element of `Items` |
//!
//! Keywords are case-insensitive and colon-delimited segments are trimmed.
//! `{{include:Sub:this}}` is the explicit spelling of `{{include:Sub}}`:
//! both pass the current input through unchanged. A variable path that
//! resolves through a null value renders as the literal directive text; a
//! lookup on a present value that lacks the member is an error.
//!
//! Documents may carry a `---`-fenced front-matter block (captured raw,
//! deserializable as YAML) and may be split into sections by `---` lines;
//! sections parse independently and concatenate flat.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use stencil::{TemplateBuilder, TemplateType};
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct GreetingModel {
//!     message: String,
//! }
//!
//! struct Greeting;
//! impl TemplateType for Greeting {
//!     const NAME: &'static str = "Greeting";
//!     type Model = GreetingModel;
//! }
//!
//! let templates = TemplateBuilder::new()
//!     .add_manual_template::<Greeting>("Hello, {{Message}}!")
//!     .unwrap()
//!     .build();
//!
//! let output = templates
//!     .render::<Greeting>(&GreetingModel { message: "World".into() })
//!     .unwrap();
//! assert_eq!(output, "Hello, World!");
//! ```
//!
//! ## Composition
//!
//! Sub-templates are resolved by name through the shared
//! [`TemplateProvider`] and constructed fresh per evaluation, so templates
//! compose recursively without knowing each other's concrete types:
//!
//! ```rust
//! use serde::Serialize;
//! use stencil::{TemplateBuilder, TemplateType};
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct ListModel {
//!     items: Vec<Item>,
//! }
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Item {
//!     name: String,
//! }
//!
//! struct List;
//! impl TemplateType for List {
//!     const NAME: &'static str = "List";
//!     type Model = ListModel;
//! }
//!
//! struct Row;
//! impl TemplateType for Row {
//!     const NAME: &'static str = "Row";
//!     type Model = Item;
//! }
//!
//! let templates = TemplateBuilder::new()
//!     .add_manual_template::<List>("{{foreach:Items:Row}}")
//!     .unwrap()
//!     .add_manual_template::<Row>("- {{Name}}\n")
//!     .unwrap()
//!     .build();
//!
//! let output = templates
//!     .render::<List>(&ListModel {
//!         items: vec![
//!             Item { name: "one".into() },
//!             Item { name: "two".into() },
//!         ],
//!     })
//!     .unwrap();
//! assert_eq!(output, "- one\n- two\n");
//! ```
//!
//! ## Layered Sources
//!
//! A provider resolves names against its sources in reverse registration
//! order, so later sources override earlier ones. [`ManualSource`] serves
//! inline registrations; [`DirSource`] serves `<root>/<name>.md` files with
//! optional content caching.

mod builder;
mod engine;
mod error;
mod node;
mod parse;
pub mod prelude;
mod provider;
mod resolve;
mod source;

pub use builder::{TemplateBuilder, Templates};
pub use engine::{Template, TemplateEngine, TemplateType};
pub use error::TemplateError;
pub use node::TemplateNode;
pub use parse::ParsedTemplate;
pub use provider::{Renderable, TemplateFactory, TemplateProvider, TemplateSource};
pub use resolve::{format_value, resolve_path};
pub use source::{DirSource, ManualSource};
