//! Templating prelude for convenient imports.
//!
//! Re-exports the types most callers need in one line:
//!
//! ```rust,ignore
//! use stencil::prelude::*;
//!
//! let templates = TemplateBuilder::new()
//!     .add_manual_template::<Greeting>("Hello, {{Message}}!")?
//!     .build();
//! ```

pub use crate::builder::{TemplateBuilder, Templates};
pub use crate::engine::{Template, TemplateEngine, TemplateType};
pub use crate::error::TemplateError;
pub use crate::provider::{TemplateProvider, TemplateSource};
pub use crate::source::{DirSource, ManualSource};
