//! Error types for template parsing and rendering.
//!
//! This module provides [`TemplateError`], the single error type for all
//! parsing, registration, and rendering operations. Every error is fatal to
//! the call that raised it: a failed render yields no output, not a
//! truncated one.

use std::fmt;

/// Error type for template operations.
///
/// The only non-fatal condition in the engine is a variable path that
/// resolves through a null value, which renders as the literal directive
/// text instead of raising [`TemplateError::PropertyResolution`].
#[derive(Debug)]
pub enum TemplateError {
    /// Malformed directive: wrong argument count or a blank required segment.
    Syntax(String),

    /// No source yields content for the template's own name.
    ContentNotFound(String),

    /// A directive names a sub-template with no registered factory.
    SubTemplateNotFound(String),

    /// A sub-template factory failed to produce an instance.
    Instantiation {
        /// Name of the sub-template being constructed.
        template: String,
        /// The construction failure.
        source: Box<TemplateError>,
    },

    /// Path traversal hit a non-null value lacking the named member.
    PropertyResolution {
        /// The member name that was looked up.
        property: String,
        /// Shape of the value the lookup was attempted on.
        type_name: String,
    },

    /// A collection path did not resolve to an iterable value.
    TypeMismatch(String),

    /// A sub-template's own render call failed.
    SubRender {
        /// Name of the sub-template that was rendering.
        template: String,
        /// The underlying render failure.
        source: Box<TemplateError>,
    },

    /// Sub-template nesting exceeded the maximum render depth.
    ///
    /// Raised instead of overflowing the stack when templates include each
    /// other cyclically.
    RecursionLimit {
        /// Name of the sub-template that would have been constructed next.
        template: String,
        /// The nesting depth at which rendering stopped.
        depth: usize,
    },

    /// A template name was registered twice within one source.
    Registration(String),

    /// Model serialization or front-matter deserialization error.
    Serialization(String),

    /// I/O error (e.g. reading template content from disk).
    Io(std::io::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            TemplateError::ContentNotFound(name) => {
                write!(f, "template '{}' not found", name)
            }
            TemplateError::SubTemplateNotFound(name) => {
                write!(f, "sub-template '{}' not found", name)
            }
            TemplateError::Instantiation { template, source } => {
                write!(f, "unable to instantiate sub-template '{}': {}", template, source)
            }
            TemplateError::PropertyResolution { property, type_name } => {
                write!(f, "property '{}' not found on {}", property, type_name)
            }
            TemplateError::TypeMismatch(msg) => write!(f, "type mismatch: {}", msg),
            TemplateError::SubRender { template, source } => {
                write!(f, "sub-template '{}' failed to render: {}", template, source)
            }
            TemplateError::RecursionLimit { template, depth } => {
                write!(
                    f,
                    "maximum render depth {} exceeded while rendering sub-template '{}'",
                    depth, template
                )
            }
            TemplateError::Registration(name) => {
                write!(f, "template '{}' already exists", name)
            }
            TemplateError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            TemplateError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::Instantiation { source, .. } => Some(&**source),
            TemplateError::SubRender { source, .. } => Some(&**source),
            TemplateError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err)
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(err: serde_yaml::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::SubTemplateNotFound("Greeting".to_string());
        assert!(err.to_string().contains("sub-template"));
        assert!(err.to_string().contains("Greeting"));
    }

    #[test]
    fn test_sub_render_chains_source() {
        use std::error::Error;

        let inner = TemplateError::ContentNotFound("Inner".to_string());
        let err = TemplateError::SubRender {
            template: "Outer".to_string(),
            source: Box::new(inner),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("Outer"));
        assert!(err.to_string().contains("Inner"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TemplateError = io_err.into();
        assert!(matches!(err, TemplateError::Io(_)));
    }
}
