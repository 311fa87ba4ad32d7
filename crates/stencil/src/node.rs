//! Parsed template nodes.

/// One parsed unit of a template: literal text or a directive.
///
/// A template compiles to an ordered sequence of nodes; every character of
/// the source body is either emitted as [`TemplateNode::Text`] or consumed
/// by a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    /// Literal text, appended to output verbatim.
    Text {
        /// The raw text.
        content: String,
    },

    /// `{{path}}` - a dotted property path resolved against the input and
    /// stringified. A path resolving through a null value renders as the
    /// original directive text rather than failing.
    Variable {
        /// Dotted property path.
        path: String,
    },

    /// `{{if:condPath:subName}}` or `{{if:condPath:subName:inputPath}}` -
    /// renders the named sub-template only when the condition resolves to
    /// boolean `true`. Without an input path the sub-template receives no
    /// input.
    If {
        /// Path to the boolean condition.
        condition_path: String,
        /// Name of the sub-template to render.
        template: String,
        /// Path selecting the sub-template's input, if any.
        input_path: Option<String>,
    },

    /// `{{include:subName}}` or `{{include:subName:inputPath}}` - always
    /// renders the named sub-template. Without an input path (or with the
    /// literal path `this`) the current input is passed through unchanged.
    Include {
        /// Name of the sub-template to render.
        template: String,
        /// Path selecting the sub-template's input; `None` passes the
        /// current input through.
        input_path: Option<String>,
    },

    /// `{{foreach:collectionPath:subName}}` - renders the named sub-template
    /// once per element of the collection, each element passed as that
    /// invocation's input.
    Loop {
        /// Path to the collection to iterate.
        collection_path: String,
        /// Name of the sub-template to render per element.
        template: String,
    },
}
