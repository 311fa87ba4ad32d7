//! Template document parsing.
//!
//! A template document has three layers:
//!
//! 1. An optional front-matter block fenced by `---` lines at the very
//!    start. Its raw text is captured but not interpreted here; callers can
//!    deserialize it via [`ParsedTemplate::front_matter`].
//! 2. A body split into sections wherever a line consists solely of `---`
//!    (optionally surrounded by whitespace). Sections exist only so that
//!    horizontal rules can appear inside a body; they carry no structure of
//!    their own and their node lists are concatenated flat.
//! 3. Within each section, `{{...}}` directives interleaved with literal
//!    text. Directive bodies are trimmed and classified by keyword prefix:
//!    `include:`, `if:`, `foreach:` (case-insensitive), or a bare variable
//!    path.
//!
//! Parsing is a one-shot operation: a [`ParsedTemplate`] is immutable and a
//! parse error is permanent.

use serde::de::DeserializeOwned;

use crate::error::TemplateError;
use crate::node::TemplateNode;

/// The immutable parse result for one template document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    nodes: Vec<TemplateNode>,
    front_matter: Option<String>,
}

impl ParsedTemplate {
    /// Parses a full template document into a flat node sequence.
    ///
    /// An empty document (or one that is all front matter) parses to an
    /// empty node sequence, not an error.
    pub fn parse(document: &str) -> Result<Self, TemplateError> {
        let (front_matter, body) = split_front_matter(document);
        let mut nodes = Vec::new();
        for section in split_sections(body) {
            parse_section(section, &mut nodes)?;
        }
        Ok(Self {
            nodes,
            front_matter: front_matter.map(str::to_string),
        })
    }

    /// The parsed node sequence, in document order.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// The raw front-matter text, if the document carried a front-matter
    /// block. Surrounding newlines are stripped.
    pub fn front_matter_raw(&self) -> Option<&str> {
        self.front_matter.as_deref()
    }

    /// Deserializes the front-matter block as YAML into `D`.
    ///
    /// Returns `Ok(None)` when the document has no front matter.
    pub fn front_matter<D: DeserializeOwned>(&self) -> Result<Option<D>, TemplateError> {
        match &self.front_matter {
            Some(raw) => Ok(Some(serde_yaml::from_str(raw)?)),
            None => Ok(None),
        }
    }
}

/// Splits an optional leading front-matter block from the document.
///
/// The block is recognized only when the very first line is exactly `---`
/// and a later line is exactly `---` followed by a newline; everything after
/// that newline is the body. If the pattern does not match, the whole
/// document is the body.
fn split_front_matter(document: &str) -> (Option<&str>, &str) {
    let Some(first_end) = document.find('\n') else {
        return (None, document);
    };
    if document[..first_end].trim_end_matches('\r') != "---" {
        return (None, document);
    }
    let mut offset = first_end + 1;
    while let Some(rel) = document[offset..].find('\n') {
        let line_end = offset + rel;
        if document[offset..line_end].trim_end_matches('\r') == "---" {
            let raw = document[first_end + 1..offset].trim_matches(['\r', '\n']);
            return (Some(raw), &document[line_end + 1..]);
        }
        offset = line_end + 1;
    }
    // No closing fence (or it sits at EOF without a trailing newline):
    // the whole document is body.
    (None, document)
}

/// Splits the body on separator lines whose trimmed content is `---`.
///
/// The separator line itself is dropped; the newlines around it stay with
/// the adjacent sections, so `a\n---\nb` yields `a\n` and `\nb`.
fn split_sections(body: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut section_start = 0;
    let mut offset = 0;
    loop {
        let (line_end, next) = match body[offset..].find('\n') {
            Some(rel) => (offset + rel, offset + rel + 1),
            None => (body.len(), body.len()),
        };
        if body[offset..line_end].trim() == "---" {
            sections.push(&body[section_start..offset]);
            section_start = line_end;
        }
        if next >= body.len() {
            break;
        }
        offset = next;
    }
    sections.push(&body[section_start..]);
    sections
}

/// Tokenizes one section into nodes, appending to `nodes`.
///
/// Directive spans are delimited by `{{` and `}}`, non-greedy: the body
/// runs to the first `}}`. An opening `{{` with no closing `}}` is literal
/// text, not an error.
fn parse_section(section: &str, nodes: &mut Vec<TemplateNode>) -> Result<(), TemplateError> {
    let mut rest_start = 0;
    let mut cursor = 0;
    while let Some(open_rel) = section[cursor..].find("{{") {
        let open = cursor + open_rel;
        let Some(close_rel) = section[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + close_rel;
        if open > rest_start {
            nodes.push(TemplateNode::Text {
                content: section[rest_start..open].to_string(),
            });
        }
        nodes.push(parse_directive(section[open + 2..close].trim())?);
        cursor = close + 2;
        rest_start = cursor;
    }
    if rest_start < section.len() {
        nodes.push(TemplateNode::Text {
            content: section[rest_start..].to_string(),
        });
    }
    Ok(())
}

/// Classifies one trimmed directive body into a node.
fn parse_directive(expression: &str) -> Result<TemplateNode, TemplateError> {
    if has_keyword(expression, "include:") {
        let parts = split_arguments(expression)?;
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid_directive("include", expression));
        }
        let template = parts[1].to_string();
        let input_path = parts
            .get(2)
            .map(|path| path.to_string())
            // `this` is the explicit spelling of "pass the current input".
            .filter(|path| path != "this");
        Ok(TemplateNode::Include {
            template,
            input_path,
        })
    } else if has_keyword(expression, "if:") {
        let parts = split_arguments(expression)?;
        if parts.len() < 3 || parts.len() > 4 {
            return Err(invalid_directive("if", expression));
        }
        Ok(TemplateNode::If {
            condition_path: parts[1].to_string(),
            template: parts[2].to_string(),
            input_path: parts.get(3).map(|path| path.to_string()),
        })
    } else if has_keyword(expression, "foreach:") {
        // Limit-3 split: the sub-template name is never split further.
        let parts: Vec<&str> = expression.splitn(3, ':').map(str::trim).collect();
        if parts.len() != 3 || parts[1].is_empty() || parts[2].is_empty() {
            return Err(invalid_directive("foreach", expression));
        }
        Ok(TemplateNode::Loop {
            collection_path: parts[1].to_string(),
            template: parts[2].to_string(),
        })
    } else {
        Ok(TemplateNode::Variable {
            path: expression.to_string(),
        })
    }
}

/// Case-insensitive keyword prefix check. The colon must immediately follow
/// the keyword; `include : Name` is a variable path, not a directive.
fn has_keyword(expression: &str, keyword: &str) -> bool {
    expression.len() >= keyword.len() && expression[..keyword.len()].eq_ignore_ascii_case(keyword)
}

/// Splits a directive on `:` with per-segment trimming. Every segment after
/// the keyword must be non-blank.
fn split_arguments(expression: &str) -> Result<Vec<&str>, TemplateError> {
    let parts: Vec<&str> = expression.split(':').map(str::trim).collect();
    for part in &parts[1..] {
        if part.is_empty() {
            return Err(TemplateError::Syntax(format!(
                "blank argument in directive: {{{{{}}}}}",
                expression
            )));
        }
    }
    Ok(parts)
}

fn invalid_directive(keyword: &str, expression: &str) -> TemplateError {
    TemplateError::Syntax(format!(
        "invalid {} directive: {{{{{}}}}}",
        keyword, expression
    ))
}
