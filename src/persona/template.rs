// src/persona/template.rs
// Generation prompt template with a single `{context_info}` placeholder

use thiserror::Error;

/// Name of the only placeholder a generation template may use
pub const CONTEXT_PLACEHOLDER: &str = "context_info";

/// Built-in template used when the operator does not supply one
pub const DEFAULT_GENERATION_PROMPT: &str = r#"You are a persona designer for a conversational assistant.
Based on the situation below, write a short persona for the assistant's next reply:
its mood, attitude and speaking style, in one or two sentences (under 80 words).
Write in the second person ("You are ..."). Output only the persona itself,
without quotes, headings or explanations.

Situation:
{context_info}"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template does not contain the {{context_info}} placeholder")]
    MissingPlaceholder,

    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

/// Operator-supplied generation prompt.
///
/// Braces are escaped by doubling them (`{{` renders as `{`), so literal
/// JSON examples can live in the template next to the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
}

impl PromptTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check the template renders, without producing output
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.render("").map(|_| ())
    }

    /// Substitute the context description into the template
    pub fn render(&self, context_info: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.raw.len() + context_info.len());
        let mut found = false;
        let mut chars = self.raw.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        out.push('{');
                        continue;
                    }
                    let mut name = String::new();
                    let mut closed = false;
                    for (inner_pos, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::UnbalancedBrace(inner_pos)),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }
                    if name != CONTEXT_PLACEHOLDER {
                        return Err(TemplateError::UnknownPlaceholder(name));
                    }
                    out.push_str(context_info);
                    found = true;
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        out.push('}');
                        continue;
                    }
                    return Err(TemplateError::UnbalancedBrace(pos));
                }
                other => out.push(other),
            }
        }

        if !found {
            return Err(TemplateError::MissingPlaceholder);
        }
        Ok(out)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_PROMPT)
    }
}
