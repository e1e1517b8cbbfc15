// Prompt constants for retrieval-augmented chat.

/// System prompt for context-grounded answers.
pub const CONTEXT_CHAT_SYSTEM: &str = "You are a helpful career assistant. \
    Answer using the document excerpts provided in the user message. \
    If the excerpts do not contain the information needed, say so plainly \
    instead of inventing details.";

/// Context chat template. Replace `{context}` and `{question}` before sending.
pub const CONTEXT_PROMPT_TEMPLATE: &str = r#"Context information is below.
---------------------
{context}
---------------------
Given the context information and not prior knowledge, respond to the following:
{question}"#;

/// Rendered in place of the context block when retrieval finds nothing.
pub const NO_CONTEXT: &str = "(no documents matched this request)";

/// Fills `{name}` placeholders in one pass over `template`.
///
/// Substituted values are never rescanned, so a value that itself contains
/// `{name}` is inserted as-is. Unknown placeholders are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find(|(name, _)| {
            tail.starts_with(name) && tail[name.len()..].starts_with('}')
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
