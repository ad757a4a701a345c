//! Answer rendering: citation cleanup, document links, chunk excerpts.

use regex::Regex;

use crate::backend::Reference;

/// Text shown in place of an answer the backend left blank.
const EMPTY_ANSWER: &str = "(empty answer)";

/// Settings controlling how answers and references render.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    /// Public web root for clickable document links.
    pub public_web_url: Option<String>,
    /// Append retrieved chunk excerpts below the answer.
    pub include_references: bool,
    /// Cap on rendered chunk excerpts.
    pub chunk_limit: usize,
}

/// Rewrite citation markers (`##3$$`) into plain `#3` anchors, then strip
/// any marker runs the rewrite did not catch.
pub fn clean_citation_markers(text: &str) -> String {
    let rewritten = match Regex::new(r"##(\d{1,2})\$\$") {
        Ok(re) => re.replace_all(text, "#$1").into_owned(),
        Err(_) => text.to_string(),
    };
    match Regex::new(r"##\d+\$\$") {
        Ok(re) => re.replace_all(&rewritten, "").into_owned(),
        Err(_) => rewritten,
    }
}

/// Markdown bullet linking to a referenced document. Falls back to a plain
/// name-and-id bullet when no public web root is configured.
pub fn doc_link(public_web_url: Option<&str>, doc_id: &str, doc_name: &str) -> String {
    match public_web_url.map(str::trim).filter(|root| !root.is_empty()) {
        Some(root) => format!(
            "- [{}]({}/document/{}?ext=pdf&prefix=document)",
            doc_name,
            root.trim_end_matches('/'),
            doc_id
        ),
        None => format!("- {doc_name} (id: {doc_id})"),
    }
}

/// Assemble the visible reply: cleaned answer, then document links, then
/// chunk excerpts when enabled.
pub fn format_answer(
    raw_answer: &str,
    reference: Option<&Reference>,
    settings: &RenderSettings,
) -> String {
    let answer = clean_citation_markers(raw_answer);
    let answer = answer.trim();
    let answer = if answer.is_empty() {
        EMPTY_ANSWER.to_string()
    } else {
        answer.to_string()
    };

    let mut parts = vec![answer];

    if let Some(reference) = reference {
        let docs: Vec<String> = reference
            .doc_aggs
            .iter()
            .map(|doc| doc_link(settings.public_web_url.as_deref(), &doc.doc_id, &doc.doc_name))
            .collect();
        if !docs.is_empty() {
            parts.push(format!("**Documents referenced:**\n{}", docs.join("\n")));
        }

        if settings.include_references {
            let chunks: Vec<String> = reference
                .chunks
                .iter()
                .take(settings.chunk_limit)
                .enumerate()
                .map(|(index, chunk)| {
                    format!(
                        "**#{}** {}\n{}",
                        index + 1,
                        chunk.document_name,
                        chunk.content.trim()
                    )
                })
                .collect();
            if !chunks.is_empty() {
                parts.push(format!(
                    "**Chunks used from knowledge base:**\n{}",
                    chunks.join("\n\n")
                ));
            }
        }
    }

    parts.join("\n\n")
}
