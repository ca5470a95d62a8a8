use log::debug;
use std::time::Duration;
use tabfeed_capability::Capability;
use tabfeed_model::{truncate_chars, Bundle, TabItem};

const SUMMARY_INSTRUCTION: &str =
    "Summarize the following bundle of related tabs in 4-6 markdown \
     bullet points. Output only the bullet list.";

const ANSWER_INSTRUCTION: &str =
    "Answer the user's question using only the provided tab context. \
     Be concise; use markdown. Say so plainly when the context does not \
     contain the answer.";

/// Per-member context blob handed to the capability for summary, tips,
/// and Q&A generation.
#[must_use]
pub fn build_context(members: &[TabItem]) -> String {
    members
        .iter()
        .map(|item| {
            format!(
                "Title: {}\nURL: {}\nSummary: {}\nText: {}",
                item.title,
                item.url,
                item.summary.as_deref().unwrap_or(""),
                truncate_chars(&item.full_text, 300)
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Cross-entity synthesis for a bundle. `None` on any failure; the
/// bundle keeps its previous summary.
pub async fn generate_summary(
    capability: &Capability,
    bundle_title: &str,
    members: &[TabItem],
    timeout: Duration,
) -> Option<String> {
    let context = build_context(members);
    if context.is_empty() {
        return None;
    }
    let input = format!("Bundle: {bundle_title}\n\n{context}");
    match capability.generate(SUMMARY_INSTRUCTION, &input, timeout).await {
        Ok(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(err) => {
            debug!("bundle summary failed for '{bundle_title}': {err}");
            None
        }
    }
}

/// Q&A over a bundle's members. `None` on failure; the caller reports
/// the failure to the asker without touching the chat log.
pub async fn answer_question(
    capability: &Capability,
    bundle: &Bundle,
    members: &[TabItem],
    question: &str,
    timeout: Duration,
) -> Option<String> {
    // Archived bundles answer from their snapshot.
    let snapshot;
    let members = if members.is_empty() {
        snapshot = bundle.items.clone().unwrap_or_default();
        &snapshot[..]
    } else {
        members
    };
    let context = build_context(members);
    let input = format!(
        "Bundle: {}\n\n{}\n\nQuestion: {}",
        bundle.title, context, question
    );
    match capability.generate(ANSWER_INSTRUCTION, &input, timeout).await {
        Ok(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(err) => {
            debug!("bundle Q&A failed for '{}': {err}", bundle.title);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn context_blob_joins_members() {
        let mut a = TabItem::new(1, 1, 0, "https://a.example/", 10);
        a.title = "First".to_string();
        a.summary = Some("- summary".to_string());
        a.full_text = "body".to_string();
        let mut b = TabItem::new(2, 1, 1, "https://b.example/", 10);
        b.title = "Second".to_string();

        let context = build_context(&[a, b]);
        assert!(context.contains("Title: First"));
        assert!(context.contains("Summary: - summary"));
        assert!(context.contains("\n---\n"));
        assert!(context.contains("Title: Second"));
    }

    #[test]
    fn context_truncates_long_text() {
        let mut a = TabItem::new(1, 1, 0, "https://a.example/", 10);
        a.full_text = "x".repeat(2_000);
        let context = build_context(&[a]);
        let text_part = context.rsplit("Text: ").next().unwrap();
        assert_eq!(text_part.len(), 300);
    }
}
