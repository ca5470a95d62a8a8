use log::debug;
use serde::Deserialize;
use std::time::Duration;
use tabfeed_capability::{parse_structured, Capability};
use tabfeed_model::{Tip, MAX_BUNDLE_TIPS};
use url::form_urlencoded::byte_serialize;

const TIPS_INSTRUCTION: &str =
    "Suggest 4-6 actionable next steps for exploring the given topic. \
     Each tip links to a relevant search or well-known reference site. \
     Output a STRICT JSON array, no commentary. \
     Schema: [{\"label\": string, \"url\": string}].";

/// Loosely-typed tip shape as models tend to emit it; `text` is an
/// observed alias for `label`.
#[derive(Debug, Deserialize)]
pub struct RawTip {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
}

/// Keep only http(s) tips, cap at [`MAX_BUNDLE_TIPS`], backfill labels.
#[must_use]
pub fn normalize_tips(raw: Vec<RawTip>) -> Vec<Tip> {
    raw.into_iter()
        .filter(|tip| tip.url.starts_with("http"))
        .map(|tip| {
            let label = if !tip.label.trim().is_empty() {
                tip.label.trim().to_string()
            } else if !tip.text.trim().is_empty() {
                tip.text.trim().to_string()
            } else {
                "Learn more".to_string()
            };
            Tip { label, url: tip.url }
        })
        .take(MAX_BUNDLE_TIPS)
        .collect()
}

/// Template tip set parameterized by the bundle's subject. Never empty;
/// this is the guaranteed fallback when the capability produces nothing
/// usable.
#[must_use]
pub fn deterministic_tips(subject_raw: &str) -> Vec<Tip> {
    let subject = {
        let trimmed = subject_raw.trim();
        if trimmed.is_empty() {
            "this topic"
        } else {
            trimmed
        }
    };
    let encoded: String = byte_serialize(subject.as_bytes()).collect();
    let attractions: String =
        byte_serialize(format!("top attractions {subject}").as_bytes()).collect();
    vec![
        Tip {
            label: format!("Find background on {subject}"),
            url: format!("https://www.google.com/search?q={encoded}"),
        },
        Tip {
            label: format!("Latest news on {subject}"),
            url: format!("https://www.google.com/search?q={encoded}&tbm=nws"),
        },
        Tip {
            label: "Wikipedia overview".to_string(),
            url: format!("https://en.wikipedia.org/wiki/Special:Search?search={encoded}"),
        },
        Tip {
            label: "Reddit discussions".to_string(),
            url: format!("https://www.reddit.com/search/?q={encoded}"),
        },
        Tip {
            label: "YouTube explainers".to_string(),
            url: format!("https://www.youtube.com/results?search_query={encoded}"),
        },
        Tip {
            label: format!("Top attractions in {subject}"),
            url: format!("https://www.tripadvisor.com/Search?q={attractions}"),
        },
    ]
}

/// Ask the capability for tips over `context`; fall back to the
/// deterministic set whenever the response is missing, malformed, or
/// contains no usable http(s) link.
pub async fn generate_tips(
    capability: &Capability,
    subject: &str,
    context: &str,
    timeout: Duration,
) -> Vec<Tip> {
    let input = format!("Topic: {subject}\n\nContext from tabs:\n{context}");
    let generated = match capability.generate(TIPS_INSTRUCTION, &input, timeout).await {
        Ok(raw) => parse_structured::<Vec<RawTip>>(&raw)
            .map(normalize_tips)
            .unwrap_or_default(),
        Err(err) => {
            debug!("tips generation failed for '{subject}': {err}");
            Vec::new()
        }
    };
    if generated.is_empty() {
        deterministic_tips(subject)
    } else {
        generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tabfeed_capability::{Result as CapResult, TextCapability};

    struct Fixed(String);

    #[async_trait]
    impl TextCapability for Fixed {
        async fn generate(&self, _instruction: &str, _input: &str) -> CapResult<String> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn deterministic_tips_cover_the_subject() {
        let tips = deterministic_tips("Japan trip");
        assert!(tips.len() >= 4);
        for tip in &tips {
            assert!(!tip.label.is_empty());
            assert!(tip.url.starts_with("http"));
        }
        assert!(tips.iter().any(|tip| tip.url.contains("Japan+trip")));
    }

    #[test]
    fn deterministic_tips_handle_empty_subject() {
        let tips = deterministic_tips("   ");
        assert!(!tips.is_empty());
        assert!(tips[0].label.contains("this topic"));
    }

    #[test]
    fn normalize_drops_non_http_and_caps() {
        let raw = vec![
            RawTip { label: "good".into(), text: String::new(), url: "https://x".into() },
            RawTip { label: "bad".into(), text: String::new(), url: "ftp://x".into() },
            RawTip { label: String::new(), text: "alias".into(), url: "http://y".into() },
        ];
        let tips = normalize_tips(raw);
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[1].label, "alias");
    }

    #[tokio::test]
    async fn malformed_response_falls_back() {
        let capability = Capability::from_provider(Arc::new(Fixed("garbage".to_string())));
        let tips = generate_tips(&capability, "Japan trip", "", Duration::from_secs(1)).await;
        assert!(tips.len() >= 4);
        assert!(tips.iter().any(|tip| tip.url.contains("Japan+trip")));
    }

    #[tokio::test]
    async fn unavailable_capability_falls_back() {
        let tips =
            generate_tips(&Capability::Unavailable, "Japan trip", "", Duration::from_secs(1)).await;
        assert!(tips.len() >= 4);
    }

    #[tokio::test]
    async fn usable_response_wins_over_fallback() {
        let raw = r#"[{"label":"Read the docs","url":"https://docs.example/"}]"#;
        let capability = Capability::from_provider(Arc::new(Fixed(raw.to_string())));
        let tips = generate_tips(&capability, "rust", "", Duration::from_secs(1)).await;
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].url, "https://docs.example/");
    }
}
