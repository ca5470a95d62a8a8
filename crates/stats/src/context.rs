use std::collections::HashMap;
use tabfeed_model::TabItem;

/// Cohesion score over the open tabs, 0-100: the mean pairwise cosine
/// similarity of term-frequency vectors built from `(title, url)`
/// tokens. Defined as 100 when fewer than two tabs exist (no pairs to
/// average over).
#[must_use]
pub fn context_score(items: &[TabItem]) -> u32 {
    if items.len() < 2 {
        return 100;
    }
    let vectors: Vec<HashMap<String, f32>> = items
        .iter()
        .map(|item| term_vector(&item.title, &item.url))
        .collect();

    let mut total = 0.0f64;
    let mut pairs = 0usize;
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            total += f64::from(cosine(&vectors[i], &vectors[j]));
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 100;
    }
    ((total / pairs as f64) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Tokens are lowercase alphanumeric runs of length ≥3.
fn term_vector(title: &str, url: &str) -> HashMap<String, f32> {
    let mut vector = HashMap::new();
    for source in [title, url] {
        let mut token = String::new();
        for ch in source.chars() {
            if ch.is_alphanumeric() {
                token.extend(ch.to_lowercase());
            } else {
                push_token(&mut vector, &mut token);
            }
        }
        push_token(&mut vector, &mut token);
    }
    vector
}

fn push_token(vector: &mut HashMap<String, f32>, token: &mut String) {
    if token.len() >= 3 {
        *vector.entry(std::mem::take(token)).or_insert(0.0) += 1.0;
    } else {
        token.clear();
    }
}

fn cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    let mut dot = 0.0f32;
    for (term, weight) in a {
        if let Some(other) = b.get(term) {
            dot += weight * other;
        }
    }
    let norm_a = a.values().map(|w| w * w).sum::<f32>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
