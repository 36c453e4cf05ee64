//! Keyword-based triage. Deliberately a crude substring heuristic, not NLP:
//! it assigns a starting category and priority so that new submissions land
//! in the right queue without a human in the loop.

use crate::models::{Category, Mood, Priority};

/// Keyword rules, evaluated in order. First match wins.
const RULES: [(&[&str], Category, Priority); 3] = [
    (
        &["wifi", "ac", "lab"],
        Category::Infrastructure,
        Priority::High,
    ),
    (&["notes", "lecture"], Category::Academic, Priority::Medium),
    (
        &["counseling", "mental"],
        Category::MentalHealth,
        Priority::High,
    ),
];

/// Classify a free-text submission into a category and priority.
///
/// Matching is case-insensitive substring containment. If no rule matches,
/// the ticket falls through to `(Other, Medium)`. A panicking mood overrides
/// whatever priority the rules produced, unconditionally.
pub fn classify(text: &str, mood: Mood) -> (Category, Priority) {
    let lowered = text.to_lowercase();

    let (category, mut priority) = RULES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, category, priority)| (*category, *priority))
        .unwrap_or((Category::Other, Priority::Medium));

    if mood == Mood::Panicking {
        priority = Priority::Critical;
    }

    (category, priority)
}
