//! Citation marker extraction

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Matches [1] as well as grouped markers such as [1, 3] or [2][4]
    PATTERN.get_or_init(|| Regex::new(r"\[(\d+(?:\s*,\s*\d+)*)\]").expect("Invalid regex"))
}

/// Citation indices mentioned in `answer`, ascending and deduplicated.
///
/// Markers outside `1..=available` are ignored; the model sometimes invents them.
pub fn referenced_indices(answer: &str, available: usize) -> Vec<usize> {
    let mut found = BTreeSet::new();

    for cap in marker_pattern().captures_iter(answer) {
        let Some(group) = cap.get(1) else { continue };
        for part in group.as_str().split(',') {
            if let Ok(index) = part.trim().parse::<usize>() {
                if (1..=available).contains(&index) {
                    found.insert(index);
                }
            }
        }
    }

    found.into_iter().collect()
}
