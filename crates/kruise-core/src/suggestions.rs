//! "Did you mean" suggestions for mistyped arguments

use crate::catalog::Catalog;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A candidate close to what the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub distance: usize,
}

/// Find the closest candidates to `input`, best first
///
/// Exact matches are not suggestions and are skipped. Ties keep candidate
/// order.
pub fn find_closest_matches(input: &str, candidates: &[&str], max_results: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = strsim::levenshtein(input, candidate);
            (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then(|| Suggestion {
                text: candidate.to_string(),
                distance,
            })
        })
        .collect();

    suggestions.sort_by_key(|s| s.distance);
    let mut seen = std::collections::HashSet::new();
    suggestions.retain(|s| seen.insert(s.text.clone()));
    suggestions.truncate(max_results);
    suggestions
}

/// Suggestions for an argument the catalog does not know
pub fn suggest_argument(catalog: &Catalog, input: &str, max_results: usize) -> Vec<String> {
    find_closest_matches(input, &catalog.valid_args(), max_results)
        .into_iter()
        .map(|s| s.text)
        .collect()
}
