//! Safety-context construction from similarity-search results.

use std::cmp::Ordering;

use crate::traits::{MatchedSubstance, SafetyContext, SimilarityMatch};

/// Fold retrieval results for one ingredient into a safety context.
///
/// Only matches strictly above `alert_threshold` are retained; candidates
/// that cleared the retrieval floor but not the alert threshold produce the
/// zero-value context. Pure function, no side effects.
pub fn build_safety_context(matches: &[SimilarityMatch], alert_threshold: f32) -> SafetyContext {
    let mut retained: Vec<MatchedSubstance> = matches
        .iter()
        .filter(|m| m.similarity > alert_threshold)
        .map(|m| MatchedSubstance {
            name: m.data.name.clone(),
            details: m.data.details.clone(),
            risk: m.data.risk.clone(),
            similarity: m.similarity,
        })
        .collect();

    if retained.is_empty() {
        return SafetyContext::default();
    }

    retained.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    let highest_similarity = retained[0].similarity;

    SafetyContext {
        has_safety_concerns: true,
        matched_substances: retained,
        highest_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SafetySubstance;

    fn hit(name: &str, risk: &str, similarity: f32) -> SimilarityMatch {
        SimilarityMatch {
            data: SafetySubstance {
                name: name.to_string(),
                details: format!("{} details", name),
                risk: risk.to_string(),
            },
            similarity,
        }
    }

    #[test]
    fn test_no_matches_gives_zero_context() {
        let ctx = build_safety_context(&[], 0.85);
        assert!(!ctx.has_safety_concerns);
        assert!(ctx.matched_substances.is_empty());
        assert_eq!(ctx.highest_similarity, 0.0);
    }

    #[test]
    fn test_match_above_retrieval_floor_but_below_alert_threshold_is_dropped() {
        // 0.82 cleared the 0.8 retrieval floor but not the alert threshold.
        let ctx = build_safety_context(&[hit("Salicylic Acid", "restricted", 0.82)], 0.85);
        assert!(!ctx.has_safety_concerns);
        assert!(ctx.matched_substances.is_empty());
    }

    #[test]
    fn test_match_at_exactly_the_threshold_is_dropped() {
        // Strictly greater than, not greater-or-equal.
        let ctx = build_safety_context(&[hit("Kojic Acid", "restricted", 0.85)], 0.85);
        assert!(!ctx.has_safety_concerns);
    }

    #[test]
    fn test_confident_match_sets_safety_concerns() {
        let ctx = build_safety_context(&[hit("Hydroquinone", "banned", 0.90)], 0.85);
        assert!(ctx.has_safety_concerns);
        assert_eq!(ctx.matched_substances.len(), 1);
        assert_eq!(ctx.matched_substances[0].name, "Hydroquinone");
        assert_eq!(ctx.highest_similarity, 0.90);
    }

    #[test]
    fn test_retained_matches_are_ordered_by_descending_similarity() {
        let ctx = build_safety_context(
            &[
                hit("Substance A", "restricted", 0.87),
                hit("Substance B", "banned", 0.95),
                hit("Substance C", "restricted", 0.82),
            ],
            0.85,
        );
        assert!(ctx.has_safety_concerns);
        assert_eq!(ctx.matched_substances.len(), 2);
        assert_eq!(ctx.matched_substances[0].name, "Substance B");
        assert_eq!(ctx.matched_substances[1].name, "Substance A");
        assert_eq!(ctx.highest_similarity, 0.95);
    }
}
