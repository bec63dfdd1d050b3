//! Score aggregation and ranking
//!
//! Converts raw (garment, score) pairs from the orchestrator into the
//! published match ordering: confidence derivation, qualitative reason
//! labels, low-confidence filtering, stable descending sort, result cap.
//!
//! Everything here is pure and synchronous; the functions are exercised
//! directly with synthetic score arrays in the tests below.

use drip_common::api::types::Garment;
use serde::Serialize;

use super::MatchMode;

/// Results at or below this confidence are dropped from the ranking.
pub const CONFIDENCE_FLOOR: u8 = 30;

/// Maximum number of results returned by a category match.
pub const CATEGORY_RESULT_CAP: usize = 6;

/// Maximum number of results returned by a full-outfit match. One winner
/// per category already bounds the set; the cap is a safety limit.
pub const OUTFIT_RESULT_CAP: usize = 8;

/// Neutral score substituted when a compatibility lookup fails.
pub const FALLBACK_SCORE: f64 = 0.5;

/// One ranked match, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// The matched garment (never the anchor)
    pub garment: Garment,
    /// Compatibility score rescaled to 0-100 and rounded
    pub confidence: u8,
    /// Qualitative tier label for the confidence
    pub reason: &'static str,
    /// Raw compatibility score in [0,1]
    pub score: f64,
}

/// Rescale a compatibility score to an integer percentage.
pub fn confidence(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Qualitative tier label for a confidence value.
///
/// Thresholds are identical in both modes; only the wording differs.
pub fn reason(mode: MatchMode, confidence: u8) -> &'static str {
    match mode {
        MatchMode::Category => match confidence {
            80..=100 => "Excellent match",
            60..=79 => "Good match",
            40..=59 => "Decent match",
            _ => "Basic match",
        },
        MatchMode::Outfit => match confidence {
            80..=100 => "Perfect complement",
            60..=79 => "Good complement",
            40..=59 => "Decent pairing",
            _ => "Basic pairing",
        },
    }
}

/// Produce the published ranking from raw scored candidates.
///
/// Candidates at or below [`CONFIDENCE_FLOOR`] are dropped; survivors are
/// sorted by descending confidence (ties keep their input order) and
/// truncated to the mode's cap.
pub fn rank(mode: MatchMode, scored: Vec<(Garment, f64)>) -> Vec<MatchResult> {
    let cap = match mode {
        MatchMode::Category => CATEGORY_RESULT_CAP,
        MatchMode::Outfit => OUTFIT_RESULT_CAP,
    };

    let mut results: Vec<MatchResult> = scored
        .into_iter()
        .map(|(garment, score)| {
            let confidence = confidence(score);
            MatchResult {
                reason: reason(mode, confidence),
                garment,
                confidence,
                score,
            }
        })
        .filter(|result| result.confidence > CONFIDENCE_FLOOR)
        .collect();

    // Vec::sort_by is stable, so equal confidences keep input order
    results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    results.truncate(cap);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn garment(category: &str) -> Garment {
        Garment {
            id: Uuid::new_v4(),
            category: category.to_string(),
            image: format!("{}.jpg", category.to_lowercase()),
            image_url: None,
            details: serde_json::Value::Null,
        }
    }

    fn scored(scores: &[f64]) -> Vec<(Garment, f64)> {
        scores.iter().map(|&s| (garment("Tops"), s)).collect()
    }

    #[test]
    fn confidence_rounds_to_nearest_percent() {
        assert_eq!(confidence(0.0), 0);
        assert_eq!(confidence(0.304), 30);
        assert_eq!(confidence(0.305), 31);
        assert_eq!(confidence(0.5), 50);
        assert_eq!(confidence(0.999), 100);
        assert_eq!(confidence(1.0), 100);
    }

    #[test]
    fn confidence_clamps_out_of_range_scores() {
        assert_eq!(confidence(-0.5), 0);
        assert_eq!(confidence(1.7), 100);
    }

    #[test]
    fn reason_tiers_at_boundaries() {
        assert_eq!(reason(MatchMode::Category, 80), "Excellent match");
        assert_eq!(reason(MatchMode::Category, 79), "Good match");
        assert_eq!(reason(MatchMode::Category, 60), "Good match");
        assert_eq!(reason(MatchMode::Category, 59), "Decent match");
        assert_eq!(reason(MatchMode::Category, 40), "Decent match");
        assert_eq!(reason(MatchMode::Category, 39), "Basic match");

        assert_eq!(reason(MatchMode::Outfit, 85), "Perfect complement");
        assert_eq!(reason(MatchMode::Outfit, 61), "Good complement");
        assert_eq!(reason(MatchMode::Outfit, 40), "Decent pairing");
        assert_eq!(reason(MatchMode::Outfit, 12), "Basic pairing");
    }

    #[test]
    fn rank_drops_results_at_or_below_floor() {
        let results = rank(MatchMode::Category, scored(&[0.30, 0.31, 0.20, 0.90]));
        let confidences: Vec<u8> = results.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![90, 31]);
    }

    #[test]
    fn rank_sorts_descending_and_is_stable() {
        let a = garment("Tops");
        let b = garment("Tops");
        let c = garment("Tops");
        let results = rank(
            MatchMode::Category,
            vec![(a.clone(), 0.7), (b.clone(), 0.9), (c.clone(), 0.7)],
        );
        assert_eq!(results[0].garment.id, b.id);
        // Equal confidence keeps input order: a before c
        assert_eq!(results[1].garment.id, a.id);
        assert_eq!(results[2].garment.id, c.id);
    }

    #[test]
    fn rank_caps_category_results_at_six() {
        let results = rank(
            MatchMode::Category,
            scored(&[0.9, 0.8, 0.7, 0.6, 0.5, 0.45, 0.4, 0.35]),
        );
        assert_eq!(results.len(), CATEGORY_RESULT_CAP);
        assert_eq!(results[0].confidence, 90);
        assert_eq!(results[5].confidence, 45);
    }

    #[test]
    fn rank_caps_outfit_results_at_eight() {
        let scores: Vec<f64> = (0..10).map(|i| 0.9 - i as f64 * 0.05).collect();
        let results = rank(MatchMode::Outfit, scored(&scores));
        assert_eq!(results.len(), OUTFIT_RESULT_CAP);
    }

    #[test]
    fn rank_is_deterministic() {
        let input: Vec<(Garment, f64)> = scored(&[0.8, 0.4, 0.6]);
        let first = rank(MatchMode::Category, input.clone());
        let second = rank(MatchMode::Category, input);
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_score_survives_the_filter() {
        let results = rank(MatchMode::Category, scored(&[FALLBACK_SCORE]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].confidence, 50);
        assert_eq!(results[0].reason, "Decent match");
    }
}
