//! Composite match scoring
//!
//! ```text
//! composite = name_score × 0.5
//!           + min(result_score / 1000, 1.0) × 0.3
//!           + 0.3  if the location (or any word of it) appears in the description
//!           + 0.2  if the entity carries a business type
//! ```
//!
//! The scorer only ranks. Whether the winner is good enough is the caller's
//! decision (`MatchPolicy::accepts`).

use std::collections::HashSet;

use super::types::{RawCandidate, ScoredCandidate};

/// Types that mark an entity as a business
pub const BUSINESS_TYPES: [&str; 4] = ["LocalBusiness", "Organization", "Place", "Corporation"];

const NAME_WEIGHT: f64 = 0.5;
const RESULT_SCORE_WEIGHT: f64 = 0.3;
const RESULT_SCORE_SCALE: f64 = 1000.0;
const LOCATION_BONUS: f64 = 0.3;
const TYPE_BONUS: f64 = 0.2;

const EXACT_NAME_SCORE: f64 = 1.0;
const PARTIAL_NAME_SCORE: f64 = 0.8;

/// Scores candidates against one target name and optional location
#[derive(Debug, Clone)]
pub struct MatchScorer {
    target: String,
    location: Option<String>,
}

impl MatchScorer {
    /// Blank locations are treated as absent.
    pub fn new(target_name: &str, location: Option<&str>) -> Self {
        Self {
            target: target_name.to_lowercase(),
            location: location
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
        }
    }

    /// Highest-scoring candidate, or `None` if the batch is empty or nothing
    /// scores above zero. Ties keep the earlier (higher-ranked) candidate.
    pub fn best_match(&self, candidates: &[RawCandidate]) -> Option<ScoredCandidate> {
        let mut best: Option<ScoredCandidate> = None;
        let mut best_score = 0.0;

        for candidate in candidates {
            let scored = self.score_candidate(candidate);
            if scored.score > best_score {
                best_score = scored.score;
                best = Some(scored);
            }
        }

        best
    }

    pub fn score_candidate(&self, candidate: &RawCandidate) -> ScoredCandidate {
        let entity = &candidate.result;
        let name = entity.name.as_deref().unwrap_or_default().to_lowercase();
        let description = entity
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let name_score = name_similarity(&self.target, &name);
        let normalized_result_score = (candidate.result_score / RESULT_SCORE_SCALE).min(1.0);
        let location_score = match &self.location {
            Some(location) if location_mentioned(location, &description) => LOCATION_BONUS,
            _ => 0.0,
        };
        let type_score = if entity
            .types
            .iter()
            .any(|t| BUSINESS_TYPES.contains(&t.as_str()))
        {
            TYPE_BONUS
        } else {
            0.0
        };

        let score = name_score * NAME_WEIGHT
            + normalized_result_score * RESULT_SCORE_WEIGHT
            + location_score
            + type_score;

        ScoredCandidate {
            entity: entity.clone(),
            score,
            name_score,
            normalized_result_score,
            location_score,
            type_score,
            result_score: candidate.result_score,
        }
    }
}

/// Name similarity on already-lowercased inputs.
///
/// 1.0 exact, 0.8 substring either way, otherwise word overlap divided by the
/// larger word-set size. The empty string is a substring of everything, so a
/// nameless candidate lands in the 0.8 tier.
pub fn name_similarity(target: &str, name: &str) -> f64 {
    if target == name {
        return EXACT_NAME_SCORE;
    }
    if name.contains(target) || target.contains(name) {
        return PARTIAL_NAME_SCORE;
    }

    let target_words: HashSet<&str> = target.split_whitespace().collect();
    let name_words: HashSet<&str> = name.split_whitespace().collect();
    if target_words.is_empty() || name_words.is_empty() {
        return 0.0;
    }
    let overlap = target_words.intersection(&name_words).count();
    overlap as f64 / target_words.len().max(name_words.len()) as f64
}

/// Substring test for the full location or any of its words
fn location_mentioned(location: &str, description: &str) -> bool {
    description.contains(location)
        || location
            .split_whitespace()
            .any(|word| description.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_graph::types::EntityRecord;

    fn candidate(name: &str, types: &[&str], description: &str, result_score: f64) -> RawCandidate {
        RawCandidate {
            result_score,
            result: EntityRecord {
                name: Some(name.to_string()),
                description: Some(description.to_string()),
                types: types.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_name_similarity_tiers() {
        assert_eq!(name_similarity("starbucks", "starbucks"), 1.0);
        assert_eq!(name_similarity("starbucks", "starbucks reserve"), 0.8);
        assert_eq!(name_similarity("starbucks reserve roastery", "reserve"), 0.8);
        // 1 shared word of max(3, 2)
        assert!(approx(
            name_similarity("blue bottle cafe", "bottle works"),
            1.0 / 3.0
        ));
        assert_eq!(name_similarity("acme", "zenith"), 0.0);
        assert_eq!(name_similarity("acme", ""), 0.8);
        assert_eq!(name_similarity("", "acme"), 0.8);
        // whitespace-only names have no words to overlap
        assert_eq!(name_similarity("acme", "   "), 0.0);
    }

    #[test]
    fn test_nameless_business_short_circuits() {
        let scorer = MatchScorer::new("Starbucks", None);
        let mut nameless = candidate("", &["LocalBusiness"], "", 900.0);
        nameless.result.name = None;

        let scored = scorer.score_candidate(&nameless);

        assert_eq!(scored.name_score, 0.8);
        // 0.4 + 0.27 + 0.2
        assert!(approx(scored.score, 0.87));
        assert!(crate::config::MatchPolicy::default().is_confident(scored.score));
    }

    #[test]
    fn test_starbucks_composite() {
        let scorer = MatchScorer::new("Starbucks", Some("Seattle"));
        let scored = scorer.score_candidate(&candidate(
            "Starbucks",
            &["LocalBusiness"],
            "Coffee company",
            900.0,
        ));
        assert_eq!(scored.name_score, 1.0);
        assert!(approx(scored.normalized_result_score, 0.9));
        assert_eq!(scored.location_score, 0.0);
        assert_eq!(scored.type_score, 0.2);
        assert!(approx(scored.score, 0.97));
    }

    #[test]
    fn test_location_bonus_on_any_word() {
        let scorer = MatchScorer::new("Kenny Bunch Plumbing", Some("Wylie TX"));
        let scored = scorer.score_candidate(&candidate(
            "Kenny Bunch Plumbing",
            &[],
            "Plumber in Wylie",
            0.0,
        ));
        assert_eq!(scored.location_score, 0.3);

        let no_location = MatchScorer::new("Kenny Bunch Plumbing", Some("  "));
        let scored = no_location.score_candidate(&candidate(
            "Kenny Bunch Plumbing",
            &[],
            "Plumber in Wylie",
            0.0,
        ));
        assert_eq!(scored.location_score, 0.0);
    }

    #[test]
    fn test_result_score_is_capped() {
        let scorer = MatchScorer::new("x", None);
        let scored = scorer.score_candidate(&candidate("unrelated", &[], "", 25_000.0));
        assert_eq!(scored.normalized_result_score, 1.0);
        assert!(approx(scored.score, 0.3));
    }

    #[test]
    fn test_exact_business_name_beats_weaker_name() {
        let scorer = MatchScorer::new("Blue Bottle", None);
        let candidates = vec![
            candidate("Blue Bottle Roasters", &["Organization"], "", 500.0),
            candidate("blue bottle", &["LocalBusiness"], "", 500.0),
        ];
        let best = scorer.best_match(&candidates).unwrap();
        assert_eq!(best.entity.name.as_deref(), Some("blue bottle"));
        assert!(best.score >= 0.5 + 0.3 * 0.5 + 0.2 - 1e-9);
    }

    #[test]
    fn test_best_match_empty_and_zero() {
        let scorer = MatchScorer::new("acme", None);
        assert!(scorer.best_match(&[]).is_none());
        assert!(scorer
            .best_match(&[candidate("zenith", &["Thing"], "", 0.0)])
            .is_none());
    }

    #[test]
    fn test_best_match_returns_low_scores() {
        // the floor belongs to the caller
        let scorer = MatchScorer::new("acme", None);
        let best = scorer
            .best_match(&[candidate("zenith", &[], "", 100.0)])
            .unwrap();
        assert!(approx(best.score, 0.03));
    }

    #[test]
    fn test_ties_keep_first() {
        let scorer = MatchScorer::new("acme", None);
        let mut first = candidate("Acme", &["Place"], "", 400.0);
        first.result.id = Some("first".into());
        let mut second = candidate("Acme", &["Place"], "", 400.0);
        second.result.id = Some("second".into());
        let best = scorer.best_match(&[first, second]).unwrap();
        assert_eq!(best.entity.id.as_deref(), Some("first"));
    }
}
