//! Transcript fraud scorer.
//!
//! Pure and deterministic: transcript text plus the lexicon (and, for the
//! adjustment pass, caller history and safe phrases) in, a score/level/
//! keywords/notes verdict out. No I/O, no clocks, no shared state, so the
//! whole scoring surface is unit-testable and safe to run on any thread.
//!
//! Scoring proceeds in fixed stages: normalize, match weighted phrases with
//! negation handling, compute the base score, add combination and heuristic
//! boosts, raise floors, clamp, and map to a risk level. The orchestrator
//! then applies the repeat-caller boost and safe-phrase dampening through
//! [`apply_adjustments`], in that order, and re-derives the level.
//!
//! Every intermediate lands in [`ScoreNotes`]; the audit record is as much a
//! product of scoring as the number itself.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::lexicon::{
    self, FraudLexicon, ACCOUNT_ACCESS_RULE, CHARITY_RULE, CODE_REQUEST_RULE, COMBO_BOOST_CAP,
    DOLLAR_AMOUNT_RULE, EXPLICIT_SCAM_RULE, FLOOR_ANY_MATCH, FLOOR_CHARITY, FLOOR_EXPLICIT_SCAM,
    FLOOR_HARD_BLOCK, FLOOR_MULTI_CRITICAL, FLOOR_PAYMENT_OR_CODE_REQUEST, FLOOR_SINGLE_CRITICAL,
    FLOOR_THREAT_AND_ACCOUNT_ACCESS, FLOOR_THREE_MATCHES, FLOOR_TWO_MATCHES, HARD_BLOCK_RULE,
    HEURISTIC_BOOST_CAP, IMPERSONATION_PAYMENT_REQUEST_BOOST, IMPERSONATION_RULE,
    NEGATION_MARKERS, NEGATION_WINDOW_CHARS, PAYMENT_APP_RULE, PAYMENT_REQUEST_RULE,
    REPEAT_CALLER_WINDOW_DAYS, SAFE_PHRASE_DAMPENING_CAP, SAFE_PHRASE_DAMPENING_PER_MATCH,
    SECRECY_PAYMENT_APP_BOOST, SECRECY_RULE, THREAT_DOLLAR_AMOUNT_BOOST, THREAT_RULE,
    URGENCY_CODE_REQUEST_BOOST, URGENCY_RULE,
};
use crate::voice::VoiceAnalysis;

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Risk level derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a clamped score to its level: >= 85 critical, >= 70 high,
    /// >= 40 medium, else low.
    pub fn from_score(score: i32) -> Self {
        if score >= 85 {
            Self::Critical
        } else if score >= 70 {
            Self::High
        } else if score >= 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Parse a level string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, crate::error::CoreError> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(crate::error::CoreError::Validation(format!(
                "Invalid risk level '{s}'. Must be one of: low, medium, high, critical"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Per-category hit counts from the heuristic pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryHits {
    pub urgency: u32,
    pub secrecy: u32,
    pub impersonation: u32,
    pub payment_app: u32,
    pub code_request: u32,
    pub explicit_scam: u32,
    pub payment_request: u32,
    pub hard_block: u32,
    pub threat: u32,
    pub account_access: u32,
    pub dollar_amount: u32,
    pub charity: u32,
}

/// The full audit record for one scoring run. Persisted as JSONB alongside
/// the score so a reviewer can reconstruct every contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreNotes {
    pub match_count: u32,
    pub weight_sum: i32,
    pub matched_phrases: Vec<String>,
    pub negated_phrases: Vec<String>,
    pub base_score: f64,
    pub combo_pairs: Vec<String>,
    pub combo_boost: i32,
    pub category_hits: CategoryHits,
    pub heuristic_boost: i32,
    pub floors_applied: Vec<String>,
    pub pre_clamp_score: f64,
    pub repeat_caller_window_days: u32,
    /// Prior calls observed in the window; `None` until the adjustment pass.
    pub prior_calls_in_window: Option<u32>,
    pub repeat_caller_boost: i32,
    pub safe_phrase_matches: Vec<String>,
    pub safe_phrase_dampening: i32,
    /// Voice-detector summary, when the detector ran for this call.
    pub voice_analysis: Option<VoiceAnalysis>,
}

impl ScoreNotes {
    fn empty() -> Self {
        Self {
            match_count: 0,
            weight_sum: 0,
            matched_phrases: Vec::new(),
            negated_phrases: Vec::new(),
            base_score: 0.0,
            combo_pairs: Vec::new(),
            combo_boost: 0,
            category_hits: CategoryHits::default(),
            heuristic_boost: 0,
            floors_applied: Vec::new(),
            pre_clamp_score: 0.0,
            repeat_caller_window_days: REPEAT_CALLER_WINDOW_DAYS,
            prior_calls_in_window: None,
            repeat_caller_boost: 0,
            safe_phrase_matches: Vec::new(),
            safe_phrase_dampening: 0,
            voice_analysis: None,
        }
    }
}

/// The scorer's verdict for one transcript.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    /// Final integer score in [0, 100].
    pub score: i32,
    pub level: RiskLevel,
    /// Matched (non-negated) phrases, deduplicated, in table order.
    pub matched_keywords: Vec<String>,
    pub notes: ScoreNotes,
}

impl ScoreOutcome {
    fn empty() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Low,
            matched_keywords: Vec::new(),
            notes: ScoreNotes::empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a transcript for matching: lowercase, strip punctuation except
/// apostrophes, collapse whitespace.
pub fn normalize_transcript(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut replaced = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_alphanumeric() || c == '\'' {
            replaced.push(c);
        } else {
            replaced.push(' ');
        }
    }
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Matching primitives
// ---------------------------------------------------------------------------

/// Word characters for boundary checks. Apostrophes bind so "don" never
/// matches inside "don't".
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\''
}

/// Byte offsets of all word-boundary occurrences of `needle` in `text`.
fn word_boundary_occurrences(text: &str, needle: &str) -> Vec<usize> {
    let mut hits = Vec::new();
    if needle.is_empty() {
        return hits;
    }
    let mut from = 0;
    while let Some(rel) = text[from..].find(needle) {
        let start = from + rel;
        let end = start + needle.len();
        let boundary_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let boundary_after = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if boundary_before && boundary_after {
            hits.push(start);
        }
        let step = text[start..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);
        from = start + step;
    }
    hits
}

/// Whether the 40-character window preceding `match_start` contains a
/// negation marker.
fn occurrence_is_negated(text: &str, match_start: usize) -> bool {
    let prefix = &text[..match_start];
    let window_start = prefix
        .char_indices()
        .rev()
        .take(NEGATION_WINDOW_CHARS)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(prefix.len());
    let window = &prefix[window_start..];
    NEGATION_MARKERS.iter().any(|marker| window.contains(marker))
}

/// Count non-negated word-boundary occurrences of any term in the list.
fn count_terms(text: &str, terms: &[&str]) -> u32 {
    let mut hits = 0;
    for term in terms {
        for start in word_boundary_occurrences(text, term) {
            if !occurrence_is_negated(text, start) {
                hits += 1;
            }
        }
    }
    hits
}

/// Count matches across a compiled pattern set.
fn count_pattern_hits(text: &str, patterns: &[regex::Regex]) -> u32 {
    patterns
        .iter()
        .map(|re| re.find_iter(text).count() as u32)
        .sum()
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a raw transcript against the lexicon.
///
/// Repeat-caller and safe-phrase adjustments are NOT applied here; the
/// orchestrator layers them on via [`apply_adjustments`] once it has the
/// caller history and the profile's safe phrases.
pub fn score_transcript(raw: &str, lexicon: &FraudLexicon) -> ScoreOutcome {
    let normalized = normalize_transcript(raw);
    if normalized.is_empty() {
        return ScoreOutcome::empty();
    }
    // Dollar amounts are matched against the raw lowercased text because
    // normalization strips '$'.
    let raw_lower = raw.to_lowercase();

    // Weighted phrase matching with negation handling. A phrase counts once
    // no matter how often it occurs; a phrase whose every occurrence is
    // negated is recorded but excluded from scoring.
    let mut matched: Vec<&'static str> = Vec::new();
    let mut negated: Vec<&'static str> = Vec::new();
    let mut weight_sum: i32 = 0;
    let mut critical_matches: u32 = 0;
    for entry in lexicon.phrases {
        let occurrences = word_boundary_occurrences(&normalized, entry.phrase);
        if occurrences.is_empty() {
            continue;
        }
        let any_clean = occurrences
            .iter()
            .any(|&start| !occurrence_is_negated(&normalized, start));
        if any_clean {
            matched.push(entry.phrase);
            weight_sum += entry.weight;
            if entry.critical {
                critical_matches += 1;
            }
        } else {
            negated.push(entry.phrase);
        }
    }
    let match_count = matched.len() as u32;

    // Base score: linear in match count and weight sum, then scaled by a log
    // factor so many distinct matches compound.
    let mut score = (match_count as f64 / 4.0) * 40.0 + (weight_sum as f64 / 100.0) * 60.0;
    score *= (match_count as f64 + 1.0).ln().max(1.0);
    let base_score = score;

    // Combination boosts.
    let matched_set: HashSet<&str> = matched.iter().copied().collect();
    let mut combo_boost = 0;
    let mut combo_pairs = Vec::new();
    for rule in lexicon.combos {
        if matched_set.contains(rule.first) && matched_set.contains(rule.second) {
            combo_boost += rule.boost;
            combo_pairs.push(format!("{} + {}", rule.first, rule.second));
        }
    }
    combo_boost = combo_boost.min(COMBO_BOOST_CAP);
    score += combo_boost as f64;

    // Heuristic category counting. Term lists are negation-aware like the
    // phrase table; regex hits are counted as written.
    let hits = CategoryHits {
        urgency: count_terms(&normalized, lexicon.urgency_terms),
        secrecy: count_terms(&normalized, lexicon.secrecy_terms),
        impersonation: count_terms(&normalized, lexicon.impersonation_terms),
        payment_app: count_terms(&normalized, lexicon.payment_app_terms),
        code_request: count_terms(&normalized, lexicon.code_request_terms),
        explicit_scam: count_terms(&normalized, lexicon.explicit_scam_terms),
        payment_request: count_pattern_hits(&normalized, &lexicon.payment_request_patterns),
        hard_block: count_terms(&normalized, lexicon.hard_block_terms)
            + count_pattern_hits(&normalized, &lexicon.hard_block_patterns),
        threat: count_terms(&normalized, lexicon.threat_terms),
        account_access: count_terms(&normalized, lexicon.account_access_terms),
        dollar_amount: count_pattern_hits(&raw_lower, &lexicon.dollar_amount_patterns),
        charity: count_terms(&normalized, lexicon.charity_terms),
    };
    let heuristic_boost = heuristic_boost_for(&hits);
    score += heuristic_boost as f64;

    // Floors: monotonic raises only. Every floor whose condition held is
    // recorded, whether or not it moved the score.
    let mut floors: Vec<(&'static str, i32)> = Vec::new();
    if hits.explicit_scam >= 1 {
        floors.push(("explicit_scam", FLOOR_EXPLICIT_SCAM));
    }
    if hits.hard_block >= 1 {
        floors.push(("hard_block", FLOOR_HARD_BLOCK));
    }
    if critical_matches >= 2 {
        floors.push(("multiple_critical_keywords", FLOOR_MULTI_CRITICAL));
    } else if critical_matches == 1 {
        floors.push(("critical_keyword", FLOOR_SINGLE_CRITICAL));
    }
    if match_count >= 3 {
        floors.push(("three_or_more_matches", FLOOR_THREE_MATCHES));
    } else if match_count == 2 {
        floors.push(("two_matches", FLOOR_TWO_MATCHES));
    } else if match_count == 1 {
        floors.push(("any_match", FLOOR_ANY_MATCH));
    }
    if hits.payment_request >= 1 || hits.code_request >= 1 {
        floors.push(("payment_or_code_request", FLOOR_PAYMENT_OR_CODE_REQUEST));
    }
    if hits.threat >= 1 && hits.account_access >= 1 {
        floors.push(("threat_and_account_access", FLOOR_THREAT_AND_ACCOUNT_ACCESS));
    }
    if hits.charity >= 1 {
        floors.push(("charity", FLOOR_CHARITY));
    }
    let mut floors_applied = Vec::with_capacity(floors.len());
    for (label, value) in floors {
        if (value as f64) > score {
            score = value as f64;
        }
        floors_applied.push(label.to_string());
    }

    let pre_clamp_score = score;
    let final_score = score.clamp(0.0, 100.0).round() as i32;

    ScoreOutcome {
        score: final_score,
        level: RiskLevel::from_score(final_score),
        matched_keywords: matched.iter().map(|s| s.to_string()).collect(),
        notes: ScoreNotes {
            match_count,
            weight_sum,
            matched_phrases: matched.iter().map(|s| s.to_string()).collect(),
            negated_phrases: negated.iter().map(|s| s.to_string()).collect(),
            base_score,
            combo_pairs,
            combo_boost,
            category_hits: hits,
            heuristic_boost,
            floors_applied,
            pre_clamp_score,
            repeat_caller_window_days: REPEAT_CALLER_WINDOW_DAYS,
            prior_calls_in_window: None,
            repeat_caller_boost: 0,
            safe_phrase_matches: Vec::new(),
            safe_phrase_dampening: 0,
            voice_analysis: None,
        },
    }
}

/// Sum the per-category and stacked-pair boosts, capped.
fn heuristic_boost_for(hits: &CategoryHits) -> i32 {
    let mut boost = 0;
    let apply = |count: u32, rule: lexicon::CategoryRule| -> i32 {
        if count >= rule.min_hits {
            rule.boost
        } else {
            0
        }
    };
    boost += apply(hits.urgency, URGENCY_RULE);
    boost += apply(hits.secrecy, SECRECY_RULE);
    boost += apply(hits.impersonation, IMPERSONATION_RULE);
    boost += apply(hits.payment_app, PAYMENT_APP_RULE);
    boost += apply(hits.code_request, CODE_REQUEST_RULE);
    boost += apply(hits.explicit_scam, EXPLICIT_SCAM_RULE);
    boost += apply(hits.payment_request, PAYMENT_REQUEST_RULE);
    boost += apply(hits.hard_block, HARD_BLOCK_RULE);
    boost += apply(hits.threat, THREAT_RULE);
    boost += apply(hits.account_access, ACCOUNT_ACCESS_RULE);
    boost += apply(hits.dollar_amount, DOLLAR_AMOUNT_RULE);
    boost += apply(hits.charity, CHARITY_RULE);

    // Stacked category pairs.
    if hits.secrecy >= 1 && hits.payment_app >= 1 {
        boost += SECRECY_PAYMENT_APP_BOOST;
    }
    if hits.urgency >= 1 && hits.code_request >= 1 {
        boost += URGENCY_CODE_REQUEST_BOOST;
    }
    if hits.impersonation >= 1 && hits.payment_request >= 1 {
        boost += IMPERSONATION_PAYMENT_REQUEST_BOOST;
    }
    if hits.threat >= 1 && hits.dollar_amount >= 1 {
        boost += THREAT_DOLLAR_AMOUNT_BOOST;
    }

    boost.min(HEURISTIC_BOOST_CAP)
}

// ---------------------------------------------------------------------------
// Post-scoring adjustments
// ---------------------------------------------------------------------------

/// Repeat-caller boost from the caller-history count: 0 for 0 or 1 prior
/// calls, +5 for 2 to 4, +10 for 5 or more.
pub fn repeat_caller_boost(prior_calls_in_window: u32) -> i32 {
    match prior_calls_in_window {
        0..=1 => 0,
        2..=4 => 5,
        _ => 10,
    }
}

/// Safe phrases from the profile that match the transcript, case-insensitive
/// and whole-phrase on word boundaries.
pub fn match_safe_phrases(raw: &str, safe_phrases: &[String]) -> Vec<String> {
    let normalized = normalize_transcript(raw);
    let mut matches = Vec::new();
    for candidate in safe_phrases {
        let needle = normalize_transcript(candidate);
        if needle.is_empty() {
            continue;
        }
        if !word_boundary_occurrences(&normalized, &needle).is_empty() {
            matches.push(candidate.clone());
        }
    }
    matches
}

/// Total dampening for a number of safe-phrase matches, capped.
pub fn safe_phrase_dampening(match_count: usize) -> i32 {
    (match_count as i32 * SAFE_PHRASE_DAMPENING_PER_MATCH).min(SAFE_PHRASE_DAMPENING_CAP)
}

/// Apply the orchestrator-side adjustments in their fixed order: add the
/// repeat-caller boost (clamped to 100), subtract safe-phrase dampening
/// (clamped to 0), then re-derive the level from the adjusted score.
pub fn apply_adjustments(
    outcome: &mut ScoreOutcome,
    prior_calls_in_window: u32,
    safe_phrase_matches: Vec<String>,
) {
    let boost = repeat_caller_boost(prior_calls_in_window);
    let dampening = safe_phrase_dampening(safe_phrase_matches.len());

    let boosted = (outcome.score + boost).min(100);
    let adjusted = (boosted - dampening).max(0);

    outcome.score = adjusted;
    outcome.level = RiskLevel::from_score(adjusted);
    outcome.notes.prior_calls_in_window = Some(prior_calls_in_window);
    outcome.notes.repeat_caller_boost = boost;
    outcome.notes.safe_phrase_dampening = dampening;
    outcome.notes.safe_phrase_matches = safe_phrase_matches;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> FraudLexicon {
        FraudLexicon::builtin()
    }

    // -- Normalization -----------------------------------------------------

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize_transcript("Hello, this IS the I.R.S.!"),
            "hello this is the i r s"
        );
    }

    #[test]
    fn normalize_keeps_apostrophes() {
        assert_eq!(normalize_transcript("Don't tell anyone"), "don't tell anyone");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_transcript("  pay   now \n please "), "pay now please");
    }

    #[test]
    fn normalize_of_punctuation_only_is_empty() {
        assert_eq!(normalize_transcript("... !? ,,"), "");
    }

    // -- Word-boundary matching --------------------------------------------

    #[test]
    fn phrase_inside_a_longer_word_does_not_match() {
        let outcome = score_transcript("the dog scampered away", &lexicon());
        assert_eq!(outcome.score, 0);
        assert!(outcome.matched_keywords.is_empty());
    }

    #[test]
    fn phrase_at_text_edges_matches() {
        let outcome = score_transcript("scam", &lexicon());
        assert!(outcome.matched_keywords.contains(&"scam".to_string()));
    }

    #[test]
    fn repeated_occurrences_count_once() {
        let lex = lexicon();
        let once = score_transcript("start a wire transfer today", &lex);
        let twice = score_transcript("start a wire transfer wire transfer today", &lex);
        assert_eq!(once.score, twice.score);
        assert_eq!(once.matched_keywords, twice.matched_keywords);
    }

    // -- Negation ----------------------------------------------------------

    #[test]
    fn negated_scam_scores_zero() {
        let outcome = score_transcript("I will not scam you", &lexicon());
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.level, RiskLevel::Low);
        assert!(outcome.matched_keywords.is_empty());
        assert_eq!(outcome.notes.negated_phrases, vec!["scam".to_string()]);
        assert_eq!(outcome.notes.category_hits.explicit_scam, 0);
    }

    #[test]
    fn unnegated_scam_floors_to_critical() {
        let outcome = score_transcript("I will scam you", &lexicon());
        assert!(outcome.score >= 90);
        assert_eq!(outcome.level, RiskLevel::Critical);
        assert!(outcome.matched_keywords.contains(&"scam".to_string()));
    }

    #[test]
    fn negation_marker_outside_the_window_does_not_negate() {
        // 44 characters of filler between "not" and the phrase push the
        // marker past the 40-character window.
        let filler = "a ".repeat(22);
        let text = format!("not {filler}scam");
        let outcome = score_transcript(&text, &lexicon());
        assert!(outcome.matched_keywords.contains(&"scam".to_string()));
        assert!(outcome.score >= 90);
    }

    #[test]
    fn one_clean_occurrence_outweighs_a_negated_one() {
        // The second occurrence sits more than 40 characters past the "not",
        // so the phrase counts as matched, not negated.
        let text = "this is not a scam well let me be honest with you my friend it truly is a scam";
        let outcome = score_transcript(text, &lexicon());
        assert!(outcome.matched_keywords.contains(&"scam".to_string()));
        assert!(outcome.notes.negated_phrases.is_empty());
    }

    // -- Base score and combos ---------------------------------------------

    #[test]
    fn base_score_follows_the_formula() {
        // "suspended" alone: weight 20, one match.
        // (1/4)*40 + (20/100)*60 = 22, times max(1, ln 2) = 22.
        let outcome = score_transcript("your service has been suspended", &lexicon());
        assert_eq!(outcome.notes.match_count, 1);
        assert_eq!(outcome.notes.weight_sum, 20);
        assert!((outcome.notes.base_score - 22.0).abs() < 1e-9);
    }

    #[test]
    fn combo_boost_applies_for_matched_pairs() {
        let outcome = score_transcript("the irs will arrest you", &lexicon());
        assert_eq!(outcome.notes.combo_boost, 10);
        assert!(outcome
            .notes
            .combo_pairs
            .contains(&"irs + arrest".to_string()));
    }

    #[test]
    fn combo_boost_is_capped_at_twenty() {
        let text = "the irs has a warrant for your arrest unless you buy a gift card";
        let outcome = score_transcript(text, &lexicon());
        assert_eq!(outcome.notes.combo_boost, COMBO_BOOST_CAP);
    }

    // -- Heuristic boosts --------------------------------------------------

    #[test]
    fn single_urgency_term_earns_no_boost() {
        // Urgency needs two hits before it contributes.
        let outcome = score_transcript("please reply urgent", &lexicon());
        assert_eq!(outcome.notes.category_hits.urgency, 1);
        assert_eq!(outcome.notes.heuristic_boost, 0);
    }

    #[test]
    fn heuristic_boost_is_capped_at_seventy() {
        let text = "this scam needs a gift card send money now read me the \
                    verification code and don't tell anyone or face arrest over \
                    your bank account";
        let outcome = score_transcript(text, &lexicon());
        assert_eq!(outcome.notes.heuristic_boost, HEURISTIC_BOOST_CAP);
    }

    #[test]
    fn dollar_amounts_are_detected_in_raw_text() {
        // '$' never survives normalization, so the raw text must be used.
        let outcome = score_transcript("you owe $4,200 to the government", &lexicon());
        assert!(outcome.notes.category_hits.dollar_amount >= 1);
    }

    // -- Floors ------------------------------------------------------------

    #[test]
    fn explicit_scam_floors_to_ninety() {
        let outcome = score_transcript("scam", &lexicon());
        assert_eq!(outcome.score, 90);
        assert!(outcome
            .notes
            .floors_applied
            .contains(&"explicit_scam".to_string()));
    }

    #[test]
    fn hard_block_floors_to_ninety_five() {
        let outcome = score_transcript("buy a gift card", &lexicon());
        assert_eq!(outcome.score, 95);
        assert!(outcome
            .notes
            .floors_applied
            .contains(&"hard_block".to_string()));
    }

    #[test]
    fn single_match_floors_to_sixty() {
        let outcome = score_transcript("please consider a donation", &lexicon());
        assert_eq!(outcome.score, 60);
        assert_eq!(outcome.level, RiskLevel::Medium);
    }

    #[test]
    fn payment_request_floors_to_seventy() {
        let outcome = score_transcript("you must pay immediately", &lexicon());
        assert!(outcome.notes.category_hits.payment_request >= 1);
        assert_eq!(outcome.score, 70);
        assert_eq!(outcome.level, RiskLevel::High);
    }

    #[test]
    fn threat_with_account_access_floors_to_eighty() {
        let outcome =
            score_transcript("there is a warrant we need your account number", &lexicon());
        assert!(outcome
            .notes
            .floors_applied
            .contains(&"threat_and_account_access".to_string()));
        assert_eq!(outcome.score, 80);
        assert_eq!(outcome.level, RiskLevel::High);
    }

    #[test]
    fn floors_never_lower_a_higher_score() {
        // A transcript already above every floor keeps its computed score.
        let text = "the irs has a warrant for your arrest pay immediately \
                    with a gift card or wire transfer";
        let outcome = score_transcript(text, &lexicon());
        assert_eq!(outcome.score, 100);
    }

    // -- Level mapping -----------------------------------------------------

    #[test]
    fn level_boundaries_match_the_mapping() {
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(85), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(84), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
    }

    // -- Empty input -------------------------------------------------------

    #[test]
    fn empty_transcript_short_circuits() {
        let outcome = score_transcript("", &lexicon());
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.level, RiskLevel::Low);
        assert!(outcome.matched_keywords.is_empty());
        assert_eq!(outcome.notes.match_count, 0);
    }

    #[test]
    fn punctuation_only_transcript_short_circuits() {
        let outcome = score_transcript("... !!! ???", &lexicon());
        assert_eq!(outcome.score, 0);
    }

    // -- Adjustments -------------------------------------------------------

    #[test]
    fn repeat_caller_boost_tiers() {
        assert_eq!(repeat_caller_boost(0), 0);
        assert_eq!(repeat_caller_boost(1), 0);
        assert_eq!(repeat_caller_boost(2), 5);
        assert_eq!(repeat_caller_boost(4), 5);
        assert_eq!(repeat_caller_boost(5), 10);
        assert_eq!(repeat_caller_boost(50), 10);
    }

    #[test]
    fn boost_is_clamped_to_one_hundred() {
        let mut outcome = score_transcript("buy a gift card", &lexicon());
        assert_eq!(outcome.score, 95);
        apply_adjustments(&mut outcome, 7, Vec::new());
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.level, RiskLevel::Critical);
        assert_eq!(outcome.notes.repeat_caller_boost, 10);
        assert_eq!(outcome.notes.prior_calls_in_window, Some(7));
    }

    #[test]
    fn dampening_is_subtracted_after_the_boost() {
        let mut outcome =
            score_transcript("there is a warrant we need your account number", &lexicon());
        assert_eq!(outcome.score, 80);
        // +10 boost clamps at 90, then two safe phrases subtract 30.
        apply_adjustments(
            &mut outcome,
            6,
            vec!["weekly check in".into(), "poker night".into()],
        );
        assert_eq!(outcome.score, 60);
        assert_eq!(outcome.level, RiskLevel::Medium);
        assert_eq!(outcome.notes.safe_phrase_dampening, 30);
    }

    #[test]
    fn dampening_never_goes_below_zero() {
        let mut outcome = score_transcript("please consider a donation", &lexicon());
        assert_eq!(outcome.score, 60);
        let phrases: Vec<String> = (0..6).map(|i| format!("safe phrase {i}")).collect();
        apply_adjustments(&mut outcome, 0, phrases);
        assert_eq!(outcome.score, 15);

        let mut low = ScoreOutcome::empty();
        low.score = 10;
        apply_adjustments(&mut low, 0, vec!["one".into(), "two".into(), "three".into()]);
        assert_eq!(low.score, 0);
        assert_eq!(low.level, RiskLevel::Low);
    }

    #[test]
    fn dampening_is_capped() {
        let phrases: Vec<String> = (0..20).map(|i| format!("phrase {i}")).collect();
        assert_eq!(safe_phrase_dampening(phrases.len()), SAFE_PHRASE_DAMPENING_CAP);
    }

    #[test]
    fn relevel_follows_the_adjusted_score() {
        let mut outcome = score_transcript("please consider a donation", &lexicon());
        assert_eq!(outcome.level, RiskLevel::Medium);
        apply_adjustments(&mut outcome, 0, vec!["donation drive".into(), "book club".into()]);
        assert_eq!(outcome.score, 30);
        assert_eq!(outcome.level, RiskLevel::Low);
    }

    // -- Safe phrase matching ----------------------------------------------

    #[test]
    fn safe_phrases_match_case_insensitively() {
        let matches = match_safe_phrases(
            "It's your GRANDSON calling about Poker Night",
            &["poker night".to_string(), "grandson calling".to_string()],
        );
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn safe_phrases_require_whole_phrase_boundaries() {
        let matches = match_safe_phrases(
            "your grandson is here",
            &["grand".to_string(), "son".to_string()],
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn empty_safe_phrases_are_ignored() {
        let matches = match_safe_phrases("anything at all", &["".to_string(), "  ".to_string()]);
        assert!(matches.is_empty());
    }

    // -- End-to-end scenarios ----------------------------------------------

    #[test]
    fn irs_gift_card_script_maxes_out() {
        let text = "Hi this is the IRS, you must pay immediately with a gift card or face arrest";
        let outcome = score_transcript(text, &lexicon());
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.level, RiskLevel::Critical);
        for expected in ["irs", "gift card", "immediately", "arrest"] {
            assert!(
                outcome.matched_keywords.contains(&expected.to_string()),
                "expected '{expected}' in matched keywords"
            );
        }
    }

    #[test]
    fn innocent_family_call_scores_zero() {
        let mut outcome =
            score_transcript("Hi mom, just calling to say hi, call me back", &lexicon());
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.level, RiskLevel::Low);
        assert!(outcome.matched_keywords.is_empty());

        apply_adjustments(&mut outcome, 0, Vec::new());
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.level, RiskLevel::Low);
    }

    // -- Notes serialization -----------------------------------------------

    #[test]
    fn notes_serialize_with_audit_fields() {
        let outcome = score_transcript("the irs will arrest you", &lexicon());
        let json = serde_json::to_value(&outcome.notes).unwrap();
        for key in [
            "match_count",
            "weight_sum",
            "matched_phrases",
            "negated_phrases",
            "base_score",
            "combo_boost",
            "category_hits",
            "heuristic_boost",
            "floors_applied",
            "pre_clamp_score",
            "repeat_caller_window_days",
            "safe_phrase_matches",
        ] {
            assert!(json.get(key).is_some(), "missing notes key '{key}'");
        }
    }
}
