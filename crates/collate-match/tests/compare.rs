//! End-to-end scenarios for the comparison entry point.

use collate_match::compare;
use collate_model::{FieldSpec, MatchConfig, MatchError, MatchTier, Record, TextMetric};

fn default_config() -> MatchConfig {
    MatchConfig::new(
        vec![
            FieldSpec::text("title", 3.0, TextMetric::JaroWinkler),
            FieldSpec::numeric("year", 1.0, 5),
        ],
        "title",
        vec!["title".to_string(), "year".to_string()],
    )
}

fn game(id: &str, title: &str) -> Record {
    Record::new(id).with_text("title", title)
}

fn dated_game(id: &str, title: &str, year: i64) -> Record {
    game(id, title).with_integer("year", year)
}

#[test]
fn exact_duplicate_matches_at_tier_one() {
    let left = vec![game("1", "Pac-Man")];
    let right = vec![game("1", "Pac-Man")];
    let result = compare(left, right, &default_config()).expect("compare");

    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].tier, MatchTier::ExactId);
    assert_eq!(result.matched[0].score, 1.0);
    assert!(result.unmatched_left.is_empty());
    assert!(result.unmatched_right.is_empty());
}

#[test]
fn exact_id_wins_regardless_of_field_dissimilarity() {
    let left = vec![game("7", "Doom")];
    let right = vec![game("7", "Chess")];
    let result = compare(left, right, &default_config()).expect("compare");

    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].tier, MatchTier::ExactId);
    assert_eq!(result.matched[0].score, 1.0);
}

#[test]
fn title_variant_matches_fuzzily_above_point_nine() {
    // No year on either side, so the title+year identity key never forms
    // and the trailing period difference is left to tier 4.
    let left = vec![game("a", "Super Mario Bros.")];
    let right = vec![game("b", "Super Mario Bros")];
    let result = compare(left, right, &default_config()).expect("compare");

    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].tier, MatchTier::Fuzzy);
    assert!(result.matched[0].score >= 0.90);
}

#[test]
fn punctuation_variant_matches_at_the_normalized_key_tier() {
    let config = MatchConfig::new(
        vec![FieldSpec::text("title", 1.0, TextMetric::JaroWinkler)],
        "title",
        vec!["title".to_string()],
    );
    let left = vec![game("a", "Super Mario Bros.")];
    let right = vec![game("b", "The Super Mario Bros")];
    let result = compare(left, right, &config).expect("compare");

    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].tier, MatchTier::NormalizedKey);
    assert_eq!(result.matched[0].score, 0.85);
}

#[test]
fn clearly_different_records_stay_unmatched() {
    let left = vec![game("a", "Doom")];
    let right = vec![game("b", "Quake")];
    let result = compare(left, right, &default_config()).expect("compare");

    assert!(result.matched.is_empty());
    assert!(result.ambiguous.is_empty());
    assert_eq!(result.unmatched_left.len(), 1);
    assert_eq!(result.unmatched_left[0].id, "a");
    assert_eq!(result.unmatched_right.len(), 1);
    assert_eq!(result.unmatched_right[0].id, "b");
}

#[test]
fn near_equal_rivals_surface_as_ambiguous() {
    // Identical titles with different years: both rights clear the fuzzy
    // fast path with the same score, so neither may be auto-committed.
    let left = vec![dated_game("a", "Mega Man", 1990)];
    let right = vec![
        dated_game("b", "Mega Man", 1992),
        dated_game("c", "Mega Man", 1988),
    ];
    let result = compare(left, right, &default_config()).expect("compare");

    assert!(result.matched.is_empty());
    assert!(result.unmatched_left.is_empty());
    assert!(result.unmatched_right.is_empty());
    assert_eq!(result.ambiguous.len(), 1);
    let group = &result.ambiguous[0];
    assert_eq!(group.len(), 2);
    assert!(group.iter().all(|candidate| candidate.left_id == "a"));
}

#[test]
fn multi_field_score_at_threshold_is_accepted() {
    // token-jaccard 0.75 on title (weight 4) and 0.0 on year (weight 1)
    // lands exactly on the 0.60 field threshold.
    let config = MatchConfig::new(
        vec![
            FieldSpec::text("title", 4.0, TextMetric::TokenJaccard),
            FieldSpec::numeric("year", 1.0, 5),
        ],
        "title",
        vec!["title".to_string(), "year".to_string()],
    );
    let left = vec![dated_game("a", "Mega Man Classic One", 1990)];
    let right = vec![dated_game("b", "Mega Man Classic", 1995)];
    let result = compare(left, right, &config).expect("compare");

    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].tier, MatchTier::MultiField);
    assert_eq!(result.matched[0].score, config.field_threshold);
    assert_eq!(result.matched[0].matched_fields, vec!["title"]);
}

#[test]
fn multi_field_score_below_threshold_is_rejected() {
    let config = MatchConfig::new(
        vec![
            FieldSpec::text("title", 4.0, TextMetric::TokenJaccard),
            FieldSpec::numeric("year", 1.0, 5),
        ],
        "title",
        vec!["title".to_string(), "year".to_string()],
    );
    let left = vec![dated_game("a", "Mega Man Classic One", 1990)];
    let right = vec![dated_game("b", "Mega Man", 1995)];
    let result = compare(left, right, &config).expect("compare");

    assert!(result.matched.is_empty());
    assert_eq!(result.unmatched_left.len(), 1);
    assert_eq!(result.unmatched_right.len(), 1);
}

#[test]
fn contested_right_goes_to_the_higher_scorer() {
    let left = vec![
        dated_game("a", "Castlevania Chronicles Arranged", 1993),
        dated_game("b", "Castlevania Chronicles", 2001),
    ];
    let right = vec![dated_game("r", "Castlevania Chronicles", 2001)];
    let result = compare(left, right, &default_config()).expect("compare");

    // "b" matches at tier 2 (identity key) before "a" can claim "r"
    // fuzzily, and "a" has nothing left.
    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].left.id, "b");
    assert_eq!(result.matched[0].tier, MatchTier::ExactKey);
    assert_eq!(result.unmatched_left.len(), 1);
    assert_eq!(result.unmatched_left[0].id, "a");
}

#[test]
fn invalid_config_fails_fast() {
    let mut config = default_config();
    config.field_threshold = -0.2;
    let err = compare(vec![game("a", "Doom")], Vec::new(), &config)
        .expect_err("must fail fast");
    assert_eq!(
        err,
        MatchError::ThresholdOutOfRange {
            name: "field_threshold",
            value: -0.2
        }
    );
}

#[test]
fn empty_collections_compare_cleanly() {
    let result = compare(Vec::new(), Vec::new(), &default_config()).expect("compare");
    assert!(result.matched.is_empty());
    assert!(result.ambiguous.is_empty());
    assert!(result.unmatched_left.is_empty());
    assert!(result.unmatched_right.is_empty());
    assert!(result.is_fully_resolved());
}

#[test]
fn summary_counts_reconcile_with_inputs() {
    let left = vec![
        game("1", "Pac-Man"),
        dated_game("a", "Mega Man", 1990),
        game("x", "Doom"),
    ];
    let right = vec![
        game("1", "Pac-Man"),
        dated_game("b", "Mega Man", 1992),
        dated_game("c", "Mega Man", 1988),
        game("y", "Quake"),
    ];
    let result = compare(left, right, &default_config()).expect("compare");
    let summary = result.summary();

    assert_eq!(summary.left_total, 3);
    assert_eq!(summary.right_total, 4);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.ambiguous_groups, 1);
    assert_eq!(summary.unmatched_left, 1);
    assert_eq!(summary.unmatched_right, 1);
    assert_eq!(summary.matched_by_tier.get("exact-id"), Some(&1));
}
