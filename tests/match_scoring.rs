//! Alignment scoring behavior exercised through the public API.

use chrono::NaiveDate;
use grant_scout::engine::{
    BudgetRange, CategoryFocus, CategoryTaxonomy, DiscoveryStatus, MatchScorer, Opportunity,
    OpportunityId, Profile,
};

fn profile() -> Profile {
    Profile {
        category_focus: CategoryFocus::Documentary,
        target_communities: vec!["multicultural communities".to_string()],
        impact_areas: vec!["cultural representation".to_string()],
        cultural_tags: vec!["multicultural".to_string(), "indigenous".to_string()],
        budget_range: BudgetRange {
            min: 10_000,
            max: 200_000,
        },
        capabilities: vec!["documentary production".to_string()],
    }
}

fn opportunity() -> Opportunity {
    Opportunity {
        id: OpportunityId("opp-1".to_string()),
        title: "Documentary Development Grant - Cultural Stories".to_string(),
        organization: "Screen Fund".to_string(),
        amount: 50_000,
        deadline: NaiveDate::from_ymd_opt(2026, 12, 1).expect("valid date"),
        category: "documentary".to_string(),
        status: "open".to_string(),
        description: "Support for documentary projects exploring community stories".to_string(),
        category_type: Some("documentary".to_string()),
        target_audience: Some(vec!["general public".to_string()]),
        impact_areas: Some(vec!["cultural representation".to_string()]),
        cultural_tags: Some(vec!["multicultural".to_string()]),
        diversity_focus: Some(true),
        alignment_score: None,
        success_prediction: None,
        recommendations: None,
        discovery_status: DiscoveryStatus::Discovered,
    }
}

#[test]
fn reference_pairing_scores_0_875() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    let score = scorer.score(&opportunity());
    assert!(
        (score - 0.875).abs() < 1e-9,
        "expected 0.875, got {score}"
    );
}

#[test]
fn related_category_still_earns_partial_credit() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    let mut opp = opportunity();
    // "community" shares no synonyms with "documentary".
    opp.category_type = Some("community".to_string());
    let breakdown = scorer.breakdown(&opp);
    assert_eq!(breakdown.category_fit, Some(0.3));
}

#[test]
fn absent_fields_are_skipped_not_zeroed() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    let mut opp = opportunity();
    opp.cultural_tags = None;
    opp.impact_areas = None;

    // Remaining factors (category, budget) are both perfect fits, so the
    // renormalized score should be 1.0, not dragged down by missing data.
    let score = scorer.score(&opp);
    assert!((score - 1.0).abs() < 1e-9, "expected 1.0, got {score}");
}

#[test]
fn fully_absent_data_scores_exactly_zero() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    let mut opp = opportunity();
    opp.category_type = None;
    opp.cultural_tags = None;
    opp.impact_areas = None;
    opp.amount = 0;
    assert_eq!(scorer.score(&opp), 0.0);
}

#[test]
fn score_stays_within_unit_interval_for_outlier_amounts() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    for amount in [1, 5_000, 250_000, u64::MAX / 2] {
        let mut opp = opportunity();
        opp.amount = amount;
        let score = scorer.score(&opp);
        assert!((0.0..=1.0).contains(&score), "amount {amount} gave {score}");
    }
}

#[test]
fn identical_inputs_give_bit_identical_scores() {
    let scorer = MatchScorer::new(profile(), CategoryTaxonomy::default());
    let opp = opportunity();
    let first = scorer.score(&opp);
    let second = scorer.score(&opp);
    assert_eq!(first.to_bits(), second.to_bits());
}
