use serde::{Deserialize, Serialize};

use super::domain::{BudgetRange, Opportunity, Profile};
use super::taxonomy::{tag_overlap, CategoryTaxonomy};

/// Relative weights for the four alignment sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub category: f64,
    pub cultural: f64,
    pub impact: f64,
    pub budget: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            category: 0.40,
            cultural: 0.25,
            impact: 0.20,
            budget: 0.15,
        }
    }
}

/// Per-factor alignment decomposition; `None` marks a factor that could not
/// be computed because the relevant fields were absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub category_fit: Option<f64>,
    pub cultural_fit: Option<f64>,
    pub impact_fit: Option<f64>,
    pub budget_fit: Option<f64>,
}

/// Computes profile-to-opportunity alignment as a weighted average over the
/// sub-scores that were actually computable.
///
/// Pure and deterministic: identical inputs always produce identical scores.
pub struct MatchScorer {
    profile: Profile,
    taxonomy: CategoryTaxonomy,
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(profile: Profile, taxonomy: CategoryTaxonomy) -> Self {
        Self::with_weights(profile, taxonomy, MatchWeights::default())
    }

    pub fn with_weights(profile: Profile, taxonomy: CategoryTaxonomy, weights: MatchWeights) -> Self {
        Self {
            profile,
            taxonomy,
            weights,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    /// Alignment score in [0, 1]. Missing optional fields skip their factor;
    /// when no factor is computable the score is exactly zero.
    pub fn score(&self, opportunity: &Opportunity) -> f64 {
        let breakdown = self.breakdown(opportunity);

        let mut weighted_sum = 0.0;
        let mut weight_mass = 0.0;
        for (fit, weight) in [
            (breakdown.category_fit, self.weights.category),
            (breakdown.cultural_fit, self.weights.cultural),
            (breakdown.impact_fit, self.weights.impact),
            (breakdown.budget_fit, self.weights.budget),
        ] {
            if let Some(value) = fit {
                weighted_sum += value * weight;
                weight_mass += weight;
            }
        }

        if weight_mass == 0.0 {
            return 0.0;
        }

        (weighted_sum / weight_mass).clamp(0.0, 1.0)
    }

    /// Per-factor fits for callers that want the decomposition rather than
    /// the folded score.
    pub fn breakdown(&self, opportunity: &Opportunity) -> MatchBreakdown {
        let category_fit = opportunity.category_type.as_deref().map(|category_type| {
            self.taxonomy
                .category_match(category_type, self.profile.category_focus.label())
        });

        let cultural_fit = match &opportunity.cultural_tags {
            Some(tags) if !self.profile.cultural_tags.is_empty() => {
                Some(tag_overlap(tags, &self.profile.cultural_tags))
            }
            _ => None,
        };

        let impact_fit = match &opportunity.impact_areas {
            Some(areas) if !self.profile.impact_areas.is_empty() => {
                Some(tag_overlap(areas, &self.profile.impact_areas))
            }
            _ => None,
        };

        // An unset amount comes through as zero; skip the factor rather than
        // scoring a placeholder value.
        let budget_fit = (opportunity.amount > 0)
            .then(|| budget_fit(opportunity.amount, &self.profile.budget_range));

        MatchBreakdown {
            category_fit,
            cultural_fit,
            impact_fit,
            budget_fit,
        }
    }
}

/// Tiered fit of an opportunity amount against the operator's budget band.
pub(crate) fn budget_fit(amount: u64, range: &BudgetRange) -> f64 {
    if range.contains(amount) {
        1.0
    } else if range.near(amount) {
        0.8
    } else {
        0.3
    }
}
