use serde::{Deserialize, Serialize};

use super::domain::{Application, Opportunity};
use super::prediction::{FactorImpact, FactorKind, ScoreFactor};

/// Negative factors heavier than this land in the high-risk bucket.
pub const HIGH_RISK_WEIGHT: f64 = 0.15;

/// Negative factors heavier than this (up to the high threshold) are medium risk.
pub const MEDIUM_RISK_WEIGHT: f64 = 0.08;

/// Completion percentage below which the missing-sections quick win applies.
const COMPLETION_QUICK_WIN_FLOOR: u8 = 80;

/// Negative factors partitioned by the fixed weight thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

/// Improvement work grouped by how quickly it pays off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementOpportunities {
    pub quick_wins: Vec<String>,
    pub medium_term: Vec<String>,
    pub long_term: Vec<String>,
}

/// Deterministic read of a factor breakdown: canned recommendations, risk
/// buckets, and tiered improvement work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessAnalysis {
    pub recommendations: Vec<String>,
    pub risks: RiskAssessment,
    pub improvements: ImprovementOpportunities,
}

/// Remediation strings per factor. New factor, new row; no conditionals.
fn remediation(kind: FactorKind) -> &'static [&'static str] {
    match kind {
        FactorKind::MediaAlignment => &[
            "Strengthen media type alignment with grant requirements",
            "Consider adapting project format to better match grant focus",
        ],
        FactorKind::CulturalRelevance => &[
            "Enhance cultural representation elements in project description",
            "Include cultural consultation and community input",
        ],
        FactorKind::ImpactClarity => &[
            "Add specific, measurable impact outcomes",
            "Include evaluation and measurement strategies",
        ],
        FactorKind::TeamStrength => &[
            "Strengthen team composition with relevant expertise",
            "Include cultural advisors and community representatives",
        ],
        FactorKind::BudgetRealism => &[
            "Review and adjust budget to align with grant amount",
            "Provide detailed budget breakdown and justification",
        ],
        FactorKind::DeadlineProximity => &[
            "Lock the submission timeline ahead of the closing date",
        ],
        FactorKind::CompetitionLevel => &[
            "Differentiate the proposal against the expected applicant pool",
        ],
        FactorKind::TrackRecord => &[
            "Reference comparable delivered projects and their outcomes",
        ],
    }
}

/// Standing recommendations appended to every analysis.
const GENERAL_RECOMMENDATIONS: &[&str] = &[
    "Emphasize the team's track record in cultural storytelling",
    "Highlight community engagement and consultation processes",
    "Demonstrate commitment to diverse representation",
];

const QUICK_WIN_SEEDS: &[&str] = &[
    "Review and refine project description",
    "Add specific impact metrics",
];

const MEDIUM_TERM_SEEDS: &[&str] = &[
    "Strengthen team composition if needed",
    "Enhance cultural consultation processes",
    "Develop detailed budget breakdown",
];

const LONG_TERM_SEEDS: &[&str] = &[
    "Build track record in the target media type",
    "Develop relationships with cultural communities",
    "Establish evaluation and measurement frameworks",
];

/// Map a factor breakdown to recommendations, risk buckets, and improvement
/// tiers. Pure lookup and categorization; the numeric work already happened
/// in the predictor.
pub fn analyze(application: &Application, factors: &[ScoreFactor]) -> SuccessAnalysis {
    let mut recommendations = Vec::new();
    let mut risks = RiskAssessment::default();
    let mut improvements = ImprovementOpportunities {
        quick_wins: Vec::new(),
        medium_term: MEDIUM_TERM_SEEDS.iter().map(|s| s.to_string()).collect(),
        long_term: LONG_TERM_SEEDS.iter().map(|s| s.to_string()).collect(),
    };

    if application
        .completion_pct
        .is_some_and(|pct| pct < COMPLETION_QUICK_WIN_FLOOR)
    {
        improvements
            .quick_wins
            .push("Complete missing application sections".to_string());
    }
    improvements
        .quick_wins
        .extend(QUICK_WIN_SEEDS.iter().map(|s| s.to_string()));

    for factor in factors {
        if factor.impact != FactorImpact::Negative {
            continue;
        }

        for line in remediation(factor.kind) {
            recommendations.push(line.to_string());
        }

        let entry = format!("{}: {}", factor.kind.label(), factor.description);
        let bucket = if factor.weight > HIGH_RISK_WEIGHT {
            &mut risks.high
        } else if factor.weight > MEDIUM_RISK_WEIGHT {
            &mut risks.medium
        } else {
            &mut risks.low
        };
        bucket.push(entry);

        // Heavy negatives are actionable now; lighter ones queue behind them.
        if let Some(first_line) = remediation(factor.kind).first() {
            let tier = if factor.weight > HIGH_RISK_WEIGHT {
                &mut improvements.quick_wins
            } else {
                &mut improvements.medium_term
            };
            let line = first_line.to_string();
            if !tier.contains(&line) {
                tier.push(line);
            }
        }
    }

    recommendations.extend(GENERAL_RECOMMENDATIONS.iter().map(|s| s.to_string()));

    SuccessAnalysis {
        recommendations,
        risks,
        improvements,
    }
}

/// Approach guidance per opportunity category.
fn category_approach(category: &str) -> &'static [&'static str] {
    match category {
        "documentary" => &[
            "Focus on storytelling and community impact",
            "Include diverse voices and perspectives",
        ],
        "digital" => &[
            "Emphasize innovation and digital engagement",
            "Highlight interactive and participatory elements",
        ],
        "community" => &[
            "Demonstrate strong community partnerships",
            "Show clear community engagement strategy",
        ],
        "multicultural" => &[
            "Highlight cultural authenticity and representation",
            "Include cultural consultation and partnerships",
        ],
        _ => &[],
    }
}

/// Canned approach recommendations for one opportunity, driven by which of
/// its descriptive fields are populated.
pub fn opportunity_recommendations(opportunity: &Opportunity) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(category) = opportunity.category_type.as_deref() {
        recommendations.extend(
            category_approach(&category.to_lowercase())
                .iter()
                .map(|s| s.to_string()),
        );
    }

    if opportunity
        .cultural_tags
        .as_ref()
        .is_some_and(|tags| !tags.is_empty())
    {
        recommendations.push("Ensure authentic cultural representation".to_string());
        recommendations.push("Include cultural advisors and community input".to_string());
    }

    if opportunity
        .impact_areas
        .as_ref()
        .is_some_and(|areas| !areas.is_empty())
    {
        recommendations.push("Quantify social impact with measurable outcomes".to_string());
        recommendations.push("Include community feedback and evaluation".to_string());
    }

    if opportunity.diversity_focus == Some(true) {
        recommendations.push("Demonstrate commitment to diversity and inclusion".to_string());
        recommendations.push("Include diverse team and stakeholder representation".to_string());
    }

    recommendations
}
