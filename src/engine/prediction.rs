use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Application, Opportunity};
use super::taxonomy::{tag_overlap, CategoryTaxonomy};

/// Baseline probability before factor adjustments are applied.
pub const DEFAULT_BASE_SUCCESS_RATE: f64 = 0.65;

/// Neutral fallback used when a factor's inputs are missing.
pub const NEUTRAL_FACTOR_VALUE: f64 = 0.5;

/// Placeholder track-record value until historical outcomes feed the model.
pub const BASELINE_TRACK_RECORD: f64 = 0.6;

/// Raw value above which a factor is tagged positive.
const POSITIVE_IMPACT_FLOOR: f64 = 0.7;

/// Raw value below which a factor is tagged negative.
const NEGATIVE_IMPACT_CEILING: f64 = 0.4;

/// The factors feeding a success prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    MediaAlignment,
    CulturalRelevance,
    ImpactClarity,
    TeamStrength,
    BudgetRealism,
    DeadlineProximity,
    CompetitionLevel,
    TrackRecord,
}

impl FactorKind {
    pub const fn label(self) -> &'static str {
        match self {
            FactorKind::MediaAlignment => "Media Alignment",
            FactorKind::CulturalRelevance => "Cultural Relevance",
            FactorKind::ImpactClarity => "Impact Clarity",
            FactorKind::TeamStrength => "Team Strength",
            FactorKind::BudgetRealism => "Budget Realism",
            FactorKind::DeadlineProximity => "Deadline Proximity",
            FactorKind::CompetitionLevel => "Competition Level",
            FactorKind::TrackRecord => "Track Record",
        }
    }
}

/// Qualitative direction of a factor's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorImpact {
    Positive,
    Negative,
    Neutral,
}

/// A named, weighted, directional contributor to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub kind: FactorKind,
    pub weight: f64,
    pub impact: FactorImpact,
    pub description: String,
    pub niche_specific: bool,
}

/// Per-factor weights applied on top of the base rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub media_alignment: f64,
    pub cultural_relevance: f64,
    pub impact_clarity: f64,
    pub team_strength: f64,
    pub budget_realism: f64,
    pub deadline_proximity: f64,
    pub competition_level: f64,
    pub track_record: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            media_alignment: 0.20,
            cultural_relevance: 0.25,
            impact_clarity: 0.15,
            team_strength: 0.20,
            budget_realism: 0.10,
            deadline_proximity: 0.05,
            competition_level: 0.03,
            track_record: 0.02,
        }
    }
}

/// Tunable prediction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub base_success_rate: f64,
    pub weights: FactorWeights,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_success_rate: DEFAULT_BASE_SUCCESS_RATE,
            weights: FactorWeights::default(),
        }
    }
}

/// Extension point for competition estimates once real applicant-pool data
/// exists. The default implementation keeps the reference heuristic.
pub trait CompetitionEstimator: Send + Sync {
    fn competition_level(&self, opportunity: &Opportunity) -> f64;
}

/// Heuristic competition model: larger pools chase larger grants, scarce
/// categories draw more applicants, diversity-focused rounds draw fewer.
#[derive(Debug, Clone)]
pub struct HeuristicCompetition {
    pub large_amount_threshold: u64,
    pub scarce_category: String,
}

impl Default for HeuristicCompetition {
    fn default() -> Self {
        Self {
            large_amount_threshold: 50_000,
            scarce_category: "documentary".to_string(),
        }
    }
}

impl CompetitionEstimator for HeuristicCompetition {
    fn competition_level(&self, opportunity: &Opportunity) -> f64 {
        let mut level: f64 = 0.5;
        if opportunity.amount > self.large_amount_threshold {
            level += 0.2;
        }
        if opportunity.diversity_focus == Some(true) {
            level -= 0.1;
        }
        if opportunity
            .category_type
            .as_deref()
            .is_some_and(|category| category.eq_ignore_ascii_case(&self.scarce_category))
        {
            level += 0.1;
        }
        level.clamp(0.0, 1.0)
    }
}

/// Extension point for historical-outcome track records.
pub trait TrackRecordSource: Send + Sync {
    fn track_record(&self, application: &Application) -> f64;
}

/// Constant placeholder pending a real submission-history store.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineTrackRecord;

impl TrackRecordSource for BaselineTrackRecord {
    fn track_record(&self, _application: &Application) -> f64 {
        BASELINE_TRACK_RECORD
    }
}

/// Prediction output: clamped probability plus the factor breakdown that
/// feeds recommendation and risk analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessPrediction {
    pub probability: f64,
    pub factors: Vec<ScoreFactor>,
}

/// Estimates application success probability from weighted heuristic factors.
///
/// Total over its inputs: missing optional fields degrade individual factors
/// to neutral defaults instead of failing. `today` is explicit so deadline
/// proximity stays deterministic.
pub struct SuccessPredictor {
    config: PredictionConfig,
    taxonomy: CategoryTaxonomy,
    competition: Box<dyn CompetitionEstimator>,
    track_record: Box<dyn TrackRecordSource>,
}

impl SuccessPredictor {
    pub fn new(config: PredictionConfig, taxonomy: CategoryTaxonomy) -> Self {
        Self::with_models(
            config,
            taxonomy,
            Box::new(HeuristicCompetition::default()),
            Box::new(BaselineTrackRecord),
        )
    }

    pub fn with_models(
        config: PredictionConfig,
        taxonomy: CategoryTaxonomy,
        competition: Box<dyn CompetitionEstimator>,
        track_record: Box<dyn TrackRecordSource>,
    ) -> Self {
        Self {
            config,
            taxonomy,
            competition,
            track_record,
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn predict(
        &self,
        application: &Application,
        opportunity: &Opportunity,
        today: NaiveDate,
    ) -> SuccessPrediction {
        let weights = &self.config.weights;

        let media = self.media_alignment(application, opportunity);
        let cultural = cultural_relevance(application, opportunity);
        let impact = impact_clarity(application);
        let team = team_strength(application);
        let budget = budget_realism(application, opportunity);
        let deadline = deadline_proximity(opportunity, today);
        let competition = self.competition.competition_level(opportunity);
        let track = self.track_record.track_record(application);

        let mut probability = self.config.base_success_rate;
        probability += media * weights.media_alignment;
        probability += cultural * weights.cultural_relevance;
        probability += impact * weights.impact_clarity;
        probability += team * weights.team_strength;
        probability += budget * weights.budget_realism;
        probability += deadline * weights.deadline_proximity;
        probability -= competition * weights.competition_level;
        probability += track * weights.track_record;

        let factors = vec![
            factor(
                FactorKind::MediaAlignment,
                weights.media_alignment,
                media,
                format!(
                    "Category alignment between application ({}) and opportunity ({})",
                    application.category_type.as_deref().unwrap_or("unset"),
                    opportunity.category_type.as_deref().unwrap_or("unset"),
                ),
                true,
            ),
            factor(
                FactorKind::CulturalRelevance,
                weights.cultural_relevance,
                cultural,
                "Cultural representation alignment between application and opportunity".to_string(),
                true,
            ),
            factor(
                FactorKind::ImpactClarity,
                weights.impact_clarity,
                impact,
                "Clarity and measurability of stated impact outcomes".to_string(),
                true,
            ),
            factor(
                FactorKind::TeamStrength,
                weights.team_strength,
                team,
                "Team composition and expertise against project requirements".to_string(),
                true,
            ),
            factor(
                FactorKind::BudgetRealism,
                weights.budget_realism,
                budget,
                "Requested budget against the opportunity amount".to_string(),
                false,
            ),
            factor(
                FactorKind::DeadlineProximity,
                weights.deadline_proximity,
                deadline,
                "Urgency implied by the remaining time before the deadline".to_string(),
                false,
            ),
            inverted_factor(
                FactorKind::CompetitionLevel,
                weights.competition_level,
                competition,
                "Estimated applicant-pool pressure for this opportunity".to_string(),
            ),
            factor(
                FactorKind::TrackRecord,
                weights.track_record,
                track,
                "Historical submission outcomes in comparable rounds".to_string(),
                false,
            ),
        ];

        SuccessPrediction {
            probability: probability.clamp(0.0, 1.0),
            factors,
        }
    }

    fn media_alignment(&self, application: &Application, opportunity: &Opportunity) -> f64 {
        match (
            application.category_type.as_deref(),
            opportunity.category_type.as_deref(),
        ) {
            (Some(app_category), Some(opp_category)) => {
                self.taxonomy.category_match(app_category, opp_category)
            }
            _ => NEUTRAL_FACTOR_VALUE,
        }
    }
}

fn factor(
    kind: FactorKind,
    weight: f64,
    raw: f64,
    description: String,
    niche_specific: bool,
) -> ScoreFactor {
    ScoreFactor {
        kind,
        weight,
        impact: impact_of(raw),
        description,
        niche_specific,
    }
}

/// Competition is subtractive, so a high raw value reads as a negative sign.
fn inverted_factor(kind: FactorKind, weight: f64, raw: f64, description: String) -> ScoreFactor {
    let impact = match impact_of(raw) {
        FactorImpact::Positive => FactorImpact::Negative,
        FactorImpact::Negative => FactorImpact::Positive,
        FactorImpact::Neutral => FactorImpact::Neutral,
    };
    ScoreFactor {
        kind,
        weight,
        impact,
        description,
        niche_specific: false,
    }
}

fn impact_of(raw: f64) -> FactorImpact {
    if raw > POSITIVE_IMPACT_FLOOR {
        FactorImpact::Positive
    } else if raw < NEGATIVE_IMPACT_CEILING {
        FactorImpact::Negative
    } else {
        FactorImpact::Neutral
    }
}

fn cultural_relevance(application: &Application, opportunity: &Opportunity) -> f64 {
    let app_tags = application.cultural_tags.as_deref().unwrap_or(&[]);
    let opp_tags = opportunity.cultural_tags.as_deref().unwrap_or(&[]);
    if app_tags.is_empty() || opp_tags.is_empty() {
        return NEUTRAL_FACTOR_VALUE;
    }
    tag_overlap(app_tags, opp_tags)
}

fn impact_clarity(application: &Application) -> f64 {
    let impact_areas = application.impact_areas.as_deref().unwrap_or(&[]);
    let mut score = NEUTRAL_FACTOR_VALUE;
    if !impact_areas.is_empty() {
        score += 0.2;
    }
    if impact_areas.len() >= 3 {
        score += 0.1;
    }
    let has_measurable_outcomes = impact_areas.iter().any(|area| {
        let lowered = area.to_lowercase();
        lowered.contains("measure") || lowered.contains("metric") || lowered.contains("target")
    });
    if has_measurable_outcomes {
        score += 0.2;
    }
    score.min(1.0)
}

fn team_strength(application: &Application) -> f64 {
    let members = &application.team_members;
    if members.is_empty() {
        return 0.3;
    }

    let mut score = NEUTRAL_FACTOR_VALUE;
    let distinct_roles: std::collections::BTreeSet<&str> =
        members.iter().map(|member| member.role.as_str()).collect();
    if distinct_roles.len() >= 3 {
        score += 0.2;
    }
    if members
        .iter()
        .any(|member| !member.cultural_background.is_empty())
    {
        score += 0.2;
    }
    if members
        .iter()
        .any(|member| !member.media_expertise.is_empty())
    {
        score += 0.1;
    }
    score.min(1.0)
}

fn budget_realism(application: &Application, opportunity: &Opportunity) -> f64 {
    let requested = match application.budget_amount {
        Some(amount) if amount > 0 && opportunity.amount > 0 => amount,
        _ => return NEUTRAL_FACTOR_VALUE,
    };
    let ratio = requested as f64 / opportunity.amount as f64;
    if (0.8..=1.2).contains(&ratio) {
        1.0
    } else if (0.6..=1.4).contains(&ratio) {
        0.8
    } else if (0.4..=1.6).contains(&ratio) {
        0.6
    } else {
        0.3
    }
}

fn deadline_proximity(opportunity: &Opportunity, today: NaiveDate) -> f64 {
    let days_left = (opportunity.deadline - today).num_days();
    if days_left <= 7 {
        0.9
    } else if days_left <= 14 {
        0.7
    } else if days_left <= 30 {
        0.5
    } else if days_left <= 60 {
        0.3
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::{
        ApplicationId, ApplicationStatus, DiscoveryStatus, OpportunityId, TeamMember,
    };

    fn opportunity() -> Opportunity {
        Opportunity {
            id: OpportunityId("opp-1".to_string()),
            title: "Documentary Development Grant".to_string(),
            organization: "Screen Fund".to_string(),
            amount: 60_000,
            deadline: NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date"),
            category: "documentary".to_string(),
            status: "open".to_string(),
            description: "Cultural stories".to_string(),
            category_type: Some("documentary".to_string()),
            target_audience: None,
            impact_areas: Some(vec!["cultural representation".to_string()]),
            cultural_tags: Some(vec!["multicultural".to_string()]),
            diversity_focus: Some(true),
            alignment_score: None,
            success_prediction: None,
            recommendations: None,
            discovery_status: DiscoveryStatus::Discovered,
        }
    }

    fn application() -> Application {
        Application {
            id: ApplicationId("app-1".to_string()),
            opportunity_id: OpportunityId("opp-1".to_string()),
            status: ApplicationStatus::InProgress,
            project_title: Some("Voices".to_string()),
            project_description: None,
            category_type: Some("documentary".to_string()),
            target_audience: None,
            impact_areas: Some(vec![
                "cultural representation".to_string(),
                "community engagement".to_string(),
                "measured audience targets".to_string(),
            ]),
            cultural_tags: Some(vec!["multicultural".to_string()]),
            budget_amount: Some(55_000),
            team_members: vec![
                TeamMember {
                    role: "producer".to_string(),
                    skills: vec![],
                    cultural_background: vec!["multicultural".to_string()],
                    media_expertise: vec!["documentary".to_string()],
                },
                TeamMember {
                    role: "director".to_string(),
                    skills: vec![],
                    cultural_background: vec![],
                    media_expertise: vec![],
                },
                TeamMember {
                    role: "editor".to_string(),
                    skills: vec![],
                    cultural_background: vec![],
                    media_expertise: vec![],
                },
            ],
            completion_pct: Some(70),
        }
    }

    #[test]
    fn probability_stays_clamped() {
        let predictor = SuccessPredictor::new(PredictionConfig::default(), CategoryTaxonomy::default());
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
        let prediction = predictor.predict(&application(), &opportunity(), today);
        assert!((0.0..=1.0).contains(&prediction.probability));
    }

    #[test]
    fn returns_all_eight_factors() {
        let predictor = SuccessPredictor::new(PredictionConfig::default(), CategoryTaxonomy::default());
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
        let prediction = predictor.predict(&application(), &opportunity(), today);
        assert_eq!(prediction.factors.len(), 8);
        let kinds: Vec<FactorKind> = prediction.factors.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&FactorKind::CompetitionLevel));
        assert!(kinds.contains(&FactorKind::TrackRecord));
    }

    #[test]
    fn missing_fields_degrade_to_neutral_defaults() {
        let bare = Application {
            id: ApplicationId("app-2".to_string()),
            opportunity_id: OpportunityId("opp-1".to_string()),
            status: ApplicationStatus::Draft,
            project_title: None,
            project_description: None,
            category_type: None,
            target_audience: None,
            impact_areas: None,
            cultural_tags: None,
            budget_amount: None,
            team_members: Vec::new(),
            completion_pct: None,
        };
        assert_eq!(cultural_relevance(&bare, &opportunity()), NEUTRAL_FACTOR_VALUE);
        assert_eq!(budget_realism(&bare, &opportunity()), NEUTRAL_FACTOR_VALUE);
        assert_eq!(impact_clarity(&bare), NEUTRAL_FACTOR_VALUE);
        assert_eq!(team_strength(&bare), 0.3);
    }

    #[test]
    fn impact_clarity_rewards_breadth_and_measurability() {
        let mut app = application();
        app.impact_areas = Some(vec!["cultural representation".to_string()]);
        assert!((impact_clarity(&app) - 0.7).abs() < 1e-9);

        app.impact_areas = Some(vec![
            "a".to_string(),
            "b".to_string(),
            "clear metric targets".to_string(),
        ]);
        assert!((impact_clarity(&app) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn deadline_buckets_follow_urgency_tiers() {
        let opp = opportunity();
        let base = opp.deadline;
        let expect = [(3, 0.9), (10, 0.7), (21, 0.5), (45, 0.3), (90, 0.1)];
        for (days, value) in expect {
            let today = base - chrono::Duration::days(days);
            assert_eq!(deadline_proximity(&opp, today), value, "{days} days out");
        }
    }

    #[test]
    fn competition_heuristic_combines_adjustments() {
        let model = HeuristicCompetition::default();
        // 0.5 + 0.2 (large) - 0.1 (diversity) + 0.1 (scarce category)
        assert!((model.competition_level(&opportunity()) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn prediction_is_deterministic() {
        let predictor = SuccessPredictor::new(PredictionConfig::default(), CategoryTaxonomy::default());
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
        let first = predictor.predict(&application(), &opportunity(), today);
        let second = predictor.predict(&application(), &opportunity(), today);
        assert_eq!(
            first.probability.to_bits(),
            second.probability.to_bits()
        );
        assert_eq!(first.factors, second.factors);
    }
}
