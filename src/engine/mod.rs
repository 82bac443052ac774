//! Grant opportunity scoring: profile-to-opportunity matching, application
//! success prediction, factor-driven recommendations, and source discovery.

pub mod analysis;
pub mod discovery;
pub mod domain;
pub mod matching;
pub mod prediction;
pub mod taxonomy;

pub use analysis::{
    analyze, opportunity_recommendations, ImprovementOpportunities, RiskAssessment,
    SuccessAnalysis, HIGH_RISK_WEIGHT, MEDIUM_RISK_WEIGHT,
};
pub use discovery::source::{CsvCatalogSource, OpportunitySource, SourceError, StaticSource};
pub use discovery::{
    DiscoveryConfig, DiscoveryEngine, DiscoveryError, DiscoveryResult, MatchDistribution,
};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, BudgetRange, CategoryFocus, DiscoveryStatus,
    Opportunity, OpportunityId, PortfolioMetrics, Profile, TeamMember,
};
pub use matching::{MatchBreakdown, MatchScorer, MatchWeights};
pub use prediction::{
    BaselineTrackRecord, CompetitionEstimator, FactorImpact, FactorKind, FactorWeights,
    HeuristicCompetition, PredictionConfig, ScoreFactor, SuccessPredictor, SuccessPrediction,
    TrackRecordSource, DEFAULT_BASE_SUCCESS_RATE,
};
pub use taxonomy::{tag_overlap, CategoryTaxonomy, RELATED_CATEGORY_SCORE};
