//! Discovery orchestration: fan out over opportunity sources, score and
//! enrich the candidates, then filter, rank, and bucket the survivors.

pub mod source;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::analysis::opportunity_recommendations;
use super::domain::Opportunity;
use super::matching::MatchScorer;
use super::prediction::SuccessPredictor;
use source::{OpportunitySource, SourceError};

/// Settings for one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Minimum alignment score (0-100) a candidate must reach to survive.
    pub min_match_score: f64,
    /// Ranked result cap after filtering.
    pub max_results: usize,
    /// Upper bound on concurrent source fetches.
    pub max_concurrent_fetches: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_match_score: 40.0,
            max_results: 100,
            max_concurrent_fetches: 4,
        }
    }
}

impl DiscoveryConfig {
    fn validate(&self) -> Result<(), DiscoveryError> {
        if !self.min_match_score.is_finite() || !(0.0..=100.0).contains(&self.min_match_score) {
            return Err(DiscoveryError::InvalidConfig(format!(
                "min_match_score must be within 0-100, got {}",
                self.min_match_score
            )));
        }
        if self.max_results == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error raised by a discovery run.
///
/// Individual source failures are tolerated; the run only fails when its
/// configuration is unusable or when every source failed and nothing was
/// gathered.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid discovery configuration: {0}")]
    InvalidConfig(String),
    #[error("no sources available: all {failed} queried sources failed")]
    NoSourcesAvailable { failed: usize },
}

/// Histogram of surviving candidates by alignment band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDistribution {
    /// Alignment 80 and above.
    pub high: usize,
    /// Alignment 60 to 79.
    pub medium: usize,
    /// Alignment 40 to 59.
    pub low: usize,
}

impl MatchDistribution {
    fn bucket(opportunities: &[Opportunity]) -> Self {
        let mut distribution = Self::default();
        for opportunity in opportunities {
            let score = opportunity.alignment_score.unwrap_or(0.0);
            if score >= 80.0 {
                distribution.high += 1;
            } else if score >= 60.0 {
                distribution.medium += 1;
            } else if score >= 40.0 {
                distribution.low += 1;
            }
        }
        distribution
    }
}

/// Outcome of one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Scored, filtered, ranked, and truncated candidates.
    pub opportunities: Vec<Opportunity>,
    /// Candidate count gathered across sources before filtering.
    pub total_found: usize,
    /// Sources that answered successfully.
    pub sources_searched: usize,
    pub match_distribution: MatchDistribution,
    pub recommendations: Vec<String>,
}

/// Orchestrates scoring across configured opportunity sources.
///
/// Holds no mutable state between runs; each `discover` call is a complete,
/// request-scoped pass.
pub struct DiscoveryEngine {
    scorer: MatchScorer,
    predictor: SuccessPredictor,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Build an engine, rejecting unusable configuration up front.
    pub fn new(
        scorer: MatchScorer,
        predictor: SuccessPredictor,
        config: DiscoveryConfig,
    ) -> Result<Self, DiscoveryError> {
        config.validate()?;
        Ok(Self {
            scorer,
            predictor,
            config,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run discovery across the given sources.
    ///
    /// A failing source is logged and contributes zero candidates; the run
    /// only errors when no source could be queried at all or when every
    /// queried source failed without yielding a single candidate.
    pub async fn discover(
        &self,
        sources: &[Arc<dyn OpportunitySource>],
        today: NaiveDate,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let active: Vec<Arc<dyn OpportunitySource>> = sources
            .iter()
            .filter(|source| source.is_active())
            .cloned()
            .collect();
        if active.is_empty() {
            return Err(DiscoveryError::InvalidConfig(
                "at least one active source is required".to_string(),
            ));
        }

        let (candidates, sources_searched, failed) = self.gather(active).await;

        if candidates.is_empty() && sources_searched == 0 {
            return Err(DiscoveryError::NoSourcesAvailable { failed });
        }

        let total_found = candidates.len();
        let mut scored: Vec<Opportunity> = candidates
            .into_iter()
            .map(|opportunity| self.enrich(opportunity, today))
            .collect();

        scored.retain(|opportunity| {
            opportunity.alignment_score.unwrap_or(0.0) >= self.config.min_match_score
        });
        scored.sort_by(|a, b| {
            b.alignment_score
                .unwrap_or(0.0)
                .total_cmp(&a.alignment_score.unwrap_or(0.0))
        });
        scored.truncate(self.config.max_results);

        let match_distribution = MatchDistribution::bucket(&scored);
        let recommendations = discovery_recommendations(&scored, today);

        info!(
            total_found,
            retained = scored.len(),
            sources_searched,
            failed,
            "discovery run complete"
        );

        Ok(DiscoveryResult {
            opportunities: scored,
            total_found,
            sources_searched,
            match_distribution,
            recommendations,
        })
    }

    /// Fetch candidates from every source with a bounded fan-out.
    async fn gather(
        &self,
        sources: Vec<Arc<dyn OpportunitySource>>,
    ) -> (Vec<Opportunity>, usize, usize) {
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut tasks: JoinSet<(String, Result<Vec<Opportunity>, SourceError>)> = JoinSet::new();

        for source in sources {
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                let name = source.name().to_string();
                let permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            name,
                            Err(SourceError::Transport("fetch slot unavailable".to_string())),
                        )
                    }
                };
                let outcome = source.fetch().await;
                drop(permit);
                (name, outcome)
            });
        }

        let mut candidates = Vec::new();
        let mut sources_searched = 0;
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(found))) => {
                    info!(source = %name, count = found.len(), "source answered");
                    candidates.extend(found);
                    sources_searched += 1;
                }
                Ok((name, Err(err))) => {
                    warn!(source = %name, error = %err, "source failed; continuing without it");
                    failed += 1;
                }
                Err(err) => {
                    warn!(error = %err, "source fetch task aborted");
                    failed += 1;
                }
            }
        }

        (candidates, sources_searched, failed)
    }

    /// Attach alignment, success estimate, and approach recommendations.
    fn enrich(&self, mut opportunity: Opportunity, today: NaiveDate) -> Opportunity {
        let alignment = self.scorer.score(&opportunity) * 100.0;
        let draft = self.scorer.profile().draft_application(&opportunity);
        let prediction = self.predictor.predict(&draft, &opportunity, today);

        opportunity.alignment_score = Some(alignment);
        opportunity.success_prediction = Some(prediction.probability * 100.0);
        opportunity.recommendations = Some(opportunity_recommendations(&opportunity));
        opportunity
    }
}

/// Run-level recommendation strings derived from simple aggregates over the
/// surviving candidates.
fn discovery_recommendations(opportunities: &[Opportunity], today: NaiveDate) -> Vec<String> {
    let mut recommendations = Vec::new();

    let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for opportunity in opportunities {
        if let Some(category) = opportunity.category_type.as_deref() {
            *category_counts.entry(category).or_default() += 1;
        }
    }
    if let Some((category, count)) = category_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
    {
        recommendations.push(format!(
            "Focus on {category} grants - {count} opportunities available"
        ));
    }

    let cultural = opportunities
        .iter()
        .filter(|opp| {
            opp.cultural_tags
                .as_ref()
                .is_some_and(|tags| !tags.is_empty())
        })
        .count();
    if cultural > 0 {
        recommendations.push(format!(
            "{cultural} grants with strong cultural representation focus"
        ));
    }

    let impact = opportunities
        .iter()
        .filter(|opp| {
            opp.impact_areas
                .as_ref()
                .is_some_and(|areas| !areas.is_empty())
        })
        .count();
    if impact > 0 {
        recommendations.push(format!("{impact} grants aligned with social impact goals"));
    }

    let closing_soon = opportunities
        .iter()
        .filter(|opp| {
            let days_left = (opp.deadline - today).num_days();
            days_left > 0 && days_left <= 30
        })
        .count();
    if closing_soon > 0 {
        recommendations.push(format!("{closing_soon} grants with deadlines within 30 days"));
    }

    let excellent = opportunities
        .iter()
        .filter(|opp| opp.alignment_score.unwrap_or(0.0) >= 80.0)
        .count();
    if excellent > 0 {
        recommendations.push(format!(
            "{excellent} grants with excellent profile alignment (80%+)"
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_out_of_range_min_score() {
        let config = DiscoveryConfig {
            min_match_score: -5.0,
            ..DiscoveryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DiscoveryError::InvalidConfig(_))
        ));

        let config = DiscoveryConfig {
            min_match_score: 140.0,
            ..DiscoveryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_zero_limits() {
        let config = DiscoveryConfig {
            max_results: 0,
            ..DiscoveryConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DiscoveryConfig {
            max_concurrent_fetches: 0,
            ..DiscoveryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn distribution_buckets_do_not_assume_prefiltering() {
        use crate::engine::domain::{DiscoveryStatus, OpportunityId};
        use chrono::NaiveDate;

        let opportunity = |score: f64| Opportunity {
            id: OpportunityId(format!("opp-{score}")),
            title: String::new(),
            organization: String::new(),
            amount: 1,
            deadline: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
            category: String::new(),
            status: "open".to_string(),
            description: String::new(),
            category_type: None,
            target_audience: None,
            impact_areas: None,
            cultural_tags: None,
            diversity_focus: None,
            alignment_score: Some(score),
            success_prediction: None,
            recommendations: None,
            discovery_status: DiscoveryStatus::Discovered,
        };

        let pool = vec![
            opportunity(92.0),
            opportunity(80.0),
            opportunity(61.0),
            opportunity(45.0),
            opportunity(12.0),
        ];
        let distribution = MatchDistribution::bucket(&pool);
        assert_eq!(distribution.high, 2);
        assert_eq!(distribution.medium, 1);
        assert_eq!(distribution.low, 1);
    }
}
