use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for discovered opportunities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpportunityId(pub String);

/// Identifier wrapper for application drafts and submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// The operator's primary category focus used when matching opportunity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFocus {
    Documentary,
    Digital,
    Community,
    Multicultural,
}

impl CategoryFocus {
    pub const fn label(self) -> &'static str {
        match self {
            CategoryFocus::Documentary => "documentary",
            CategoryFocus::Digital => "digital",
            CategoryFocus::Community => "community",
            CategoryFocus::Multicultural => "multicultural",
        }
    }
}

/// Inclusive funding band the operator can realistically deliver within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u64,
    pub max: u64,
}

impl BudgetRange {
    pub fn contains(&self, amount: u64) -> bool {
        amount >= self.min && amount <= self.max
    }

    /// True when the amount sits within 20% of either end of the band.
    /// Compared in floating point so fractional bounds are not truncated.
    pub fn near(&self, amount: u64) -> bool {
        let amount = amount as f64;
        amount >= self.min as f64 * 0.8 && amount <= self.max as f64 * 1.2
    }
}

/// The operator's standing focus and preference configuration.
///
/// Built once at startup and passed explicitly into the scorers; the engine
/// never holds a process-wide default profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub category_focus: CategoryFocus,
    pub target_communities: Vec<String>,
    pub impact_areas: Vec<String>,
    pub cultural_tags: Vec<String>,
    pub budget_range: BudgetRange,
    pub capabilities: Vec<String>,
}

impl Profile {
    /// Seed a draft application from the profile for discovery-time success
    /// estimates, before any real application exists for the opportunity.
    pub fn draft_application(&self, opportunity: &Opportunity) -> Application {
        Application {
            id: ApplicationId(format!("draft-{}", opportunity.id.0)),
            opportunity_id: opportunity.id.clone(),
            status: ApplicationStatus::Draft,
            project_title: None,
            project_description: None,
            category_type: Some(self.category_focus.label().to_string()),
            target_audience: Some(self.target_communities.clone()),
            impact_areas: Some(self.impact_areas.clone()),
            cultural_tags: Some(self.cultural_tags.clone()),
            budget_amount: None,
            team_members: Vec::new(),
            completion_pct: None,
        }
    }
}

/// Workflow position of a discovered opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    Discovered,
    Researching,
    Drafting,
    Submitted,
    Successful,
    Unsuccessful,
}

impl DiscoveryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DiscoveryStatus::Discovered => "discovered",
            DiscoveryStatus::Researching => "researching",
            DiscoveryStatus::Drafting => "drafting",
            DiscoveryStatus::Submitted => "submitted",
            DiscoveryStatus::Successful => "successful",
            DiscoveryStatus::Unsuccessful => "unsuccessful",
        }
    }

    /// Allowed forward transitions through the discovery workflow.
    pub fn can_transition_to(self, next: DiscoveryStatus) -> bool {
        matches!(
            (self, next),
            (DiscoveryStatus::Discovered, DiscoveryStatus::Researching)
                | (DiscoveryStatus::Researching, DiscoveryStatus::Drafting)
                | (DiscoveryStatus::Drafting, DiscoveryStatus::Submitted)
                | (DiscoveryStatus::Submitted, DiscoveryStatus::Successful)
                | (DiscoveryStatus::Submitted, DiscoveryStatus::Unsuccessful)
        )
    }
}

/// A candidate grant opportunity produced by a discovery source.
///
/// Tag lists are optional so scorers can distinguish "field not provided"
/// (factor skipped) from "provided but empty" (factor scores zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub title: String,
    pub organization: String,
    pub amount: u64,
    pub deadline: NaiveDate,
    pub category: String,
    pub status: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversity_focus: Option<bool>,
    /// Populated by the discovery pipeline, expressed on a 0-100 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<f64>,
    /// Populated by the discovery pipeline, expressed on a 0-100 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default = "default_discovery_status")]
    pub discovery_status: DiscoveryStatus,
}

fn default_discovery_status() -> DiscoveryStatus {
    DiscoveryStatus::Discovered
}

/// Lifecycle of an application the operator is preparing or has submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    InProgress,
    Submitted,
    Successful,
    Unsuccessful,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Successful => "successful",
            ApplicationStatus::Unsuccessful => "unsuccessful",
        }
    }
}

/// A member of the team attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub cultural_background: Vec<String>,
    #[serde(default)]
    pub media_expertise: Vec<String>,
}

/// The operator's submission attempt against one opportunity.
///
/// Read-only input to the success predictor; the authoring workflow that
/// mutates it lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub opportunity_id: OpportunityId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<u64>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_pct: Option<u8>,
}

/// Aggregate counts over a set of applications for portfolio reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_applications: usize,
    pub submitted: usize,
    pub pending: usize,
    pub won: usize,
    pub success_rate_pct: f64,
    pub category_projects: usize,
    pub cultural_projects: usize,
    pub impact_projects: usize,
}

impl PortfolioMetrics {
    pub fn from_applications(applications: &[Application]) -> Self {
        let total_applications = applications.len();
        let submitted = applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::Submitted)
            .count();
        let pending = applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::InProgress)
            .count();
        let won = applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::Successful)
            .count();
        let success_rate_pct = if total_applications > 0 {
            (won as f64 / total_applications as f64) * 100.0
        } else {
            0.0
        };

        let category_projects = applications
            .iter()
            .filter(|app| app.category_type.is_some())
            .count();
        let cultural_projects = applications
            .iter()
            .filter(|app| {
                app.cultural_tags
                    .as_ref()
                    .is_some_and(|tags| !tags.is_empty())
            })
            .count();
        let impact_projects = applications
            .iter()
            .filter(|app| {
                app.impact_areas
                    .as_ref()
                    .is_some_and(|areas| !areas.is_empty())
            })
            .count();

        Self {
            total_applications,
            submitted,
            pending,
            won,
            success_rate_pct,
            category_projects,
            cultural_projects,
            impact_projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_status_follows_workflow_order() {
        assert!(DiscoveryStatus::Discovered.can_transition_to(DiscoveryStatus::Researching));
        assert!(DiscoveryStatus::Submitted.can_transition_to(DiscoveryStatus::Successful));
        assert!(DiscoveryStatus::Submitted.can_transition_to(DiscoveryStatus::Unsuccessful));
        assert!(!DiscoveryStatus::Discovered.can_transition_to(DiscoveryStatus::Submitted));
        assert!(!DiscoveryStatus::Successful.can_transition_to(DiscoveryStatus::Discovered));
    }

    #[test]
    fn budget_range_loose_band_extends_both_ends() {
        let range = BudgetRange {
            min: 10_000,
            max: 100_000,
        };
        assert!(range.contains(10_000));
        assert!(range.contains(100_000));
        assert!(!range.contains(9_999));
        assert!(range.near(8_000));
        assert!(range.near(120_000));
        assert!(!range.near(7_999));
        assert!(!range.near(120_001));
    }

    #[test]
    fn loose_band_keeps_fractional_bounds() {
        // 0.8 * 10_001 = 8_000.8; truncating that bound would admit 8_000.
        let range = BudgetRange {
            min: 10_001,
            max: 99_999,
        };
        assert!(!range.near(8_000));
        assert!(range.near(8_001));
        // 1.2 * 99_999 = 119_998.8.
        assert!(range.near(119_998));
        assert!(!range.near(119_999));
    }

    #[test]
    fn portfolio_metrics_counts_by_status() {
        let mut apps = Vec::new();
        for (idx, status) in [
            ApplicationStatus::Submitted,
            ApplicationStatus::InProgress,
            ApplicationStatus::Successful,
            ApplicationStatus::Successful,
        ]
        .into_iter()
        .enumerate()
        {
            apps.push(Application {
                id: ApplicationId(format!("app-{idx}")),
                opportunity_id: OpportunityId(format!("opp-{idx}")),
                status,
                project_title: None,
                project_description: None,
                category_type: None,
                target_audience: None,
                impact_areas: None,
                cultural_tags: None,
                budget_amount: None,
                team_members: Vec::new(),
                completion_pct: None,
            });
        }

        let metrics = PortfolioMetrics::from_applications(&apps);
        assert_eq!(metrics.total_applications, 4);
        assert_eq!(metrics.submitted, 1);
        assert_eq!(metrics.pending, 1);
        assert_eq!(metrics.won, 2);
        assert!((metrics.success_rate_pct - 50.0).abs() < f64::EPSILON);
    }
}
