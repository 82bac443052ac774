use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tokio::task;

use crate::engine::domain::{DiscoveryStatus, Opportunity, OpportunityId};

/// Failure fetching or decoding candidates from one source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source transport failure: {0}")]
    Transport(String),
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog data: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog row {row} is invalid: {reason}")]
    Decode { row: usize, reason: String },
}

/// A provider of candidate opportunities.
///
/// The aggregator queries each active source independently and tolerates
/// individual failures; implementations decide the transport.
#[async_trait]
pub trait OpportunitySource: Send + Sync {
    /// Stable identifier used in logs and run statistics.
    fn id(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    /// Inactive sources are skipped without counting as searched or failed.
    fn is_active(&self) -> bool {
        true
    }

    async fn fetch(&self) -> Result<Vec<Opportunity>, SourceError>;
}

/// In-memory source backed by a fixed candidate list.
pub struct StaticSource {
    id: String,
    name: String,
    opportunities: Vec<Opportunity>,
    active: bool,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, opportunities: Vec<Opportunity>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            opportunities,
            active: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[async_trait]
impl OpportunitySource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn fetch(&self) -> Result<Vec<Opportunity>, SourceError> {
        Ok(self.opportunities.clone())
    }
}

/// Source reading opportunities from a CSV catalog export.
///
/// Expected header: `id,title,organization,amount,deadline,category,status,
/// description,category_type,target_audience,impact_areas,cultural_tags,
/// diversity_focus`. List columns are pipe-separated; empty cells mean the
/// field was not provided.
pub struct CsvCatalogSource {
    id: String,
    name: String,
    path: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl OpportunitySource for CsvCatalogSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Opportunity>, SourceError> {
        let path = self.path.clone();
        task::spawn_blocking(move || read_catalog(&path))
            .await
            .map_err(|err| SourceError::Transport(format!("catalog reader task failed: {err}")))?
    }
}

pub(crate) fn read_catalog(path: &Path) -> Result<Vec<Opportunity>, SourceError> {
    let file = std::fs::File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut opportunities = Vec::new();
    for (index, record) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = record?;
        opportunities.push(row.into_opportunity(index + 1)?);
    }
    Ok(opportunities)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    title: String,
    organization: String,
    amount: u64,
    deadline: String,
    category: String,
    status: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    target_audience: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    impact_areas: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cultural_tags: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    diversity_focus: Option<String>,
}

impl CatalogRow {
    fn into_opportunity(self, row: usize) -> Result<Opportunity, SourceError> {
        let deadline = NaiveDate::parse_from_str(&self.deadline, "%Y-%m-%d").map_err(|err| {
            SourceError::Decode {
                row,
                reason: format!("deadline '{}' is not YYYY-MM-DD: {err}", self.deadline),
            }
        })?;

        let diversity_focus = match self.diversity_focus.as_deref() {
            None => None,
            Some("true") | Some("yes") | Some("1") => Some(true),
            Some("false") | Some("no") | Some("0") => Some(false),
            Some(other) => {
                return Err(SourceError::Decode {
                    row,
                    reason: format!("diversity_focus '{other}' is not a boolean"),
                })
            }
        };

        Ok(Opportunity {
            id: OpportunityId(self.id),
            title: self.title,
            organization: self.organization,
            amount: self.amount,
            deadline,
            category: self.category,
            status: self.status,
            description: self.description,
            category_type: self.category_type,
            target_audience: self.target_audience.as_deref().map(split_list),
            impact_areas: self.impact_areas.as_deref().map(split_list),
            cultural_tags: self.cultural_tags.as_deref().map(split_list),
            diversity_focus,
            alignment_score: None,
            success_prediction: None,
            recommendations: None,
            discovery_status: DiscoveryStatus::Discovered,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "id,title,organization,amount,deadline,category,status,description,category_type,target_audience,impact_areas,cultural_tags,diversity_focus";

    fn write_catalog(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}").expect("write header");
        for row in rows {
            writeln!(file, "{row}").expect("write row");
        }
        file
    }

    #[test]
    fn reads_rows_with_pipe_separated_lists() {
        let file = write_catalog(&[
            "g-1,Doc Grant,Fund,50000,2026-10-01,documentary,open,desc,documentary,public|communities,cultural representation,multicultural|indigenous,true",
        ]);
        let opportunities = read_catalog(file.path()).expect("catalog reads");
        assert_eq!(opportunities.len(), 1);
        let opp = &opportunities[0];
        assert_eq!(opp.id, OpportunityId("g-1".to_string()));
        assert_eq!(
            opp.cultural_tags.as_deref(),
            Some(["multicultural".to_string(), "indigenous".to_string()].as_slice())
        );
        assert_eq!(opp.diversity_focus, Some(true));
    }

    #[test]
    fn empty_optional_cells_become_none() {
        let file = write_catalog(&[
            "g-2,Open Grant,Fund,20000,2026-11-15,other,open,,,,,,",
        ]);
        let opportunities = read_catalog(file.path()).expect("catalog reads");
        let opp = &opportunities[0];
        assert!(opp.category_type.is_none());
        assert!(opp.cultural_tags.is_none());
        assert!(opp.diversity_focus.is_none());
    }

    #[test]
    fn bad_deadline_reports_the_row() {
        let file = write_catalog(&[
            "g-3,Bad Grant,Fund,20000,soon,other,open,,,,,,",
        ]);
        let err = read_catalog(file.path()).expect_err("invalid deadline");
        match err {
            SourceError::Decode { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
