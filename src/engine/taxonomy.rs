use std::collections::{BTreeMap, BTreeSet};

/// Data-driven synonym table used for category matching.
///
/// Categories expand to a set of related terms so near-miss pairings such as
/// "documentary" vs "film" still register. The table is plain data: new
/// categories are added through [`CategoryTaxonomy::with_entry`] without
/// touching the scoring code.
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    entries: BTreeMap<String, BTreeSet<String>>,
}

/// Partial credit awarded when two categories share no expanded terms.
pub const RELATED_CATEGORY_SCORE: f64 = 0.3;

impl CategoryTaxonomy {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a category and its synonym set, replacing any prior entry.
    pub fn with_entry<I, S>(mut self, category: &str, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = synonyms
            .into_iter()
            .map(|synonym| synonym.into().to_lowercase())
            .collect();
        set.insert(category.to_lowercase());
        self.entries.insert(category.to_lowercase(), set);
        self
    }

    /// Expanded term set for a category; unknown categories expand to nothing.
    pub fn expansion(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(&category.to_lowercase())
    }

    /// Category alignment score: 1.0 when the expanded sets intersect,
    /// otherwise partial credit rather than zero.
    pub fn category_match(&self, left: &str, right: &str) -> f64 {
        let left_terms = self.expansion(left);
        let right_terms = self.expansion(right);
        match (left_terms, right_terms) {
            (Some(a), Some(b)) if !a.is_disjoint(b) => 1.0,
            _ => RELATED_CATEGORY_SCORE,
        }
    }
}

impl Default for CategoryTaxonomy {
    /// The stock media-category table carried over from the operator's
    /// production configuration.
    fn default() -> Self {
        Self::new()
            .with_entry("documentary", ["documentary", "film", "video", "media"])
            .with_entry("digital", ["digital", "online", "web", "interactive"])
            .with_entry(
                "community",
                ["community", "local", "grassroots", "engagement"],
            )
            .with_entry(
                "multicultural",
                ["multicultural", "diversity", "cultural", "inclusive"],
            )
    }
}

/// Overlap ratio between two tag lists: |intersection| / max(|a|, |b|).
///
/// Returns 0 when either side is empty. Matching is case-insensitive.
pub fn tag_overlap(left: &[String], right: &[String]) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let right_lower: BTreeSet<String> = right.iter().map(|tag| tag.to_lowercase()).collect();
    let intersection = left
        .iter()
        .filter(|tag| right_lower.contains(&tag.to_lowercase()))
        .count();

    intersection as f64 / left.len().max(right.len()) as f64
}
