//! Content records shown on the landing page.
//!
//! These mirror rows of the datastore's `services` and `projects` tables.
//! Optional columns may come back as `null` or be missing entirely; both
//! deserialize to the empty value.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::id::{ProjectId, ServiceId};

/// Category label shown when a project has none.
pub const FALLBACK_CATEGORY: &str = "Case Study";

/// Number of results shown on a project card.
const HEADLINE_RESULTS: usize = 2;

/// A service offered by the agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl Service {
    /// Whether the service carries the "most requested" badge.
    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Image URL, treating an empty string as no image.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        non_empty(self.image_url.as_deref())
    }
}

/// A case-study project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub details: Option<ProjectDetails>,
}

/// Case-study details stored as a JSON column on the project row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub strategy: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl Project {
    /// Image URL, treating an empty string as no image.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        non_empty(self.image_url.as_deref())
    }

    /// Category label, falling back to [`FALLBACK_CATEGORY`].
    #[must_use]
    pub fn category(&self) -> &str {
        non_empty(self.details.as_ref().and_then(|d| d.category.as_deref()))
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// The challenge text, falling back to the description.
    #[must_use]
    pub fn summary(&self) -> &str {
        non_empty(self.details.as_ref().and_then(|d| d.challenge.as_deref()))
            .unwrap_or(&self.description)
    }

    /// Duration label, if one was recorded.
    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        non_empty(self.details.as_ref().and_then(|d| d.duration.as_deref()))
    }

    /// Ordered strategy points.
    #[must_use]
    pub fn strategy(&self) -> &[String] {
        self.details.as_ref().map_or(&[], |d| d.strategy.as_slice())
    }

    /// Ordered result strings.
    #[must_use]
    pub fn results(&self) -> &[String] {
        self.details.as_ref().map_or(&[], |d| d.results.as_slice())
    }

    /// The results shown on the project card.
    #[must_use]
    pub fn headline_results(&self) -> &[String] {
        let results = self.results();
        results.get(..HEADLINE_RESULTS).unwrap_or(results)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
