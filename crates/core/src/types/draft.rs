//! Editor drafts for services and projects.
//!
//! An `*Input` holds the raw form values as typed by the editor. Converting it
//! into a `*Draft` trims and normalises the values and enforces the one rule
//! the site owns: title and description must not be empty. Drafts serialize
//! directly into the datastore's insert and update payloads.

use serde::{Deserialize, Serialize};

use crate::types::content::{Project, ProjectDetails, Service};

/// Category given to a new project when the editor leaves it blank.
pub const DEFAULT_PROJECT_CATEGORY: &str = "E-commerce Case Study";

/// Duration given to a new project when the editor leaves it blank.
pub const DEFAULT_PROJECT_DURATION: &str = "خلال 6 أشهر";

/// Validation errors for editor drafts.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("description cannot be empty")]
    EmptyDescription,
}

// =============================================================================
// Services
// =============================================================================

/// Raw service form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// HTML checkboxes are absent when unchecked.
    #[serde(default, deserialize_with = "checkbox")]
    pub featured: bool,
}

impl From<&Service> for ServiceInput {
    fn from(service: &Service) -> Self {
        Self {
            title: service.title.clone(),
            description: service.description.clone(),
            image_url: service.image_url.clone().unwrap_or_default(),
            featured: service.is_featured(),
        }
    }
}

/// A validated service ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub featured: bool,
}

impl TryFrom<&ServiceInput> for ServiceDraft {
    type Error = DraftError;

    fn try_from(input: &ServiceInput) -> Result<Self, Self::Error> {
        let (title, description) = required(&input.title, &input.description)?;
        Ok(Self {
            title,
            description,
            image_url: optional(&input.image_url),
            featured: input.featured,
        })
    }
}

// =============================================================================
// Projects
// =============================================================================

/// Raw project form values. Strategy and results hold one item per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub results: String,
}

impl ProjectInput {
    /// Blank form for a new project, pre-filled with the default labels.
    #[must_use]
    pub fn new_project() -> Self {
        Self {
            category: DEFAULT_PROJECT_CATEGORY.to_string(),
            duration: DEFAULT_PROJECT_DURATION.to_string(),
            ..Self::default()
        }
    }
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        let details = project.details.clone().unwrap_or_default();
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            image_url: project.image_url.clone().unwrap_or_default(),
            challenge: details.challenge.unwrap_or_default(),
            category: details.category.unwrap_or_default(),
            duration: details.duration.unwrap_or_default(),
            strategy: details.strategy.join("\n"),
            results: details.results.join("\n"),
        }
    }
}

/// A validated project ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub details: ProjectDetails,
}

impl TryFrom<&ProjectInput> for ProjectDraft {
    type Error = DraftError;

    fn try_from(input: &ProjectInput) -> Result<Self, Self::Error> {
        let (title, description) = required(&input.title, &input.description)?;

        let challenge = optional(&input.challenge).unwrap_or_else(|| description.clone());
        let category = optional(&input.category)
            .unwrap_or_else(|| DEFAULT_PROJECT_CATEGORY.to_string());
        let duration = optional(&input.duration)
            .unwrap_or_else(|| DEFAULT_PROJECT_DURATION.to_string());

        Ok(Self {
            image_url: optional(&input.image_url),
            details: ProjectDetails {
                challenge: Some(challenge),
                strategy: lines(&input.strategy),
                results: lines(&input.results),
                category: Some(category),
                duration: Some(duration),
            },
            title,
            description,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn required(title: &str, description: &str) -> Result<(String, String), DraftError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DraftError::EmptyTitle);
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(DraftError::EmptyDescription);
    }
    Ok((title.to_string(), description.to_string()))
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Split a textarea into trimmed, non-blank lines.
fn lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    ))
}
