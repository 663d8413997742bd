//! Cache types for content reads.

use social_culture_core::{Project, ProjectId, Service, ServiceId};

/// Cache key for content reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Services,
    Service(ServiceId),
    Projects,
    Project(ProjectId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Services(Vec<Service>),
    Service(Option<Box<Service>>),
    Projects(Vec<Project>),
    Project(Option<Box<Project>>),
}
