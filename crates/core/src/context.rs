//! Addressing scope shared by every accessor.
//!
//! A [`ScopeContext`] carries the organization/project/environment/cluster
//! tuple that targets a remote operation. It is mutated in place through the
//! fluent `with_*` methods; accessors receive a fresh copy every time they are
//! handed out so they never act on stale values.

use serde::{Deserialize, Serialize};

/// Name of the organization field as reported in validation errors.
pub const ORGANIZATION: &str = "organization";
/// Name of the project field as reported in validation errors.
pub const PROJECT: &str = "project";
/// Name of the environment field as reported in validation errors.
pub const ENVIRONMENT: &str = "environment";
/// Name of the cluster field as reported in validation errors.
pub const CLUSTER: &str = "cluster";

/// Organization → project → environment → cluster addressing tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeContext {
    /// Organization name
    pub organization: Option<String>,
    /// Project name
    pub project: Option<String>,
    /// Environment name
    pub environment: Option<String>,
    /// Cluster name
    pub cluster: Option<String>,
}

impl ScopeContext {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the organization.
    pub fn with_organization(&mut self, organization: impl Into<String>) -> &mut Self {
        self.organization = Some(organization.into());
        self
    }

    /// Overwrite the project.
    pub fn with_project(&mut self, project: impl Into<String>) -> &mut Self {
        self.project = Some(project.into());
        self
    }

    /// Overwrite the environment.
    pub fn with_environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.environment = Some(environment.into());
        self
    }

    /// Overwrite the cluster.
    pub fn with_cluster(&mut self, cluster: impl Into<String>) -> &mut Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Organization as `&str`.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Project as `&str`.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Environment as `&str`.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Cluster as `&str`.
    #[must_use]
    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }
}
