//! Run report.

use crate::tag::ArtifactTag;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Provision the build container and run setup
    Install,
    /// Run the build command
    Build,
    /// Run the test command
    Test,
    /// Build and push the image
    Publish,
    /// Deploy a preview environment
    Deploy,
}

impl Stage {
    /// Every stage, in order.
    pub const ALL: [Self; 5] = [
        Self::Install,
        Self::Build,
        Self::Test,
        Self::Publish,
        Self::Deploy,
    ];

    /// Lowercase stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Build => "build",
            Self::Test => "test",
            Self::Publish => "publish",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One finished stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    /// Which stage
    pub stage: Stage,
    /// When it started
    pub started_at: DateTime<Utc>,
    /// When it finished
    pub finished_at: DateTime<Utc>,
    /// True when the stage had nothing to do
    pub skipped: bool,
}

/// Result of a preview deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    /// Preview environment name
    pub environment: String,
    /// Tag deployed into it
    pub tag: ArtifactTag,
    /// Status output of the deployment CLI
    pub status: String,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Correlation id of the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended, successfully or not
    pub finished_at: Option<DateTime<Utc>>,
    /// Stages that completed, in order
    pub stages: Vec<StageRecord>,
    /// Stage that failed, if any
    pub failed_stage: Option<Stage>,
    /// Tag of the published image
    pub artifact_tag: Option<ArtifactTag>,
    /// Reference the image was pushed to
    pub published_image: Option<String>,
    /// Preview deployment
    pub deployment: Option<DeploymentReport>,
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl PipelineReport {
    /// Empty report for run `run_id`.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            stages: Vec::new(),
            failed_stage: None,
            artifact_tag: None,
            published_image: None,
            deployment: None,
        }
    }

    /// Names of completed stages, in order.
    #[must_use]
    pub fn completed(&self) -> Vec<Stage> {
        self.stages.iter().map(|record| record.stage).collect()
    }

    /// True when no stage failed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failed_stage.is_none()
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_names() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["install", "build", "test", "publish", "deploy"]);
    }

    #[test]
    fn test_new_report_is_empty() {
        let report = PipelineReport::default();
        assert!(report.succeeded());
        assert!(report.completed().is_empty());
        assert!(report.finished_at.is_none());
    }
}
