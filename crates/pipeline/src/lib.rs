//! Install, build, test, publish and preview-deploy pipeline
//!
//! [`Pipeline`] runs the five stages over any [`qovery_core::Executor`],
//! threading a [`PipelineState`] from stage to stage and recording a
//! [`PipelineReport`]. The deploy stage drives the deployment CLI through
//! [`qovery_wrapper::QoveryCli`].

pub mod config;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod tag;

pub use config::{DeployConfig, PipelineConfig, PublishConfig};
pub use pipeline::Pipeline;
pub use report::{DeploymentReport, PipelineReport, Stage, StageRecord};
pub use state::PipelineState;
pub use tag::{ArtifactTag, FixedTag, RandomTag, TagGenerator};
