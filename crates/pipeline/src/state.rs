//! State threaded between pipeline stages.

use crate::tag::ArtifactTag;
use qovery_core::ExecutionContext;

/// Outputs of earlier stages consumed by later ones.
///
/// `execution` is written only by the install stage and `artifact_tag` only
/// by the publish stage; the setters are crate-private for that reason.
/// `workspace` is the context after the build stage ran, when it did.
#[derive(Debug, Default, Clone)]
pub struct PipelineState {
    execution: Option<ExecutionContext>,
    workspace: Option<ExecutionContext>,
    artifact_tag: Option<ArtifactTag>,
}

impl PipelineState {
    /// Context provisioned by the install stage.
    #[must_use]
    pub fn execution(&self) -> Option<&ExecutionContext> {
        self.execution.as_ref()
    }

    /// Context holding the build output, or the install context before the
    /// build stage ran.
    #[must_use]
    pub fn workspace(&self) -> Option<&ExecutionContext> {
        self.workspace.as_ref().or(self.execution.as_ref())
    }

    /// Tag produced by the publish stage.
    #[must_use]
    pub fn artifact_tag(&self) -> Option<&ArtifactTag> {
        self.artifact_tag.as_ref()
    }

    pub(crate) fn set_execution(&mut self, execution: ExecutionContext) {
        self.workspace = None;
        self.execution = Some(execution);
    }

    pub(crate) fn set_workspace(&mut self, workspace: ExecutionContext) {
        self.workspace = Some(workspace);
    }

    pub(crate) fn set_artifact_tag(&mut self, tag: ArtifactTag) {
        self.artifact_tag = Some(tag);
    }
}
