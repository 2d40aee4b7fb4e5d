//! Stage orchestration.
//!
//! Stages run strictly in order and every stage awaits all of its remote
//! work before returning. A failing stage aborts the run; deploying without
//! a published artifact is the one case that returns normally without doing
//! anything.

use crate::config::PipelineConfig;
use crate::report::{DeploymentReport, PipelineReport, Stage, StageRecord};
use crate::state::PipelineState;
use crate::tag::{ArtifactTag, RandomTag, TagGenerator};
use chrono::{DateTime, Utc};
use qovery_core::{
    Error, ExecutionContext, Executor, Layer, PublishRequest, RegistryCredentials, Result,
    SecureToken,
};
use qovery_wrapper::{DeploySelectors, QoveryCli};
use std::path::Path;
use std::sync::Arc;

/// What a successful stage did.
enum StageOutcome {
    Done,
    Skipped,
}

/// Build/deploy pipeline over one execution backend.
pub struct Pipeline {
    config: PipelineConfig,
    executor: Arc<dyn Executor>,
    tags: Box<dyn TagGenerator>,
    state: PipelineState,
    report: PipelineReport,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("backend", &self.executor.name())
            .field("state", &self.state)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline generating random artifact tags.
    #[must_use]
    pub fn new(config: PipelineConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            executor,
            tags: Box::new(RandomTag),
            state: PipelineState::default(),
            report: PipelineReport::default(),
        }
    }

    /// Replace the tag generator.
    #[must_use]
    pub fn with_tag_generator(mut self, tags: impl TagGenerator + 'static) -> Self {
        self.tags = Box::new(tags);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// State produced so far.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Report of the stages run so far.
    #[must_use]
    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    fn require_execution(&self, stage: Stage) -> Result<ExecutionContext> {
        self.state
            .execution()
            .cloned()
            .ok_or_else(|| Error::missing_state(stage.as_str(), "an execution context from install"))
    }

    fn require_workspace(&self, stage: Stage) -> Result<ExecutionContext> {
        self.state
            .workspace()
            .cloned()
            .ok_or_else(|| Error::missing_state(stage.as_str(), "an execution context from install"))
    }

    /// Record the outcome of `stage` and log a checkpoint on success.
    fn finish(
        &mut self,
        stage: Stage,
        started_at: DateTime<Utc>,
        outcome: Result<StageOutcome>,
    ) -> Result<()> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(%stage, error = %err, "Stage failed");
                self.report.failed_stage = Some(stage);
                return Err(err);
            }
        };

        let finished_at = Utc::now();
        let skipped = matches!(outcome, StageOutcome::Skipped);
        let elapsed_ms = (finished_at - started_at).num_milliseconds();
        if skipped {
            tracing::info!(%stage, elapsed_ms, "Stage skipped");
        } else {
            tracing::info!(%stage, elapsed_ms, "Stage complete");
        }
        self.report.stages.push(StageRecord {
            stage,
            started_at,
            finished_at,
            skipped,
        });
        Ok(())
    }

    /// Provision the build container, mount `source` and run the setup commands.
    #[tracing::instrument(name = "stage_install", skip(self), fields(image = %self.config.image))]
    pub async fn install(&mut self, source: &Path) -> Result<&mut Self> {
        let started_at = Utc::now();
        let outcome = self.provision(source).await;
        self.finish(Stage::Install, started_at, outcome)?;
        Ok(self)
    }

    async fn provision(&mut self, source: &Path) -> Result<StageOutcome> {
        let config = &self.config;
        let mut context = ExecutionContext::provision(
            Arc::clone(&self.executor),
            &config.image,
            Some(&config.platform),
        )
        .await?
        .with_layers(&[
            Layer::MountedDirectory {
                path: config.source_mount.clone(),
                source: source.to_path_buf(),
            },
            Layer::Workdir(config.source_mount.clone()),
        ])
        .await?;

        for command in &config.setup {
            context = context.with_exec(command).await?;
        }

        self.state.set_execution(context);
        Ok(StageOutcome::Done)
    }

    /// Run the build command.
    #[tracing::instrument(name = "stage_build", skip(self))]
    pub async fn build(&mut self) -> Result<&mut Self> {
        let started_at = Utc::now();
        let outcome = self.run_build().await;
        self.finish(Stage::Build, started_at, outcome)?;
        Ok(self)
    }

    async fn run_build(&mut self) -> Result<StageOutcome> {
        let context = self.require_execution(Stage::Build)?;
        let built = context.with_exec(&self.config.build_command).await?;
        self.state.set_workspace(built);
        Ok(StageOutcome::Done)
    }

    /// Run the test command.
    #[tracing::instrument(name = "stage_test", skip(self))]
    pub async fn test(&mut self) -> Result<&mut Self> {
        let started_at = Utc::now();
        let outcome = self.run_tests().await;
        self.finish(Stage::Test, started_at, outcome)?;
        Ok(self)
    }

    async fn run_tests(&self) -> Result<StageOutcome> {
        let context = self.require_workspace(Stage::Test)?;
        let output = context.stdout(&self.config.test_command).await?;
        tracing::debug!(output = %output, "Test output");
        Ok(StageOutcome::Done)
    }

    /// Build the image from the mounted source and push it under a fresh tag.
    #[tracing::instrument(name = "stage_publish", skip_all)]
    pub async fn publish(
        &mut self,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<&mut Self> {
        let started_at = Utc::now();
        let outcome = self.push_image(credentials).await;
        self.finish(Stage::Publish, started_at, outcome)?;
        Ok(self)
    }

    async fn push_image(
        &mut self,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<StageOutcome> {
        let context = self.require_workspace(Stage::Publish)?;
        let tag = self.tags.generate()?;
        let publish = &self.config.publish;
        let request = PublishRequest {
            context_dir: self.config.source_mount.clone(),
            dockerfile: publish.dockerfile.clone(),
            platform: Some(publish.platform.clone()),
            address: publish.address(tag.as_str()),
            credentials: credentials.cloned(),
        };

        let reference = context.publish(&request).await?;
        tracing::info!(%tag, image = %reference, "Image published");

        self.report.artifact_tag = Some(tag.clone());
        self.report.published_image = Some(reference);
        self.state.set_artifact_tag(tag);
        Ok(StageOutcome::Done)
    }

    /// Deploy the published artifact into a fresh preview environment.
    ///
    /// Without a published artifact this logs and returns without invoking
    /// the deployment CLI.
    #[tracing::instrument(name = "stage_deploy", skip_all)]
    pub async fn deploy(&mut self, token: &SecureToken) -> Result<&mut Self> {
        let started_at = Utc::now();
        let outcome = match self.state.artifact_tag().cloned() {
            Some(tag) => self.deploy_preview(tag, token).await,
            None => {
                tracing::info!("No artifact tag, nothing to deploy");
                Ok(StageOutcome::Skipped)
            }
        };
        self.finish(Stage::Deploy, started_at, outcome)?;
        Ok(self)
    }

    async fn deploy_preview(
        &mut self,
        tag: ArtifactTag,
        token: &SecureToken,
    ) -> Result<StageOutcome> {
        let context = self.require_execution(Stage::Deploy)?;
        let deploy = &self.config.deploy;
        let preview = tag.preview_environment();
        let image_name = deploy
            .image_name
            .clone()
            .unwrap_or_else(|| self.config.publish.image_name());

        let mut cli = QoveryCli::with_tool_config(self.config.tool.clone());
        cli.install(&context, token).await?;
        cli.with_scope(deploy.scope());

        cli.environment()
            .clone_environment(&preview, deploy.environment_type, false)
            .await?;
        tracing::info!(environment = %preview, "Preview environment cloned");

        cli.with_environment(preview.as_str());
        cli.container()
            .update(&deploy.container, Some(image_name.as_str()), Some(tag.as_str()))
            .await?;
        cli.environment()
            .deploy(&DeploySelectors::default(), true, true)
            .await?;
        let status = cli.environment().statuses(false).await?;

        self.report.deployment = Some(DeploymentReport {
            environment: preview,
            tag,
            status,
        });
        Ok(StageOutcome::Done)
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// [`Self::state`] and [`Self::report`] stay available after a failure.
    #[tracing::instrument(name = "pipeline_run", skip_all, fields(run_id = %self.report.run_id))]
    pub async fn run(
        &mut self,
        source: &Path,
        token: &SecureToken,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<PipelineReport> {
        let outcome = self.run_stages(source, token, credentials).await;
        self.report.finish();
        outcome.map(|()| self.report.clone())
    }

    async fn run_stages(
        &mut self,
        source: &Path,
        token: &SecureToken,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<()> {
        self.install(source)
            .await?
            .build()
            .await?
            .test()
            .await?
            .publish(credentials)
            .await?
            .deploy(token)
            .await?;
        Ok(())
    }
}
