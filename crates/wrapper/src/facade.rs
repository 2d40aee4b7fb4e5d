//! The `QoveryCli` facade.

use crate::container::ContainerAccessor;
use crate::environment::EnvironmentAccessor;
use crate::registry::{AccessorRegistry, Binding};
use qovery_core::{
    ArgumentBuilder, Error, ExecutionContext, Executor, Result, ScopeContext, SecureToken,
    ToolConfig,
};
use std::sync::Arc;

/// Deployment CLI bound to one execution context and one mutable scope.
///
/// The facade starts uninstalled. [`QoveryCli::install`] layers the access
/// token and runs the install script on a base context; from then on every
/// accessor handed out by [`QoveryCli::environment`] or
/// [`QoveryCli::container`] runs against that context with the scope as it
/// is at the moment of the call.
///
/// ```ignore
/// cli.with_project("web")
///     .with_environment("preview-ab12cd3")
///     .environment()
///     .deploy(&DeploySelectors::default(), true, true)
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct QoveryCli {
    tool: Arc<ToolConfig>,
    scope: ScopeContext,
    execution: Option<ExecutionContext>,
    accessors: AccessorRegistry,
}

impl QoveryCli {
    /// Create an uninstalled facade with the default tool configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uninstalled facade for a custom tool configuration.
    #[must_use]
    pub fn with_tool_config(tool: ToolConfig) -> Self {
        Self {
            tool: Arc::new(tool),
            ..Self::default()
        }
    }

    /// Tool configuration in use.
    #[must_use]
    pub fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    /// Current scope.
    #[must_use]
    pub fn scope(&self) -> &ScopeContext {
        &self.scope
    }

    /// Set the organization.
    pub fn with_organization(&mut self, organization: impl Into<String>) -> &mut Self {
        self.scope.with_organization(organization);
        self
    }

    /// Set the project.
    pub fn with_project(&mut self, project: impl Into<String>) -> &mut Self {
        self.scope.with_project(project);
        self
    }

    /// Set the environment.
    pub fn with_environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.scope.with_environment(environment);
        self
    }

    /// Set the cluster.
    pub fn with_cluster(&mut self, cluster: impl Into<String>) -> &mut Self {
        self.scope.with_cluster(cluster);
        self
    }

    /// Replace the whole scope.
    pub fn with_scope(&mut self, scope: ScopeContext) -> &mut Self {
        self.scope = scope;
        self
    }

    /// Provision the standalone bootstrap image described by `tool` and run
    /// its preparation commands, yielding a base context for [`Self::install`].
    #[tracing::instrument(name = "bootstrap_cli_context", skip(executor, tool), fields(image = %tool.bootstrap_image))]
    pub async fn bootstrap_context(
        executor: Arc<dyn Executor>,
        tool: &ToolConfig,
    ) -> Result<ExecutionContext> {
        let mut context = ExecutionContext::provision(executor, &tool.bootstrap_image, None).await?;
        for command in &tool.bootstrap_commands {
            context = context.with_exec(command).await?;
        }
        Ok(context)
    }

    /// Install the CLI on top of `base` with `token` as access token.
    #[tracing::instrument(name = "install_cli", skip_all, fields(tool = %self.tool.binary))]
    pub async fn install(
        &mut self,
        base: &ExecutionContext,
        token: &SecureToken,
    ) -> Result<&mut Self> {
        if token.is_empty() {
            tracing::warn!(token_env = %self.tool.token_env, "Installing with an empty access token");
        }
        let context = base
            .with_secret_variable(&self.tool.token_env, token)
            .await?
            .with_exec(&self.tool.install_command)
            .await?;

        tracing::info!(handle = %context.handle(), "Deployment CLI installed");
        self.execution = Some(context);
        Ok(self)
    }

    /// True once [`Self::install`] has succeeded.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.execution.is_some()
    }

    /// Execution context the CLI is installed in.
    pub fn execution_context(&self) -> Result<&ExecutionContext> {
        self.execution
            .as_ref()
            .ok_or_else(|| Error::not_installed(self.tool.binary.clone()))
    }

    /// Version reported by the installed CLI.
    pub async fn version(&self) -> Result<String> {
        let context = self.execution_context()?;
        let spec = ArgumentBuilder::new([self.tool.binary.as_str(), "version"]).build();
        context.stdout(spec.argv()).await
    }

    fn binding(&self) -> Binding {
        Binding::new(
            Arc::clone(&self.tool),
            self.scope.clone(),
            self.execution.clone(),
        )
    }

    /// Environment operations for the current scope.
    pub fn environment(&mut self) -> &EnvironmentAccessor {
        let binding = self.binding();
        self.accessors.environment(&binding)
    }

    /// Container operations for the current scope.
    pub fn container(&mut self) -> &ContainerAccessor {
        let binding = self.binding();
        self.accessors.container(&binding)
    }
}
