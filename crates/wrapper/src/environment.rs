//! `qovery environment` operations.

use crate::registry::{Accessor, Binding, run};
use qovery_core::context::{CLUSTER, ENVIRONMENT, ORGANIZATION, PROJECT};
use qovery_core::{ArgumentBuilder, EnvironmentType, Result, ScopeContext, require_context};

/// Service selectors for a partial environment deploy.
///
/// Each field is a comma-separated list of `name` or `name:version` entries,
/// passed through to the CLI untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySelectors {
    /// Applications to deploy
    pub applications: Option<String>,
    /// Containers to deploy
    pub containers: Option<String>,
    /// Cron jobs to deploy
    pub cronjobs: Option<String>,
    /// Helm charts to deploy
    pub helms: Option<String>,
    /// Lifecycle jobs to deploy
    pub lifecycles: Option<String>,
    /// Services to deploy
    pub services: Option<String>,
}

/// Lifecycle operations on the environment selected by the current scope.
#[derive(Debug, Default)]
pub struct EnvironmentAccessor {
    binding: Binding,
}

impl Accessor for EnvironmentAccessor {
    fn sync(&mut self, binding: &Binding) {
        self.binding = binding.clone();
    }
}

impl EnvironmentAccessor {
    /// Scope this accessor currently targets.
    #[must_use]
    pub fn scope(&self) -> &ScopeContext {
        self.binding.scope()
    }

    fn command(&self, verb: &'static str) -> ArgumentBuilder<'_> {
        ArgumentBuilder::new([self.binding.binary(), "environment", verb])
    }

    /// Project and environment are required by every verb except `list`.
    fn require_target(&self) -> Result<(&str, &str)> {
        let scope = self.scope();
        require_context(&[
            (PROJECT, scope.project()),
            (ENVIRONMENT, scope.environment()),
        ])?;
        Ok((
            scope.project().unwrap_or_default(),
            scope.environment().unwrap_or_default(),
        ))
    }

    /// List all environments of the project.
    pub async fn list(&self) -> Result<String> {
        let execution = self.binding.execution()?;
        let scope = self.scope();
        require_context(&[(PROJECT, scope.project())])?;

        let spec = self
            .command("list")
            .mandatory(PROJECT, scope.project().unwrap_or_default())
            .value(ORGANIZATION, scope.organization())
            .build();
        run(execution, spec).await
    }

    /// Cancel the running deployment.
    pub async fn cancel(&self, force: bool, watch: bool) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;

        let spec = self
            .command("cancel")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, self.scope().organization())
            .switch("force", force)
            .switch("watch", watch)
            .build();
        run(execution, spec).await
    }

    /// Clone the environment into `new_name` on the scoped cluster.
    pub async fn clone_environment(
        &self,
        new_name: &str,
        environment_type: EnvironmentType,
        apply_deployment_rule: bool,
    ) -> Result<String> {
        let execution = self.binding.execution()?;
        let scope = self.scope();
        require_context(&[
            (PROJECT, scope.project()),
            (ENVIRONMENT, scope.environment()),
            (CLUSTER, scope.cluster()),
        ])?;

        let spec = self
            .command("clone")
            .mandatory(ENVIRONMENT, scope.environment().unwrap_or_default())
            .mandatory("new-environment-name", new_name)
            .mandatory("environment-type", environment_type.as_str())
            .mandatory(CLUSTER, scope.cluster().unwrap_or_default())
            .mandatory(PROJECT, scope.project().unwrap_or_default())
            .value(ORGANIZATION, scope.organization())
            .value(
                "apply-deployment-rule",
                apply_deployment_rule.then_some("true"),
            )
            .build();
        run(execution, spec).await
    }

    /// Delete the environment.
    pub async fn delete(&self, watch: bool) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;

        let spec = self
            .command("delete")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, self.scope().organization())
            .switch("watch", watch)
            .build();
        run(execution, spec).await
    }

    /// Deploy the environment, optionally restricted to `selectors`.
    pub async fn deploy(
        &self,
        selectors: &DeploySelectors,
        skip_paused_services: bool,
        watch: bool,
    ) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;
        let scope = self.scope();

        let spec = self
            .command("deploy")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, scope.organization())
            .value(CLUSTER, scope.cluster())
            .value("applications", selectors.applications.as_deref())
            .value("containers", selectors.containers.as_deref())
            .value("cronjobs", selectors.cronjobs.as_deref())
            .value("helms", selectors.helms.as_deref())
            .value("lifecycles", selectors.lifecycles.as_deref())
            .value("services", selectors.services.as_deref())
            .switch("skip-paused-services", skip_paused_services)
            .switch("watch", watch)
            .build();
        run(execution, spec).await
    }

    /// Redeploy the environment.
    pub async fn redeploy(&self, watch: bool) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;

        let spec = self
            .command("redeploy")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, self.scope().organization())
            .switch("watch", watch)
            .build();
        run(execution, spec).await
    }

    /// Status of the environment and its services.
    pub async fn statuses(&self, json: bool) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;
        let scope = self.scope();

        let spec = self
            .command("statuses")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, scope.organization())
            .value(CLUSTER, scope.cluster())
            .switch("json", json)
            .build();
        run(execution, spec).await
    }

    /// Stop the environment.
    pub async fn stop(&self, watch: bool) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;
        let scope = self.scope();

        let spec = self
            .command("stop")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value(ORGANIZATION, scope.organization())
            .value(CLUSTER, scope.cluster())
            .switch("watch", watch)
            .build();
        run(execution, spec).await
    }

    /// Rename the environment or change its type.
    pub async fn update(
        &self,
        new_name: Option<&str>,
        environment_type: Option<EnvironmentType>,
    ) -> Result<String> {
        let execution = self.binding.execution()?;
        let (project, environment) = self.require_target()?;

        let spec = self
            .command("update")
            .mandatory(PROJECT, project)
            .mandatory(ENVIRONMENT, environment)
            .value("name", new_name)
            .value("type", environment_type.map(EnvironmentType::as_str))
            .value(ORGANIZATION, self.scope().organization())
            .build();
        run(execution, spec).await
    }
}
