//! Command execution.

use crate::cli::{Cli, Commands, ContainerCommands, EnvironmentCommands, RunArgs, ScopeArgs};
use qovery_core::{Error, RegistryCredentials, SecureToken};
use qovery_dagger::create_dagger_executor;
use qovery_pipeline::{Pipeline, PipelineConfig, PipelineReport};
use qovery_wrapper::QoveryCli;

/// Run the selected command, printing its output on stdout.
pub async fn execute(cli: Cli) -> miette::Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    let token = SecureToken::new(cli.token.unwrap_or_default());

    match cli.command {
        Commands::Run(args) => {
            let report = run_pipeline(config, &cli.scope, &token, args).await?;
            print_report(&report, cli.json)?;
        }
        Commands::Version => {
            let qovery = installed_cli(&config, &cli.scope, &token).await?;
            println!("{}", qovery.version().await?.trim_end());
        }
        Commands::Environment { subcommand } => {
            let mut qovery = installed_cli(&config, &cli.scope, &token).await?;
            let output = environment(&mut qovery, subcommand, cli.json).await?;
            println!("{}", output.trim_end());
        }
        Commands::Container { subcommand } => {
            let mut qovery = installed_cli(&config, &cli.scope, &token).await?;
            let output = container(&mut qovery, subcommand).await?;
            println!("{}", output.trim_end());
        }
    }
    Ok(())
}

/// Scope flags override the `[deploy]` section for this run.
fn apply_scope_overrides(config: &mut PipelineConfig, scope: &ScopeArgs) {
    let deploy = &mut config.deploy;
    if scope.organization.is_some() {
        deploy.organization.clone_from(&scope.organization);
    }
    if scope.project.is_some() {
        deploy.project.clone_from(&scope.project);
    }
    if scope.environment.is_some() {
        deploy.template_environment.clone_from(&scope.environment);
    }
    if scope.cluster.is_some() {
        deploy.cluster.clone_from(&scope.cluster);
    }
}

fn registry_credentials(config: &PipelineConfig, args: RunArgs) -> Option<RegistryCredentials> {
    match (args.registry_username, args.registry_password) {
        (Some(username), Some(password)) => Some(RegistryCredentials {
            registry: config.publish.registry.clone(),
            username,
            password: SecureToken::new(password),
        }),
        (None, None) => None,
        _ => {
            tracing::warn!("Registry username and password must be given together; pushing anonymously");
            None
        }
    }
}

async fn run_pipeline(
    mut config: PipelineConfig,
    scope: &ScopeArgs,
    token: &SecureToken,
    args: RunArgs,
) -> qovery_core::Result<PipelineReport> {
    apply_scope_overrides(&mut config, scope);
    let source = args.source.clone();
    let credentials = registry_credentials(&config, args);

    let mut pipeline = Pipeline::new(config, create_dagger_executor());
    let outcome = pipeline.run(&source, token, credentials.as_ref()).await;
    if outcome.is_err() {
        tracing::debug!(report = ?pipeline.report(), "Pipeline aborted");
    }
    outcome
}

fn print_report(report: &PipelineReport, json: bool) -> miette::Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report)
            .map_err(|e| miette::miette!("Failed to render report: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    for record in &report.stages {
        let marker = if record.skipped { "skipped" } else { "ok" };
        println!("{:<8} {marker}", record.stage);
    }
    if let Some(image) = &report.published_image {
        println!("image    {image}");
    }
    if let Some(deployment) = &report.deployment {
        println!("preview  {}", deployment.environment);
        println!("{}", deployment.status.trim_end());
    }
    Ok(())
}

/// Standalone CLI container with the scope taken from the `[deploy]`
/// section and the command-line flags.
async fn installed_cli(
    config: &PipelineConfig,
    scope: &ScopeArgs,
    token: &SecureToken,
) -> qovery_core::Result<QoveryCli> {
    if token.is_empty() {
        return Err(Error::configuration(
            "missing Qovery access token: pass --token or set QOVERY_CLI_ACCESS_TOKEN",
        ));
    }

    let base = QoveryCli::bootstrap_context(create_dagger_executor(), &config.tool).await?;
    let mut qovery = QoveryCli::with_tool_config(config.tool.clone());
    qovery.install(&base, token).await?;

    let mut context = config.deploy.scope();
    scope.apply(&mut context);
    qovery.with_scope(context);
    Ok(qovery)
}

async fn environment(
    qovery: &mut QoveryCli,
    command: EnvironmentCommands,
    json: bool,
) -> qovery_core::Result<String> {
    let environment = qovery.environment();
    match command {
        EnvironmentCommands::List => environment.list().await,
        EnvironmentCommands::Cancel { force, watch } => environment.cancel(force, watch).await,
        EnvironmentCommands::Clone {
            new_name,
            environment_type,
            apply_deployment_rule,
        } => {
            environment
                .clone_environment(&new_name, environment_type, apply_deployment_rule)
                .await
        }
        EnvironmentCommands::Delete { watch } => environment.delete(watch).await,
        EnvironmentCommands::Deploy {
            selectors,
            skip_paused_services,
            watch,
        } => {
            environment
                .deploy(&selectors.into(), skip_paused_services, watch)
                .await
        }
        EnvironmentCommands::Redeploy { watch } => environment.redeploy(watch).await,
        EnvironmentCommands::Statuses => environment.statuses(json).await,
        EnvironmentCommands::Stop { watch } => environment.stop(watch).await,
        EnvironmentCommands::Update {
            name,
            environment_type,
        } => environment.update(name.as_deref(), environment_type).await,
    }
}

async fn container(
    qovery: &mut QoveryCli,
    command: ContainerCommands,
) -> qovery_core::Result<String> {
    match command {
        ContainerCommands::Update {
            container,
            image_name,
            tag,
        } => {
            qovery
                .container()
                .update(&container, image_name.as_deref(), tag.as_deref())
                .await
        }
    }
}
