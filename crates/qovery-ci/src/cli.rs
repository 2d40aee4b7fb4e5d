use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use qovery_core::{EnvironmentType, ScopeContext};
use qovery_wrapper::DeploySelectors;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qovery-ci")]
#[command(about = "Build, test, publish and preview-deploy a project with the Qovery CLI")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Log format", value_enum)]
    pub format: Option<TracingFormat>,

    #[arg(long, global = true, help = "JSON logs and JSON command output")]
    pub json: bool,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "QOVERY_CI_CONFIG",
        help = "Pipeline configuration file (TOML)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "QOVERY_CLI_ACCESS_TOKEN",
        hide_env_values = true,
        help = "Qovery CLI access token"
    )]
    pub token: Option<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

impl Cli {
    /// Log format selected by `--format`, or JSON when `--json` is set.
    pub fn tracing_format(&self) -> TracingFormat {
        match self.format {
            Some(format) => format,
            None if self.json => TracingFormat::Json,
            None => TracingFormat::Compact,
        }
    }
}

/// Scope flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    #[arg(long, global = true, env = "QOVERY_ORGANIZATION", help = "Organization")]
    pub organization: Option<String>,

    #[arg(long, global = true, env = "QOVERY_PROJECT", help = "Project")]
    pub project: Option<String>,

    #[arg(long, global = true, env = "QOVERY_ENVIRONMENT", help = "Environment")]
    pub environment: Option<String>,

    #[arg(long, global = true, env = "QOVERY_CLUSTER", help = "Cluster")]
    pub cluster: Option<String>,
}

impl ScopeArgs {
    /// Overlay the flags that are set onto `scope`.
    pub fn apply(&self, scope: &mut ScopeContext) {
        if let Some(organization) = &self.organization {
            scope.with_organization(organization.as_str());
        }
        if let Some(project) = &self.project {
            scope.with_project(project.as_str());
        }
        if let Some(environment) = &self.environment {
            scope.with_environment(environment.as_str());
        }
        if let Some(cluster) = &self.cluster {
            scope.with_cluster(cluster.as_str());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run install, build, test, publish and deploy")]
    Run(RunArgs),
    #[command(about = "Show the installed Qovery CLI version")]
    Version,
    #[command(about = "Environment operations")]
    Environment {
        #[command(subcommand)]
        subcommand: EnvironmentCommands,
    },
    #[command(about = "Container operations")]
    Container {
        #[command(subcommand)]
        subcommand: ContainerCommands,
    },
}

impl Commands {
    /// Command name for spans.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Version => "version",
            Self::Environment { .. } => "environment",
            Self::Container { .. } => "container",
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(
        long,
        short = 's',
        help = "Source directory to build",
        default_value = "."
    )]
    pub source: PathBuf,

    #[arg(long, env = "REGISTRY_USERNAME", help = "Registry user")]
    pub registry_username: Option<String>,

    #[arg(
        long,
        env = "REGISTRY_PASSWORD",
        hide_env_values = true,
        help = "Registry password or token"
    )]
    pub registry_password: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    #[arg(long, help = "Applications to deploy (name[:version],...)")]
    pub applications: Option<String>,
    #[arg(long, help = "Containers to deploy (name[:tag],...)")]
    pub containers: Option<String>,
    #[arg(long, help = "Cron jobs to deploy")]
    pub cronjobs: Option<String>,
    #[arg(long, help = "Helm charts to deploy")]
    pub helms: Option<String>,
    #[arg(long, help = "Lifecycle jobs to deploy")]
    pub lifecycles: Option<String>,
    #[arg(long, help = "Services to deploy")]
    pub services: Option<String>,
}

impl From<SelectorArgs> for DeploySelectors {
    fn from(args: SelectorArgs) -> Self {
        Self {
            applications: args.applications,
            containers: args.containers,
            cronjobs: args.cronjobs,
            helms: args.helms,
            lifecycles: args.lifecycles,
            services: args.services,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum EnvironmentCommands {
    #[command(about = "List environments of the project")]
    List,
    #[command(about = "Cancel the running deployment")]
    Cancel {
        #[arg(long, help = "Force the cancellation")]
        force: bool,
        #[arg(long, help = "Wait until the operation completes")]
        watch: bool,
    },
    #[command(about = "Clone the environment")]
    Clone {
        #[arg(long, help = "Name of the new environment")]
        new_name: String,
        #[arg(
            long = "type",
            help = "Type of the new environment",
            value_enum,
            default_value_t
        )]
        environment_type: EnvironmentType,
        #[arg(long, help = "Apply the project's deployment rules")]
        apply_deployment_rule: bool,
    },
    #[command(about = "Delete the environment")]
    Delete {
        #[arg(long, help = "Wait until the operation completes")]
        watch: bool,
    },
    #[command(about = "Deploy the environment")]
    Deploy {
        #[command(flatten)]
        selectors: SelectorArgs,
        #[arg(long, help = "Leave paused services untouched")]
        skip_paused_services: bool,
        #[arg(long, help = "Wait until the operation completes")]
        watch: bool,
    },
    #[command(about = "Redeploy the environment")]
    Redeploy {
        #[arg(long, help = "Wait until the operation completes")]
        watch: bool,
    },
    #[command(about = "Show the status of the environment and its services")]
    Statuses,
    #[command(about = "Stop the environment")]
    Stop {
        #[arg(long, help = "Wait until the operation completes")]
        watch: bool,
    },
    #[command(about = "Rename the environment or change its type")]
    Update {
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long = "type", help = "New type", value_enum)]
        environment_type: Option<EnvironmentType>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContainerCommands {
    #[command(about = "Point a container service at a new image or tag")]
    Update {
        #[arg(long, help = "Container service name")]
        container: String,
        #[arg(long, help = "Image name")]
        image_name: Option<String>,
        #[arg(long, help = "Image tag")]
        tag: Option<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["qovery-ci", "version"]).unwrap();

        assert_eq!(cli.level, LogLevel::Info);
        assert!(!cli.json);
        assert_eq!(cli.tracing_format(), TracingFormat::Compact);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_json_selects_json_logs_unless_format_given() {
        let cli = Cli::try_parse_from(["qovery-ci", "--json", "version"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Json);

        let cli =
            Cli::try_parse_from(["qovery-ci", "--json", "--format", "dev", "version"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Dev);
    }

    #[test]
    fn test_scope_flags_are_global() {
        let cli = Cli::try_parse_from([
            "qovery-ci",
            "environment",
            "list",
            "--organization",
            "acme",
            "--project",
            "web",
        ])
        .unwrap();

        let mut scope = ScopeContext::new();
        cli.scope.apply(&mut scope);
        assert_eq!(scope.organization(), Some("acme"));
        assert_eq!(scope.project(), Some("web"));
        assert_eq!(scope.environment(), None);
    }

    #[test]
    fn test_scope_flags_override_existing_scope() {
        let mut scope = ScopeContext::new();
        scope.with_project("from-config").with_cluster("eu-1");
        let args = ScopeArgs {
            project: Some("from-flag".to_string()),
            ..ScopeArgs::default()
        };

        args.apply(&mut scope);

        assert_eq!(scope.project(), Some("from-flag"));
        assert_eq!(scope.cluster(), Some("eu-1"));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["qovery-ci", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        assert_eq!(args.source, PathBuf::from("."));
    }

    #[test]
    fn test_clone_parses_environment_type() {
        let cli = Cli::try_parse_from([
            "qovery-ci",
            "environment",
            "clone",
            "--new-name",
            "preview-ab12cd3",
            "--type",
            "STAGING",
        ])
        .unwrap();

        match cli.command {
            Commands::Environment {
                subcommand:
                    EnvironmentCommands::Clone {
                        new_name,
                        environment_type,
                        apply_deployment_rule,
                    },
            } => {
                assert_eq!(new_name, "preview-ab12cd3");
                assert_eq!(environment_type, EnvironmentType::Staging);
                assert!(!apply_deployment_rule);
            }
            other => panic!("Expected environment clone, got {other:?}"),
        }
    }

    #[test]
    fn test_clone_defaults_to_development() {
        let cli = Cli::try_parse_from([
            "qovery-ci",
            "environment",
            "clone",
            "--new-name",
            "copy",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Environment {
                subcommand: EnvironmentCommands::Clone {
                    environment_type: EnvironmentType::Development,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_deploy_selectors_convert() {
        let cli = Cli::try_parse_from([
            "qovery-ci",
            "environment",
            "deploy",
            "--containers",
            "api:1.2",
            "--skip-paused-services",
            "--watch",
        ])
        .unwrap();

        let Commands::Environment {
            subcommand:
                EnvironmentCommands::Deploy {
                    selectors,
                    skip_paused_services,
                    watch,
                },
        } = cli.command
        else {
            panic!("Expected environment deploy");
        };
        let selectors = DeploySelectors::from(selectors);
        assert_eq!(selectors.containers.as_deref(), Some("api:1.2"));
        assert!(selectors.applications.is_none());
        assert!(skip_paused_services);
        assert!(watch);
    }

    #[test]
    fn test_container_update_requires_container() {
        assert!(Cli::try_parse_from(["qovery-ci", "container", "update"]).is_err());

        let cli = Cli::try_parse_from([
            "qovery-ci",
            "container",
            "update",
            "--container",
            "api",
            "--tag",
            "ab12cd3",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "container");
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(Cli::try_parse_from(["qovery-ci", "--level", "loud", "version"]).is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["qovery-ci"]).is_err());
    }
}
