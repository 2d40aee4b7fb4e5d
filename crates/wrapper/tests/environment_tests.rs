//! Command-line shape of every `qovery environment` verb.

use qovery_core::testing::RecordingExecutor;
use qovery_core::{EnvironmentType, Error, ExecutionContext, SecureToken};
use qovery_wrapper::{DeploySelectors, QoveryCli};
use std::sync::Arc;

async fn installed() -> (Arc<RecordingExecutor>, QoveryCli) {
    let executor = RecordingExecutor::shared();
    let base = ExecutionContext::provision(executor.clone(), "node:22.9.0", None)
        .await
        .unwrap();
    let mut cli = QoveryCli::new();
    cli.install(&base, &SecureToken::new("token")).await.unwrap();
    (executor, cli)
}

fn last_command(executor: &RecordingExecutor) -> Vec<String> {
    executor.commands_for("qovery").pop().unwrap()
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn test_list_requires_only_project() {
    let (executor, mut cli) = installed().await;
    cli.with_project("p1");

    cli.environment().list().await.unwrap();

    assert_eq!(
        last_command(&executor),
        argv(&["qovery", "environment", "list", "--project=p1"])
    );
}

#[tokio::test]
async fn test_list_passes_organization_when_set() {
    let (executor, mut cli) = installed().await;
    cli.with_organization("acme").with_project("p1");

    cli.environment().list().await.unwrap();

    assert_eq!(
        last_command(&executor),
        argv(&[
            "qovery",
            "environment",
            "list",
            "--project=p1",
            "--organization=acme"
        ])
    );
}

#[tokio::test]
async fn test_accessor_follows_latest_scope() {
    let (executor, mut cli) = installed().await;

    cli.with_project("p1").environment().list().await.unwrap();
    cli.with_project("p2").environment().list().await.unwrap();

    let commands = executor.commands_for("qovery");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0][3], "--project=p1");
    assert_eq!(commands[1][3], "--project=p2");
}

#[tokio::test]
async fn test_cancel_with_switches() {
    let (executor, mut cli) = installed().await;
    cli.with_project("p").with_environment("e");

    cli.environment().cancel(true, true).await.unwrap();

    assert_eq!(
        last_command(&executor),
        argv(&[
            "qovery",
            "environment",
            "cancel",
            "--project=p",
            "--environment=e",
            "--force",
            "--watch"
        ])
    );
}

#[tokio::test]
async fn test_cancel_without_switches_emits_no_flags() {
    let (executor, mut cli) = installed().await;
    cli.with_project("p").with_environment("e");

    cli.environment().cancel(false, false).await.unwrap();

    let command = last_command(&executor);
    assert!(!command.iter().any(|t| t == "--force" || t == "--watch"));
}

#[tokio::test]
async fn test_clone_emits_cluster_and_type() {
    let (executor, mut cli) = installed().await;
    cli.with_project("web")
        .with_environment("main")
        .with_cluster("eu-1");

    cli.environment()
        .clone_environment("preview-ab12cd3", EnvironmentType::Development, true)
        .await
        .unwrap();

    assert_eq!(
        last_command(&executor),
        argv(&[
            "qovery",
            "environment",
            "clone",
            "--environment=main",
            "--new-environment-name=preview-ab12cd3",
            "--environment-type=DEVELOPMENT",
            "--cluster=eu-1",
            "--project=web",
            "--apply-deployment-rule=true"
        ])
    );
}

#[tokio::test]
async fn test_clone_without_cluster_is_rejected_before_running() {
    let (executor, mut cli) = installed().await;
    cli.with_project("web").with_environment("main");

    let err = cli
        .environment()
        .clone_environment("copy", EnvironmentType::Staging, false)
        .await
        .unwrap_err();

    assert_eq!(err.missing_fields(), ["cluster".to_string()]);
    assert!(executor.commands_for("qovery").is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_all_reported() {
    let (_executor, mut cli) = installed().await;

    let err = cli.environment().delete(false).await.unwrap_err();

    assert!(matches!(err, Error::MissingContext { .. }));
    assert_eq!(
        err.missing_fields(),
        ["project".to_string(), "environment".to_string()]
    );
}

#[tokio::test]
async fn test_deploy_with_selectors() {
    let (executor, mut cli) = installed().await;
    cli.with_project("p").with_environment("e").with_cluster("c");
    let selectors = DeploySelectors {
        containers: Some("api:1.2,worker".to_string()),
        ..DeploySelectors::default()
    };

    cli.environment()
        .deploy(&selectors, true, false)
        .await
        .unwrap();

    assert_eq!(
        last_command(&executor),
        argv(&[
            "qovery",
            "environment",
            "deploy",
            "--project=p",
            "--environment=e",
            "--cluster=c",
            "--containers=api:1.2,worker",
            "--skip-paused-services"
        ])
    );
}

#[tokio::test]
async fn test_statuses_returns_cli_output() {
    let (executor, mut cli) = installed().await;
    executor.respond(&["qovery", "environment", "statuses"], "{\"state\":\"RUNNING\"}");
    cli.with_project("p").with_environment("e");

    let out = cli.environment().statuses(true).await.unwrap();

    assert_eq!(out, "{\"state\":\"RUNNING\"}");
    assert_eq!(last_command(&executor).last().map(String::as_str), Some("--json"));
}

#[tokio::test]
async fn test_stop_redeploy_and_update() {
    let (executor, mut cli) = installed().await;
    cli.with_project("p").with_environment("e");

    cli.environment().stop(true).await.unwrap();
    cli.environment().redeploy(false).await.unwrap();
    cli.environment()
        .update(Some("renamed"), Some(EnvironmentType::Production))
        .await
        .unwrap();

    let commands = executor.commands_for("qovery");
    assert_eq!(
        commands[0],
        argv(&[
            "qovery",
            "environment",
            "stop",
            "--project=p",
            "--environment=e",
            "--watch"
        ])
    );
    assert_eq!(
        commands[1],
        argv(&[
            "qovery",
            "environment",
            "redeploy",
            "--project=p",
            "--environment=e"
        ])
    );
    assert_eq!(
        commands[2],
        argv(&[
            "qovery",
            "environment",
            "update",
            "--project=p",
            "--environment=e",
            "--name=renamed",
            "--type=PRODUCTION"
        ])
    );
}

#[tokio::test]
async fn test_cli_failure_surfaces_as_execution_error() {
    let (executor, mut cli) = installed().await;
    executor.fail(
        &["qovery", "environment", "delete"],
        2,
        "environment not found",
    );
    cli.with_project("p").with_environment("gone");

    let err = cli.environment().delete(true).await.unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("exit code 2"));
}
