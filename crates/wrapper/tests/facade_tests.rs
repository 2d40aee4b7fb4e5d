//! Install lifecycle and container operations through the facade.

use qovery_core::testing::{Call, RecordingExecutor};
use qovery_core::{EnvironmentType, Error, ExecutionContext, SecureToken, ToolConfig};
use qovery_wrapper::QoveryCli;
use std::sync::Arc;

async fn base_context(executor: &Arc<RecordingExecutor>) -> ExecutionContext {
    ExecutionContext::provision(executor.clone(), "node:22.9.0", Some("linux/amd64"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_uninstalled_facade_rejects_every_operation() {
    let mut cli = QoveryCli::new();
    cli.with_project("p").with_environment("e");

    assert!(!cli.is_installed());
    assert!(matches!(
        cli.execution_context().unwrap_err(),
        Error::NotInstalled { .. }
    ));
    assert!(matches!(
        cli.version().await.unwrap_err(),
        Error::NotInstalled { .. }
    ));
    assert!(matches!(
        cli.environment().list().await.unwrap_err(),
        Error::NotInstalled { .. }
    ));
    assert!(matches!(
        cli.container().update("api", None, None).await.unwrap_err(),
        Error::NotInstalled { .. }
    ));
}

#[tokio::test]
async fn test_install_layers_token_then_runs_script() {
    let executor = RecordingExecutor::shared();
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();

    cli.install(&base, &SecureToken::new("s3cr3t")).await.unwrap();

    assert!(cli.is_installed());
    assert_eq!(
        executor.layers(),
        vec!["SECRET QOVERY_CLI_ACCESS_TOKEN".to_string()]
    );
    let commands = executor.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0][0], "bash");
    assert!(commands[0][2].contains("get.qovery.com"));

    // The base context is untouched; the facade holds the installed one
    assert_ne!(cli.execution_context().unwrap().handle(), base.handle());
}

#[tokio::test]
async fn test_install_failure_leaves_facade_uninstalled() {
    let executor = RecordingExecutor::shared();
    executor.fail(&["bash", "-c"], 6, "could not resolve host");
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();

    let err = cli
        .install(&base, &SecureToken::new("t"))
        .await
        .unwrap_err();

    assert!(err.is_execution());
    assert!(!cli.is_installed());
}

#[tokio::test]
async fn test_custom_tool_config_changes_binary_and_token_env() {
    let executor = RecordingExecutor::shared();
    let base = base_context(&executor).await;
    let tool = ToolConfig::new("qovery-beta").with_token_env("QOVERY_BETA_TOKEN");
    let mut cli = QoveryCli::with_tool_config(tool);
    cli.install(&base, &SecureToken::new("t")).await.unwrap();
    cli.with_project("p");

    cli.environment().list().await.unwrap();

    assert_eq!(executor.layers(), vec!["SECRET QOVERY_BETA_TOKEN".to_string()]);
    assert_eq!(executor.commands_for("qovery-beta").len(), 1);
}

#[tokio::test]
async fn test_version_returns_cli_stdout() {
    let executor = RecordingExecutor::shared();
    executor.respond(&["qovery", "version"], "v1.42.0");
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();
    cli.install(&base, &SecureToken::new("t")).await.unwrap();

    assert_eq!(cli.version().await.unwrap(), "v1.42.0");
}

#[tokio::test]
async fn test_bootstrap_context_prepares_alpine() {
    let executor = RecordingExecutor::shared();
    let tool = ToolConfig::default();

    let context = QoveryCli::bootstrap_context(executor.clone(), &tool)
        .await
        .unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0],
        Call::Provision {
            image: "alpine:latest".to_string(),
            platform: None,
        }
    );
    let commands = executor.commands();
    assert_eq!(commands[0][..2], ["apk".to_string(), "add".to_string()]);
    assert!(commands[0].iter().any(|t| t == "curl"));
    assert_eq!(context.handle().as_str(), "ctr-2");
}

#[tokio::test]
async fn test_scope_setters_chain() {
    let mut cli = QoveryCli::new();
    cli.with_organization("o")
        .with_project("p")
        .with_environment("e")
        .with_cluster("c");

    let scope = cli.scope();
    assert_eq!(scope.organization(), Some("o"));
    assert_eq!(scope.project(), Some("p"));
    assert_eq!(scope.environment(), Some("e"));
    assert_eq!(scope.cluster(), Some("c"));
}

#[tokio::test]
async fn test_container_update_argv() {
    let executor = RecordingExecutor::shared();
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();
    cli.install(&base, &SecureToken::new("t")).await.unwrap();
    cli.with_organization("acme")
        .with_project("web")
        .with_environment("preview-ab12cd3");

    cli.container()
        .update("api", Some("ghcr.io/acme/api"), Some("ab12cd3"))
        .await
        .unwrap();

    let expected: Vec<String> = [
        "qovery",
        "container",
        "update",
        "--container=api",
        "--project=web",
        "--environment=preview-ab12cd3",
        "--image-name=ghcr.io/acme/api",
        "--tag=ab12cd3",
        "--organization=acme",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();
    assert_eq!(executor.commands_for("qovery"), vec![expected]);
}

#[tokio::test]
async fn test_container_update_reports_missing_environment() {
    let executor = RecordingExecutor::shared();
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();
    cli.install(&base, &SecureToken::new("t")).await.unwrap();
    cli.with_project("web");

    let err = cli
        .container()
        .update("api", None, Some("ab12cd3"))
        .await
        .unwrap_err();

    assert_eq!(err.missing_fields(), ["environment".to_string()]);
    assert!(executor.commands_for("qovery").is_empty());
}

#[tokio::test]
async fn test_container_update_lists_project_and_environment_when_both_unset() {
    let executor = RecordingExecutor::shared();
    let base = base_context(&executor).await;
    let mut cli = QoveryCli::new();
    cli.install(&base, &SecureToken::new("t")).await.unwrap();
    cli.with_organization("acme");

    let err = cli
        .container()
        .update("api", Some("ghcr.io/acme/api"), None)
        .await
        .unwrap_err();

    assert_eq!(
        err.missing_fields(),
        ["project".to_string(), "environment".to_string()]
    );
    assert!(executor.commands_for("qovery").is_empty());
}

#[tokio::test]
async fn test_install_is_checked_before_scope() {
    let mut cli = QoveryCli::new();

    assert!(matches!(
        cli.environment()
            .clone_environment("copy", EnvironmentType::default(), false)
            .await
            .unwrap_err(),
        Error::NotInstalled { .. }
    ));
    assert!(matches!(
        cli.container().update("api", None, None).await.unwrap_err(),
        Error::NotInstalled { .. }
    ));
}
