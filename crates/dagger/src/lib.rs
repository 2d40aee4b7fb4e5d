//! Dagger execution backend
//!
//! `DaggerExecutor` implements [`qovery_core::Executor`] on top of the Dagger
//! engine. Each call opens its own engine session; contexts are carried from
//! one call to the next as container ids, which the engine can reload in a
//! later session.

use async_trait::async_trait;
use dagger_sdk::{
    Config, ContainerId, ContainerWithExecOptsBuilder, DirectoryDockerBuildOptsBuilder, Platform,
    Query, QueryContainerOpts, ReturnType, connect_opts,
};
use qovery_core::exec::{ExecHandle, ExecOutput, Executor, Layer, PublishRequest};
use qovery_core::{Error, Result};
use std::future::Future;
use std::sync::{Arc, Mutex};

type DaggerReport = Box<dyn std::error::Error + Send + Sync + 'static>;

type Outcome<T> = std::result::Result<T, DaggerReport>;

/// Executor running every context as a Dagger container.
#[derive(Debug, Default, Clone, Copy)]
pub struct DaggerExecutor;

impl DaggerExecutor {
    /// Create an executor using the default engine configuration.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `work` in a fresh engine session.
    ///
    /// The outer error is the session itself failing (engine unreachable);
    /// the inner one is whatever `work` reported.
    async fn session<I, T, F, Fut>(&self, input: I, work: F) -> Result<Outcome<T>>
    where
        I: Clone + Send + 'static,
        T: Send + 'static,
        F: Fn(Query, I) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let result_store: Arc<Mutex<Option<Outcome<T>>>> = Arc::new(Mutex::new(None));
        let result_store_clone = result_store.clone();

        connect_opts(Config::default(), move |client| {
            let input = input.clone();
            let result_store = result_store_clone.clone();
            async move {
                let res = work(client, input).await;
                if let Ok(mut guard) = result_store.lock() {
                    *guard = Some(res);
                }
                Ok(())
            }
        })
        .await
        .map_err(|err| Error::backend(format!("Dagger session failed: {err}")))?;

        let mut guard = result_store
            .lock()
            .map_err(|_| Error::backend("Failed to acquire lock on session result"))?;
        guard
            .take()
            .ok_or_else(|| Error::backend("Dagger session completed but produced no result"))
    }
}

fn container_id(handle: &ExecHandle) -> ContainerId {
    ContainerId(handle.as_str().to_string())
}

fn exec_handle(id: ContainerId) -> ExecHandle {
    ExecHandle::new(id.0)
}

/// What one command left behind in its container.
#[derive(Debug)]
struct ExecRun {
    stdout: String,
    stderr: String,
    exit_code: isize,
    next: ContainerId,
}

/// Non-zero exits become [`Error::Execution`] with the command's own stderr.
fn exec_result(argv: &[String], run: ExecRun) -> Result<ExecOutput> {
    if run.exit_code != 0 {
        let exit_code = i32::try_from(run.exit_code).ok();
        return Err(Error::execution(argv, exit_code, run.stderr));
    }
    Ok(ExecOutput {
        stdout: run.stdout,
        handle: exec_handle(run.next),
    })
}

fn backend_failure(operation: &str, report: &DaggerReport) -> Error {
    Error::backend(format!("Dagger {operation} failed: {report}"))
}

#[async_trait]
impl Executor for DaggerExecutor {
    #[tracing::instrument(name = "dagger_provision", skip(self))]
    async fn provision(&self, image: &str, platform: Option<&str>) -> Result<ExecHandle> {
        let input = (image.to_string(), platform.map(str::to_string));
        let outcome = self
            .session(input, |client, (image, platform)| async move {
                let opts = QueryContainerOpts {
                    platform: platform.map(Platform),
                };
                let id = client.container_opts(opts).from(image).id().await?;
                Ok::<_, DaggerReport>(id)
            })
            .await?;

        outcome
            .map(exec_handle)
            .map_err(|report| backend_failure("provision", &report))
    }

    #[tracing::instrument(name = "dagger_layer", skip_all, fields(handle = %handle, layers = layers.len()))]
    async fn layer(&self, handle: &ExecHandle, layers: &[Layer]) -> Result<ExecHandle> {
        let input = (container_id(handle), layers.to_vec());
        let outcome = self
            .session(input, |client, (id, layers)| async move {
                let mut container = client.load_container_from_id(id);
                for layer in layers {
                    container = match layer {
                        Layer::EnvVariable { name, value } => {
                            container.with_env_variable(name, value)
                        }
                        Layer::SecretVariable { name, secret } => {
                            let dagger_secret = client.set_secret(name.clone(), secret.expose());
                            container.with_secret_variable(name, dagger_secret)
                        }
                        Layer::MountedDirectory { path, source } => {
                            let host_dir = client
                                .host()
                                .directory(source.to_string_lossy().to_string());
                            container.with_mounted_directory(path, host_dir)
                        }
                        Layer::Workdir(path) => container.with_workdir(path),
                    };
                }
                let id = container.id().await?;
                Ok::<_, DaggerReport>(id)
            })
            .await?;

        outcome
            .map(exec_handle)
            .map_err(|report| backend_failure("layer", &report))
    }

    #[tracing::instrument(name = "dagger_exec", skip_all, fields(handle = %handle, program = argv.first().map(String::as_str)))]
    async fn exec(&self, handle: &ExecHandle, argv: &[String]) -> Result<ExecOutput> {
        if argv.is_empty() {
            return Err(Error::configuration(
                "Dagger exec requires a command to execute",
            ));
        }

        let input = (container_id(handle), argv.to_vec());
        let outcome = self
            .session(input, |client, (id, argv)| async move {
                // Any exit status is a result, not a query error
                let opts = ContainerWithExecOptsBuilder::default()
                    .expect(ReturnType::Any)
                    .build()?;
                let exec = client.load_container_from_id(id).with_exec_opts(argv, opts);
                let stdout = exec.stdout().await?;
                let stderr = exec.stderr().await?;
                let exit_code = exec.exit_code().await?;
                let next = exec.id().await?;
                Ok::<_, DaggerReport>(ExecRun {
                    stdout,
                    stderr,
                    exit_code,
                    next,
                })
            })
            .await?;

        let run = outcome.map_err(|report| backend_failure("exec", &report))?;
        if run.exit_code != 0 {
            tracing::debug!(exit_code = run.exit_code, "Command failed inside Dagger container");
        }
        exec_result(argv, run)
    }

    #[tracing::instrument(name = "dagger_publish", skip_all, fields(handle = %handle, address = %request.address))]
    async fn publish(&self, handle: &ExecHandle, request: &PublishRequest) -> Result<String> {
        let input = (container_id(handle), request.clone());
        let outcome = self
            .session(input, |client, (id, request)| async move {
                let mut build_opts = DirectoryDockerBuildOptsBuilder::default();
                build_opts.dockerfile(request.dockerfile.as_str());
                if let Some(platform) = &request.platform {
                    build_opts.platform(Platform(platform.clone()));
                }
                let build_opts = build_opts.build()?;

                let mut image = client
                    .load_container_from_id(id)
                    .directory(request.context_dir.as_str())
                    .docker_build_opts(build_opts);

                if let Some(credentials) = &request.credentials {
                    let password = client.set_secret(
                        format!("{}-password", credentials.registry),
                        credentials.password.expose(),
                    );
                    image = image.with_registry_auth(
                        credentials.registry.as_str(),
                        credentials.username.as_str(),
                        password,
                    );
                }

                let reference = image.publish(request.address.as_str()).await?;
                Ok::<_, DaggerReport>(reference)
            })
            .await?;

        outcome.map_err(|report| backend_failure("publish", &report))
    }

    fn name(&self) -> &'static str {
        "dagger"
    }
}

/// Create a shared Dagger executor.
#[must_use]
pub fn create_dagger_executor() -> Arc<dyn Executor> {
    Arc::new(DaggerExecutor::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dagger_executor_name() {
        assert_eq!(DaggerExecutor::new().name(), "dagger");
        assert_eq!(create_dagger_executor().name(), "dagger");
    }

    #[test]
    fn test_handle_and_container_id_are_interchangeable() {
        let handle = ExecHandle::new("core.Container:abc123");
        let id = container_id(&handle);
        assert_eq!(id.0, "core.Container:abc123");
        assert_eq!(exec_handle(id), handle);
    }

    fn run(exit_code: isize) -> ExecRun {
        ExecRun {
            stdout: "done\n".to_string(),
            stderr: "error Command failed with exit code 1.\n".to_string(),
            exit_code,
            next: ContainerId("core.Container:next".to_string()),
        }
    }

    #[test]
    fn test_non_zero_exit_keeps_status_and_stderr() {
        let argv = vec!["yarn".to_string(), "test".to_string()];

        let err = exec_result(&argv, run(1)).unwrap_err();

        assert!(err.is_execution());
        match err {
            Error::Execution {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "yarn test");
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "error Command failed with exit code 1.\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_exit_returns_stdout_and_next_container() {
        let argv = vec!["yarn".to_string(), "build".to_string()];

        let output = exec_result(&argv, run(0)).unwrap();

        assert_eq!(output.stdout, "done\n");
        assert_eq!(output.handle, ExecHandle::new("core.Container:next"));
    }

    #[test]
    fn test_out_of_range_exit_code_is_still_a_failure() {
        let argv = vec!["sh".to_string()];
        let err = exec_result(&argv, run(isize::MAX)).unwrap_err();
        assert!(err.is_execution());
    }

    #[test]
    fn test_backend_failure_names_operation() {
        let report: DaggerReport = "connection refused".into();
        let err = backend_failure("publish", &report);
        assert!(!err.is_execution());
        assert!(err.to_string().contains("Dagger publish failed"));
    }

    #[tokio::test]
    async fn test_exec_rejects_empty_command() {
        let executor = DaggerExecutor::new();
        let err = executor
            .exec(&ExecHandle::new("ctr"), &[])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
