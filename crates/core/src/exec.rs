//! Execution context abstraction.
//!
//! An execution context is "a place commands run": a provisioned container
//! with mounted sources and installed tooling. Backends implement
//! [`Executor`]; callers hold an [`ExecutionContext`], which pairs a backend
//! with an opaque [`ExecHandle`] and exposes a layering API. Every layering
//! call yields a new context and leaves the original untouched.

use crate::{Result, SecureToken};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque reference to a provisioned execution context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecHandle(String);

impl ExecHandle {
    /// Wrap a backend-specific identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Backend-specific identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Backend ids can be very long; the prefix is enough to correlate logs
        let short: String = self.0.chars().take(16).collect();
        f.write_str(&short)
    }
}

/// One setup step layered on top of an execution context.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Plain environment variable
    EnvVariable {
        /// Variable name
        name: String,
        /// Variable value
        value: String,
    },
    /// Environment variable whose value is a secret
    SecretVariable {
        /// Variable name
        name: String,
        /// Secret value
        secret: SecureToken,
    },
    /// Host directory mounted into the context
    MountedDirectory {
        /// Mount point inside the context
        path: String,
        /// Directory on the host
        source: PathBuf,
    },
    /// Working directory for subsequent commands
    Workdir(String),
}

/// Credentials for pushing to a container registry.
#[derive(Debug, Clone)]
pub struct RegistryCredentials {
    /// Registry host, e.g. `ghcr.io`
    pub registry: String,
    /// Registry user
    pub username: String,
    /// Registry password or token
    pub password: SecureToken,
}

/// Request to build an image from a directory of a context and push it.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Directory inside the context holding the build context
    pub context_dir: String,
    /// Dockerfile path relative to `context_dir`
    pub dockerfile: String,
    /// Target platform, e.g. `linux/amd64`
    pub platform: Option<String>,
    /// Fully qualified image reference to push to
    pub address: String,
    /// Registry credentials, if the registry requires them
    pub credentials: Option<RegistryCredentials>,
}

/// Result of running one command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Standard output
    pub stdout: String,
    /// Handle of the context after the command ran
    pub handle: ExecHandle,
}

/// Backend capable of provisioning and running execution contexts.
///
/// A command that exits non-zero must surface as
/// [`crate::Error::Execution`]; a backend that cannot be reached surfaces as
/// [`crate::Error::Backend`].
#[async_trait]
pub trait Executor: Send + Sync {
    /// Start a fresh context from an image.
    async fn provision(&self, image: &str, platform: Option<&str>) -> Result<ExecHandle>;

    /// Apply setup layers and return the resulting context.
    async fn layer(&self, handle: &ExecHandle, layers: &[Layer]) -> Result<ExecHandle>;

    /// Run a command inside a context.
    async fn exec(&self, handle: &ExecHandle, argv: &[String]) -> Result<ExecOutput>;

    /// Build and push an image, returning the pushed reference.
    async fn publish(&self, handle: &ExecHandle, request: &PublishRequest) -> Result<String>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// A backend paired with a handle: the value callers pass around.
#[derive(Clone)]
pub struct ExecutionContext {
    executor: Arc<dyn Executor>,
    handle: ExecHandle,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("backend", &self.executor.name())
            .field("handle", &self.handle)
            .finish()
    }
}

impl ExecutionContext {
    /// Bind an existing handle to its backend.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, handle: ExecHandle) -> Self {
        Self { executor, handle }
    }

    /// Provision a fresh context from an image.
    pub async fn provision(
        executor: Arc<dyn Executor>,
        image: &str,
        platform: Option<&str>,
    ) -> Result<Self> {
        let handle = executor.provision(image, platform).await?;
        tracing::debug!(backend = executor.name(), image, %handle, "Provisioned execution context");
        Ok(Self { executor, handle })
    }

    /// Current handle.
    #[must_use]
    pub fn handle(&self) -> &ExecHandle {
        &self.handle
    }

    /// Backend this context runs on.
    #[must_use]
    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    fn rebind(&self, handle: ExecHandle) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            handle,
        }
    }

    /// Apply layers, returning the layered context.
    pub async fn with_layers(&self, layers: &[Layer]) -> Result<Self> {
        let handle = self.executor.layer(&self.handle, layers).await?;
        Ok(self.rebind(handle))
    }

    /// Set a plain environment variable.
    pub async fn with_env_variable(&self, name: &str, value: &str) -> Result<Self> {
        self.with_layers(&[Layer::EnvVariable {
            name: name.to_string(),
            value: value.to_string(),
        }])
        .await
    }

    /// Set a secret environment variable.
    pub async fn with_secret_variable(&self, name: &str, secret: &SecureToken) -> Result<Self> {
        self.with_layers(&[Layer::SecretVariable {
            name: name.to_string(),
            secret: secret.clone(),
        }])
        .await
    }

    /// Run a command and return the context it produced.
    pub async fn with_exec(&self, argv: &[String]) -> Result<Self> {
        let output = self.executor.exec(&self.handle, argv).await?;
        Ok(self.rebind(output.handle))
    }

    /// Run a command and return its standard output.
    pub async fn stdout(&self, argv: &[String]) -> Result<String> {
        let output = self.executor.exec(&self.handle, argv).await?;
        Ok(output.stdout)
    }

    /// Build and push an image from this context.
    pub async fn publish(&self, request: &PublishRequest) -> Result<String> {
        self.executor.publish(&self.handle, request).await
    }
}
