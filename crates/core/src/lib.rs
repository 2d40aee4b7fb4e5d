//! Core types for qovery-ci
//!
//! This crate holds everything the deployment CLI wrapper and the pipeline
//! share: the mutable [`ScopeContext`], the declarative argument builder, the
//! mandatory-field validator, the [`Executor`] contract for execution
//! contexts, and the common [`Error`] type.

pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod secret;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use args::{ArgumentBuilder, CommandSpec, Flag, FlagValue, build_args};
pub use config::{EnvironmentType, ToolConfig};
pub use context::ScopeContext;
pub use error::{Error, Result};
pub use exec::{
    ExecHandle, ExecOutput, ExecutionContext, Executor, Layer, PublishRequest, RegistryCredentials,
};
pub use secret::SecureToken;
pub use validate::require_context;
