//! Error types shared by every qovery-ci crate.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for qovery-ci operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qovery-ci operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Generic configuration problem.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(qovery::core::configuration))]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// One or more scope fields required by an operation are unset.
    #[error("Configuration error: missing required context: {}", .fields.join(", "))]
    #[diagnostic(
        code(qovery::core::missing_context),
        help("Set the missing fields with with_organization/with_project/with_environment/with_cluster")
    )]
    MissingContext {
        /// Names of every missing field, in declaration order
        fields: Vec<String>,
    },

    /// An accessor was used before the tool was installed.
    #[error("Configuration error: {tool} CLI is not installed: execution context is not set")]
    #[diagnostic(
        code(qovery::core::not_installed),
        help("Call install() with a base execution context and an access token first")
    )]
    NotInstalled {
        /// Name of the tool binary
        tool: String,
    },

    /// A pipeline stage ran without the state an earlier stage produces.
    #[error("Configuration error: stage '{stage}' requires {requirement}")]
    #[diagnostic(code(qovery::core::missing_state))]
    MissingState {
        /// The stage that could not run
        stage: String,
        /// The missing prerequisite
        requirement: String,
    },

    /// A command exited with a non-zero status.
    #[error("Command `{command}` failed{}", .exit_code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    #[diagnostic(code(qovery::core::execution))]
    Execution {
        /// The command line that failed
        command: String,
        /// Exit status, when the engine reports one
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The execution engine itself could not be reached or failed.
    #[error("Execution backend failed: {message}")]
    #[diagnostic(
        code(qovery::core::backend),
        help("Check that the container engine is running and reachable")
    )]
    Backend {
        /// Error message reported by the backend
        message: String,
    },

    /// Config file could not be parsed.
    #[error("Invalid configuration file {path}: {message}")]
    #[diagnostic(code(qovery::core::config_parse))]
    ConfigParse {
        /// Path of the offending file
        path: String,
        /// Parser message
        message: String,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    #[diagnostic(code(qovery::core::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a missing-context error listing every missing field.
    #[must_use]
    pub fn missing_context<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingContext {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a not-installed error for the given tool.
    #[must_use]
    pub fn not_installed(tool: impl Into<String>) -> Self {
        Self::NotInstalled { tool: tool.into() }
    }

    /// Create a missing-state error for a pipeline stage.
    #[must_use]
    pub fn missing_state(stage: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self::MissingState {
            stage: stage.into(),
            requirement: requirement.into(),
        }
    }

    /// Create an execution error from a failed command.
    #[must_use]
    pub fn execution(command: &[String], exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Execution {
            command: command.join(" "),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a config parse error.
    #[must_use]
    pub fn config_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by missing setup or context rather than by a
    /// command that ran and failed.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::MissingContext { .. }
                | Self::NotInstalled { .. }
                | Self::MissingState { .. }
                | Self::ConfigParse { .. }
        )
    }

    /// True when a command ran and exited non-zero.
    #[must_use]
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Missing field names for a [`Error::MissingContext`], empty otherwise.
    #[must_use]
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Self::MissingContext { fields } => fields,
            _ => &[],
        }
    }
}
