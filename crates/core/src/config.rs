//! Deployment tool configuration.
//!
//! Everything the wrapper would otherwise inline as a literal (binary name,
//! token variable, install script, bootstrap image) lives here with a
//! documented default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default name of the deployment CLI binary.
pub const DEFAULT_TOOL: &str = "qovery";

/// Default environment variable the CLI reads its access token from.
pub const DEFAULT_TOKEN_ENV: &str = "QOVERY_CLI_ACCESS_TOKEN";

/// Default install script, run through `bash -c`.
pub const DEFAULT_INSTALL_SCRIPT: &str =
    "curl -s https://get.qovery.com > install.sh && chmod +x install.sh && bash install.sh";

/// Default image for a standalone CLI container.
pub const DEFAULT_BOOTSTRAP_IMAGE: &str = "alpine:latest";

/// How the deployment CLI is named, authenticated and installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ToolConfig {
    /// Binary name, first token of every command (default: `qovery`)
    pub binary: String,

    /// Environment variable carrying the access token
    /// (default: `QOVERY_CLI_ACCESS_TOKEN`)
    pub token_env: String,

    /// Command that installs the binary into an execution context
    pub install_command: Vec<String>,

    /// Image used when no execution context is supplied (default: `alpine:latest`)
    pub bootstrap_image: String,

    /// Commands that prepare the bootstrap image for the install script
    pub bootstrap_commands: Vec<Vec<String>>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TOOL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            install_command: vec![
                "bash".to_string(),
                "-c".to_string(),
                DEFAULT_INSTALL_SCRIPT.to_string(),
            ],
            bootstrap_image: DEFAULT_BOOTSTRAP_IMAGE.to_string(),
            bootstrap_commands: vec![
                ["apk", "add", "--no-cache", "bash", "curl", "tar", "sudo"]
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            ],
        }
    }
}

impl ToolConfig {
    /// Create a config for a differently named binary.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Default::default()
        }
    }

    /// Set the token environment variable
    #[must_use]
    pub fn with_token_env(mut self, token_env: impl Into<String>) -> Self {
        self.token_env = token_env.into();
        self
    }

    /// Replace the install command
    #[must_use]
    pub fn with_install_command(mut self, command: Vec<String>) -> Self {
        self.install_command = command;
        self
    }

    /// Replace the bootstrap image
    #[must_use]
    pub fn with_bootstrap_image(mut self, image: impl Into<String>) -> Self {
        self.bootstrap_image = image.into();
        self
    }
}

/// Kind of environment created by clone or set by update.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentType {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl EnvironmentType {
    /// Flag value understood by the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "DEVELOPMENT",
            Self::Staging => "STAGING",
            Self::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEVELOPMENT" => Ok(Self::Development),
            "STAGING" => Ok(Self::Staging),
            "PRODUCTION" => Ok(Self::Production),
            _ => Err(format!("Unknown environment type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_config() {
        let config = ToolConfig::default();
        assert_eq!(config.binary, "qovery");
        assert_eq!(config.token_env, "QOVERY_CLI_ACCESS_TOKEN");
        assert_eq!(config.install_command[0], "bash");
        assert_eq!(config.install_command[2], DEFAULT_INSTALL_SCRIPT);
        assert_eq!(config.bootstrap_image, "alpine:latest");
        assert_eq!(config.bootstrap_commands.len(), 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ToolConfig::new("qcli")
            .with_token_env("QCLI_TOKEN")
            .with_bootstrap_image("debian:stable");
        assert_eq!(config.binary, "qcli");
        assert_eq!(config.token_env, "QCLI_TOKEN");
        assert_eq!(config.bootstrap_image, "debian:stable");
    }

    #[test]
    fn test_environment_type_parsing() {
        assert_eq!(
            "staging".parse::<EnvironmentType>(),
            Ok(EnvironmentType::Staging)
        );
        assert_eq!(
            "PRODUCTION".parse::<EnvironmentType>(),
            Ok(EnvironmentType::Production)
        );
        assert!("qa".parse::<EnvironmentType>().is_err());
    }

    #[test]
    fn test_environment_type_display() {
        assert_eq!(EnvironmentType::Development.to_string(), "DEVELOPMENT");
        assert_eq!(EnvironmentType::default(), EnvironmentType::Development);
    }
}
