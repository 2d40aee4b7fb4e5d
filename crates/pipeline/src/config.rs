//! Pipeline configuration.
//!
//! Every field has a default matching a Node.js project built with Yarn, so
//! an empty file (or no file at all) yields a runnable pipeline. Only the
//! `[deploy]` section has to be filled in for the deploy stage to do
//! anything useful.

use qovery_core::{EnvironmentType, Error, Result, ScopeContext, ToolConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default build image.
pub const DEFAULT_IMAGE: &str = "node:22.9.0";

/// Default platform for the build container and the published image.
pub const DEFAULT_PLATFORM: &str = "linux/amd64";

/// Default mount point of the source directory.
pub const DEFAULT_SOURCE_MOUNT: &str = "/mnt";

/// Default registry for published images.
pub const DEFAULT_REGISTRY: &str = "ttl.sh";

/// Default repository for published images.
pub const DEFAULT_REPOSITORY: &str = "qovery-ci";

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| (*token).to_string()).collect()
}

/// Image publication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PublishConfig {
    /// Registry host (default: `ttl.sh`)
    pub registry: String,
    /// Repository inside the registry (default: `qovery-ci`)
    pub repository: String,
    /// Dockerfile path relative to the source root
    pub dockerfile: String,
    /// Target platform of the image
    pub platform: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            dockerfile: "Dockerfile".to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl PublishConfig {
    /// Image name without tag, e.g. `ttl.sh/qovery-ci`.
    #[must_use]
    pub fn image_name(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }

    /// Fully qualified reference for `tag`.
    #[must_use]
    pub fn address(&self, tag: &str) -> String {
        format!("{}:{tag}", self.image_name())
    }
}

/// Preview deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DeployConfig {
    /// Organization, passed through when set
    pub organization: Option<String>,
    /// Project holding the template environment
    pub project: Option<String>,
    /// Cluster the preview environment is created on
    pub cluster: Option<String>,
    /// Environment cloned into each preview
    pub template_environment: Option<String>,
    /// Container service whose image is replaced in the preview
    pub container: String,
    /// Image name set on the container (default: the published image)
    pub image_name: Option<String>,
    /// Type of the preview environment
    pub environment_type: EnvironmentType,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            cluster: None,
            template_environment: None,
            container: "app".to_string(),
            image_name: None,
            environment_type: EnvironmentType::Development,
        }
    }
}

impl DeployConfig {
    /// Scope pointing at the template environment.
    #[must_use]
    pub fn scope(&self) -> ScopeContext {
        let mut scope = ScopeContext::new();
        if let Some(organization) = &self.organization {
            scope.with_organization(organization.as_str());
        }
        if let Some(project) = &self.project {
            scope.with_project(project.as_str());
        }
        if let Some(cluster) = &self.cluster {
            scope.with_cluster(cluster.as_str());
        }
        if let Some(environment) = &self.template_environment {
            scope.with_environment(environment.as_str());
        }
        scope
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Build image (default: `node:22.9.0`)
    pub image: String,
    /// Platform of the build container (default: `linux/amd64`)
    pub platform: String,
    /// Where the source directory is mounted; also the working directory
    pub source_mount: String,
    /// Commands run once after mounting the source
    pub setup: Vec<Vec<String>>,
    /// Build command
    pub build_command: Vec<String>,
    /// Test command
    pub test_command: Vec<String>,
    /// Image publication
    pub publish: PublishConfig,
    /// Preview deployment
    pub deploy: DeployConfig,
    /// Deployment CLI
    pub tool: ToolConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            source_mount: DEFAULT_SOURCE_MOUNT.to_string(),
            setup: vec![
                argv(&["corepack", "enable"]),
                argv(&["yarn", "set", "version", "stable"]),
                argv(&["yarn", "install"]),
            ],
            build_command: argv(&["yarn", "build"]),
            test_command: argv(&["yarn", "test"]),
            publish: PublishConfig::default(),
            deploy: DeployConfig::default(),
            tool: ToolConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document. `origin` names the source in error messages.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::config_parse(origin, e.to_string()))
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), image = %config.image, "Loaded pipeline configuration");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }
}
