//! In-memory executor for tests.
//!
//! [`RecordingExecutor`] records every call in order and replays scripted
//! outputs and failures, so argument vectors and stage ordering can be
//! asserted without a container engine.

use crate::exec::{ExecHandle, ExecOutput, Executor, Layer, PublishRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded executor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `provision(image, platform)`
    Provision {
        /// Image reference
        image: String,
        /// Requested platform
        platform: Option<String>,
    },
    /// `layer(handle, layers)`, each layer rendered as text with secrets redacted
    Layer {
        /// Handle the layers were applied to
        handle: String,
        /// Rendered layers
        layers: Vec<String>,
    },
    /// `exec(handle, argv)`
    Exec {
        /// Handle the command ran in
        handle: String,
        /// Command line
        argv: Vec<String>,
    },
    /// `publish(handle, request)`
    Publish {
        /// Handle the image was built from
        handle: String,
        /// Pushed reference
        address: String,
        /// Target platform
        platform: Option<String>,
    },
}

enum Outcome {
    Stdout(String),
    Fail { exit_code: i32, stderr: String },
}

struct Rule {
    prefix: Vec<String>,
    outcome: Outcome,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    rules: Vec<Rule>,
    next_id: usize,
    publish_failure: Option<String>,
}

impl State {
    fn next_handle(&mut self) -> ExecHandle {
        self.next_id += 1;
        ExecHandle::new(format!("ctr-{}", self.next_id))
    }
}

/// Executor that records calls and answers from a script.
#[derive(Default)]
pub struct RecordingExecutor {
    state: Mutex<State>,
}

fn render_layer(layer: &Layer) -> String {
    match layer {
        Layer::EnvVariable { name, value } => format!("ENV {name}={value}"),
        Layer::SecretVariable { name, .. } => format!("SECRET {name}"),
        Layer::MountedDirectory { path, source } => {
            format!("MOUNT {}:{path}", source.display())
        }
        Layer::Workdir(path) => format!("WORKDIR {path}"),
    }
}

impl RecordingExecutor {
    /// Create an executor with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared executor.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer commands starting with `prefix` with `stdout`.
    pub fn respond(&self, prefix: &[&str], stdout: impl Into<String>) {
        self.lock().rules.push(Rule {
            prefix: prefix.iter().map(|s| (*s).to_string()).collect(),
            outcome: Outcome::Stdout(stdout.into()),
        });
    }

    /// Fail commands starting with `prefix`.
    pub fn fail(&self, prefix: &[&str], exit_code: i32, stderr: impl Into<String>) {
        self.lock().rules.push(Rule {
            prefix: prefix.iter().map(|s| (*s).to_string()).collect(),
            outcome: Outcome::Fail {
                exit_code,
                stderr: stderr.into(),
            },
        });
    }

    /// Fail every publish with `message`.
    pub fn fail_publish(&self, message: impl Into<String>) {
        self.lock().publish_failure = Some(message.into());
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Argument vectors of every executed command, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Exec { argv, .. } => Some(argv.clone()),
                _ => None,
            })
            .collect()
    }

    /// Executed commands whose first token is `binary`.
    #[must_use]
    pub fn commands_for(&self, binary: &str) -> Vec<Vec<String>> {
        self.commands()
            .into_iter()
            .filter(|argv| argv.first().is_some_and(|first| first == binary))
            .collect()
    }

    /// Rendered layers of every layer call, flattened.
    #[must_use]
    pub fn layers(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Layer { layers, .. } => Some(layers.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn provision(&self, image: &str, platform: Option<&str>) -> Result<ExecHandle> {
        let mut state = self.lock();
        state.calls.push(Call::Provision {
            image: image.to_string(),
            platform: platform.map(str::to_string),
        });
        Ok(state.next_handle())
    }

    async fn layer(&self, handle: &ExecHandle, layers: &[Layer]) -> Result<ExecHandle> {
        let mut state = self.lock();
        state.calls.push(Call::Layer {
            handle: handle.as_str().to_string(),
            layers: layers.iter().map(render_layer).collect(),
        });
        Ok(state.next_handle())
    }

    async fn exec(&self, handle: &ExecHandle, argv: &[String]) -> Result<ExecOutput> {
        let mut state = self.lock();
        state.calls.push(Call::Exec {
            handle: handle.as_str().to_string(),
            argv: argv.to_vec(),
        });

        let matched = state
            .rules
            .iter()
            .rev()
            .find(|rule| argv.starts_with(&rule.prefix))
            .map(|rule| match &rule.outcome {
                Outcome::Stdout(stdout) => Ok(stdout.clone()),
                Outcome::Fail { exit_code, stderr } => {
                    Err(Error::execution(argv, Some(*exit_code), stderr.clone()))
                }
            });

        let stdout = matched.unwrap_or_else(|| Ok(String::new()))?;
        Ok(ExecOutput {
            stdout,
            handle: state.next_handle(),
        })
    }

    async fn publish(&self, handle: &ExecHandle, request: &PublishRequest) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(Call::Publish {
            handle: handle.as_str().to_string(),
            address: request.address.clone(),
            platform: request.platform.clone(),
        });
        if let Some(message) = &state.publish_failure {
            return Err(Error::backend(message.clone()));
        }
        Ok(format!("{}@sha256:0000", request.address))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
