//! Argument vector assembly.
//!
//! Every remote operation is described declaratively: a fixed prefix, an
//! ordered list of mandatory `--name=value` pairs and an ordered list of
//! optional [`Flag`]s. A single emission routine turns that description into
//! a [`CommandSpec`], so token order is identical for every operation:
//!
//! 1. prefix
//! 2. mandatory flags, in declared order
//! 3. optional value flags that are present, in declared order
//! 4. optional switches that are on, in declared order
//!
//! Presence of mandatory fields is not checked here; run
//! [`crate::validate::require_context`] first.

use std::fmt;

/// Value carried by an optional flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue<'a> {
    /// Emitted as `--name=value` when present and non-empty.
    Text(Option<&'a str>),
    /// Emitted as a bare `--name` when `true`.
    Switch(bool),
}

/// One optional flag in a declarative flag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag<'a> {
    /// Flag name without the leading dashes
    pub name: &'a str,
    /// Flag value
    pub value: FlagValue<'a>,
}

impl<'a> Flag<'a> {
    /// Optional `--name=value` flag.
    #[must_use]
    pub const fn text(name: &'a str, value: Option<&'a str>) -> Self {
        Self {
            name,
            value: FlagValue::Text(value),
        }
    }

    /// Optional bare `--name` switch.
    #[must_use]
    pub const fn switch(name: &'a str, on: bool) -> Self {
        Self {
            name,
            value: FlagValue::Switch(on),
        }
    }

    fn is_switch(&self) -> bool {
        matches!(self.value, FlagValue::Switch(_))
    }

    fn render(&self) -> Option<String> {
        match self.value {
            FlagValue::Text(Some(value)) if !value.is_empty() => {
                Some(format!("--{}={}", self.name, value))
            }
            FlagValue::Switch(true) => Some(format!("--{}", self.name)),
            FlagValue::Text(_) | FlagValue::Switch(false) => None,
        }
    }
}

/// Ordered argument vector ready to hand to an executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Wrap an already assembled argv.
    #[must_use]
    pub fn from_argv(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Tokens as a slice.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Consume into the owned tokens.
    #[must_use]
    pub fn into_argv(self) -> Vec<String> {
        self.argv
    }

    /// True when `token` appears verbatim in the argv.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.argv.iter().any(|t| t == token)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

impl From<CommandSpec> for Vec<String> {
    fn from(spec: CommandSpec) -> Self {
        spec.argv
    }
}

/// Build an argument vector from a prefix, mandatory pairs and optional flags.
#[must_use]
pub fn build_args(prefix: &[&str], mandatory: &[(&str, &str)], optional: &[Flag<'_>]) -> CommandSpec {
    let mut argv: Vec<String> = prefix.iter().map(|token| (*token).to_string()).collect();

    argv.extend(
        mandatory
            .iter()
            .map(|(name, value)| format!("--{name}={value}")),
    );

    let (switches, values): (Vec<&Flag<'_>>, Vec<&Flag<'_>>) =
        optional.iter().partition(|flag| flag.is_switch());
    argv.extend(values.into_iter().chain(switches).filter_map(Flag::render));

    CommandSpec { argv }
}

/// Fluent front-end over [`build_args`].
#[derive(Debug, Clone, Default)]
pub struct ArgumentBuilder<'a> {
    prefix: Vec<&'a str>,
    mandatory: Vec<(&'a str, &'a str)>,
    optional: Vec<Flag<'a>>,
}

impl<'a> ArgumentBuilder<'a> {
    /// Start a command with the given prefix tokens.
    #[must_use]
    pub fn new(prefix: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            prefix: prefix.into_iter().collect(),
            mandatory: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// Append a mandatory `--name=value` token.
    #[must_use]
    pub fn mandatory(mut self, name: &'a str, value: &'a str) -> Self {
        self.mandatory.push((name, value));
        self
    }

    /// Append an optional `--name=value` token.
    #[must_use]
    pub fn value(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        self.optional.push(Flag::text(name, value));
        self
    }

    /// Append an optional bare `--name` switch.
    #[must_use]
    pub fn switch(mut self, name: &'a str, on: bool) -> Self {
        self.optional.push(Flag::switch(name, on));
        self
    }

    /// Emit the argument vector.
    #[must_use]
    pub fn build(self) -> CommandSpec {
        build_args(&self.prefix, &self.mandatory, &self.optional)
    }
}
