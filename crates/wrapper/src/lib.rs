//! Context-bound wrapper around the Qovery deployment CLI
//!
//! [`QoveryCli`] owns an execution context with the CLI installed and a
//! mutable [`qovery_core::ScopeContext`]. It vends one cached accessor per
//! resource kind ([`EnvironmentAccessor`], [`ContainerAccessor`]) and
//! re-synchronizes the accessor with the current scope every time it is
//! requested.

pub mod container;
pub mod environment;
pub mod facade;
mod registry;

pub use container::ContainerAccessor;
pub use environment::{DeploySelectors, EnvironmentAccessor};
pub use facade::QoveryCli;
