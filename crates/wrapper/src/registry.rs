//! Accessor registry.
//!
//! The facade keeps one lazily created instance per accessor kind. Handing an
//! accessor out always goes through [`Accessor::sync`], which copies the
//! facade's current scope and execution binding into the cached instance.

use crate::container::ContainerAccessor;
use crate::environment::EnvironmentAccessor;
use qovery_core::{CommandSpec, Error, ExecutionContext, Result, ScopeContext, ToolConfig};
use std::sync::Arc;

/// Everything an accessor needs to build and run a command.
#[derive(Debug, Clone, Default)]
pub(crate) struct Binding {
    pub(crate) tool: Arc<ToolConfig>,
    pub(crate) scope: ScopeContext,
    pub(crate) execution: Option<ExecutionContext>,
}

impl Binding {
    pub(crate) fn new(
        tool: Arc<ToolConfig>,
        scope: ScopeContext,
        execution: Option<ExecutionContext>,
    ) -> Self {
        Self {
            tool,
            scope,
            execution,
        }
    }

    pub(crate) fn scope(&self) -> &ScopeContext {
        &self.scope
    }

    pub(crate) fn binary(&self) -> &str {
        &self.tool.binary
    }

    pub(crate) fn execution(&self) -> Result<&ExecutionContext> {
        self.execution
            .as_ref()
            .ok_or_else(|| Error::not_installed(self.tool.binary.clone()))
    }
}

/// Run `spec` on an installed CLI's execution context.
pub(crate) async fn run(execution: &ExecutionContext, spec: CommandSpec) -> Result<String> {
    tracing::debug!(command = %spec, "Running deployment CLI command");
    execution.stdout(spec.argv()).await
}

/// A context-bound resource accessor.
pub(crate) trait Accessor: Default {
    fn sync(&mut self, binding: &Binding);
}

fn resolve<'a, A: Accessor>(slot: &'a mut Option<A>, binding: &Binding) -> &'a A {
    let accessor = slot.get_or_insert_with(A::default);
    accessor.sync(binding);
    accessor
}

/// One cached slot per accessor kind.
#[derive(Debug, Default)]
pub(crate) struct AccessorRegistry {
    environment: Option<EnvironmentAccessor>,
    container: Option<ContainerAccessor>,
}

impl AccessorRegistry {
    pub(crate) fn environment(&mut self, binding: &Binding) -> &EnvironmentAccessor {
        resolve(&mut self.environment, binding)
    }

    pub(crate) fn container(&mut self, binding: &Binding) -> &ContainerAccessor {
        resolve(&mut self.container, binding)
    }
}
