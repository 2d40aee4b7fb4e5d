//! `qovery container` operations.

use crate::registry::{Accessor, Binding, run};
use qovery_core::context::{ENVIRONMENT, ORGANIZATION, PROJECT};
use qovery_core::{ArgumentBuilder, Result, ScopeContext, require_context};

/// Operations on container services inside the scoped environment.
#[derive(Debug, Default)]
pub struct ContainerAccessor {
    binding: Binding,
}

impl Accessor for ContainerAccessor {
    fn sync(&mut self, binding: &Binding) {
        self.binding = binding.clone();
    }
}

impl ContainerAccessor {
    /// Scope this accessor currently targets.
    #[must_use]
    pub fn scope(&self) -> &ScopeContext {
        self.binding.scope()
    }

    /// Point a container service at a new image and/or tag.
    ///
    /// Requires project and environment; organization is passed through when
    /// set.
    pub async fn update(
        &self,
        container_name: &str,
        image_name: Option<&str>,
        tag: Option<&str>,
    ) -> Result<String> {
        let execution = self.binding.execution()?;
        let scope = self.scope();
        require_context(&[
            (PROJECT, scope.project()),
            (ENVIRONMENT, scope.environment()),
        ])?;

        let spec = ArgumentBuilder::new([self.binding.binary(), "container", "update"])
            .mandatory("container", container_name)
            .mandatory(PROJECT, scope.project().unwrap_or_default())
            .mandatory(ENVIRONMENT, scope.environment().unwrap_or_default())
            .value("image-name", image_name)
            .value("tag", tag)
            .value(ORGANIZATION, scope.organization())
            .build();
        run(execution, spec).await
    }
}
