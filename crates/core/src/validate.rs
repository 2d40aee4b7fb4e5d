//! Mandatory context validation.

use crate::{Error, Result};

/// Fail with [`Error::MissingContext`] naming every field whose value is
/// `None`, in the order given.
pub fn require_context(fields: &[(&str, Option<&str>)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::missing_context(missing))
    }
}
