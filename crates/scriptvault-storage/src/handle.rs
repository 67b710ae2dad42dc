//! Locator for a single persisted document.

use crate::{StorageError, StorageResult};
use std::fmt;

/// Where one project's snapshot log lives: a named document inside a
/// container. Resolving a handle never touches the backend; the document is
/// created by the first write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    container: String,
    name: String,
}

impl DocumentHandle {
    /// Resolve the handle for `name` inside `container`.
    pub fn resolve(container: impl Into<String>, name: impl Into<String>) -> StorageResult<Self> {
        let container = container.into();
        let name = name.into();
        validate_component(&container)?;
        validate_component(&name)?;
        Ok(Self { container, name })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage key for this document.
    pub fn key(&self) -> [&str; 2] {
        [self.container.as_str(), self.name.as_str()]
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// Reject key components that are empty or could escape the base directory.
pub(crate) fn validate_component(component: &str) -> StorageResult<()> {
    if component.is_empty()
        || component.contains('/')
        || component.contains('\\')
        || component == "."
        || component == ".."
    {
        return Err(StorageError::invalid_key(format!(
            "Invalid key component: {:?}",
            component
        )));
    }
    Ok(())
}
