//! Source file model shared by providers and snapshots.

use serde::{Deserialize, Serialize};

/// Kind of a project file, using the provider's type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileKind {
    /// Server-side script.
    ServerJs,
    /// Markup template.
    Html,
    /// Project manifest.
    Json,
    /// The API's placeholder tag. Kept as-is so such files still snapshot.
    EnumTypeUnspecified,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::ServerJs => "SERVER_JS",
            FileKind::Html => "HTML",
            FileKind::Json => "JSON",
            FileKind::EnumTypeUnspecified => "ENUM_TYPE_UNSPECIFIED",
        }
    }
}

/// One file of a project's source bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub kind: FileKind,
    pub source: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, kind: FileKind, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            source: source.into(),
        }
    }

    /// Shorthand for a server-side script file.
    pub fn script(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(name, FileKind::ServerJs, source)
    }
}
