//! Configuration management for scriptvault.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/scriptvault/config.json`
//! 2. Environment variable: `SCRIPTVAULT_CONFIG_CONTENT`
//! 3. Project config: `scriptvault.json` or `scriptvault.jsonc` in the working directory
//!
//! Supports JSONC (JSON with comments) and variable substitution:
//! - `{env:VAR_NAME}` - Substitute environment variable
//! - `{file:path}` - Substitute file contents

use crate::error::ConfigError;
use crate::gate::DEFAULT_LOCK_TIMEOUT;
use scriptvault_provider::DEFAULT_BASE_URL;
use scriptvault_util::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable holding a full config document.
pub const CONFIG_CONTENT_ENV: &str = "SCRIPTVAULT_CONFIG_CONTENT";

/// Environment variable consulted when no provider token is configured.
pub const TOKEN_ENV: &str = "SCRIPTVAULT_TOKEN";

/// Container used when neither the request nor the config names one.
pub const DEFAULT_CONTAINER: &str = "root";

/// Default listen address of the HTTP server.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

static VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn var_regex() -> &'static regex::Regex {
    VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\{(env|file):([^}]+)\}")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON Schema reference.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Base directory of the JSON document store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Container used when a request omits one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_container: Option<String>,

    /// Content provider settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// HTTP server settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Request gate settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockConfig>,
}

/// Content provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the content API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token.
    ///
    /// Supports variable substitution: `{env:SCRIPTVAULT_TOKEN}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Externally visible base URL, used in links to the markup view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

/// Request gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Longest wait for the gate before a request fails with a timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `~/.config/scriptvault/`
    /// 2. `SCRIPTVAULT_CONFIG_CONTENT` environment variable
    /// 3. Project config from `project_dir`
    ///
    /// Returns the merged config and the files it was read from.
    pub async fn load(project_dir: Option<&Path>) -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(global_dir) = scriptvault_util::path::config_dir() {
            for name in &["config.json", "scriptvault.json", "scriptvault.jsonc"] {
                let path = global_dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        if let Ok(content) = std::env::var(CONFIG_CONTENT_ENV) {
            config = config.merge(Self::parse_jsonc(&content, "<env>")?);
        }

        if let Some(dir) = project_dir {
            for name in &["scriptvault.jsonc", "scriptvault.json"] {
                let path = dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        tracing::debug!(sources = sources.len(), "Loaded configuration");
        Ok((config, sources))
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::substitute_variables(&content, path)?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Parse JSONC (JSON with comments).
    pub fn parse_jsonc(content: &str, source: &str) -> Result<Self, ConfigError> {
        let stripped = Self::strip_comments(content);
        serde_json::from_str(&stripped).map_err(|e| ConfigError::InvalidJson {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    fn strip_comments(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(c) = chars.next() {
            if escape_next {
                result.push(c);
                escape_next = false;
                continue;
            }

            if in_string {
                match c {
                    '\\' => escape_next = true,
                    '"' => in_string = false,
                    _ => {}
                }
                result.push(c);
                continue;
            }

            if c == '"' {
                in_string = true;
                result.push(c);
                continue;
            }

            match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // Keep line numbers stable for parse errors
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => result.push(c),
            }
        }

        result
    }

    /// Replace `{env:NAME}` and `{file:path}` references. File paths are
    /// relative to the config file.
    fn substitute_variables(content: &str, config_path: &Path) -> Result<String, ConfigError> {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut result = content.to_string();

        for cap in var_regex().captures_iter(content) {
            let (Some(full), Some(kind), Some(value)) = (cap.get(0), cap.get(1), cap.get(2)) else {
                continue;
            };
            let value = value.as_str();

            let replacement = match kind.as_str() {
                "env" => std::env::var(value).map_err(|_| ConfigError::EnvVarNotFound {
                    name: value.to_string(),
                })?,
                "file" => {
                    let file_path = config_dir.join(value);
                    std::fs::read_to_string(&file_path)
                        .map(|v| v.trim().to_string())
                        .map_err(|_| ConfigError::FileRefNotFound {
                            path: file_path.display().to_string(),
                        })?
                }
                _ => continue,
            };

            result = result.replace(full.as_str(), &replacement);
        }

        Ok(result)
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        self.schema = other.schema.or(self.schema);
        self.log_level = other.log_level.or(self.log_level);
        self.data_dir = other.data_dir.or(self.data_dir);
        self.default_container = other.default_container.or(self.default_container);

        self.provider = match (self.provider, other.provider) {
            (Some(base), Some(o)) => Some(ProviderConfig {
                base_url: o.base_url.or(base.base_url),
                token: o.token.or(base.token),
            }),
            (b, o) => o.or(b),
        };

        self.server = match (self.server, other.server) {
            (Some(base), Some(o)) => Some(ServerConfig {
                address: o.address.or(base.address),
                public_url: o.public_url.or(base.public_url),
            }),
            (b, o) => o.or(b),
        };

        self.lock = match (self.lock, other.lock) {
            (Some(base), Some(o)) => Some(LockConfig {
                timeout_ms: o.timeout_ms.or(base.timeout_ms),
            }),
            (b, o) => o.or(b),
        };

        self
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Base directory of the document store.
    pub fn store_dir(&self) -> Result<PathBuf, ConfigError> {
        self.data_dir
            .clone()
            .or_else(scriptvault_util::path::default_store_dir)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "data_dir".into(),
                message: "could not determine a data directory".into(),
            })
    }

    pub fn default_container(&self) -> &str {
        self.default_container.as_deref().unwrap_or(DEFAULT_CONTAINER)
    }

    pub fn provider_base_url(&self) -> &str {
        self.provider
            .as_ref()
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Bearer token from the config, else from `SCRIPTVAULT_TOKEN`.
    pub fn provider_token(&self) -> Option<String> {
        self.provider
            .as_ref()
            .and_then(|p| p.token.clone())
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }

    pub fn server_address(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.address.as_deref())
            .unwrap_or(DEFAULT_ADDRESS)
    }

    /// Base URL for links to the markup view, without a trailing slash.
    pub fn public_url(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.public_url.clone())
            .unwrap_or_else(|| format!("http://{}", self.server_address()))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock
            .as_ref()
            .and_then(|l| l.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LOCK_TIMEOUT)
    }

    /// A copy safe to print: the provider token is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(token) = config.provider.as_mut().and_then(|p| p.token.as_mut()) {
            *token = "********".to_string();
        }
        config
    }
}
