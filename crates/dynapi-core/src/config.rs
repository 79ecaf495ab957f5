use std::fs;
use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ClientError;

/// Keys recognised in the options bag.
pub const OPTION_KEYS: &[&str] = &[
    "connectTimeoutMs",
    "readTimeoutMs",
    "defaultHeaders",
    "baseUrlOverride",
];

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Caller-supplied client options. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientOptions {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Merged under header parameters, over the built-in defaults.
    pub default_headers: IndexMap<String, String>,
    /// Replaces base URL resolution from the spec.
    pub base_url_override: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_headers: IndexMap::new(),
            base_url_override: None,
        }
    }
}

/// How unknown keys in an options bag are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionsMode {
    #[default]
    Lax,
    Strict,
}

impl ClientOptions {
    /// Build options from a loosely-typed bag. `null` yields the defaults.
    pub fn from_value(value: &serde_json::Value, mode: OptionsMode) -> Result<Self, ClientError> {
        let map = match value {
            serde_json::Value::Null => return Ok(Self::default()),
            serde_json::Value::Object(map) => map,
            other => {
                return Err(ClientError::InvalidOptions(format!(
                    "expected a map, got {other}"
                )));
            }
        };

        if mode == OptionsMode::Strict {
            if let Some(unknown) = map.keys().find(|k| !OPTION_KEYS.contains(&k.as_str())) {
                return Err(ClientError::InvalidOptions(format!(
                    "unknown option '{unknown}'"
                )));
            }
        }

        serde_json::from_value(value.clone())
            .map_err(|e| ClientError::InvalidOptions(e.to_string()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

/// Project configuration for the command-line host, loaded from `.dynapi.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DynapiConfig {
    /// Spec location used when none is given on the command line.
    pub spec: Option<String>,
    /// Options bag passed to the client.
    pub options: serde_json::Value,
    pub options_mode: OptionsMode,
    /// Map from a short alias to an operation name.
    pub aliases: IndexMap<String, String>,
}

impl DynapiConfig {
    pub fn client_options(&self) -> Result<ClientOptions, ClientError> {
        ClientOptions::from_value(&self.options, self.options_mode)
    }

    /// Resolve an alias to its operation name; unknown names pass through.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".dynapi.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<DynapiConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: DynapiConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# dynapi configuration
spec: openapi.yaml     # URL or path of the OpenAPI 3.x document

options:
  connectTimeoutMs: 30000
  readTimeoutMs: 30000
  defaultHeaders: {}
    # Authorization: Bearer xyz
  # baseUrlOverride: https://staging.example.com

options_mode: lax      # lax | strict (strict rejects unknown option keys)

aliases: {}
  # users: listUsers
"#
}
