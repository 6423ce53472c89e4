use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

use crate::auth::Token;
use crate::error::DashboardError;

/// Dashboard configuration.
///
/// Settings may be written at the top level of the file or nested under a
/// `config` key. Numeric settings accept either numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitLab instance base URL
    pub url: String,

    /// Project id or full path (e.g. "42" or "group/project")
    #[serde(deserialize_with = "id_or_number")]
    pub id: String,

    /// Private token sent with every API request
    pub token: String,

    /// Number of distinct refs shown on the dashboard
    #[serde(deserialize_with = "number_or_string")]
    pub size: usize,

    /// Local TCP port to listen on
    #[serde(deserialize_with = "number_or_string")]
    pub port: u16,

    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Upper bound on pipeline list pages fetched per render
    #[serde(
        default = "default_max_pages",
        deserialize_with = "number_or_string"
    )]
    pub max_pages: usize,

    /// HTML-escape values inserted into templates
    #[serde(default = "default_escape_html")]
    pub escape_html: bool,

    /// Per-request timeout for upstream calls; none when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory holding main.html, tr.html, td.html and error.html
    #[serde(default = "default_templates")]
    pub templates: PathBuf,
}

/// Settings nested under a top-level `config` table, or the document itself.
fn settings(mut document: Value) -> Value {
    if document.get("config").is_some_and(Value::is_object) {
        return document["config"].take();
    }
    document
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => T::try_from(n)
            .map_err(|_| de::Error::custom(format!("number {n} is out of range"))),
        NumberOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("'{text}' is not a valid number"))),
    }
}

fn id_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::Text(text) => text,
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_pages() -> usize {
    50
}

fn default_escape_html() -> bool {
    true
}

fn default_templates() -> PathBuf {
    PathBuf::from("template")
}

impl Config {
    /// Load and validate configuration from a file.
    ///
    /// The format follows the extension (`.json`, `.toml`, `.yaml`/`.yml`);
    /// anything else is tried as TOML, then JSON, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let document: Value = match extension {
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        let config: Config = serde_json::from_value(settings(document))
            .with_context(|| format!("Invalid settings in config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        Url::parse(&self.url)
            .map_err(|e| DashboardError::Config(format!("invalid url '{}': {e}", self.url)))?;

        if self.id.trim().is_empty() {
            return Err(DashboardError::Config("id must not be empty".to_string()));
        }
        if self.token().is_empty() {
            return Err(DashboardError::Config("token must not be empty".to_string()));
        }
        if self.size == 0 {
            return Err(DashboardError::Config("size must be at least 1".to_string()));
        }
        if self.max_pages == 0 {
            return Err(DashboardError::Config(
                "max-pages must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn token(&self) -> Token {
        Token::from(self.token.as_str())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
