//! Configuration loading.
//!
//! Files are loaded in order (later wins, table by table):
//! 1. `/etc/ethicist/config.toml` (system)
//! 2. `~/.config/ethicist/config.toml` (user)
//! 3. `./ethicist.toml`, or the `--config` path when given
//! 4. Environment variables (`ETHICIST_*`, `RUST_LOG`, `OTEL_EXPORTER_OTLP_ENDPOINT`)
//!
//! The API key itself never lives in config; `llm.api_key_env` names the
//! variable that holds it, and the gateway reads that on first use.
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//! base_url = "http://localhost:11434/v1"
//!
//! [server]
//! host = "127.0.0.1"
//! http_port = 8000
//!
//! [telemetry]
//! log_level = "info,ethicist=debug"
//! otlp_endpoint = "http://127.0.0.1:4317"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EthicistConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Environment variable holding the API key.
    #[serde(default = "LlmConfig::default_api_key_env")]
    pub api_key_env: String,

    /// Environment variable that, when set, overrides `model`.
    #[serde(default = "LlmConfig::default_model_env")]
    pub model_env: String,

    #[serde(default = "LlmConfig::default_model")]
    pub model: String,

    /// OpenAI-compatible endpoint; the public API when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LlmConfig {
    fn default_api_key_env() -> String {
        "OPENAI_API_KEY".to_string()
    }

    fn default_model_env() -> String {
        "OPENAI_MODEL".to_string()
    }

    fn default_model() -> String {
        "gpt-4o-mini".to_string()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: Self::default_api_key_env(),
            model_env: Self::default_model_env(),
            model: Self::default_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,

    #[serde(default = "ServerConfig::default_http_port")]
    pub http_port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_http_port() -> u16 {
        8000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            http_port: Self::default_http_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives.
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint. Traces are exported only when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info,ethicist=debug,baton=info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: None,
        }
    }
}

/// Where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub files: Vec<PathBuf>,
    pub env_overrides: Vec<String>,
}

impl EthicistConfig {
    /// Load from standard locations plus environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None).map(|(config, _)| config)
    }

    /// Load, with `config_path` taking the place of `./ethicist.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in discover_config_files(config_path) {
            let table = read_table(&path)?;
            merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config: EthicistConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;

        apply_env_overrides(&mut config, &mut sources, |name| env::var(name).ok());

        Ok((config, sources))
    }
}

/// Existing config files in load order.
///
/// A `cli_path` that exists replaces the local `./ethicist.toml`.
pub fn discover_config_files(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/ethicist/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("ethicist/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path.filter(|p| p.exists()) {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("ethicist.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Recursively merge `overlay` into `base`. Non-table values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Overlay environment variables, recording each one applied.
///
/// Blank values and values that fail to parse are skipped and not recorded.
pub fn apply_env_overrides<F>(config: &mut EthicistConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let text = |v: &str| Some(v.to_string());

    if let Some(v) = env_value(sources, &lookup, "ETHICIST_HOST", text) {
        config.server.host = v;
    }
    if let Some(port) = env_value(sources, &lookup, "ETHICIST_HTTP_PORT", |v| v.trim().parse::<u16>().ok()) {
        config.server.http_port = port;
    }

    if let Some(v) = env_value(sources, &lookup, "ETHICIST_LLM_MODEL", text) {
        config.llm.model = v;
    }
    if let Some(v) = env_value(sources, &lookup, "ETHICIST_LLM_BASE_URL", text) {
        config.llm.base_url = Some(v);
    }

    // RUST_LOG beats the ethicist-specific knob, matching EnvFilter's own convention
    if let Some(v) = env_value(sources, &lookup, "ETHICIST_LOG_LEVEL", text) {
        config.telemetry.log_level = v;
    }
    if let Some(v) = env_value(sources, &lookup, "RUST_LOG", text) {
        config.telemetry.log_level = v;
    }

    if let Some(v) = env_value(sources, &lookup, "OTEL_EXPORTER_OTLP_ENDPOINT", text) {
        config.telemetry.otlp_endpoint = Some(v);
    }
    if let Some(v) = env_value(sources, &lookup, "ETHICIST_OTLP_ENDPOINT", text) {
        config.telemetry.otlp_endpoint = Some(v);
    }
}

fn env_value<T>(
    sources: &mut ConfigSources,
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(name).filter(|v| !v.trim().is_empty())?;
    let value = parse(&raw)?;
    sources.env_overrides.push(name.to_string());
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = EthicistConfig::default();
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.server.http_port, 8000);
        assert!(config.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"gpt-4o\"\n\n[server]\nhttp_port = 9100").unwrap();

        let table = read_table(file.path()).unwrap();
        let config: EthicistConfig = toml::Value::Table(table).try_into().unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.server.http_port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn later_tables_merge_key_by_key() {
        let mut base: toml::Table = "[llm]\nmodel = \"a\"\nbase_url = \"http://x\"".parse().unwrap();
        let overlay: toml::Table = "[llm]\nmodel = \"b\"".parse().unwrap();
        merge_tables(&mut base, overlay);

        let config: EthicistConfig = toml::Value::Table(base).try_into().unwrap();
        assert_eq!(config.llm.model, "b");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://x"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nmodel = ").unwrap();

        let err = read_table(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn env_overrides_are_applied_and_recorded() {
        let mut config = EthicistConfig::default();
        let mut sources = ConfigSources::default();

        apply_env_overrides(
            &mut config,
            &mut sources,
            env_from(&[
                ("ETHICIST_HTTP_PORT", "8123"),
                ("ETHICIST_LOG_LEVEL", "warn"),
                ("RUST_LOG", "debug"),
                ("ETHICIST_LLM_BASE_URL", "http://localhost:1234/v1"),
                ("OTEL_EXPORTER_OTLP_ENDPOINT", ""),
            ]),
        );

        assert_eq!(config.server.http_port, 8123);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:1234/v1"));
        assert!(config.telemetry.otlp_endpoint.is_none());
        assert_eq!(
            sources.env_overrides,
            vec!["ETHICIST_HTTP_PORT", "ETHICIST_LLM_BASE_URL", "ETHICIST_LOG_LEVEL", "RUST_LOG"]
        );
    }

    #[test]
    fn unparseable_port_is_ignored() {
        let mut config = EthicistConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides(
            &mut config,
            &mut sources,
            env_from(&[("ETHICIST_HTTP_PORT", "eighty")]),
        );
        assert_eq!(config.server.http_port, 8000);
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn cli_path_replaces_local_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let files = discover_config_files(Some(file.path()));
        assert_eq!(files.last().map(PathBuf::as_path), Some(file.path()));
    }
}
