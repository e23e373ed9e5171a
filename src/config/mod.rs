use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4320;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".taskd"))
        .unwrap_or_else(|| PathBuf::from(".taskd"))
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Persistence backend selection (`backend` in config.toml, `--backend`,
/// `TASKD_BACKEND`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite table, WAL mode (default).
    #[default]
    Sqlite,
    /// Flat JSON file, fully rewritten on every mutation. Fine for small
    /// task lists; does not scale past that.
    Json,
}

impl Backend {
    pub fn parse(raw: &str) -> Option<Backend> {
        match raw {
            "sqlite" => Some(Backend::Sqlite),
            "json" => Some(Backend::Json),
            _ => None,
        }
    }
}

// ─── ObservabilityConfig ─────────────────────────────────────────────────────

/// Observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds).
    /// Default: 100. Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── TomlConfig ──────────────────────────────────────────────────────────────

/// File-backed configuration (`{data_dir}/config.toml`). Every field is
/// optional; anything absent falls through to the defaults.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    /// HTTP server port (default: 4320).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json"
    /// (structured for log aggregators).
    log_format: Option<String>,
    /// Persistence backend: "sqlite" (default) | "json".
    backend: Option<Backend>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ServerConfig ────────────────────────────────────────────────────────────

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_address: String,
    /// Holds config.toml, the SQLite database, and the JSON task file.
    pub data_dir: PathBuf,
    pub log: String,
    pub log_format: String,
    pub backend: Backend,
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
        backend: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("TASKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let backend = match backend.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => match Backend::parse(raw) {
                Some(b) => b,
                None => {
                    error!(backend = raw, "unknown backend — using sqlite");
                    Backend::Sqlite
                }
            },
            None => toml.backend.unwrap_or_default(),
        };

        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            backend,
            observability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new(None, Some(dir.path().to_path_buf()), None, None, None);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log, "info");
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.observability.slow_query_threshold_ms, 100);
    }

    #[test]
    fn cli_wins_over_toml_wins_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 9999\nlog = \"debug\"\nbackend = \"json\"\n\n[observability]\nslow_query_threshold_ms = 250\n",
        )
        .unwrap();

        let config = ServerConfig::new(
            Some(1234),
            Some(dir.path().to_path_buf()),
            None,
            None,
            None,
        );
        assert_eq!(config.port, 1234); // CLI beats TOML
        assert_eq!(config.log, "debug"); // TOML beats default
        assert_eq!(config.backend, Backend::Json);
        assert_eq!(config.observability.slow_query_threshold_ms, 250);
    }

    #[test]
    fn unknown_backend_falls_back_to_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new(
            None,
            Some(dir.path().to_path_buf()),
            None,
            None,
            Some("postgres".to_string()),
        );
        assert_eq!(config.backend, Backend::Sqlite);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = \"not a number").unwrap();
        let config = ServerConfig::new(None, Some(dir.path().to_path_buf()), None, None, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
