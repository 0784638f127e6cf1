use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

/// Application configuration, layered: TOML file (optional) under
/// environment-variable overrides, with built-in defaults below both.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// JSON array file holding the equipment registry.
    #[serde(default = "default_equipment_file")]
    pub equipment_file: String,

    /// Line-delimited JSON traffic log.
    #[serde(default = "default_traffic_log_file")]
    pub traffic_log_file: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub snmp: SnmpConfig,

    #[serde(default)]
    pub ping: PingConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SnmpConfig {
    #[serde(default = "default_community")]
    pub community: String,

    #[serde(default = "default_snmp_port")]
    pub port: u16,

    #[serde(default = "default_snmp_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PingConfig {
    #[serde(default = "default_ping_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_equipment_file() -> String {
    "equipment.json".to_string()
}

fn default_traffic_log_file() -> String {
    "traffic_log.json".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_community() -> String {
    "public".to_string()
}

fn default_snmp_port() -> u16 {
    161
}

fn default_snmp_timeout_secs() -> u64 {
    3
}

fn default_ping_timeout_secs() -> u64 {
    2
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            port: default_snmp_port(),
            timeout_secs: default_snmp_timeout_secs(),
        }
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_ping_timeout_secs(),
        }
    }
}

impl SnmpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads configuration. A missing file (or `None`) falls back to
    /// defaults; `EQUIPWATCH_EQUIPMENT_FILE` and `EQUIPWATCH_TRAFFIC_LOG`
    /// override the file paths from the environment.
    pub fn load(config_path: Option<&str>) -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let mut config: AppConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("failed to read config file {path:?}: {e}"))
                })?;
                toml::from_str(&contents).map_err(|e| {
                    AppError::Config(format!("failed to parse config file {path:?}: {e}"))
                })?
            } else {
                // Same fallback as an absent --config: run on defaults.
                toml::from_str("").map_err(|e| AppError::Config(e.to_string()))?
            }
        } else {
            // An empty document takes every serde default.
            toml::from_str("").map_err(|e| AppError::Config(e.to_string()))?
        };

        if let Ok(path) = env::var("EQUIPWATCH_EQUIPMENT_FILE") {
            config.equipment_file = path;
        }
        if let Ok(path) = env::var("EQUIPWATCH_TRAFFIC_LOG") {
            config.traffic_log_file = path;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_deployed_layout() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.equipment_file, "equipment.json");
        assert_eq!(config.traffic_log_file, "traffic_log.json");
        assert_eq!(config.snmp.community, "public");
        assert_eq!(config.snmp.port, 161);
        assert_eq!(config.ping.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
traffic_log_file = "/var/lib/equipwatch/traffic.jsonl"

[snmp]
community = "internal"
timeout_secs = 5
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.traffic_log_file, "/var/lib/equipwatch/traffic.jsonl");
        assert_eq!(config.snmp.community, "internal");
        assert_eq!(config.snmp.timeout(), Duration::from_secs(5));
        // Untouched sections keep their defaults.
        assert_eq!(config.snmp.port, 161);
        assert_eq!(config.equipment_file, "equipment.json");
    }

    #[test]
    fn missing_named_file_falls_back_to_defaults() {
        let config = AppConfig::load(Some("/nonexistent/equipwatch.toml")).unwrap();
        assert_eq!(config.equipment_file, "equipment.json");
    }
}
