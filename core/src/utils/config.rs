// core/src/utils/config.rs
use crate::utils::models::Cluster;
use crate::utils::value::{merge, Mapping, Value};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

const SETTINGS_FILE_NAME: &str = ".cs.json";

/// Contents of the settings file. Every section is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub clusters: Vec<Cluster>,
    /// Per-subcommand option defaults, e.g. `{"submit": {"mem": 256}}`.
    pub defaults: BTreeMap<String, Mapping>,
    pub http: HttpSettings,
    pub metrics: MetricsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Seconds
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: f64,
    /// Seconds
    #[serde(rename = "read-timeout")]
    pub read_timeout: f64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings { connect_timeout: 3.05, read_timeout: 20.0 }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Result<Duration> {
        seconds("connect-timeout", self.connect_timeout)
    }

    pub fn read_timeout(&self) -> Result<Duration> {
        seconds("read-timeout", self.read_timeout)
    }
}

/// Negative values clamp to zero; values too large for a `Duration` are rejected.
fn seconds(key: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value.max(0.0))
        .map_err(|e| anyhow!("Invalid http {} of {} seconds in settings: {}", key, value, e))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub disabled: bool,
    pub file: Option<PathBuf>,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        MetricsSettings { disabled: true, file: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings { file: None, level: "info".to_string() }
    }
}

/// Location of the settings file when none is given: `$HOME/.cs.json`,
/// falling back to the current directory.
pub fn default_settings_path() -> Result<PathBuf> {
    match env::var_os("HOME") {
        Some(home) => Ok(PathBuf::from(home).join(SETTINGS_FILE_NAME)),
        None => env::current_dir()
            .map(|p| p.join(SETTINGS_FILE_NAME))
            .context("Failed to get current directory for settings file"),
    }
}

impl Settings {
    /// Loads settings from `config_override`, or from the default location.
    /// A missing default file means built-in settings; a missing explicit one
    /// is an error.
    pub fn load(config_override: Option<&Path>) -> Result<Settings> {
        let config_path = match config_override {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found at {}", path.display()));
                }
                path.to_path_buf()
            }
            None => {
                let path = default_settings_path()?;
                if !path.exists() {
                    log::debug!("No settings file at {}, using built-in settings", path.display());
                    return Ok(Settings::default());
                }
                path
            }
        };
        Settings::from_file(&config_path)
    }

    pub fn from_file(config_path: &Path) -> Result<Settings> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let settings: Settings = serde_json::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        log::debug!("Loaded settings from {}", config_path.display());
        Ok(settings)
    }

    /// Layers option values for `command`: `declared` defaults, then the
    /// settings file's defaults, then `explicit` options on top.
    pub fn option_values(&self, command: &str, declared: &Mapping, explicit: &Mapping) -> Mapping {
        let configured = self.defaults.get(command).cloned().unwrap_or_default();
        merge(&merge(declared, &configured), explicit)
    }

    /// Picks the clusters to submit to, in order.
    ///
    /// An ad-hoc `url` wins over everything; a `cluster_name` selects that one
    /// configured cluster (even if disabled); otherwise all enabled clusters
    /// are used in file order.
    pub fn select_clusters(&self, cluster_name: Option<&str>, url: Option<&str>) -> Result<Vec<Cluster>> {
        if let Some(url) = url {
            let name = cluster_name.unwrap_or(url);
            return Ok(vec![Cluster::new(name, url)]);
        }
        if let Some(name) = cluster_name {
            return self
                .clusters
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .cloned()
                .map(|c| vec![c])
                .ok_or_else(|| anyhow!("You must specify a cluster that is present in your configuration (unknown cluster '{}').", name));
        }
        Ok(self.clusters.iter().filter(|c| !c.disabled).cloned().collect())
    }
}

/// Default option values for `submit` before any settings file is applied.
pub fn submit_declared_defaults() -> Mapping {
    let mut defaults = Mapping::new();
    defaults.insert("cpus".to_string(), Value::from(1i64));
    defaults.insert("max-retries".to_string(), Value::from(1i64));
    defaults.insert("mem".to_string(), Value::from(128i64));
    defaults.insert("command-prefix".to_string(), Value::str(""));
    defaults
}
