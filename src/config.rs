//! Layered settings: built-in defaults, an optional TOML file, then
//! `STREAMSCOUT__*` environment variables.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "STREAMSCOUT";
const CONFIG_DIR: &str = "streamscout";
const CONFIG_FILE: &str = "config.toml";

/// Crate settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub adapters: AdapterSettings,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "streamscout=debug"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// Write daily rolling log files here instead of stderr
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

/// Per-adapter settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    /// Adapter ids to register; `None` registers all
    pub enabled: Option<Vec<String>>,
    /// Replacement URLs keyed by adapter id, for sites that moved domains
    pub overrides: HashMap<String, SiteOverride>,
}

/// Replacement URLs for one adapter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteOverride {
    pub main_url: Option<String>,
    pub api_url: Option<String>,
}

impl SiteOverride {
    /// Overwrite the given URLs with the configured ones
    pub fn apply(&self, main_url: &mut String, api_url: &mut String) {
        if let Some(ref url) = self.main_url {
            *main_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref url) = self.api_url {
            *api_url = url.trim_end_matches('/').to_string();
        }
    }
}

impl AdapterSettings {
    /// Whether the adapter with `id` should be registered
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|e| e.eq_ignore_ascii_case(id)))
    }

    pub fn override_for(&self, id: &str) -> Option<&SiteOverride> {
        self.overrides.get(id)
    }

    /// Main URL of `id`, or `default`
    pub fn main_url(&self, id: &str, default: &str) -> String {
        self.override_for(id)
            .and_then(|o| o.main_url.as_deref())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// API URL of `id`, or `default`
    pub fn api_url(&self, id: &str, default: &str) -> String {
        self.override_for(id)
            .and_then(|o| o.api_url.as_deref())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

impl Settings {
    /// Load settings from `path` (or the default location) and the environment
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                if let Some(default_path) = Self::default_path()
                    && default_path.exists()
                {
                    builder =
                        builder.add_source(File::from(default_path).format(FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(source: &str) -> crate::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// `<config dir>/streamscout/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    fn validate(&self) -> crate::Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::Error::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        for (id, site) in &self.adapters.overrides {
            for url in [&site.main_url, &site.api_url].into_iter().flatten() {
                url::Url::parse(url).map_err(|e| {
                    crate::Error::Config(format!("invalid override URL for {id}: {url} ({e})"))
                })?;
            }
        }

        Ok(())
    }
}
