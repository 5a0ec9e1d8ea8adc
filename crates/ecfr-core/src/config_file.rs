use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub endpoints: Option<EndpointsConfig>,
    pub http: Option<HttpConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub registry_url: Option<String>,
    pub acquisition_url: Option<String>,
    pub corrections_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

/// Platform config directory path: `<config_dir>/ecfr-dashboard/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ecfr-dashboard").join("config.toml"))
}

/// Load config by cascading CWD `.ecfr-dashboard.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".ecfr-dashboard.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_endpoints = base.endpoints.unwrap_or_default();
    let overlay_endpoints = overlay.endpoints.unwrap_or_default();
    let base_http = base.http.unwrap_or_default();
    let overlay_http = overlay.http.unwrap_or_default();
    let base_display = base.display.unwrap_or_default();
    let overlay_display = overlay.display.unwrap_or_default();

    ConfigFile {
        endpoints: Some(EndpointsConfig {
            registry_url: overlay_endpoints
                .registry_url
                .or(base_endpoints.registry_url),
            acquisition_url: overlay_endpoints
                .acquisition_url
                .or(base_endpoints.acquisition_url),
            corrections_url: overlay_endpoints
                .corrections_url
                .or(base_endpoints.corrections_url),
        }),
        http: Some(HttpConfig {
            request_timeout_secs: overlay_http
                .request_timeout_secs
                .or(base_http.request_timeout_secs),
            user_agent: overlay_http.user_agent.or(base_http.user_agent),
        }),
        display: Some(DisplayConfig {
            theme: overlay_display.theme.or(base_display.theme),
        }),
    }
}

impl ConfigFile {
    /// Overwrite the fields of `config` that this file sets.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(endpoints) = &self.endpoints {
            if let Some(url) = &endpoints.registry_url {
                config.endpoints.registry_url = url.clone();
            }
            if let Some(url) = &endpoints.acquisition_url {
                config.endpoints.acquisition_url = url.clone();
            }
            if let Some(url) = &endpoints.corrections_url {
                config.endpoints.corrections_url = url.clone();
            }
        }
        if let Some(http) = &self.http {
            if let Some(secs) = http.request_timeout_secs {
                // 0 means "no timeout"
                config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            if let Some(ua) = &http.user_agent {
                config.user_agent = ua.clone();
            }
        }
    }

    pub fn theme(&self) -> Option<&str> {
        self.display.as_ref().and_then(|d| d.theme.as_deref())
    }
}
