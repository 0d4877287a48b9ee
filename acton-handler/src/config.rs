//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: ACTON_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-handler/{service_name}/config.toml
//! 4. System directory: /etc/acton-handler/{service_name}/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "blog"
//! log_level = "debug"
//!
//! [pagination]
//! default_per_page = 50
//! limit_enabled = true
//! max_per_page = 250
//!
//! [executor]
//! guard_enabled = true
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Page size defaults and limits for query shaping
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Action executor behavior
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level (trace, debug, info, warn, error) or a full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Pagination configuration
///
/// Read once at startup and shared read-only with every [`QueryShaper`](crate::query::QueryShaper).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items per page when neither the caller nor the request asks for a size
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Items per page for client-facing listings
    #[serde(default = "default_client_per_page")]
    pub client_per_page: u32,

    /// Clamp requested page sizes to `max_per_page`
    #[serde(default = "default_true")]
    pub limit_enabled: bool,

    /// Hard cap applied when `limit_enabled` is set
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

impl PaginationConfig {
    /// Page size used for client-facing listings
    #[must_use]
    pub fn client_default(&self) -> u32 {
        self.client_per_page
    }

    /// Apply the cap to a requested page size
    ///
    /// ```rust
    /// use acton_handler::config::PaginationConfig;
    ///
    /// let config = PaginationConfig::default();
    /// assert_eq!(config.clamp(1000), 250);
    /// assert_eq!(config.clamp(20), 20);
    /// ```
    #[must_use]
    pub fn clamp(&self, requested: u32) -> u32 {
        if self.limit_enabled {
            requested.min(self.max_per_page)
        } else {
            requested
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            client_per_page: default_client_per_page(),
            limit_enabled: true,
            max_per_page: default_max_per_page(),
        }
    }
}

/// Action executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Process-wide switch for guarded execution.
    ///
    /// When false every action runs unguarded, regardless of per-call options.
    #[serde(default = "default_true")]
    pub guard_enabled: bool,

    /// Status attached to successful guarded results unless the action overrides it
    #[serde(default = "default_success_status")]
    pub success_status: u16,

    /// Status attached to recovered faults
    #[serde(default = "default_failure_status")]
    pub failure_status: u16,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            guard_enabled: true,
            success_status: default_success_status(),
            failure_status: default_failure_status(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_per_page() -> u32 {
    50
}

fn default_client_per_page() -> u32 {
    25
}

fn default_max_per_page() -> u32 {
    250
}

fn default_success_status() -> u16 {
    200
}

fn default_failure_status() -> u16 {
    500
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the running binary.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "acton-handler".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut defaults = Config::default();
        defaults.service.name = service_name.to_string();

        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so later merges win
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("ACTON_").split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ACTON_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-handler");
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Ok(path) = xdg_dirs.place_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/acton-handler")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "acton-handler".to_string(),
                log_level: default_log_level(),
            },
            pagination: PaginationConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}
