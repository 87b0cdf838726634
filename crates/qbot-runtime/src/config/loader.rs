//! Layered configuration loading.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. `QbotConfig::default()`
//! 2. the profile file, e.g. `qbot.production.toml`
//! 3. the main file, `qbot.toml` (or `qbot.yaml` / `qbot.yml`)
//! 4. `QBOT_*` environment variables, nested with `__`
//! 5. values passed to [`ConfigLoader::merge`]
//!
//! So `QBOT_DISPATCH__CONCURRENCY=4` sets `dispatch.concurrency` and
//! `QBOT_LOGGING__LEVEL=debug` sets `logging.level`.
//!
//! TOML needs the `toml-config` feature (on by default) and YAML needs
//! `yaml-config`. With both enabled, one file of each format may be merged,
//! TOML first.
//!
//! ```rust,ignore
//! use qbot_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("prod")
//!     .file("deploy/qbot.toml")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::QbotConfig;
use super::validation::validate_config;

/// Prefix of environment variables read by the loader.
pub const ENV_PREFIX: &str = "QBOT_";

/// Variable selecting the [`Profile`].
const PROFILE_VAR: &str = "QBOT_PROFILE";

/// Directory under the user config dir, and file stem.
const APP_NAME: &str = "qbot";

// =============================================================================
// Profile
// =============================================================================

/// Deployment profile. Picks the `qbot.{profile}.*` overlay file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    /// Any other name, kept as given.
    Custom(String),
}

impl Profile {
    /// Name used in overlay file names.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev` and `prod` are accepted, case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dev" | "development" => Self::Development,
            "prod" | "production" => Self::Production,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Reads `QBOT_PROFILE`, falling back to [`Profile::Development`].
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// File formats
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

/// Formats compiled in, in merge order.
const FORMATS: &[FileFormat] = &[
    #[cfg(feature = "toml-config")]
    FileFormat::Toml,
    #[cfg(feature = "yaml-config")]
    FileFormat::Yaml,
];

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        FORMATS
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    #[cfg_attr(
        not(any(feature = "toml-config", feature = "yaml-config")),
        allow(unused_variables)
    )]
    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(figment::providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(figment::providers::Yaml::file(path)),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Builder that gathers configuration sources and extracts a [`QbotConfig`].
pub struct ConfigLoader {
    profile: Profile,
    search_paths: Vec<PathBuf>,
    /// When set, the only file read; search paths are ignored.
    config_file: Option<PathBuf>,
    load_env: bool,
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader with the profile from `QBOT_PROFILE` and env loading on.
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
            overrides: Figment::new(),
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to look for `qbot.*` files in.
    ///
    /// Without any, the current directory and the user config directory
    /// are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds `<config dir>/qbot`, e.g. `~/.config/qbot` on Linux.
    pub fn with_user_config_dir(self) -> Self {
        match user_config_dir() {
            Some(dir) => self.search_path(dir),
            None => self,
        }
    }

    /// Reads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` over every other source.
    ///
    /// All fields are applied, so start from a loaded or default value and
    /// change what you need.
    pub fn merge(mut self, config: QbotConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<QbotConfig> {
        let profile = self.profile.clone();
        let config: QbotConfig = self.build_figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            %profile,
            level = %config.logging.level,
            concurrency = config.dispatch.concurrency,
            sandbox = config.bot.sandbox,
            "Configuration ready"
        );
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(QbotConfig::default()));

        match &self.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.clone()));
                }
                let format = FileFormat::from_path(path).ok_or_else(|| {
                    ConfigError::ParseError(format!(
                        "{} is not a supported configuration format",
                        path.display()
                    ))
                })?;
                info!(path = %path.display(), "Reading config file");
                figment = format.merge_into(figment, path);
            }
            None => {
                let files = self.discover_files();
                if files.is_empty() {
                    warn!("No qbot config file found, continuing with defaults");
                }
                for (format, path) in files {
                    info!(path = %path.display(), "Reading config file");
                    figment = format.merge_into(figment, &path);
                }
            }
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Reading environment overrides");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Files to merge, in merge order.
    ///
    /// For each format, the first search directory holding a main file wins.
    /// The profile overlay from that same directory comes just before it so
    /// the main file takes precedence.
    fn discover_files(&self) -> Vec<(FileFormat, PathBuf)> {
        let dirs = if self.search_paths.is_empty() {
            default_search_paths()
        } else {
            self.search_paths.clone()
        };

        let mut files = Vec::new();
        for &format in FORMATS {
            let found = dirs.iter().find_map(|dir| {
                format.extensions().iter().find_map(|ext| {
                    let main = dir.join(format!("{APP_NAME}.{ext}"));
                    main.exists().then(|| {
                        let overlay = dir.join(format!("{APP_NAME}.{}.{ext}", self.profile));
                        (overlay, main)
                    })
                })
            });

            if let Some((overlay, main)) = found {
                if overlay.exists() {
                    debug!(path = %overlay.display(), profile = %self.profile, "Found profile overlay");
                    files.push((format, overlay));
                }
                files.push((format, main));
            }
        }
        files
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

fn default_search_paths() -> Vec<PathBuf> {
    std::env::current_dir()
        .ok()
        .into_iter()
        .chain(user_config_dir())
        .collect()
}

/// [`ConfigLoader::new`] then [`ConfigLoader::load`].
pub fn load_config() -> ConfigResult<QbotConfig> {
    ConfigLoader::new().load()
}

/// Loads `path` plus environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<QbotConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
