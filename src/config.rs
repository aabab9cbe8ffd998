//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <FILE>` or `$XDG_CONFIG_HOME/cb/cb.toml`
//! 3. Environment variables: `AWS_PROFILE`, then `CB_*` prefix
//! 4. Command line flags

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::ApplicationError;

/// Which implementation of the build service to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// CodeBuild and CloudWatch Logs via the AWS SDK
    #[default]
    Aws,
    /// Offline canned data
    Stub,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Aws => f.write_str("aws"),
            Backend::Stub => f.write_str("stub"),
        }
    }
}

impl FromStr for Backend {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Backend::Aws),
            "stub" => Ok(Backend::Stub),
            other => Err(ApplicationError::Config {
                message: format!("unknown backend '{other}' (expected 'aws' or 'stub')"),
            }),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub backend: Option<Backend>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Unified configuration for cb.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Backend implementation (default: aws)
    pub backend: Backend,
    /// Named AWS profile for the SDK credential chain
    pub profile: Option<String>,
    /// AWS region override (default: SDK region resolution)
    pub region: Option<String>,
    /// Deadline for one invocation, in seconds (default: none)
    pub timeout_secs: Option<u64>,
}

/// Get the XDG config directory for cb.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cb").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cb.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let raw: RawSettings = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    if let Some(secs) = raw.timeout_secs {
        check_timeout(&path.display().to_string(), secs)?;
    }
    Ok(raw)
}

/// Timeouts share the command line's lower bound of one second.
fn check_timeout(source: &str, secs: u64) -> Result<u64, ApplicationError> {
    if secs == 0 {
        return Err(ApplicationError::Config {
            message: format!("{source}: timeout_secs must be at least 1"),
        });
    }
    Ok(secs)
}

impl Settings {
    /// Merge overlay onto self: overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            backend: overlay.backend.unwrap_or(self.backend),
            profile: overlay.profile.clone().or_else(|| self.profile.clone()),
            region: overlay.region.clone().or_else(|| self.region.clone()),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Load defaults and the config file, without environment overrides.
    ///
    /// An explicit `config_path` must exist; the global file is optional.
    pub fn load_layers(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_path {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        let raw = load_raw_settings(&global_path)?;
                        current = current.merge_with(&raw);
                    }
                }
            }
        }

        Ok(current)
    }

    /// Load settings with layered precedence (everything except CLI flags).
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let current = Self::load_layers(config_path)?;
        let aws_profile = std::env::var("AWS_PROFILE").ok();
        let current = current.apply_aws_profile(aws_profile);
        Self::apply_env_overrides(current)
    }

    /// Use the SDK's profile variable when nothing more specific is set in the environment.
    pub fn apply_aws_profile(mut self, aws_profile: Option<String>) -> Self {
        if let Some(profile) = aws_profile.filter(|p| !p.is_empty()) {
            self.profile = Some(profile);
        }
        self
    }

    /// Apply CB_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("backend") {
            settings.backend = val.parse()?;
        }
        if let Ok(val) = config.get_string("profile") {
            settings.profile = Some(val);
        }
        if let Ok(val) = config.get_string("region") {
            settings.region = Some(val);
        }
        if let Ok(val) = config.get_string("timeout_secs") {
            let secs = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("CB_TIMEOUT_SECS: not a number of seconds: {val}"),
            })?;
            settings.timeout_secs = Some(check_timeout("CB_TIMEOUT_SECS", secs)?);
        }

        Ok(settings)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
