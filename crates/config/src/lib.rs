//! Layered configuration.
//!
//! Sources are merged lowest to highest:
//!
//! 1. built-in defaults,
//! 2. `frost.toml`, `frost.yaml` and `frost.json` in the platform
//!    configuration directory, when present,
//! 3. an explicit file (passed in, or named by `FROST_CONFIG`),
//! 4. `FROST_` environment variables, with `__` separating nested keys
//!    (`FROST_PREVIEW__USER_ID`).
//!
//! ```toml
//! [preview]
//! user_id = "previewuser"
//! password = "previewuserpass"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use frost_tree::Credentials;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name, without extension, looked up in the configuration directory.
pub const CONFIG_FILE_STEM: &str = "frost";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "FROST_CONFIG";
/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "FROST_";
/// User the read-only view logs in as unless configured otherwise.
pub const DEFAULT_PREVIEW_USER: &str = "previewuser";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials for the read-only view that version history is read through.
    pub preview: PreviewConfig,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub user_id: String,
    pub password: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_PREVIEW_USER.to_string(),
            password: None,
        }
    }
}

impl fmt::Debug for PreviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewConfig")
            .field("user_id", &self.user_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Loads every layer, reading the platform configuration directory if it
    /// can be determined.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let dir = match default_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping platform configuration directory");
                None
            },
        };
        let file = file.map(Path::to_path_buf).or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        Self::load_layers(dir.as_deref(), file.as_deref())
    }

    /// Loads from an explicit directory and file instead of the platform
    /// defaults. Environment variables still apply.
    pub fn load_layers(dir: Option<&Path>, file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(dir) = dir {
            let stem = dir.join(CONFIG_FILE_STEM);
            figment = figment
                .merge(Toml::file(stem.with_extension("toml")))
                .merge(Yaml::file(stem.with_extension("yaml")))
                .merge(Json::file(stem.with_extension("json")));
        }
        if let Some(file) = file {
            figment = merge_file(figment, file)?;
        }
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"]));
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(user_id = %config.preview.user_id, "Loaded configuration");
        Ok(config)
    }

    /// Credentials for opening the read-only view.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.preview.user_id.clone(), self.preview.password.clone())
    }
}

/// The platform configuration directory for frost.
pub fn default_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", CONFIG_FILE_STEM)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_raise(|| ErrorKind::NoConfigDirectory)
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(figment)
}
