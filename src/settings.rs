use crate::core::config::Config;
use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "GITLAB_ADMIN";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub gitlab: Config,
}

/// Values given on the command line, winning over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub auth_token: Option<String>,
}

impl Settings {
    /// `~/.config/gitlab-admin/config.yaml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gitlab-admin")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Reads `path` (must exist) or the default config file (optional),
    /// then `GITLAB_ADMIN_*` variables (e.g. `GITLAB_ADMIN_GITLAB__HOST`),
    /// then `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("reading settings from {}", path.display());

            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(required));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("gitlab.host", overrides.host.clone())?
            .set_override_option("gitlab.auth_token", overrides.auth_token.clone())?
            .build()?
            .try_deserialize()
    }
}
