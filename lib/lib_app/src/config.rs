use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use lib_renderer::{Color, DEFAULT_BIN_SIZE, ScreenMode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("atlas bin size must be positive, got {0}")]
    InvalidBinSize(i16),
}

/// Window and renderer settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    pub screen: ScreenMode,
    /// Width and height of each atlas bin.
    pub bin_size: i16,
    /// sRGB color of the letterbox margins.
    pub border_color: [u8; 3],
    pub maximized: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "pixlet".to_owned(),
            screen: ScreenMode::default(),
            bin_size: DEFAULT_BIN_SIZE,
            border_color: [0, 0, 0],
            maximized: false,
        }
    }
}

impl AppConfig {
    pub const PATH_VAR: &str = "PIXLET_CONFIG";
    pub const DEFAULT_PATH: &str = "pixlet.toml";

    /// Reads the file named by `PIXLET_CONFIG`, or `pixlet.toml` if that
    /// variable is unset. A missing `pixlet.toml` gives the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        match env::var_os(Self::PATH_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                let path = Path::new(Self::DEFAULT_PATH);
                if path.exists() {
                    Self::load(path)
                } else {
                    log::debug!("no {}, using default config", Self::DEFAULT_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        let config = Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            err => err,
        })?;

        log::info!("loaded config from {path:?}");

        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        if config.bin_size <= 0 {
            return Err(ConfigError::InvalidBinSize(config.bin_size));
        }

        Ok(config)
    }

    pub fn border(&self) -> Color {
        let [r, g, b] = self.border_color;
        Color::srgb8(r, g, b)
    }
}
