use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CollisionPolicy, Config};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub conversion: Option<ConversionConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub base_dir: Option<String>,
    pub output_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub on_collision: Option<CollisionPolicy>,
    pub expand_ligatures: Option<bool>,
}

/// Backend tuning. Interpreted by the PDF backend, not by the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub header_exclusion_ratio: Option<f32>,
    pub footer_exclusion_ratio: Option<f32>,
}

/// Platform config directory path: `<config_dir>/pdf2md/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdf2md").join("config.toml"))
}

/// Load config by cascading CWD `.pdf2md.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdf2md.toml"));

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
    match load_strict(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Read { .. }) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Load a config the user asked for explicitly; any problem is an error.
pub fn load_strict(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        paths: Some(PathsConfig {
            base_dir: overlay
                .paths
                .as_ref()
                .and_then(|p| p.base_dir.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.base_dir.clone())),
            output_suffix: overlay
                .paths
                .as_ref()
                .and_then(|p| p.output_suffix.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.output_suffix.clone())),
        }),
        conversion: Some(ConversionConfig {
            on_collision: overlay
                .conversion
                .as_ref()
                .and_then(|c| c.on_collision)
                .or_else(|| base.conversion.as_ref().and_then(|c| c.on_collision)),
            expand_ligatures: overlay
                .conversion
                .as_ref()
                .and_then(|c| c.expand_ligatures)
                .or_else(|| base.conversion.as_ref().and_then(|c| c.expand_ligatures)),
        }),
        extraction: Some(ExtractionConfig {
            header_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.header_exclusion_ratio)
                }),
            footer_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.footer_exclusion_ratio)
                }),
        }),
    }
}

impl ConfigFile {
    /// Apply the values present in this file on top of `config`.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(paths) = &self.paths {
            if let Some(base_dir) = &paths.base_dir {
                config.base_dir = PathBuf::from(base_dir);
            }
            if let Some(suffix) = &paths.output_suffix {
                config.output_suffix = suffix.clone();
            }
        }
        if let Some(conversion) = &self.conversion {
            if let Some(policy) = conversion.on_collision {
                config.on_collision = policy;
            }
            if let Some(expand) = conversion.expand_ligatures {
                config.expand_ligatures = expand;
            }
        }
        config
    }
}
