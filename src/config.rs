use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const GITHUB_EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

const DEFAULT_CONFIG_FILE: &str = ".pr-ai-review.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for `{key}` in config file: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Optional overrides read from `.pr-ai-review.toml`.
///
/// Every field is optional; credentials are never read from the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub gemini: GeminiSection,

    #[serde(default)]
    pub github: GitHubSection,

    #[serde(default)]
    pub images: ImagesSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubSection {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesSection {
    pub timeout_secs: Option<u64>,
    pub max_images: Option<usize>,
}

impl FileConfig {
    /// Load from `path` if given, otherwise from `.pr-ai-review.toml` in the
    /// current directory. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(FileConfig::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Credentials passed on the command line by the action wrapper.
/// Each one falls back to its environment variable when absent.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
}

/// The single immutable configuration value handed to the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub gemini_api_key: String,
    pub event_path: PathBuf,
    pub github_api_url: String,
    pub gemini_base_url: String,
    pub model: String,
    pub gemini_timeout: Duration,
    pub github_timeout: Duration,
    pub image_timeout: Duration,
    pub max_images: usize,
}

impl Config {
    pub const DEFAULT_GITHUB_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_GEMINI_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";
    pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_IMAGES: usize = 3;

    /// Load configuration from the process environment, the optional TOML
    /// file and the CLI overrides.
    pub fn load(cli: CliOverrides, config_path: Option<&Path>) -> Result<Config, ConfigError> {
        let file = FileConfig::load(config_path)?;
        Self::from_sources(cli, file, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from explicit sources. `env` looks up a
    /// variable by name.
    ///
    /// Precedence: CLI > environment > file > defaults. Blank values count
    /// as unset.
    pub fn from_sources<F>(cli: CliOverrides, file: FileConfig, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |cli_value: Option<String>, var: &'static str| {
            non_blank(cli_value)
                .or_else(|| non_blank(env(var)))
                .ok_or(ConfigError::MissingVar(var))
        };

        let github_token = required(cli.github_token, GITHUB_TOKEN_VAR)?;
        let gemini_api_key = required(cli.gemini_api_key, GEMINI_API_KEY_VAR)?;
        let event_path = required(None, GITHUB_EVENT_PATH_VAR)?;

        Ok(Config {
            github_token,
            gemini_api_key,
            event_path: PathBuf::from(event_path),
            github_api_url: trim_base(
                file.github
                    .api_url
                    .unwrap_or_else(|| Self::DEFAULT_GITHUB_API_URL.to_string()),
            ),
            gemini_base_url: trim_base(
                file.gemini
                    .base_url
                    .unwrap_or_else(|| Self::DEFAULT_GEMINI_BASE_URL.to_string()),
            ),
            model: file
                .gemini
                .model
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            gemini_timeout: timeout(
                "gemini.timeout_secs",
                file.gemini.timeout_secs,
                Self::DEFAULT_API_TIMEOUT,
            )?,
            github_timeout: timeout(
                "github.timeout_secs",
                file.github.timeout_secs,
                Self::DEFAULT_API_TIMEOUT,
            )?,
            image_timeout: timeout(
                "images.timeout_secs",
                file.images.timeout_secs,
                Self::DEFAULT_IMAGE_TIMEOUT,
            )?,
            max_images: max_images(file.images.max_images)?,
        })
    }
}

fn timeout(key: &'static str, secs: Option<u64>, default: Duration) -> Result<Duration, ConfigError> {
    match secs {
        None => Ok(default),
        Some(0) => Err(ConfigError::InvalidValue {
            key,
            reason: "timeout must be at least one second".to_string(),
        }),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

/// The file may lower the image cap but never raise it above the default.
fn max_images(value: Option<usize>) -> Result<usize, ConfigError> {
    match value {
        None => Ok(Config::DEFAULT_MAX_IMAGES),
        Some(n) if (1..=Config::DEFAULT_MAX_IMAGES).contains(&n) => Ok(n),
        Some(n) => Err(ConfigError::InvalidValue {
            key: "images.max_images",
            reason: format!("{n} is outside 1..={}", Config::DEFAULT_MAX_IMAGES),
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
