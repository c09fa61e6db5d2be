//! Run configuration.
//!
//! Loads `config.toml` (everything about *what* to post and *how*) and the
//! secrets file it points to (the server and the credentials). Both are read
//! once at startup and validated before any state is touched, so a broken
//! configuration never gets as far as the ledger.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! image_dir = "media"          # Media root; subdirectory names become hashtags
//! order = "random"             # random | sequential (alias: seq)
//! default_desc = ""            # First line of every status
//! default_tags = ""            # Tags put before the directory tags
//! sensitive = false            # Mark uploads as sensitive
//! add_media_format_tag = true  # Append #video / #gif
//! visibility = "public"        # public | unlisted | private | direct
//! secrets = "secrets.toml"     # Server and credentials, see below
//! infodb = ""                  # Metadata database (JSON); empty = none
//! visited_db = "visited.json"  # Visited ledger (JSON)
//! max_width = 2048             # Wider images are resized before upload
//! jpeg_quality = 90            # Quality of resized uploads (1-100)
//!
//! [retry]
//! attempts = 5                 # Delivery attempts per run, including the first
//! delay_secs = 1               # Pause between failed attempts
//!
//! [http]
//! timeout_secs = 60            # Per-request timeout
//! ```
//!
//! ## Secrets
//!
//! ```toml
//! mastodon_hostname = "botsin.space"
//! access_token = "..."
//! client_secret = "..."        # optional, unused by token auth
//! ```
//!
//! Relative paths are resolved against the directory holding `config.toml`,
//! not the working directory, so cron jobs can run from anywhere.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::mastodon::Visibility;
use crate::pipeline::PipelineOptions;
use crate::retry::RetryPolicy;
use crate::select::Order;
use crate::text::ComposeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub image_dir: PathBuf,
    pub order: Order,
    pub default_desc: String,
    pub default_tags: String,
    pub sensitive: bool,
    pub add_media_format_tag: bool,
    #[serde(alias = "toot_visibility")]
    pub visibility: Visibility,
    pub secrets: PathBuf,
    /// Empty means no metadata database.
    pub infodb: PathBuf,
    pub visited_db: PathBuf,
    pub max_width: u32,
    pub jpeg_quality: u32,
    pub retry: RetryConfig,
    pub http: HttpConfig,
    /// `image_dir` before path resolution.
    #[serde(skip)]
    image_dir_as_written: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("media"),
            order: Order::default(),
            default_desc: String::new(),
            default_tags: String::new(),
            sensitive: false,
            add_media_format_tag: true,
            visibility: Visibility::default(),
            secrets: PathBuf::from("secrets.toml"),
            infodb: PathBuf::new(),
            visited_db: PathBuf::from("visited.json"),
            max_width: 2048,
            jpeg_quality: 90,
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            image_dir_as_written: PathBuf::from("media"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("image_dir must not be empty".into()));
        }
        if self.visited_db.as_os_str().is_empty() {
            return Err(ConfigError::Validation("visited_db must not be empty".into()));
        }
        if self.max_width == 0 {
            return Err(ConfigError::Validation("max_width must be non-zero".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Validation("jpeg_quality must be 1-100".into()));
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.attempts must be at least 1".into(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Make every relative path absolute against `base`. Empty paths stay
    /// empty.
    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.image_dir,
            &mut self.secrets,
            &mut self.infodb,
            &mut self.visited_db,
        ] {
            if !path.as_os_str().is_empty() && path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Prefix older ledgers put in front of item ids: the media root exactly
    /// as written in the config file.
    pub fn legacy_ledger_prefix(&self) -> String {
        self.image_dir_as_written.to_string_lossy().into_owned()
    }

    pub fn infodb_path(&self) -> Option<&Path> {
        if self.infodb.as_os_str().is_empty() {
            None
        } else {
            Some(&self.infodb)
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry.attempts,
            delay: Duration::from_secs(self.retry.delay_secs),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            compose: ComposeOptions {
                default_desc: self.default_desc.clone(),
                default_tags: self.default_tags.clone(),
                add_media_format_tag: self.add_media_format_tag,
            },
            sensitive: self.sensitive,
            max_width: self.max_width,
            quality: Quality::new(self.jpeg_quality),
            retry: self.retry_policy(),
        }
    }
}

/// Server and credentials, kept out of `config.toml` so the latter can be
/// shared.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Secrets {
    pub mastodon_hostname: String,
    pub access_token: String,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("mastodon_hostname", &self.mastodon_hostname)
            .field("access_token", &"<redacted>")
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mastodon_hostname.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mastodon_hostname must not be empty".into(),
            ));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "access_token must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate `config.toml`, resolving its relative paths against the
/// file's own directory.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = read_toml(path)?;
    config.image_dir_as_written = config.image_dir.clone();
    let base = path.parent().unwrap_or(Path::new(""));
    config.resolve_paths(base);
    config.validate()?;
    Ok(config)
}

/// Load and validate the secrets file named by the config.
pub fn load_secrets(path: &Path) -> Result<Secrets, ConfigError> {
    let secrets: Secrets = read_toml(path)?;
    secrets.validate()?;
    Ok(secrets)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# media-toot configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory of this file.
# Unknown keys will cause an error.

# Media root. Every supported file below it is a candidate, and the names of
# the directories between the root and a file become its hashtags:
#   media/cats/black and white/01.jpg  ->  #cats #black #and #white
image_dir = "media"

# How the next item is picked: "random" or "sequential" (alias "seq").
# Sequential walks the tree in file-name order.
order = "random"

# Text put at the top of every status.
default_desc = ""

# Tags put before the directory tags, e.g. "#bot #art".
default_tags = ""

# Mark every upload as sensitive.
sensitive = false

# Append #video for mp4/webm and #gif for gif files.
add_media_format_tag = true

# Status visibility: "public", "unlisted", "private" or "direct".
visibility = "public"

# TOML file with mastodon_hostname and access_token (client_secret optional).
secrets = "secrets.toml"

# Optional metadata database: a JSON object mapping item paths (relative to
# image_dir) to {"desc": "...", "source": ["..."]}. Empty disables it.
infodb = ""

# Ledger of posted items. Created on first run.
visited_db = "visited.json"

# Images wider than this are scaled down (aspect kept) and sent as JPEG.
max_width = 2048

# JPEG quality of resized uploads (1-100).
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Delivery retries
# ---------------------------------------------------------------------------
[retry]
# Attempts per run, including the first. When all fail the item stays
# unvisited and is tried again on a later run.
attempts = 5
# Seconds to wait after a failed attempt.
delay_secs = 1

# ---------------------------------------------------------------------------
# HTTP
# ---------------------------------------------------------------------------
[http]
# Per-request timeout in seconds.
timeout_secs = 60
"##
}
