//! Pipeline configuration
//!
//! Resolution order:
//! - Built-in defaults
//! - TOML file named by `GIGPULSE_CONFIG` (tuning, keyword map, base URLs)
//! - Environment variables (paths, credentials, model, start date)
//!
//! Credentials only ever come from the environment.

use crate::error::ConfigError;
use chrono::NaiveDate;
use gigpulse_extract::Throttle;
use gigpulse_notify::NotifierConfig;
use gigpulse_snapshot::{DataLayout, Platform};
use gigpulse_synth::{SynthConfig, DEFAULT_MODEL};
use gigpulse_tracker::KeywordMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "GIGPULSE_MODEL";
pub const ENV_DOCS_ROOT: &str = "GIGPULSE_DOCS_ROOT";
pub const ENV_DATA_DIR: &str = "GIGPULSE_DATA_DIR";
pub const ENV_START_DATE: &str = "GIGPULSE_START_DATE";
pub const ENV_CONFIG: &str = "GIGPULSE_CONFIG";

/// File name of the tracking document under the docs root
pub const TRACKER_FILE: &str = "TRACKER.md";

/// A credential that never shows up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Network budgets, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// One page navigation
    pub page_secs: u64,
    /// One chat API request
    pub chat_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_secs: 30,
            chat_secs: 15,
        }
    }
}

impl Timeouts {
    #[inline]
    #[must_use]
    pub fn page(&self) -> Duration {
        Duration::from_secs(self.page_secs)
    }

    #[inline]
    #[must_use]
    pub fn chat(&self) -> Duration {
        Duration::from_secs(self.chat_secs)
    }
}

/// Dashboard roots, when not the public sites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseUrls {
    pub fiverr: Option<Url>,
    pub upwork: Option<Url>,
}

impl BaseUrls {
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&Url> {
        match platform {
            Platform::Fiverr => self.fiverr.as_ref(),
            Platform::Upwork => self.upwork.as_ref(),
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sessions, snapshots, history, reports and status records
    pub data_dir: PathBuf,
    /// Directory holding the tracking document
    pub docs_root: PathBuf,
    /// Generative model name
    pub model: String,
    /// Day 1 of the day counter
    pub start_date: Option<NaiveDate>,
    pub throttle: Throttle,
    pub timeouts: Timeouts,
    pub synth: SynthConfig,
    pub notifier: NotifierConfig,
    /// Listing title keywords to tracker row IDs
    pub keywords: KeywordMap,
    pub base_urls: BaseUrls,

    #[serde(skip)]
    pub anthropic_api_key: Option<Secret>,
    #[serde(skip)]
    pub telegram_bot_token: Option<Secret>,
    #[serde(skip)]
    pub telegram_chat_id: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            docs_root: PathBuf::from("docs"),
            model: DEFAULT_MODEL.to_string(),
            start_date: None,
            throttle: Throttle::default(),
            timeouts: Timeouts::default(),
            synth: SynthConfig::default(),
            notifier: NotifierConfig::default(),
            keywords: KeywordMap::default(),
            base_urls: BaseUrls::default(),
            anthropic_api_key: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }
}

impl PipelineConfig {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = match var(ENV_CONFIG) {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        if let Some(dir) = var(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(ENV_DOCS_ROOT) {
            config.docs_root = PathBuf::from(dir);
        }
        if let Some(model) = var(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = var(ENV_START_DATE) {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| ConfigError::invalid(ENV_START_DATE, &raw, e))?;
            config.start_date = Some(date);
        }
        config.anthropic_api_key = var(ENV_ANTHROPIC_API_KEY).map(Secret::new);
        config.telegram_bot_token = var(ENV_TELEGRAM_BOT_TOKEN).map(Secret::new);
        config.telegram_chat_id = var(ENV_TELEGRAM_CHAT_ID);

        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings no run could work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notifier.limit == 0 {
            return Err(ConfigError::invalid("notifier.limit", "0", "must be positive"));
        }
        if self.notifier.max_attempts == 0 {
            return Err(ConfigError::invalid("notifier.max_attempts", "0", "must be positive"));
        }
        if self.synth.word_budget == 0 {
            return Err(ConfigError::invalid("synth.word_budget", "0", "must be positive"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid(ENV_MODEL, "", "must not be empty"));
        }
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(_), None) => Err(ConfigError::Incomplete(format!(
                "{ENV_TELEGRAM_BOT_TOKEN} is set but {ENV_TELEGRAM_CHAT_ID} is not"
            ))),
            (None, Some(_)) => Err(ConfigError::Incomplete(format!(
                "{ENV_TELEGRAM_CHAT_ID} is set but {ENV_TELEGRAM_BOT_TOKEN} is not"
            ))),
            _ => Ok(()),
        }
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }

    /// `<docs_root>/TRACKER.md`
    #[inline]
    #[must_use]
    pub fn tracker_path(&self) -> PathBuf {
        self.docs_root.join(TRACKER_FILE)
    }

    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_docs_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.docs_root = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: NotifierConfig) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordMap) -> Self {
        self.keywords = keywords;
        self
    }

    #[must_use]
    pub fn with_telegram(mut self, token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        self.telegram_bot_token = Some(Secret::new(token));
        self.telegram_chat_id = Some(chat_id.into());
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(Secret::new(key));
        self
    }
}
