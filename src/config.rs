// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `walletboard.toml`, with environment overrides:
//! WALLETBOARD_BACKEND, WALLETBOARD_URL, WALLETBOARD_ANON_KEY, WALLETBOARD_LOG.

use crate::error::LedgerError;
use crate::models::PaymentMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "walletboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub cards: Vec<CardConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub anon_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Local,
            url: None,
            anon_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn url(&self) -> Result<&str, LedgerError> {
        self.url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or(LedgerError::MissingBackendSetting("backend.url"))
    }

    pub fn anon_key(&self) -> Result<&str, LedgerError> {
        self.anon_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LedgerError::MissingBackendSetting("backend.anon_key"))
    }
}

/// Display metadata for one payment method on the balances view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub method: PaymentMethod,
    pub label: String,
    #[serde(default)]
    pub holder: Option<String>,
    #[serde(default)]
    pub last_four: Option<String>,
}

impl CardConfig {
    fn fallback(method: PaymentMethod) -> Self {
        let label = match method {
            PaymentMethod::Nubank => "Nubank",
            PaymentMethod::Inter => "Inter",
            PaymentMethod::Pix => "Pix",
        };
        CardConfig {
            method,
            label: label.to_string(),
            holder: None,
            last_four: None,
        }
    }

    /// "Nubank •••• 2682"
    pub fn display_name(&self) -> String {
        match &self.last_four {
            Some(digits) => format!("{} •••• {}", self.label, digits),
            None => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "walletboard=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(crate::db::config_dir()?.join(CONFIG_FILE))
    }

    /// Load from the platform config dir; a missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("WALLETBOARD_BACKEND") {
            match kind.trim().to_lowercase().as_str() {
                "local" => self.backend.kind = BackendKind::Local,
                "remote" => self.backend.kind = BackendKind::Remote,
                other => tracing::warn!(value = other, "ignoring unknown WALLETBOARD_BACKEND"),
            }
        }
        if let Some(url) = lookup("WALLETBOARD_URL") {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup("WALLETBOARD_ANON_KEY") {
            self.backend.anon_key = Some(key);
        }
        if let Some(level) = lookup("WALLETBOARD_LOG") {
            self.logging.level = level;
        }
    }

    pub fn card(&self, method: PaymentMethod) -> CardConfig {
        self.cards
            .iter()
            .find(|c| c.method == method)
            .cloned()
            .unwrap_or_else(|| CardConfig::fallback(method))
    }
}

pub fn default_config_toml() -> &'static str {
    r#"# Walletboard configuration
#
# Environment variables override these settings:
# - WALLETBOARD_BACKEND   (local | remote)
# - WALLETBOARD_URL
# - WALLETBOARD_ANON_KEY
# - WALLETBOARD_LOG

[backend]
# "local" keeps everything in an embedded SQLite file;
# "remote" talks to the hosted REST backend and requires `auth signin`.
kind = "local"
# url = "https://your-project.example.co"
# anon_key = "public-anon-key"
timeout_secs = 15

[[cards]]
method = "nubank"
label = "Nubank"
# holder = "Your Name"
# last_four = "0000"

[[cards]]
method = "inter"
label = "Inter"

[[cards]]
method = "pix"
label = "Pix"

[logging]
level = "walletboard=warn"
"#
}
