//! Configuration types for lexpand.
//!
//! [`Settings::load`] layers `~/.config/lexpand/config.toml` (or an explicit
//! file) on top of the embedded defaults. [`Settings::defaults`] returns the
//! same defaults without touching the filesystem (useful in tests).

use crate::expander::ExpansionOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[engine]
latency_budget_ms = 40

[lexicon]
path = "data/ontology_runtime.json"

[server]
bind = "127.0.0.1:8080"

[telemetry]
enabled           = true
track_performance = true
max_samples       = 10000
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub lexicon: LexiconSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
    #[serde(default)]
    pub max_related_per_entity: Option<usize>,
    #[serde(default)]
    pub max_terms: Option<usize>,
}

fn default_latency_budget_ms() -> u64 { 40 }

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            latency_budget_ms: default_latency_budget_ms(),
            max_related_per_entity: None,
            max_terms: None,
        }
    }
}

impl EngineSettings {
    pub fn latency_budget(&self) -> Duration {
        Duration::from_millis(self.latency_budget_ms)
    }

    pub fn expansion_options(&self) -> ExpansionOptions {
        ExpansionOptions {
            max_related_per_entity: self.max_related_per_entity,
            max_terms: self.max_terms,
        }
    }
}

/// `[lexicon]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconSettings {
    #[serde(default = "default_lexicon_path")]
    pub path: PathBuf,
}

fn default_lexicon_path() -> PathBuf { PathBuf::from("data/ontology_runtime.json") }

impl Default for LexiconSettings {
    fn default() -> Self {
        Self { path: default_lexicon_path() }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:8080".to_string() }

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// `[telemetry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub track_performance: bool,
    /// Latency samples kept per operation by the monitor.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_true() -> bool { true }
fn default_max_samples() -> usize { crate::monitor::DEFAULT_MAX_SAMPLES }

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            track_performance: default_true(),
            max_samples: default_max_samples(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    /// Load `explicit` (must exist) or else the user config file (optional),
    /// layered on top of the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let file = match explicit {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every rewrite useless.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.engine.max_terms == Some(0) {
            anyhow::bail!("engine.max_terms must be at least 1 when set");
        }
        if self.telemetry.max_samples == 0 {
            anyhow::bail!("telemetry.max_samples must be at least 1");
        }
        Ok(())
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("lexpand")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
