//! Configuration types for the trainscope-ml crate.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment -> explicit overrides. Configuration
//! is read from `~/.config/trainscope/config.toml` and/or
//! `.trainscope/config.toml` in the workspace directory.

use crate::error::MlError;
use crate::training::trigger::PeriodicTrigger;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlConfig {
    /// One entry per evaluation dataset attached to the run.
    #[serde(default)]
    pub evaluators: Vec<EvaluatorConfig>,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MlConfig {
    pub fn validate(&self) -> Result<(), MlError> {
        self.evaluators.iter().try_for_each(EvaluatorConfig::validate)
    }
}

/// Settings for one periodic evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Evaluate every N batches. Unset disables batch evaluation.
    #[serde(default)]
    pub batch_frequency: Option<i64>,
    /// Evaluate every N epochs. Unset disables epoch evaluation.
    #[serde(default)]
    pub epoch_frequency: Option<i64>,
    /// Appended to every reported metric name.
    #[serde(default)]
    pub label_suffix: String,
}

impl EvaluatorConfig {
    pub fn validate(&self) -> Result<(), MlError> {
        PeriodicTrigger::new(self.batch_frequency)
            .map_err(|e| MlError::config(format!("batch {e}")))?;
        PeriodicTrigger::new(self.epoch_frequency)
            .map_err(|e| MlError::config(format!("epoch {e}")))?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `trainscope_ml=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Explicit overrides applied on top of every other layer.
///
/// Only fields that are set are merged; the rest keep the values loaded from
/// files and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluators: Option<Vec<EvaluatorConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `TRAINSCOPE_`)
/// 3. Workspace-local config (`.trainscope/config.toml`)
/// 4. User config (`~/.config/trainscope/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<MlConfig, MlError> {
    let mut figment = Figment::from(Serialized::defaults(MlConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "trainscope", "trainscope") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".trainscope").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // TRAINSCOPE_LOGGING__LEVEL, TRAINSCOPE_LOGGING__JSON, ...
    figment = figment.merge(Env::prefixed("TRAINSCOPE_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: MlConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
