//! Error types for the trainscope-ml crate.

use crate::training::trigger::Axis;
use thiserror::Error;

/// Top-level error type for evaluation hooks.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No evaluation results recorded on the {0} axis")]
    NoResults(Axis),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error(
        "Metric set changed at cycle {cycle}: expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    MetricSetMismatch {
        cycle: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config loading error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl MlError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }
}
