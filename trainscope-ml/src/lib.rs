//! # trainscope-ml — periodic evaluation hooks for training loops
//!
//! This crate provides callbacks a training loop notifies at the end of every
//! batch and every epoch. The central piece is
//! [`PeriodicEvaluator`](training::PeriodicEvaluator): it holds an evaluation
//! dataset, asks the model under training to evaluate itself on it every N
//! batches and/or every N epochs, and buffers the reported metrics so they can
//! be read back as one column per metric.
//!
//! ```
//! use trainscope_ml::training::{EvaluateModel, MetricMap, PeriodicEvaluator};
//! use trainscope_ml::MlError;
//!
//! struct Mean;
//!
//! impl EvaluateModel<Vec<f64>> for Mean {
//!     fn evaluate(&mut self, data: &Vec<f64>) -> Result<MetricMap, MlError> {
//!         let mean = data.iter().sum::<f64>() / data.len() as f64;
//!         Ok(MetricMap::from([("mean".to_string(), mean)]))
//!     }
//! }
//!
//! let mut eval = PeriodicEvaluator::new(vec![1.0, 3.0], Some(2), None)?
//!     .with_label_suffix("_val");
//! for batch in 0..4 {
//!     eval.on_batch_end(&mut Mean, batch, None)?;
//! }
//! assert_eq!(eval.batch_results_table()?["mean_val"], vec![2.0, 2.0]);
//! # Ok::<(), MlError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod telemetry;
pub mod training;

pub use config::{ConfigOverrides, EvaluatorConfig, LoggingConfig, MlConfig, load_config};
pub use data::{DatasetAdapter, FnAdapter, Passthrough};
pub use error::MlError;
pub use training::{
    Axis, CallbackAction, CallbackList, EvaluateModel, MetricMap, MetricTable, PeriodicEvaluator,
    PeriodicTrigger, TrainingCallback,
};
