//! Training hooks — periodic triggers, dataset evaluators, callback dispatch.

pub mod callbacks;
pub mod evaluator;
pub mod metrics;
pub mod trigger;

pub use callbacks::{CallbackAction, CallbackList, CheckpointCallback, TrainingCallback};
pub use evaluator::{EvaluateModel, PeriodicEvaluator};
pub use metrics::{MetricMap, MetricTable, unpack_results};
pub use trigger::{Axis, PeriodicTrigger};
