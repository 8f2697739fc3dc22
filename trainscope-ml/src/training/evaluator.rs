//! Periodic evaluation of the model under training against a fixed dataset.
//!
//! A [`PeriodicEvaluator`] owns one dataset and two [`PeriodicTrigger`]s, one
//! per axis. On each batch-end or epoch-end notification it advances the
//! matching trigger and, when it is due, asks the model to evaluate itself on
//! the dataset. Reported metric names get the evaluator's label suffix so that
//! several evaluators can share a training run.

use crate::config::EvaluatorConfig;
use crate::data::DatasetAdapter;
use crate::error::MlError;
use crate::training::metrics::{MetricMap, MetricTable, check_key_set, suffixed, unpack_results};
use crate::training::trigger::{Axis, PeriodicTrigger};
use serde_json::json;

/// A model that can compute metrics over a dataset.
///
/// Implementations must report the same metric names for a given
/// model/dataset pair on every call.
pub trait EvaluateModel<D: ?Sized> {
    fn evaluate(&mut self, dataset: &D) -> Result<MetricMap, MlError>;
}

impl<D: ?Sized, M: EvaluateModel<D> + ?Sized> EvaluateModel<D> for Box<M> {
    fn evaluate(&mut self, dataset: &D) -> Result<MetricMap, MlError> {
        (**self).evaluate(dataset)
    }
}

/// Evaluates the model on a dataset every N batches and/or every N epochs.
#[derive(Debug, Clone)]
pub struct PeriodicEvaluator<D> {
    dataset: D,
    batch_trigger: PeriodicTrigger,
    epoch_trigger: PeriodicTrigger,
    label_suffix: String,
    batch_results: Vec<MetricMap>,
    epoch_results: Vec<MetricMap>,
}

impl<D> PeriodicEvaluator<D> {
    /// Create an evaluator. A `None` frequency disables that axis.
    pub fn new(
        dataset: D,
        batch_frequency: Option<i64>,
        epoch_frequency: Option<i64>,
    ) -> Result<Self, MlError> {
        let batch_trigger = PeriodicTrigger::new(batch_frequency)
            .map_err(|e| MlError::config(format!("batch {e}")))?;
        let epoch_trigger = PeriodicTrigger::new(epoch_frequency)
            .map_err(|e| MlError::config(format!("epoch {e}")))?;

        tracing::info!(
            batch_frequency = ?batch_trigger.frequency(),
            epoch_frequency = ?epoch_trigger.frequency(),
            "Created periodic evaluator"
        );

        Ok(Self {
            dataset,
            batch_trigger,
            epoch_trigger,
            label_suffix: String::new(),
            batch_results: Vec::new(),
            epoch_results: Vec::new(),
        })
    }

    pub fn from_config(dataset: D, config: &EvaluatorConfig) -> Result<Self, MlError> {
        Ok(Self::new(dataset, config.batch_frequency, config.epoch_frequency)?
            .with_label_suffix(config.label_suffix.clone()))
    }

    /// Convert `raw` with `adapter` once, then build the evaluator from `config`.
    pub fn with_adapter<R, A>(raw: R, adapter: &A, config: &EvaluatorConfig) -> Result<Self, MlError>
    where
        A: DatasetAdapter<R, Output = D>,
    {
        let dataset = adapter.adapt(raw)?;
        Self::from_config(dataset, config)
    }

    pub fn with_label_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.label_suffix = suffix.into();
        self
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn label_suffix(&self) -> &str {
        &self.label_suffix
    }

    pub fn batch_trigger(&self) -> &PeriodicTrigger {
        &self.batch_trigger
    }

    pub fn epoch_trigger(&self) -> &PeriodicTrigger {
        &self.epoch_trigger
    }

    pub fn batches_seen(&self) -> usize {
        self.batch_trigger.seen()
    }

    pub fn epochs_seen(&self) -> usize {
        self.epoch_trigger.seen()
    }

    pub fn batch_results(&self) -> &[MetricMap] {
        &self.batch_results
    }

    pub fn epoch_results(&self) -> &[MetricMap] {
        &self.epoch_results
    }

    /// Handle a batch-end notification. The batch ordinal within the current
    /// epoch and the training-time metrics do not affect triggering.
    pub fn on_batch_end<M>(
        &mut self,
        model: &mut M,
        _batch: usize,
        _logs: Option<&MetricMap>,
    ) -> Result<(), MlError>
    where
        M: EvaluateModel<D> + ?Sized,
    {
        self.notify(Axis::Batch, model)
    }

    /// Handle an epoch-end notification.
    pub fn on_epoch_end<M>(
        &mut self,
        model: &mut M,
        _epoch: usize,
        _logs: Option<&MetricMap>,
    ) -> Result<(), MlError>
    where
        M: EvaluateModel<D> + ?Sized,
    {
        self.notify(Axis::Epoch, model)
    }

    fn notify<M>(&mut self, axis: Axis, model: &mut M) -> Result<(), MlError>
    where
        M: EvaluateModel<D> + ?Sized,
    {
        let (trigger, results) = match axis {
            Axis::Batch => (&mut self.batch_trigger, &mut self.batch_results),
            Axis::Epoch => (&mut self.epoch_trigger, &mut self.epoch_results),
        };
        let dataset = &self.dataset;
        let suffix = self.label_suffix.as_str();

        let fired = trigger.maybe_fire(|index| {
            let metrics = suffixed(model.evaluate(dataset)?, suffix);
            if let Some(first) = results.first()
                && let Err(e) = check_key_set(results.len(), first, &metrics)
            {
                tracing::warn!(%axis, index, error = %e, "Evaluation reported a different metric set");
                return Err(e);
            }
            tracing::debug!(%axis, index, metrics = ?metrics, "Evaluation cycle completed");
            Ok(metrics)
        })?;

        if let Some(metrics) = fired {
            results.push(metrics);
        }
        Ok(())
    }

    pub fn results(&self, axis: Axis) -> &[MetricMap] {
        match axis {
            Axis::Batch => &self.batch_results,
            Axis::Epoch => &self.epoch_results,
        }
    }

    /// Column view of one axis' results.
    pub fn results_table(&self, axis: Axis) -> Result<MetricTable, MlError> {
        let results = self.results(axis);
        if results.is_empty() {
            return Err(MlError::NoResults(axis));
        }
        unpack_results(results)
    }

    pub fn batch_results_table(&self) -> Result<MetricTable, MlError> {
        self.results_table(Axis::Batch)
    }

    pub fn epoch_results_table(&self) -> Result<MetricTable, MlError> {
        self.results_table(Axis::Epoch)
    }

    /// Both axes' tables as JSON. An axis with no results maps to `{}`.
    pub fn results_json(&self) -> Result<serde_json::Value, MlError> {
        let table = |axis| match self.results_table(axis) {
            Ok(table) => Ok(table),
            Err(MlError::NoResults(_)) => Ok(MetricTable::new()),
            Err(e) => Err(e),
        };
        Ok(json!({
            "label_suffix": self.label_suffix,
            "batch": serde_json::to_value(table(Axis::Batch)?)?,
            "epoch": serde_json::to_value(table(Axis::Epoch)?)?,
        }))
    }

    /// Drop buffered results. Counters are left untouched.
    pub fn clear_results(&mut self) {
        self.batch_results.clear();
        self.epoch_results.clear();
    }

    /// Drop buffered results and restart both counters.
    pub fn reset(&mut self) {
        self.clear_results();
        self.batch_trigger.reset();
        self.epoch_trigger.reset();
    }
}
