//! Training callbacks — hook points a training loop calls into.

use crate::error::MlError;
use crate::training::evaluator::{EvaluateModel, PeriodicEvaluator};
use crate::training::metrics::MetricMap;
use crate::training::trigger::PeriodicTrigger;

/// Action a callback can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallbackAction {
    Continue,
    Checkpoint,
    Stop,
}

impl CallbackAction {
    /// The stronger of two requests: `Stop` over `Checkpoint` over `Continue`.
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

/// Trait for training callbacks over a model of type `M`.
///
/// The training loop owns the model and lends it to each hook.
pub trait TrainingCallback<M: ?Sized> {
    /// Called once before the first batch.
    fn on_train_begin(&mut self, _model: &mut M) -> Result<CallbackAction, MlError> {
        Ok(CallbackAction::Continue)
    }

    /// Called after each batch with its ordinal within the epoch.
    fn on_batch_end(
        &mut self,
        _model: &mut M,
        _batch: usize,
        _logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        Ok(CallbackAction::Continue)
    }

    /// Called at the end of each epoch.
    fn on_epoch_end(
        &mut self,
        _model: &mut M,
        _epoch: usize,
        _logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        Ok(CallbackAction::Continue)
    }
}

impl<M, T> TrainingCallback<M> for &mut T
where
    M: ?Sized,
    T: TrainingCallback<M> + ?Sized,
{
    fn on_train_begin(&mut self, model: &mut M) -> Result<CallbackAction, MlError> {
        (**self).on_train_begin(model)
    }

    fn on_batch_end(
        &mut self,
        model: &mut M,
        batch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        (**self).on_batch_end(model, batch, logs)
    }

    fn on_epoch_end(
        &mut self,
        model: &mut M,
        epoch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        (**self).on_epoch_end(model, epoch, logs)
    }
}

impl<D, M> TrainingCallback<M> for PeriodicEvaluator<D>
where
    M: EvaluateModel<D> + ?Sized,
{
    fn on_batch_end(
        &mut self,
        model: &mut M,
        batch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        PeriodicEvaluator::on_batch_end(self, model, batch, logs)?;
        Ok(CallbackAction::Continue)
    }

    fn on_epoch_end(
        &mut self,
        model: &mut M,
        epoch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        PeriodicEvaluator::on_epoch_end(self, model, epoch, logs)?;
        Ok(CallbackAction::Continue)
    }
}

/// Ordered set of callbacks notified together.
///
/// Hooks run in insertion order and stop at the first error.
pub struct CallbackList<'a, M: ?Sized> {
    callbacks: Vec<Box<dyn TrainingCallback<M> + 'a>>,
}

impl<'a, M: ?Sized> Default for CallbackList<'a, M> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }
}

impl<'a, M: ?Sized> CallbackList<'a, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: impl TrainingCallback<M> + 'a) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn on_train_begin(&mut self, model: &mut M) -> Result<CallbackAction, MlError> {
        self.dispatch(|cb| cb.on_train_begin(&mut *model))
    }

    pub fn on_batch_end(
        &mut self,
        model: &mut M,
        batch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        self.dispatch(|cb| cb.on_batch_end(&mut *model, batch, logs))
    }

    pub fn on_epoch_end(
        &mut self,
        model: &mut M,
        epoch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        let action = self.dispatch(|cb| cb.on_epoch_end(&mut *model, epoch, logs))?;
        if action != CallbackAction::Continue {
            tracing::debug!(epoch, ?action, "Callback requested action");
        }
        Ok(action)
    }

    fn dispatch<F>(&mut self, mut hook: F) -> Result<CallbackAction, MlError>
    where
        F: FnMut(&mut (dyn TrainingCallback<M> + 'a)) -> Result<CallbackAction, MlError>,
    {
        let mut action = CallbackAction::Continue;
        for callback in &mut self.callbacks {
            action = action.merge(hook(callback.as_mut())?);
        }
        Ok(action)
    }
}

impl<'a, M: ?Sized> TrainingCallback<M> for CallbackList<'a, M> {
    fn on_train_begin(&mut self, model: &mut M) -> Result<CallbackAction, MlError> {
        CallbackList::on_train_begin(self, model)
    }

    fn on_batch_end(
        &mut self,
        model: &mut M,
        batch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        CallbackList::on_batch_end(self, model, batch, logs)
    }

    fn on_epoch_end(
        &mut self,
        model: &mut M,
        epoch: usize,
        logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        CallbackList::on_epoch_end(self, model, epoch, logs)
    }
}

/// Requests a checkpoint every `frequency` epochs.
#[derive(Debug, Clone)]
pub struct CheckpointCallback {
    trigger: PeriodicTrigger,
}

impl CheckpointCallback {
    pub fn new(frequency: i64) -> Result<Self, MlError> {
        Ok(Self {
            trigger: PeriodicTrigger::new(Some(frequency))?,
        })
    }
}

impl<M: ?Sized> TrainingCallback<M> for CheckpointCallback {
    fn on_epoch_end(
        &mut self,
        _model: &mut M,
        _epoch: usize,
        _logs: Option<&MetricMap>,
    ) -> Result<CallbackAction, MlError> {
        // Counting starts after the first epoch, unlike evaluation.
        self.trigger.advance();
        Ok(if self.trigger.is_due() {
            CallbackAction::Checkpoint
        } else {
            CallbackAction::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::trigger::Axis;

    struct ConstModel(f64);

    impl EvaluateModel<()> for ConstModel {
        fn evaluate(&mut self, _dataset: &()) -> Result<MetricMap, MlError> {
            let mut metrics = MetricMap::new();
            metrics.insert("loss".into(), self.0);
            Ok(metrics)
        }
    }

    struct Failing;

    impl<M: ?Sized> TrainingCallback<M> for Failing {
        fn on_batch_end(
            &mut self,
            _model: &mut M,
            _batch: usize,
            _logs: Option<&MetricMap>,
        ) -> Result<CallbackAction, MlError> {
            Err(MlError::evaluation("callback failed"))
        }
    }

    #[test]
    fn test_action_merge() {
        use CallbackAction::*;
        assert_eq!(Continue.merge(Checkpoint), Checkpoint);
        assert_eq!(Checkpoint.merge(Stop), Stop);
        assert_eq!(Stop.merge(Continue), Stop);
    }

    #[test]
    fn test_list_drives_evaluators() {
        let mut train = PeriodicEvaluator::new((), Some(2), None)
            .unwrap()
            .with_label_suffix("_train");
        let mut test = PeriodicEvaluator::new((), None, Some(1))
            .unwrap()
            .with_label_suffix("_test");
        let mut model = ConstModel(0.5);

        {
            let mut list = CallbackList::new();
            list.push(&mut train);
            list.push(&mut test);
            assert_eq!(list.len(), 2);

            list.on_train_begin(&mut model).unwrap();
            for batch in 0..3 {
                list.on_batch_end(&mut model, batch, None).unwrap();
            }
            list.on_epoch_end(&mut model, 0, None).unwrap();
        }

        assert_eq!(train.batch_results_table().unwrap()["loss_train"], vec![0.5, 0.5]);
        assert!(matches!(
            train.epoch_results_table(),
            Err(MlError::NoResults(Axis::Epoch))
        ));
        assert_eq!(test.epoch_results_table().unwrap()["loss_test"], vec![0.5]);
    }

    #[test]
    fn test_list_stops_at_first_error() {
        let mut after = PeriodicEvaluator::new((), Some(1), None).unwrap();
        let mut model = ConstModel(1.0);
        {
            let mut list = CallbackList::new();
            list.push(Failing);
            list.push(&mut after);
            assert!(list.on_batch_end(&mut model, 0, None).is_err());
        }
        assert_eq!(after.batches_seen(), 0);
    }

    #[test]
    fn test_checkpoint_callback() {
        let mut cb = CheckpointCallback::new(2).unwrap();
        let mut model = ConstModel(0.0);
        let actions: Vec<_> = (0..4)
            .map(|epoch| cb.on_epoch_end(&mut model, epoch, None).unwrap())
            .collect();
        assert_eq!(
            actions,
            vec![
                CallbackAction::Continue,
                CallbackAction::Checkpoint,
                CallbackAction::Continue,
                CallbackAction::Checkpoint,
            ]
        );
    }
}
