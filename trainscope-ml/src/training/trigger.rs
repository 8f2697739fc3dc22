//! Counter-gated periodic trigger, one per notification axis.

use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Notification axis a trigger is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Batch,
    Epoch,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Batch => write!(f, "batch"),
            Axis::Epoch => write!(f, "epoch"),
        }
    }
}

/// Fires on notifications 0, F, 2F, ... where F is the frequency.
///
/// A disabled trigger ignores notifications entirely and its counter never
/// moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTrigger {
    frequency: Option<NonZeroUsize>,
    seen: usize,
}

impl PeriodicTrigger {
    /// Build a trigger from an optional frequency. `None` disables it; zero
    /// or negative values are rejected.
    pub fn new(frequency: Option<i64>) -> Result<Self, MlError> {
        let frequency = match frequency {
            None => None,
            Some(f) => {
                let f = usize::try_from(f)
                    .ok()
                    .and_then(NonZeroUsize::new)
                    .ok_or_else(|| {
                        MlError::config(format!("frequency must be a positive integer, got {f}"))
                    })?;
                Some(f)
            }
        };
        Ok(Self { frequency, seen: 0 })
    }

    pub fn every(frequency: NonZeroUsize) -> Self {
        Self {
            frequency: Some(frequency),
            seen: 0,
        }
    }

    pub fn disabled() -> Self {
        Self {
            frequency: None,
            seen: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.frequency.is_some()
    }

    pub fn frequency(&self) -> Option<NonZeroUsize> {
        self.frequency
    }

    /// Notifications counted so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Whether the next notification will fire.
    pub fn is_due(&self) -> bool {
        self.frequency
            .is_some_and(|f| self.seen % f.get() == 0)
    }

    /// Count one notification without firing.
    pub fn advance(&mut self) {
        if self.is_enabled() {
            self.seen += 1;
        }
    }

    /// Handle one notification, running `action` if the trigger is due.
    ///
    /// The counter advances after a successful run or a skipped one. An
    /// error from `action` is returned as-is and leaves the counter where it
    /// was, so the same notification index is due again next time.
    pub fn maybe_fire<T, F>(&mut self, action: F) -> Result<Option<T>, MlError>
    where
        F: FnOnce(usize) -> Result<T, MlError>,
    {
        if !self.is_enabled() {
            return Ok(None);
        }
        let fired = if self.is_due() {
            Some(action(self.seen)?)
        } else {
            None
        };
        self.seen += 1;
        Ok(fired)
    }

    /// Number of firings over the first `notifications` notifications.
    pub fn fires_within(&self, notifications: usize) -> usize {
        match self.frequency {
            Some(f) if notifications > 0 => (notifications - 1) / f.get() + 1,
            _ => 0,
        }
    }

    pub fn reset(&mut self) {
        self.seen = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_frequency() {
        assert!(matches!(
            PeriodicTrigger::new(Some(0)),
            Err(MlError::Config(_))
        ));
        assert!(matches!(
            PeriodicTrigger::new(Some(-1)),
            Err(MlError::Config(_))
        ));
        assert!(PeriodicTrigger::new(Some(1)).is_ok());
    }

    #[test]
    fn test_fires_on_multiples() {
        let mut trigger = PeriodicTrigger::new(Some(3)).unwrap();
        let fired: Vec<usize> = (0..7)
            .filter_map(|_| trigger.maybe_fire(Ok).unwrap())
            .collect();
        assert_eq!(fired, vec![0, 3, 6]);
        assert_eq!(trigger.seen(), 7);
        assert_eq!(trigger.fires_within(7), 3);
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut trigger = PeriodicTrigger::new(None).unwrap();
        for _ in 0..4 {
            assert_eq!(trigger.maybe_fire(|_| Ok(())).unwrap(), None);
        }
        assert_eq!(trigger.seen(), 0);
        assert!(!trigger.is_due());
        assert_eq!(trigger.fires_within(4), 0);
    }

    #[test]
    fn test_failed_action_does_not_advance() {
        let mut trigger = PeriodicTrigger::new(Some(2)).unwrap();
        let result: Result<Option<()>, _> =
            trigger.maybe_fire(|_| Err(MlError::evaluation("boom")));
        assert!(result.is_err());
        assert_eq!(trigger.seen(), 0);
        assert!(trigger.is_due());
    }

    #[test]
    fn test_reset() {
        let mut trigger = PeriodicTrigger::every(NonZeroUsize::new(2).unwrap());
        trigger.advance();
        assert!(!trigger.is_due());
        trigger.reset();
        assert!(trigger.is_due());
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::Batch.to_string(), "batch");
        assert_eq!(Axis::Epoch.to_string(), "epoch");
    }
}
