//! Results of mutations whose secondary effects are best-effort.
//!
//! Once a complaint write commits, the ledger entry and the notifications
//! that follow it may fail without failing the operation. Those failures are
//! collected here instead of being dropped.

use serde::Serialize;
use std::fmt;

/// A secondary effect that follows a committed complaint write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Status history entry
    Ledger,
    /// Notification fan-out
    Notification,
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffect::Ledger => write!(f, "status history"),
            SideEffect::Notification => write!(f, "notification"),
        }
    }
}

/// One secondary effect that did not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedEffect {
    pub effect: SideEffect,
    pub reason: String,
}

impl DegradedEffect {
    pub fn new(effect: SideEffect, reason: impl Into<String>) -> Self {
        Self {
            effect,
            reason: reason.into(),
        }
    }
}

/// A committed primary effect plus whatever degraded after it
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    pub degraded: Vec<DegradedEffect>,
}

impl<T> Committed<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            degraded: Vec::new(),
        }
    }

    /// True when every secondary effect completed
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }

    pub fn is_degraded(&self, effect: SideEffect) -> bool {
        self.degraded.iter().any(|d| d.effect == effect)
    }

    pub fn record(&mut self, degraded: DegradedEffect) {
        self.degraded.push(degraded);
    }

    /// Human-readable warnings, one per degraded effect
    pub fn warnings(&self) -> Vec<String> {
        self.degraded
            .iter()
            .map(|d| format!("{} was not recorded: {}", d.effect, d.reason))
            .collect()
    }

    pub fn map<U, F>(self, f: F) -> Committed<U>
    where
        F: FnOnce(T) -> U,
    {
        Committed {
            value: f(self.value),
            degraded: self.degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_commit_is_complete() {
        let committed = Committed::new(5);
        assert!(committed.is_complete());
        assert!(committed.warnings().is_empty());
    }

    #[test]
    fn test_recorded_degradation_is_visible() {
        let mut committed = Committed::new("ok");
        committed.record(DegradedEffect::new(SideEffect::Notification, "store offline"));

        assert!(!committed.is_complete());
        assert!(committed.is_degraded(SideEffect::Notification));
        assert!(!committed.is_degraded(SideEffect::Ledger));
        assert_eq!(
            committed.warnings(),
            vec!["notification was not recorded: store offline".to_string()]
        );

        let mapped = committed.map(str::len);
        assert_eq!(mapped.value, 2);
        assert_eq!(mapped.degraded.len(), 1);
    }
}
