//! Call context - deadline propagation into transaction boundaries
//!
//! Callers thread a `CallContext` through every store operation instead of
//! relying on ambient request state. The transaction executor checks the
//! deadline at transaction boundaries; an expired context rolls the
//! in-flight transaction back and surfaces `Error::DeadlineExceeded`, so
//! partial writes are never observable.

use crate::{Error, Result};
use std::time::{Duration, Instant};

/// Per-call context carrying an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never expires
    pub fn background() -> Self {
        Self::default()
    }

    /// A context expiring at a fixed instant
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// A context expiring after `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Check whether the deadline has passed
    pub fn check(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
