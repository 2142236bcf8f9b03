use crate::error::{AppError, AppResult};
use log::debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Accepted,
    Rejected { retry_after: Duration },
}

/// Process-wide single-flight cooldown gate.
///
/// Every endpoint shares one instance: after any accepted request, all
/// further requests are rejected until the cooldown has elapsed, no matter
/// which route or caller they come from. The timestamp is only written on
/// acceptance, so a rejected request (or a later upstream failure) never
/// moves the window.
///
/// Best effort within one process only; separate instances each carry their
/// own window and do not coordinate.
pub struct CooldownLimiter {
    cooldown: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl CooldownLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(None),
        }
    }

    pub fn try_acquire(&self) -> AppResult<RateDecision> {
        self.try_acquire_at(Instant::now())
    }

    /// Check-and-update in one critical section. The lock is a sync mutex
    /// held across no await point, so two interleaved requests cannot both
    /// observe a stale timestamp and pass within one window.
    pub fn try_acquire_at(&self, now: Instant) -> AppResult<RateDecision> {
        let mut last = self
            .last_accepted
            .lock()
            .map_err(|e| AppError::LockPoisoned(format!("rate limiter lock: {}", e)))?;

        if let Some(prev) = *last {
            let elapsed = now.saturating_duration_since(prev);
            if elapsed < self.cooldown {
                let retry_after = self.cooldown - elapsed;
                debug!(
                    "cooldown gate rejected request, {}ms remaining",
                    retry_after.as_millis()
                );
                return Ok(RateDecision::Rejected { retry_after });
            }
        }

        *last = Some(now);
        Ok(RateDecision::Accepted)
    }
}
