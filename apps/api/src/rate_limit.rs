//! Sliding-window admission control shared by every analysis in the process.
//!
//! Two overlapping windows are tracked per caller identifier: 20 requests per
//! minute and 300 per hour. State is in-memory only and is lost on restart.
//! Windows are created lazily and pruned only when their identifier is checked.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTIFIER: &str = "default";
pub const MINUTE_LIMIT: usize = 20;
pub const HOUR_LIMIT: usize = 300;

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const HOUR_WINDOW: Duration = Duration::from_secs(3600);

/// Outcome of a single admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AdmissionDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Requests still available to an identifier in each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingRequests {
    pub minute: usize,
    pub hour: usize,
}

/// Per-identifier request timestamps, oldest first.
#[derive(Debug, Default)]
struct RateWindow {
    timestamps: Vec<Instant>,
}

impl RateWindow {
    fn prune(&mut self, now: Instant) {
        self.timestamps
            .retain(|t| now.saturating_duration_since(*t) < HOUR_WINDOW);
    }

    fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .filter(|t| now.saturating_duration_since(**t) < window)
            .count()
    }
}

/// Admission gate injected into the orchestrator; one instance per process.
///
/// The whole prune → count → append sequence runs under a single lock, so two
/// concurrent callers can never both claim the last free slot.
#[derive(Debug, Default)]
pub struct RateAdmissionController {
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateAdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, identifier: &str) -> AdmissionDecision {
        self.check_at(identifier, Instant::now())
    }

    pub fn remaining(&self, identifier: &str) -> RemainingRequests {
        self.remaining_at(identifier, Instant::now())
    }

    pub(crate) fn check_at(&self, identifier: &str, now: Instant) -> AdmissionDecision {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let window = windows.entry(identifier.to_string()).or_default();

        window.prune(now);
        let minute_count = window.count_within(now, MINUTE_WINDOW);
        let hour_count = window.timestamps.len();

        if minute_count >= MINUTE_LIMIT {
            return AdmissionDecision::reject(format!(
                "Rate limit exceeded: maximum {MINUTE_LIMIT} requests per minute"
            ));
        }
        if hour_count >= HOUR_LIMIT {
            return AdmissionDecision::reject(format!(
                "Rate limit exceeded: maximum {HOUR_LIMIT} requests per hour"
            ));
        }

        window.timestamps.push(now);
        AdmissionDecision::allow()
    }

    pub(crate) fn remaining_at(&self, identifier: &str, now: Instant) -> RemainingRequests {
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        match windows.get(identifier) {
            None => RemainingRequests {
                minute: MINUTE_LIMIT,
                hour: HOUR_LIMIT,
            },
            Some(window) => RemainingRequests {
                minute: MINUTE_LIMIT.saturating_sub(window.count_within(now, MINUTE_WINDOW)),
                hour: HOUR_LIMIT.saturating_sub(window.count_within(now, HOUR_WINDOW)),
            },
        }
    }
}
