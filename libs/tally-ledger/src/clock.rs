//! Timestamp source for `created_at`
//!
//! Wall clocks can step backwards (NTP, manual changes). The ledger needs
//! `created_at` to be non-decreasing within a process, so every stamp goes
//! through [`MonotonicClock`], which clamps to the last value it handed out.

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;

/// Source of wall-clock time
pub trait TimeProvider: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Local system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant, for deterministic tests
#[derive(Clone, Copy, Debug)]
pub struct FixedTimeProvider {
    at: DateTime<Utc>,
}

impl FixedTimeProvider {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Non-decreasing clock over any [`TimeProvider`]
///
/// Stamps are truncated to microseconds, the precision the SQLite store keeps.
pub struct MonotonicClock {
    source: Box<dyn TimeProvider>,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new(source: impl TimeProvider) -> Self {
        Self {
            source: Box::new(source),
            last: Mutex::new(None),
        }
    }

    pub fn system() -> Self {
        Self::new(SystemTimeProvider)
    }

    pub fn now(&self) -> DateTime<Utc> {
        let observed = self.source.now().trunc_subsecs(6);
        let mut last = self.last.lock();
        let stamp = match *last {
            Some(prev) if prev > observed => prev,
            _ => observed,
        };
        *last = Some(stamp);
        stamp
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("last", &*self.last.lock())
            .finish_non_exhaustive()
    }
}
