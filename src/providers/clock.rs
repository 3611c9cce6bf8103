use std::sync::RwLock;

use chrono::{DateTime, Local, Timelike, Utc};

/// Source of the current time for workflows
///
/// Decision functions never read the clock themselves; coordinators read it
/// once per operation and pass the values in.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) used by the approval window rule
    fn local_hour(&self) -> u32;

    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Manually driven clock for tests and deterministic replays
#[derive(Debug)]
pub struct FixedClock {
    state: RwLock<(DateTime<Utc>, u32)>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, local_hour: u32) -> Self {
        Self {
            state: RwLock::new((now, local_hour)),
        }
    }

    /// Fixed clock at the given Unix timestamp, local hour taken from UTC
    pub fn at_timestamp(timestamp: i64) -> Self {
        let now = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();
        let hour = now.hour();
        Self::new(now, hour)
    }

    pub fn set_hour(&self, hour: u32) {
        if let Ok(mut state) = self.state.write() {
            state.1 = hour;
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut state) = self.state.write() {
            state.0 += chrono::Duration::seconds(secs);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.state
            .read()
            .map(|state| state.0)
            .unwrap_or_else(|poisoned| poisoned.into_inner().0)
    }

    fn local_hour(&self) -> u32 {
        self.state
            .read()
            .map(|state| state.1)
            .unwrap_or_else(|poisoned| poisoned.into_inner().1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances_without_changing_hour() {
        let clock = FixedClock::at_timestamp(1_700_000_000);
        clock.set_hour(10);
        clock.advance_secs(121);
        assert_eq!(clock.timestamp(), 1_700_000_121);
        assert_eq!(clock.local_hour(), 10);
    }

    #[test]
    fn test_system_clock_hour_in_range() {
        assert!(SystemClock.local_hour() < 24);
    }
}
