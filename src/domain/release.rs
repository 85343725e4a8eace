//! Release policy: decides whether a secret is still held in escrow.
//!
//! A secret with `wait_periods = n` stays locked while the client has been
//! silent for at most `n * unit_seconds`. Reaching the boundary exactly is
//! still locked; the secret opens one second later.

use serde::{Deserialize, Serialize};

use super::Liveness;

/// Length of one wait-unit when nothing else is configured
pub const DEFAULT_UNIT_SECONDS: u64 = 3600;

/// Returns `true` while `now - last_seen <= wait_periods * unit_seconds`.
///
/// Arithmetic saturates, so absurdly large waiting periods stay locked
/// instead of wrapping around.
pub fn is_locked(now: i64, last_seen: i64, wait_periods: u32, unit_seconds: u64) -> bool {
    let silence = i128::from(now) - i128::from(last_seen);
    silence <= required_silence(wait_periods, unit_seconds)
}

fn required_silence(wait_periods: u32, unit_seconds: u64) -> i128 {
    i128::from(wait_periods).saturating_mul(i128::from(unit_seconds))
}

/// Release policy bound to a wait-unit length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePolicy {
    unit_seconds: u64,
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self { unit_seconds: DEFAULT_UNIT_SECONDS }
    }
}

impl ReleasePolicy {
    pub fn new(unit_seconds: u64) -> Self {
        Self { unit_seconds }
    }

    /// Lock decision. A client that never sent a heartbeat counts as "seen
    /// now", so it only ever gets its zero-wait secrets back. A first-contact
    /// record starts the clock for longer waits but is no heartbeat.
    pub fn is_locked(&self, now: i64, liveness: Option<Liveness>, wait_periods: u32) -> bool {
        match liveness {
            Some(record) if !record.seeded || wait_periods > 0 => {
                is_locked(now, record.last_seen, wait_periods, self.unit_seconds)
            }
            _ => wait_periods > 0,
        }
    }

    /// First second at which a secret deposited with `wait_periods` opens,
    /// given no further heartbeats after `last_seen`.
    pub fn unlocks_at(&self, last_seen: i64, wait_periods: u32) -> i64 {
        let at = i128::from(last_seen) + required_silence(wait_periods, self.unit_seconds) + 1;
        i64::try_from(at).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_boundary_is_locked() {
        assert!(is_locked(T + 3600, T, 1, 3600));
        assert!(!is_locked(T + 3601, T, 1, 3600));
    }

    #[test]
    fn test_zero_wait_unlocks_after_one_second() {
        assert!(is_locked(T, T, 0, 3600));
        assert!(!is_locked(T + 1, T, 0, 3600));
    }

    #[test]
    fn test_absent_last_seen_falls_back_to_now() {
        let policy = ReleasePolicy::default();
        assert!(policy.is_locked(T, None, 1));
        assert!(policy.is_locked(T + 10 * 3600, None, u32::MAX));
        assert!(!policy.is_locked(T, None, 0));
    }

    #[test]
    fn test_first_contact_record() {
        let policy = ReleasePolicy::default();
        let seeded = Some(Liveness::seeded(T));

        // No heartbeat yet, so zero-wait secrets open in the same second
        assert!(!policy.is_locked(T, seeded, 0));
        assert!(policy.is_locked(T, Some(Liveness::heartbeat(T)), 0));

        // Longer waits count from first contact
        assert!(policy.is_locked(T + 3600, seeded, 1));
        assert!(!policy.is_locked(T + 3601, seeded, 1));
    }

    #[test]
    fn test_out_of_order_heartbeat_in_future() {
        // A heartbeat stamped after "now" keeps the secret locked
        assert!(is_locked(T, T + 600, 0, 3600));
    }

    #[test]
    fn test_huge_wait_periods_do_not_overflow() {
        assert!(is_locked(i64::MAX, i64::MIN, u32::MAX, u64::MAX));
        let policy = ReleasePolicy::new(u64::MAX);
        assert_eq!(policy.unlocks_at(T, u32::MAX), i64::MAX);
    }

    #[test]
    fn test_unlocks_at() {
        let policy = ReleasePolicy::new(60);
        assert_eq!(policy.unlocks_at(T, 2), T + 121);
        let seen = Some(Liveness::heartbeat(T));
        assert!(policy.is_locked(T + 120, seen, 2));
        assert!(!policy.is_locked(policy.unlocks_at(T, 2), seen, 2));
    }

    proptest! {
        #[test]
        fn prop_exact_boundary_locked(last_seen in 0i64..2_000_000_000, wait in 0u32..100_000) {
            let now = last_seen + i64::from(wait) * 3600;
            prop_assert!(is_locked(now, last_seen, wait, 3600));
        }

        #[test]
        fn prop_one_past_boundary_unlocked(last_seen in 0i64..2_000_000_000, wait in 0u32..100_000) {
            let now = last_seen + i64::from(wait) * 3600 + 1;
            prop_assert!(!is_locked(now, last_seen, wait, 3600));
        }
    }
}
