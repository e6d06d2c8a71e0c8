//! Release schedule computation.
//!
//! Folds a lock queue into a release-time-ascending curve: how much frees
//! up at each timestamp and how much will be free in total once that
//! timestamp passes. Wallets render this as "when can I spend what".
//!
//! The queue itself is arrival-ordered; this view re-groups by release
//! time without touching the queue.

use std::collections::BTreeMap;

use vesta_core::queue::LockQueue;
use vesta_core::types::{Balance, Timestamp};

/// One point on an account's release curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePoint {
    /// Release timestamp (UTC Unix seconds).
    pub release_at: Timestamp,
    /// Amount releasing at exactly this timestamp, in grana.
    pub amount: Balance,
    /// Running total released once this timestamp has passed.
    pub cumulative: Balance,
    /// True if this point is already in the past at `now`.
    pub matured: bool,
}

/// Compute the release curve for a queue, release-time ascending.
///
/// Timestamps whose batches have all matured away carry no weight and are
/// omitted, even though the queue's per-timestamp index may still hold
/// their keys at zero.
pub fn release_schedule(queue: &LockQueue, now: Timestamp) -> Vec<ReleasePoint> {
    let mut grouped: BTreeMap<Timestamp, Balance> = BTreeMap::new();
    for batch in queue.batches() {
        *grouped.entry(batch.release_at).or_insert(0) += batch.amount;
    }

    let mut cumulative: Balance = 0;
    grouped
        .into_iter()
        .map(|(release_at, amount)| {
            cumulative += amount;
            ReleasePoint {
                release_at,
                amount,
                cumulative,
                matured: release_at <= now,
            }
        })
        .collect()
}

/// Earliest future release timestamp, if any value is still maturing.
pub fn next_release(queue: &LockQueue, now: Timestamp) -> Option<Timestamp> {
    queue
        .batches()
        .map(|b| b.release_at)
        .filter(|ts| *ts > now)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_groups_and_orders_by_release_time() {
        let mut q = LockQueue::default();
        q.push(10, 300); // arrival order deliberately not release order
        q.push(20, 100);
        q.push(5, 300);

        let schedule = release_schedule(&q, 150);
        assert_eq!(schedule.len(), 2);

        assert_eq!(schedule[0].release_at, 100);
        assert_eq!(schedule[0].amount, 20);
        assert_eq!(schedule[0].cumulative, 20);
        assert!(schedule[0].matured);

        assert_eq!(schedule[1].release_at, 300);
        assert_eq!(schedule[1].amount, 15);
        assert_eq!(schedule[1].cumulative, 35);
        assert!(!schedule[1].matured);
    }

    #[test]
    fn schedule_omits_released_timestamps() {
        let mut q = LockQueue::default();
        q.push(10, 100);
        q.push(20, 200);
        q.mature(150, 10); // releases the batch at 100; index keeps the key at zero

        let schedule = release_schedule(&q, 150);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].release_at, 200);
        assert_eq!(schedule[0].cumulative, 20);
    }

    #[test]
    fn schedule_of_empty_queue_is_empty() {
        assert!(release_schedule(&LockQueue::default(), 0).is_empty());
    }

    #[test]
    fn next_release_skips_matured_batches() {
        let mut q = LockQueue::default();
        q.push(10, 100);
        q.push(20, 300);
        q.push(30, 200);

        assert_eq!(next_release(&q, 150), Some(200));
        assert_eq!(next_release(&q, 300), None);
    }
}
