use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::types::{Balance, Timestamp};

// ── LockedBatch ──────────────────────────────────────────────────────────────

/// One discrete locked transfer: an amount that becomes spendable once
/// `release_at` has passed. A batch releases atomically or not at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedBatch {
    pub amount: Balance,
    /// Unlock timestamp (UTC Unix seconds).
    pub release_at: Timestamp,
}

/// What a bounded maturation pass released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaturedFunds {
    /// Sum of the released batch amounts, in grana.
    pub amount: Balance,
    /// Number of batches removed from the queue head.
    pub batches: u32,
}

// ── LockQueue ────────────────────────────────────────────────────────────────

/// Per-account queue of pending locked batches.
///
/// Three views of the same value are kept in lockstep and persisted as one
/// record:
///
///   batches      — arrival order, append at the tail, release from the head
///   by_release   — accumulated amount per exact release timestamp
///   locked_total — aggregate locked balance
///
/// Invariant after every mutation:
/// `locked_total == Σ batches.amount == Σ by_release.values()`.
///
/// The queue is ordered by arrival, NOT by release time: a later batch may
/// carry a shorter lock than the head. Maturation releases only the
/// contiguous matured prefix and never reorders or peeks past the first
/// unmatured head.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockQueue {
    batches: VecDeque<LockedBatch>,
    by_release: BTreeMap<Timestamp, Balance>,
    locked_total: Balance,
}

impl LockQueue {
    /// Append a batch at the tail. Zero-value locks carry nothing worth
    /// tracking and are dropped here.
    pub fn push(&mut self, amount: Balance, release_at: Timestamp) {
        if amount == 0 {
            return;
        }
        self.batches.push_back(LockedBatch { amount, release_at });
        *self.by_release.entry(release_at).or_insert(0) += amount;
        self.locked_total += amount;
    }

    /// Release the contiguous matured prefix, at most `max_count` batches.
    ///
    /// Stops at the first head batch with `release_at > now` even if later
    /// batches have already matured; arrival order is authoritative. Cost
    /// is bounded by `max_count`, independent of queue length. An empty
    /// queue or an unmatured head is a no-op, not an error.
    pub fn mature(&mut self, now: Timestamp, max_count: u32) -> MaturedFunds {
        let mut freed = MaturedFunds::default();
        for _ in 0..max_count {
            let Some(head) = self.batches.front().copied() else {
                break;
            };
            if head.release_at > now {
                break;
            }
            self.batches.pop_front();
            self.locked_total -= head.amount;
            if let Some(entry) = self.by_release.get_mut(&head.release_at) {
                // The entry is retained at zero; the per-timestamp view
                // keeps answering for timestamps that once held value.
                *entry -= head.amount;
            }
            freed.amount += head.amount;
            freed.batches += 1;
        }
        freed
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Aggregate locked balance in grana.
    pub fn locked_total(&self) -> Balance {
        self.locked_total
    }

    /// Accumulated amount of all pending batches releasing at exactly
    /// `release_at`. Zero for unknown timestamps and for timestamps whose
    /// batches have all matured.
    pub fn amount_at(&self, release_at: Timestamp) -> Balance {
        self.by_release.get(&release_at).copied().unwrap_or(0)
    }

    /// Release timestamps of all pending batches, oldest-arrived first.
    pub fn release_timestamps(&self) -> Vec<Timestamp> {
        self.batches.iter().map(|b| b.release_at).collect()
    }

    /// Pending batches, oldest-arrived first.
    pub fn batches(&self) -> impl Iterator<Item = &LockedBatch> {
        self.batches.iter()
    }

    /// The batch that must mature before anything else can.
    pub fn head(&self) -> Option<&LockedBatch> {
        self.batches.front()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_views(q: &LockQueue) -> (Balance, Balance, Balance) {
        let from_batches = q.batches().map(|b| b.amount).sum();
        let from_index: Balance = q
            .release_timestamps()
            .iter()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .map(|ts| q.amount_at(*ts))
            .sum();
        (q.locked_total(), from_batches, from_index)
    }

    fn assert_views_agree(q: &LockQueue) {
        let (total, from_batches, from_index) = sum_views(q);
        assert_eq!(total, from_batches);
        assert_eq!(total, from_index);
    }

    #[test]
    fn push_appends_in_arrival_order() {
        let mut q = LockQueue::default();
        q.push(10, 300);
        q.push(20, 100); // shorter lock arrives later
        q.push(30, 200);

        assert_eq!(q.len(), 3);
        assert_eq!(q.release_timestamps(), vec![300, 100, 200]);
        assert_eq!(q.locked_total(), 60);
        assert_views_agree(&q);
    }

    #[test]
    fn zero_amount_push_is_dropped() {
        let mut q = LockQueue::default();
        q.push(0, 100);
        assert!(q.is_empty());
        assert_eq!(q.locked_total(), 0);
        assert_eq!(q.amount_at(100), 0);
    }

    #[test]
    fn mature_releases_contiguous_prefix_only() {
        let mut q = LockQueue::default();
        q.push(10, 300); // head, not yet matured at now=250
        q.push(20, 100); // already matured, but behind the head

        let freed = q.mature(250, 10);
        assert_eq!(freed, MaturedFunds::default());
        assert_eq!(q.len(), 2, "an unmatured head blocks the whole pass");
        assert_eq!(q.locked_total(), 30);
        assert_views_agree(&q);
    }

    #[test]
    fn mature_is_bounded_by_max_count() {
        let mut q = LockQueue::default();
        for i in 0..5 {
            q.push(1, 100 + i);
        }

        let freed = q.mature(1_000, 2);
        assert_eq!(freed.batches, 2);
        assert_eq!(freed.amount, 2);
        assert_eq!(q.len(), 3, "at most max_count batches per pass");

        let freed = q.mature(1_000, 100);
        assert_eq!(freed.batches, 3);
        assert!(q.is_empty());
        assert_views_agree(&q);
    }

    #[test]
    fn mature_on_empty_queue_is_noop() {
        let mut q = LockQueue::default();
        let before = q.clone();
        assert_eq!(q.mature(1_000, 10), MaturedFunds::default());
        assert_eq!(q, before);
    }

    #[test]
    fn mature_with_zero_budget_is_noop() {
        let mut q = LockQueue::default();
        q.push(10, 100);
        let before = q.clone();
        assert_eq!(q.mature(1_000, 0), MaturedFunds::default());
        assert_eq!(q, before);
    }

    #[test]
    fn release_index_entry_is_retained_at_zero() {
        let mut q = LockQueue::default();
        q.push(10, 100);
        q.mature(200, 10);

        assert!(q.is_empty());
        assert_eq!(q.amount_at(100), 0);
        assert_eq!(q.locked_total(), 0);
    }

    #[test]
    fn same_release_timestamp_accumulates() {
        let mut q = LockQueue::default();
        q.push(10, 100);
        q.push(15, 100);
        assert_eq!(q.amount_at(100), 25);

        // Only one of the two batches fits the budget; the index entry
        // must drop by exactly that batch's amount.
        let freed = q.mature(150, 1);
        assert_eq!(freed.amount, 10);
        assert_eq!(q.amount_at(100), 15);
        assert_eq!(q.locked_total(), 15);
        assert_views_agree(&q);
    }

    #[test]
    fn views_stay_consistent_across_interleaved_mutations() {
        let mut q = LockQueue::default();
        q.push(5, 50);
        q.push(7, 70);
        q.mature(60, 10); // releases the 5
        q.push(11, 50); // reuses a timestamp whose entry sits at zero
        q.mature(55, 10); // head (70) unmatured, so a no-op
        assert_eq!(q.len(), 2);
        assert_eq!(q.amount_at(50), 11);
        assert_eq!(q.locked_total(), 18);
        assert_views_agree(&q);

        q.mature(100, 10);
        assert!(q.is_empty());
        assert_eq!(q.locked_total(), 0);
        assert_views_agree(&q);
    }
}
