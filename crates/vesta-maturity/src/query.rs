use vesta_core::error::VestaError;
use vesta_core::queue::{LockQueue, LockedBatch};
use vesta_core::types::{AccountId, Balance, Timestamp};
use vesta_state::StateDb;

/// Query helpers for per-account lock queues. Pure reads, no side effects.
pub struct MaturityQuery<'a> {
    db: &'a StateDb,
}

impl<'a> MaturityQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    fn queue(&self, id: &AccountId) -> Result<LockQueue, VestaError> {
        Ok(self.db.get_queue(id)?.unwrap_or_default())
    }

    /// Number of pending locked batches.
    pub fn queue_length(&self, id: &AccountId) -> Result<usize, VestaError> {
        Ok(self.queue(id)?.len())
    }

    /// Aggregate locked balance in grana.
    pub fn locked_balance(&self, id: &AccountId) -> Result<Balance, VestaError> {
        Ok(self.queue(id)?.locked_total())
    }

    /// Accumulated pending amount releasing at exactly `release_at`.
    pub fn locked_amount_at(
        &self,
        id: &AccountId,
        release_at: Timestamp,
    ) -> Result<Balance, VestaError> {
        Ok(self.queue(id)?.amount_at(release_at))
    }

    /// Release timestamps of all pending batches, oldest-arrived first.
    pub fn release_timestamps(&self, id: &AccountId) -> Result<Vec<Timestamp>, VestaError> {
        Ok(self.queue(id)?.release_timestamps())
    }

    /// Pending batches, oldest-arrived first.
    pub fn snapshot(&self, id: &AccountId) -> Result<Vec<LockedBatch>, VestaError> {
        Ok(self.queue(id)?.batches().copied().collect())
    }

    /// Human-readable summary of an account's locked position.
    pub fn describe(&self, id: &AccountId, now: Timestamp) -> Result<String, VestaError> {
        let queue = self.queue(id)?;
        if queue.is_empty() {
            return Ok(format!("{} | no pending locked batches", id));
        }

        let claimable: Balance = queue
            .batches()
            .filter(|b| b.release_at <= now)
            .map(|b| b.amount)
            .sum();

        let head = queue
            .head()
            .map(|h| {
                if h.release_at > now {
                    format!("head releases in {} s", h.release_at - now)
                } else {
                    "head matured, ready to release".to_string()
                }
            })
            .unwrap_or_default();

        Ok(format!(
            "{} | {} batches | {} grana locked | {} grana past release | {}",
            id,
            queue.len(),
            queue.locked_total(),
            claimable,
            head
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("vesta_maturity_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    #[test]
    fn queries_reflect_the_stored_queue() {
        let db = temp_db("reads");
        let id = AccountId::derived(b"locked");

        let mut queue = LockQueue::default();
        queue.push(10, 300);
        queue.push(20, 100);
        db.put_queue(&id, &queue).unwrap();

        let query = MaturityQuery::new(&db);
        assert_eq!(query.queue_length(&id).unwrap(), 2);
        assert_eq!(query.locked_balance(&id).unwrap(), 30);
        assert_eq!(query.locked_amount_at(&id, 300).unwrap(), 10);
        assert_eq!(query.locked_amount_at(&id, 999).unwrap(), 0);
        assert_eq!(query.release_timestamps(&id).unwrap(), vec![300, 100]);
        assert_eq!(query.snapshot(&id).unwrap().len(), 2);
    }

    #[test]
    fn unknown_account_reads_as_empty() {
        let db = temp_db("empty");
        let query = MaturityQuery::new(&db);
        let ghost = AccountId::derived(b"ghost");

        assert_eq!(query.queue_length(&ghost).unwrap(), 0);
        assert_eq!(query.locked_balance(&ghost).unwrap(), 0);
        assert!(query.release_timestamps(&ghost).unwrap().is_empty());
        assert!(query.describe(&ghost, 0).unwrap().contains("no pending"));
    }

    #[test]
    fn describe_reports_the_blocking_head() {
        let db = temp_db("describe");
        let id = AccountId::derived(b"described");

        let mut queue = LockQueue::default();
        queue.push(10, 500); // unmatured head
        queue.push(20, 100); // matured behind it
        db.put_queue(&id, &queue).unwrap();

        let text = MaturityQuery::new(&db).describe(&id, 200).unwrap();
        assert!(text.contains("2 batches"));
        assert!(text.contains("30 grana locked"));
        assert!(text.contains("20 grana past release"));
        assert!(text.contains("head releases in 300 s"));
    }
}
