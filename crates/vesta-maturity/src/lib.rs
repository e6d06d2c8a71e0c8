//! vesta-maturity
//!
//! Read-side helpers over the lock queues. The mutating append/release
//! logic lives in vesta-state's LedgerEngine; this crate answers the
//! questions wallets and the RPC layer ask: how much is locked, when does
//! it free up, and what does the release curve look like.

pub mod query;
pub mod schedule;

pub use query::MaturityQuery;
pub use schedule::{next_release, release_schedule, ReleasePoint};
