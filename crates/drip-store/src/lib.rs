//! `drip-store` — durable scheduler state.
//!
//! Three JSON documents back the scheduler, all living in one state
//! directory and each replaced atomically (temp file + fsync + rename)
//! after every mutation:
//!
//! | Document          | Contents                                   |
//! |-------------------|--------------------------------------------|
//! | `recipients.json` | recipient id → profile + blocked flag      |
//! | `last_sent.json`  | recipient id → last-send timestamp         |
//! | `delivered.json`  | recipient id → set of delivered content ids|
//!
//! A fourth document, the content catalog, is read-only input and never
//! written back.
//!
//! [`state::ScheduleState`] owns the registry/ledger pair; all mutating
//! operations persist the touched documents before returning, so a crash
//! never leaves the in-memory and on-disk state silently diverged.

pub mod catalog;
mod doc;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod state;

pub use catalog::Catalog;
pub use error::{Result, StoreError};
pub use ledger::Ledger;
pub use registry::{Recipient, Registry};
pub use state::ScheduleState;
