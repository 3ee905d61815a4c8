//! The combined durable state pair (registry + ledger).
//!
//! Loaded once at startup — a missing or corrupt document is fatal, the
//! process must not serve with partially-initialised state. Every
//! mutating operation persists the touched document(s) before returning;
//! a persistence failure propagates so the caller aborts the current
//! tick instead of carrying unsynchronised in-memory state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{Duration, FixedOffset};
use drip_core::clock::{self, Timestamp};
use drip_core::{Profile, RecipientId};
use tracing::{info, instrument, warn};

use crate::doc::{read_doc, write_doc};
use crate::error::{Result, StoreError};
use crate::ledger::Ledger;
use crate::registry::{Recipient, Registry};

const RECIPIENTS_DOC: &str = "recipients.json";
const LAST_SENT_DOC: &str = "last_sent.json";
const DELIVERED_DOC: &str = "delivered.json";

/// The full durable scheduler state.
#[derive(Debug)]
pub struct ScheduleState {
    dir: PathBuf,
    zone: FixedOffset,
    registry: Registry,
    ledger: Ledger,
}

impl ScheduleState {
    /// Load the three documents from `dir`.
    ///
    /// Timestamps are parsed in `zone`; the registry pair invariant
    /// (recipient record ↔ last-send entry) is enforced here.
    pub fn load<P: AsRef<Path>>(dir: P, zone: FixedOffset) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        let recipients: BTreeMap<RecipientId, Recipient> = read_doc(&dir.join(RECIPIENTS_DOC))?;
        let raw_stamps: BTreeMap<RecipientId, String> = read_doc(&dir.join(LAST_SENT_DOC))?;
        let ledger: Ledger = read_doc(&dir.join(DELIVERED_DOC))?;

        let last_sent_path = dir.join(LAST_SENT_DOC);
        let mut last_sent = BTreeMap::new();
        for (id, raw) in raw_stamps {
            let ts = clock::parse_ts(&raw, zone).map_err(|e| StoreError::Invalid {
                path: last_sent_path.display().to_string(),
                message: format!("{id}: {e}"),
            })?;
            last_sent.insert(id, ts);
        }

        let registry =
            Registry::from_parts(recipients, last_sent).map_err(|message| StoreError::Invalid {
                path: last_sent_path.display().to_string(),
                message,
            })?;

        Ok(Self {
            dir,
            zone,
            registry,
            ledger,
        })
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn recipient(&self, id: &RecipientId) -> Option<&Recipient> {
        self.registry.get(id)
    }

    pub fn is_blocked(&self, id: &RecipientId) -> bool {
        self.registry.get(id).is_some_and(|r| r.blocked)
    }

    pub fn last_sent(&self, id: &RecipientId) -> Option<Timestamp> {
        self.registry.last_sent(id)
    }

    pub fn delivered(&self, id: &RecipientId) -> &BTreeSet<u32> {
        self.ledger.delivered(id)
    }

    pub fn due(&self, now: Timestamp, interval: Duration) -> Vec<RecipientId> {
        self.registry.due(now, interval)
    }

    pub fn any_due(&self, now: Timestamp, interval: Duration) -> bool {
        self.registry.any_due(now, interval)
    }

    /// Register a recipient. Idempotent: a known id only refreshes its
    /// profile metadata and never touches scheduling state.
    ///
    /// Returns `true` when the recipient is new.
    #[instrument(skip(self, profile, first_contact), fields(recipient = %id))]
    pub fn register(
        &mut self,
        id: &RecipientId,
        profile: Profile,
        first_contact: Timestamp,
    ) -> Result<bool> {
        if self.registry.contains(id) {
            info!("already registered");
            if self.registry.update_profile(id, profile)? {
                self.persist_recipients()?;
            }
            return Ok(false);
        }

        self.registry.insert(id.clone(), profile, first_contact);
        self.ledger.ensure(id);
        self.persist_recipients()?;
        self.persist_ledger()?;
        self.persist_last_sent()?;
        info!("recipient registered");
        Ok(true)
    }

    /// Commit a confirmed delivery: ledger first, then the schedule stamp.
    ///
    /// The ordering matters for crash recovery — if the process dies
    /// between the two writes the item is already in the ledger, so the
    /// immediately-due recipient cannot receive it twice.
    pub fn record_delivery(
        &mut self,
        id: &RecipientId,
        content_id: u32,
        now: Timestamp,
    ) -> Result<()> {
        if !self.registry.contains(id) {
            return Err(StoreError::UnknownRecipient(id.clone()));
        }
        if !self.ledger.record(id, content_id) {
            warn!(recipient = %id, content = content_id, "item was already in the ledger");
        }
        self.registry.set_last_sent(id, now)?;
        self.persist_ledger()?;
        self.persist_last_sent()?;
        Ok(())
    }

    /// The recipient has seen everything currently available. Stamp `now`
    /// so the next attempt waits a full interval.
    pub fn record_exhaustion(&mut self, id: &RecipientId, now: Timestamp) -> Result<()> {
        self.registry.set_last_sent(id, now)?;
        self.persist_last_sent()
    }

    /// Permanent delivery failure: retain the record, never schedule again.
    pub fn record_block(&mut self, id: &RecipientId) -> Result<()> {
        self.registry.block(id, clock::never(self.zone))?;
        self.persist_recipients()?;
        self.persist_last_sent()
    }

    fn persist_recipients(&self) -> Result<()> {
        write_doc(&self.dir.join(RECIPIENTS_DOC), self.registry.recipients_doc())
    }

    fn persist_last_sent(&self) -> Result<()> {
        write_doc(&self.dir.join(LAST_SENT_DOC), &self.registry.last_sent_doc())
    }

    fn persist_ledger(&self) -> Result<()> {
        write_doc(&self.dir.join(DELIVERED_DOC), &self.ledger)
    }
}
