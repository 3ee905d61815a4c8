//! Recipient registry: who exists, whether they are blocked, and when
//! each of them was last sent content.

use std::collections::BTreeMap;

use chrono::Duration;
use drip_core::clock::{self, Timestamp};
use drip_core::{Profile, RecipientId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Durable per-recipient record. Recipients are never deleted; a blocked
/// one is retained for audit with its last-sent stamp pushed to `NEVER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub profile: Profile,
    #[serde(default)]
    pub blocked: bool,
}

/// In-memory view over the `recipients.json` + `last_sent.json` pair.
///
/// Pure bookkeeping — persistence lives in [`crate::state::ScheduleState`],
/// which owns a `Registry` and writes the documents after each mutation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    recipients: BTreeMap<RecipientId, Recipient>,
    last_sent: BTreeMap<RecipientId, Timestamp>,
}

impl Registry {
    /// Assemble from the two parsed documents, enforcing the pair
    /// invariant: every recipient has a last-send entry and vice versa.
    /// `Err` carries a human-readable message; the caller attaches the path.
    pub fn from_parts(
        recipients: BTreeMap<RecipientId, Recipient>,
        last_sent: BTreeMap<RecipientId, Timestamp>,
    ) -> std::result::Result<Self, String> {
        for id in recipients.keys() {
            if !last_sent.contains_key(id) {
                return Err(format!("recipient {id} has no last-send entry"));
            }
        }
        for id in last_sent.keys() {
            if !recipients.contains_key(id) {
                return Err(format!("last-send entry {id} has no recipient record"));
            }
        }
        Ok(Self {
            recipients,
            last_sent,
        })
    }

    pub fn contains(&self, id: &RecipientId) -> bool {
        self.recipients.contains_key(id)
    }

    pub fn get(&self, id: &RecipientId) -> Option<&Recipient> {
        self.recipients.get(id)
    }

    pub fn last_sent(&self, id: &RecipientId) -> Option<Timestamp> {
        self.last_sent.get(id).copied()
    }

    /// Add a new recipient. `first_contact` seeds the last-sent stamp —
    /// `MIN_TIME` makes them due on the next scan.
    pub fn insert(&mut self, id: RecipientId, profile: Profile, first_contact: Timestamp) {
        self.recipients.insert(
            id.clone(),
            Recipient {
                profile,
                blocked: false,
            },
        );
        self.last_sent.insert(id, first_contact);
    }

    /// Refresh profile metadata. Returns `true` when something changed.
    pub fn update_profile(&mut self, id: &RecipientId, profile: Profile) -> Result<bool> {
        let rec = self
            .recipients
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownRecipient(id.clone()))?;
        if rec.profile == profile {
            return Ok(false);
        }
        rec.profile = profile;
        Ok(true)
    }

    pub fn set_last_sent(&mut self, id: &RecipientId, ts: Timestamp) -> Result<()> {
        if !self.recipients.contains_key(id) {
            return Err(StoreError::UnknownRecipient(id.clone()));
        }
        self.last_sent.insert(id.clone(), ts);
        Ok(())
    }

    /// Mark `id` blocked and push its last-sent stamp to the never-sentinel
    /// so the due-scan skips it forever.
    pub fn block(&mut self, id: &RecipientId, never: Timestamp) -> Result<()> {
        let rec = self
            .recipients
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownRecipient(id.clone()))?;
        rec.blocked = true;
        self.last_sent.insert(id.clone(), never);
        Ok(())
    }

    fn is_due(&self, id: &RecipientId, ts: Timestamp, now: Timestamp, interval: Duration) -> bool {
        match self.recipients.get(id) {
            Some(rec) if !rec.blocked => now >= ts + interval,
            _ => false,
        }
    }

    /// Recipients whose minimum-interval boundary has passed, in id order.
    pub fn due(&self, now: Timestamp, interval: Duration) -> Vec<RecipientId> {
        self.last_sent
            .iter()
            .filter(|(id, ts)| self.is_due(id, **ts, now, interval))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Cheap O(recipients) check driving the engine's early wake-up.
    pub fn any_due(&self, now: Timestamp, interval: Duration) -> bool {
        self.last_sent
            .iter()
            .any(|(id, ts)| self.is_due(id, *ts, now, interval))
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn recipients_doc(&self) -> &BTreeMap<RecipientId, Recipient> {
        &self.recipients
    }

    /// The `last_sent.json` document: timestamps rendered in the fixed format.
    pub fn last_sent_doc(&self) -> BTreeMap<RecipientId, String> {
        self.last_sent
            .iter()
            .map(|(id, ts)| (id.clone(), clock::format_ts(*ts)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use drip_core::clock::{min_time, never, zone};

    fn msk() -> FixedOffset {
        zone(3).unwrap()
    }

    fn profile(name: &str) -> Profile {
        Profile {
            display_name: name.to_string(),
            handle: None,
        }
    }

    #[test]
    fn fresh_recipient_is_due_immediately() {
        let z = msk();
        let mut reg = Registry::default();
        let id = RecipientId::from("1");
        reg.insert(id.clone(), profile("a"), min_time(z));

        let now = z.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(reg.due(now, Duration::days(1)), vec![id]);
    }

    #[test]
    fn interval_gates_due() {
        let z = msk();
        let mut reg = Registry::default();
        let id = RecipientId::from("1");
        let t0 = z.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        reg.insert(id.clone(), profile("a"), t0);

        let interval = Duration::days(1);
        assert!(!reg.any_due(t0, interval));
        assert!(!reg.any_due(t0 + Duration::hours(23), interval));
        assert!(reg.any_due(t0 + interval, interval));
    }

    #[test]
    fn blocked_recipient_is_never_due() {
        let z = msk();
        let mut reg = Registry::default();
        let id = RecipientId::from("1");
        reg.insert(id.clone(), profile("a"), min_time(z));
        reg.block(&id, never(z)).unwrap();

        let now = z.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(reg.due(now, Duration::days(1)).is_empty());
        assert!(reg.get(&id).unwrap().blocked);
    }

    #[test]
    fn update_profile_reports_changes() {
        let z = msk();
        let mut reg = Registry::default();
        let id = RecipientId::from("1");
        reg.insert(id.clone(), profile("a"), min_time(z));

        assert!(!reg.update_profile(&id, profile("a")).unwrap());
        assert!(reg.update_profile(&id, profile("b")).unwrap());
        assert_eq!(reg.get(&id).unwrap().profile.display_name, "b");
    }

    #[test]
    fn ops_on_unknown_recipient_fail() {
        let z = msk();
        let mut reg = Registry::default();
        let id = RecipientId::from("ghost");
        assert!(reg.set_last_sent(&id, min_time(z)).is_err());
        assert!(reg.block(&id, never(z)).is_err());
    }

    #[test]
    fn from_parts_enforces_pair_invariant() {
        let z = msk();
        let id = RecipientId::from("1");

        let mut recipients = BTreeMap::new();
        recipients.insert(
            id.clone(),
            Recipient {
                profile: profile("a"),
                blocked: false,
            },
        );
        // no last_sent entry for "1"
        assert!(Registry::from_parts(recipients.clone(), BTreeMap::new()).is_err());

        // orphan last_sent entry
        let mut last_sent = BTreeMap::new();
        last_sent.insert(RecipientId::from("2"), min_time(z));
        let mut both = last_sent.clone();
        both.insert(id, min_time(z));
        assert!(Registry::from_parts(recipients, both).is_err());
    }
}
