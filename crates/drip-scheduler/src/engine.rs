use std::sync::Arc;

use chrono::{Duration, FixedOffset};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use drip_core::clock::{self, Timestamp};
use drip_core::DripConfig;
use drip_store::{Catalog, ScheduleState};

use crate::error::Result;
use crate::selector::{self, Picker};
use crate::transport::{DeliveryOutcome, Transport};

/// The scheduling loop.
///
/// Shares `ScheduleState` with the registration handler through one
/// `tokio::sync::Mutex`; the whole state pair is a single critical
/// section, sized for low recipient counts. The transport call is
/// awaited while the lock is held, so one slow send delays the rest of
/// the batch; deliveries to a single recipient can therefore never
/// overlap or reorder.
pub struct SchedulerEngine {
    state: Arc<Mutex<ScheduleState>>,
    catalog: Arc<Catalog>,
    transport: Arc<dyn Transport>,
    picker: Box<dyn Picker + Send>,
    min_send_interval: Duration,
    poll_interval_ticks: u64,
    zone: FixedOffset,
}

impl SchedulerEngine {
    pub fn new(
        config: &DripConfig,
        zone: FixedOffset,
        state: Arc<Mutex<ScheduleState>>,
        catalog: Arc<Catalog>,
        transport: Arc<dyn Transport>,
        picker: Box<dyn Picker + Send>,
    ) -> Self {
        Self {
            state,
            catalog,
            transport,
            picker,
            min_send_interval: config.min_send_interval(),
            poll_interval_ticks: config.poll_interval_secs.max(1),
            zone,
        }
    }

    /// Main loop. Wakes every second and runs a due-scan when any
    /// recipient is due or the poll interval has elapsed, until
    /// `shutdown` broadcasts `true`.
    ///
    /// The 1-second wake bounds worst-case delivery latency; no recipient
    /// can be served earlier than the next poll boundary.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("scheduler engine started");

        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        let mut ticks_since_scan = 0u64;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    ticks_since_scan += 1;
                    let now = clock::now(self.zone);
                    let wake_early = self
                        .state
                        .lock()
                        .await
                        .any_due(now, self.min_send_interval);
                    if !wake_early && ticks_since_scan < self.poll_interval_ticks {
                        continue;
                    }
                    ticks_since_scan = 0;

                    let mut state = self.state.lock().await;
                    if let Err(e) = due_scan(
                        &mut state,
                        &self.catalog,
                        self.transport.as_ref(),
                        self.picker.as_mut(),
                        now,
                        self.min_send_interval,
                    )
                    .await
                    {
                        // Persistence failed mid-scan; the remaining due
                        // recipients are picked up again next cycle.
                        error!("due-scan aborted: {e}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// One pass over every due recipient: select, send, commit.
///
/// Takes `now` as a parameter so tests drive time explicitly. Returns an
/// error only when a state write fails — delivery failures are handled
/// in place and never abort the scan.
pub async fn due_scan<P>(
    state: &mut ScheduleState,
    catalog: &Catalog,
    transport: &dyn Transport,
    picker: &mut P,
    now: Timestamp,
    min_interval: Duration,
) -> Result<()>
where
    P: Picker + ?Sized,
{
    let due = state.due(now, min_interval);
    if due.is_empty() {
        return Ok(());
    }
    debug!(count = due.len(), "due-scan");

    let today = now.date_naive();
    for id in due {
        let Some(item) = selector::select_for(catalog, state.delivered(&id), today, picker)
        else {
            info!(recipient = %id, "catalog exhausted; idle until new content arrives");
            state.record_exhaustion(&id, now)?;
            continue;
        };

        match transport.deliver(&id, item).await {
            DeliveryOutcome::Delivered => {
                info!(recipient = %id, content = item.id, "delivered");
                // A crash between the confirmation above and this commit
                // re-sends one item after restart: accepted at-least-once
                // behaviour.
                state.record_delivery(&id, item.id, now)?;
            }
            DeliveryOutcome::Permanent(reason) => {
                let profile = state.recipient(&id).map(|r| r.profile.clone());
                error!(
                    recipient = %id,
                    profile = ?profile,
                    %reason,
                    "permanent delivery failure; blocking recipient"
                );
                state.record_block(&id)?;
            }
            DeliveryOutcome::Transient(reason) => {
                warn!(recipient = %id, %reason, "transient delivery failure; retrying next cycle");
            }
        }
    }
    Ok(())
}
