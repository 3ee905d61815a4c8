//! `drip-scheduler` — the delivery state machine.
//!
//! # Overview
//!
//! The [`engine::SchedulerEngine`] wakes every second, checks cheaply
//! whether any recipient's minimum-interval boundary has passed, and runs
//! a due-scan when one has (or when the configured poll interval elapses).
//! A due-scan takes the state lock once, walks every due recipient, asks
//! the [`selector`] for an unseen content item and hands it to the
//! [`transport::Transport`] collaborator.
//!
//! # Transitions per recipient
//!
//! | Outcome              | Effect                                        |
//! |----------------------|-----------------------------------------------|
//! | delivered            | ledger append, last-sent = now                |
//! | catalog exhausted    | last-sent = now, stays scheduled (idle)       |
//! | permanent failure    | blocked, last-sent = NEVER, kept for audit    |
//! | transient failure    | nothing mutated, retried next cycle           |
//!
//! Failure classification lives behind the transport; the engine only
//! ever sees [`transport::DeliveryOutcome`].

pub mod engine;
pub mod error;
pub mod selector;
pub mod transport;

pub use engine::{due_scan, SchedulerEngine};
pub use error::{Result, SchedulerError};
pub use selector::{Picker, RandomPicker};
pub use transport::{DeliveryOutcome, Transport};
