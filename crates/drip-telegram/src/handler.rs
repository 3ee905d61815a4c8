//! Inbound registration handler.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::error;

use drip_core::clock::Timestamp;
use drip_core::{Profile, RecipientId};
use drip_store::ScheduleState;

/// Everything the `/start` handler needs, injected via dptree.
pub struct RegistrationContext {
    /// Shared with the scheduler engine; all mutation goes through this lock.
    pub state: Arc<tokio::sync::Mutex<ScheduleState>>,
    /// Reply sent on every `/start`, registered or not.
    pub greeting: String,
    /// Seed for a new recipient's last-sent stamp. `MIN_TIME` unless a
    /// fixed first-contact time is configured.
    pub first_contact: Timestamp,
}

/// Runs for every incoming `Message`; only `/start` does anything.
///
/// The greeting is sent before the registry is touched — acknowledgement
/// is immediate and independent of scheduling state, and delivery
/// problems are never surfaced to the recipient.
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    ctx: Arc<RegistrationContext>,
) -> ResponseResult<()> {
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return Ok(());
    }
    if !is_start(msg.text().unwrap_or("")) {
        return Ok(());
    }

    bot.send_message(msg.chat.id, &ctx.greeting).await?;

    let id = RecipientId::from(msg.chat.id.0);
    let profile = profile_from(&msg);
    let mut state = ctx.state.lock().await;
    // register() logs both the new-recipient and already-registered cases.
    if let Err(e) = state.register(&id, profile, ctx.first_contact) {
        error!(recipient = %id, "registration not persisted: {e}");
    }
    Ok(())
}

/// `/start`, `/start extra-args` and `/start@botname` all count.
fn is_start(text: &str) -> bool {
    let cmd = text.split_whitespace().next().unwrap_or("");
    cmd == "/start" || cmd.starts_with("/start@")
}

fn profile_from(msg: &Message) -> Profile {
    match msg.from.as_ref() {
        Some(user) => Profile {
            display_name: user.full_name(),
            handle: user.username.clone(),
        },
        None => Profile {
            display_name: msg.chat.title().unwrap_or("unknown").to_string(),
            handle: None,
        },
    }
}
