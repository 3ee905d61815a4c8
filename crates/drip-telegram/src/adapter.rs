//! Long-polling dispatcher wiring.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use crate::handler::{handle_message, RegistrationContext};

/// Connect to Telegram and drive the long-polling loop.
///
/// Never returns in normal operation — runs for the lifetime of the
/// process. No public URL required.
pub async fn run_dispatcher(bot: Bot, ctx: Arc<RegistrationContext>) {
    info!("telegram: starting long-polling dispatcher");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .default_handler(|_upd| async {})
        .build()
        .dispatch()
        .await;
}
