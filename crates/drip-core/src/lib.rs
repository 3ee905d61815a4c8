//! `drip-core` — shared types, clock helpers and configuration.
//!
//! Everything the other crates agree on lives here: the recipient and
//! content item types, the fixed-offset timestamp format the durable
//! documents use (including the `MIN_TIME`/`NEVER` sentinels), and
//! `DripConfig` (drip.toml + `DRIP_*` env overrides).

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use config::DripConfig;
pub use error::{DripError, Result};
pub use types::{ContentItem, Profile, RecipientId};
