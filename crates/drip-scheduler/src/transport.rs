//! Outbound transport seam.
//!
//! The engine never inspects provider error payloads. Whatever library
//! the concrete transport wraps, it classifies its own failures and the
//! engine acts on the three-way [`DeliveryOutcome`] alone.

use async_trait::async_trait;
use drip_core::{ContentItem, RecipientId};

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport confirmed delivery.
    Delivered,
    /// The recipient can never receive content again (access revoked).
    /// Anything else — however broken it looks — must map to `Transient`.
    Permanent(String),
    /// Expected to succeed on a later attempt (network blip, rate limit,
    /// timeout). Retried implicitly on the next due cycle.
    Transient(String),
}

/// One delivery attempt to one recipient. Implementations bound their own
/// send time; an elapsed bound is a `Transient` outcome, never an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, to: &RecipientId, item: &ContentItem) -> DeliveryOutcome;
}
