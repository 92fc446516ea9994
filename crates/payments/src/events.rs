//! Webhook event payloads.

use listcraft_core::types::DbId;
use serde::Deserialize;

/// Top-level webhook envelope. Only the fields we read.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// The `checkout.session.completed` object, as far as crediting needs.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionCompleted {
    pub id: String,
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionMetadata {
    pub user_id: Option<String>,
    pub package_id: Option<String>,
    pub credits: Option<String>,
}

/// What a completed checkout session entitles the user to.
#[derive(Debug, PartialEq, Eq)]
pub struct CreditGrant {
    pub user_id: DbId,
    pub package_id: String,
    pub credits: i32,
    pub payment_intent: String,
}

impl CheckoutSessionCompleted {
    /// Extract the credit grant from session metadata. `None` when the
    /// session was not created by our checkout flow (missing or
    /// malformed metadata); such sessions are logged and skipped, not
    /// errors.
    pub fn credit_grant(&self) -> Option<CreditGrant> {
        let user_id = self.metadata.user_id.as_deref()?.parse::<DbId>().ok()?;
        let credits = self.metadata.credits.as_deref()?.parse::<i32>().ok()?;
        if credits <= 0 {
            return None;
        }
        Some(CreditGrant {
            user_id,
            package_id: self.metadata.package_id.clone().unwrap_or_default(),
            credits,
            payment_intent: self.payment_intent.clone()?,
        })
    }
}
