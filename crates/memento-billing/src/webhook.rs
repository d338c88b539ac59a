//! Stripe Webhook Reconciliation
//!
//! Verifies webhook signatures and drives the profile payment-state machine
//! from inbound Stripe events. Signature verification is mandatory before
//! any processing; a failed signature must not mutate state.
//!
//! Events are matched to a profile by `stripe_customer_id`. The session's
//! `user_id` metadata is only used as the lazy-creation fallback on the
//! first grant, when no profile carries the customer id yet.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;

use crate::error::{BillingError, Result};
use crate::profile::{PriceType, Profile, ProfileStore};

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age of a signed payload, in seconds
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `stripe-signature` header against the raw request body.
///
/// Header format: `t=<unix-timestamp>,v1=<hex-hmac>[,v1=...,v0=...]`.
/// The signed payload is `<timestamp>.<body>`, HMAC-SHA256 under the
/// endpoint secret; comparison is constant-time.
pub fn verify_signature(payload: &str, signature_header: &str, secret: &str) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| BillingError::WebhookSignature("missing timestamp".into()))?;
    if candidates.is_empty() {
        return Err(BillingError::WebhookSignature("missing v1 signature".into()));
    }

    let age = (chrono::Utc::now().timestamp() - timestamp).abs();
    if age > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::WebhookSignature(format!(
            "timestamp outside tolerance ({age}s)"
        )));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::WebhookSignature("invalid secret".into()))?;
    mac.update(format!("{timestamp}.{payload}").as_bytes());

    for candidate in candidates {
        let Ok(bytes) = hex::decode(candidate) else {
            continue;
        };
        // verify_slice is constant-time
        if mac.clone().verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }

    Err(BillingError::WebhookSignature("no matching signature".into()))
}

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Checkout completed - grant access
    CheckoutCompleted {
        session_id: String,
        customer_id: Option<String>,
        user_id: Option<String>,
        customer_email: Option<String>,
        price_type: PriceType,
    },

    /// Subscription cancelled - revoke a monthly grant
    SubscriptionCancelled { customer_id: String },

    /// Recurring payment failed - revoke a monthly grant
    PaymentFailed { customer_id: Option<String> },

    /// Unhandled event type
    Other { event_type: String },
}

impl WebhookEvent {
    /// Decode a raw Stripe event body.
    ///
    /// Only the fields the state machine reads are extracted; everything
    /// else in the payload is ignored.
    pub fn parse(payload: &str) -> Result<Self> {
        let event: Value = serde_json::from_str(payload)
            .map_err(|e| BillingError::WebhookParse(e.to_string()))?;

        let event_type = event["type"]
            .as_str()
            .ok_or_else(|| BillingError::WebhookParse("missing event type".into()))?;
        let object = &event["data"]["object"];

        let parsed = match event_type {
            "checkout.session.completed" => {
                let session_id = object["id"]
                    .as_str()
                    .ok_or_else(|| BillingError::WebhookParse("missing session id".into()))?
                    .to_string();

                let metadata = &object["metadata"];
                let price_type = metadata["plan"]
                    .as_str()
                    .and_then(PriceType::parse)
                    .or_else(|| match object["mode"].as_str() {
                        Some("payment") => Some(PriceType::Lifetime),
                        Some("subscription") => Some(PriceType::Monthly),
                        _ => None,
                    })
                    .unwrap_or(PriceType::Monthly);

                WebhookEvent::CheckoutCompleted {
                    session_id,
                    customer_id: object["customer"].as_str().map(str::to_owned),
                    user_id: metadata["user_id"].as_str().map(str::to_owned),
                    customer_email: object["customer_details"]["email"]
                        .as_str()
                        .or_else(|| object["customer_email"].as_str())
                        .map(str::to_owned),
                    price_type,
                }
            }

            "customer.subscription.deleted" => {
                let customer_id = object["customer"]
                    .as_str()
                    .ok_or_else(|| {
                        BillingError::WebhookParse("subscription missing customer".into())
                    })?
                    .to_string();
                WebhookEvent::SubscriptionCancelled { customer_id }
            }

            "invoice.payment_failed" => WebhookEvent::PaymentFailed {
                customer_id: object["customer"].as_str().map(str::to_owned),
            },

            other => WebhookEvent::Other {
                event_type: other.to_string(),
            },
        };

        Ok(parsed)
    }
}

/// Webhook handler
pub struct WebhookHandler<S: ProfileStore> {
    profiles: Arc<S>,
}

impl<S: ProfileStore> WebhookHandler<S> {
    pub fn new(profiles: Arc<S>) -> Self {
        Self { profiles }
    }

    /// Verify the signature, then decode the event.
    ///
    /// State is untouched until this returns `Ok`.
    pub fn verify_and_parse(
        &self,
        payload: &str,
        signature: &str,
        secret: &str,
    ) -> Result<WebhookEvent> {
        verify_signature(payload, signature, secret)?;
        WebhookEvent::parse(payload)
    }

    /// Apply an event to the matched profile.
    ///
    /// Every write is the target state, not a delta, so replays are safe.
    pub async fn handle(&self, event: &WebhookEvent) -> Result<()> {
        match event {
            WebhookEvent::CheckoutCompleted {
                session_id,
                customer_id,
                user_id,
                customer_email,
                price_type,
            } => {
                let Some(customer) = customer_id else {
                    tracing::warn!(session_id = %session_id, "Checkout completed without customer, skipping");
                    return Ok(());
                };

                let profile = self.match_profile(customer, user_id.as_deref())?;
                let Some(mut profile) = profile else {
                    tracing::warn!(
                        customer_id = %customer,
                        "No profile matches checkout, dropping grant"
                    );
                    return Ok(());
                };

                profile.grant(*price_type, Some(customer), Some(session_id));
                self.profiles.upsert(&profile)?;

                tracing::info!(
                    user_id = %profile.user_id,
                    customer_id = %customer,
                    price_type = %price_type,
                    email = ?customer_email,
                    "Granted access"
                );
            }

            WebhookEvent::SubscriptionCancelled { customer_id } => {
                self.revoke_monthly(customer_id, "subscription cancelled")?;
            }

            WebhookEvent::PaymentFailed { customer_id } => {
                let Some(customer) = customer_id else {
                    tracing::warn!("Payment failure without customer, skipping");
                    return Ok(());
                };
                self.revoke_monthly(customer, "payment failed")?;
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
            }
        }

        Ok(())
    }

    /// Match by customer id first; fall back to the metadata user id for the
    /// lazy first-grant upsert.
    fn match_profile(&self, customer_id: &str, user_id: Option<&str>) -> Result<Option<Profile>> {
        if let Some(profile) = self.profiles.find_by_customer(customer_id)? {
            return Ok(Some(profile));
        }

        match user_id {
            Some(user_id) => match self.profiles.get(user_id)? {
                Some(profile) => Ok(Some(profile)),
                None => Ok(Some(Profile::new(user_id))),
            },
            None => Ok(None),
        }
    }

    fn revoke_monthly(&self, customer_id: &str, reason: &str) -> Result<()> {
        let Some(mut profile) = self.profiles.find_by_customer(customer_id)? else {
            tracing::warn!(customer_id = %customer_id, reason, "No profile for customer, ignoring");
            return Ok(());
        };

        if profile.revoke() {
            self.profiles.upsert(&profile)?;
            tracing::info!(
                user_id = %profile.user_id,
                customer_id = %customer_id,
                reason,
                "Revoked access"
            );
        } else {
            tracing::debug!(
                user_id = %profile.user_id,
                payment_type = ?profile.payment_type,
                reason,
                "Grant not revocable, ignoring"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;

    const SECRET: &str = "whsec_test_secret";

    fn sign_at(payload: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn sign(payload: &str) -> String {
        sign_at(payload, chrono::Utc::now().timestamp())
    }

    fn checkout_completed(customer: &str, user_id: &str, plan: &str, mode: &str) -> String {
        serde_json::json!({
            "id": "evt_1",
            "object": "event",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "object": "checkout.session",
                    "customer": customer,
                    "mode": mode,
                    "customer_details": { "email": "seneca@example.com" },
                    "metadata": { "plan": plan, "user_id": user_id }
                }
            }
        })
        .to_string()
    }

    fn subscription_deleted(customer: &str) -> String {
        serde_json::json!({
            "id": "evt_2",
            "object": "event",
            "type": "customer.subscription.deleted",
            "data": { "object": { "id": "sub_1", "object": "subscription", "customer": customer } }
        })
        .to_string()
    }

    fn invoice_failed(customer: &str) -> String {
        serde_json::json!({
            "id": "evt_3",
            "object": "event",
            "type": "invoice.payment_failed",
            "data": { "object": { "id": "in_1", "object": "invoice", "customer": customer } }
        })
        .to_string()
    }

    #[test]
    fn test_signature_roundtrip() {
        let payload = r#"{"type":"ping"}"#;
        let header = sign(payload);
        assert!(verify_signature(payload, &header, SECRET).is_ok());
    }

    #[test]
    fn test_signature_rejects_tampered_payload() {
        let header = sign(r#"{"type":"ping"}"#);
        assert!(verify_signature(r#"{"type":"pong"}"#, &header, SECRET).is_err());
    }

    #[test]
    fn test_signature_rejects_stale_timestamp() {
        let payload = r#"{"type":"ping"}"#;
        let header = sign_at(payload, chrono::Utc::now().timestamp() - 3600);
        assert!(verify_signature(payload, &header, SECRET).is_err());
    }

    #[test]
    fn test_signature_rejects_malformed_header() {
        assert!(verify_signature("{}", "not-a-header", SECRET).is_err());
        assert!(verify_signature("{}", "t=12345", SECRET).is_err());
    }

    #[test]
    fn test_parse_checkout_completed() {
        let payload = checkout_completed("cus_1", "user-1", "lifetime", "payment");
        let event = WebhookEvent::parse(&payload).unwrap();

        assert_eq!(
            event,
            WebhookEvent::CheckoutCompleted {
                session_id: "cs_test_1".into(),
                customer_id: Some("cus_1".into()),
                user_id: Some("user-1".into()),
                customer_email: Some("seneca@example.com".into()),
                price_type: PriceType::Lifetime,
            }
        );
    }

    #[test]
    fn test_parse_falls_back_to_session_mode() {
        let payload = serde_json::json!({
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_2", "customer": "cus_2", "mode": "payment" } }
        })
        .to_string();

        match WebhookEvent::parse(&payload).unwrap() {
            WebhookEvent::CheckoutCompleted { price_type, .. } => {
                assert_eq!(price_type, PriceType::Lifetime);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_event() {
        let payload = r#"{"type":"charge.refunded","data":{"object":{}}}"#;
        assert_eq!(
            WebhookEvent::parse(payload).unwrap(),
            WebhookEvent::Other {
                event_type: "charge.refunded".into()
            }
        );
    }

    async fn deliver(handler: &WebhookHandler<MemoryProfileStore>, payload: &str) {
        let event = handler
            .verify_and_parse(payload, &sign(payload), SECRET)
            .unwrap();
        handler.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_monthly_lifecycle() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());

        deliver(
            &handler,
            &checkout_completed("cus_m", "user-m", "monthly", "subscription"),
        )
        .await;

        let profile = store.get("user-m").unwrap().unwrap();
        assert!(profile.is_paid);
        assert_eq!(profile.payment_type, Some(PriceType::Monthly));
        assert_eq!(profile.stripe_customer_id.as_deref(), Some("cus_m"));

        deliver(&handler, &subscription_deleted("cus_m")).await;

        let profile = store.get("user-m").unwrap().unwrap();
        assert!(!profile.is_paid);
    }

    #[tokio::test]
    async fn test_lifetime_survives_cancellation() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());

        deliver(
            &handler,
            &checkout_completed("cus_l", "user-l", "lifetime", "payment"),
        )
        .await;
        deliver(&handler, &subscription_deleted("cus_l")).await;
        deliver(&handler, &invoice_failed("cus_l")).await;

        let profile = store.get("user-l").unwrap().unwrap();
        assert!(profile.is_paid);
        assert_eq!(profile.payment_type, Some(PriceType::Lifetime));
    }

    #[tokio::test]
    async fn test_payment_failure_revokes_monthly() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());

        deliver(
            &handler,
            &checkout_completed("cus_f", "user-f", "monthly", "subscription"),
        )
        .await;
        deliver(&handler, &invoice_failed("cus_f")).await;

        assert!(!store.get("user-f").unwrap().unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_replay_is_idempotent() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());
        let payload = checkout_completed("cus_r", "user-r", "monthly", "subscription");

        deliver(&handler, &payload).await;
        let first = store.get("user-r").unwrap().unwrap();

        deliver(&handler, &payload).await;
        let second = store.get("user-r").unwrap().unwrap();

        assert_eq!(first.is_paid, second.is_paid);
        assert_eq!(first.payment_type, second.payment_type);
        assert_eq!(first.stripe_customer_id, second.stripe_customer_id);
        assert_eq!(first.stripe_session_id, second.stripe_session_id);
    }

    #[tokio::test]
    async fn test_invalid_signature_never_mutates() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());
        let payload = checkout_completed("cus_x", "user-x", "monthly", "subscription");

        let result = handler.verify_and_parse(&payload, "t=1,v1=deadbeef", SECRET);
        assert!(result.is_err());
        assert!(store.get("user-x").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancellation_for_unknown_customer_is_ignored() {
        let store = Arc::new(MemoryProfileStore::new());
        let handler = WebhookHandler::new(store.clone());

        deliver(&handler, &subscription_deleted("cus_ghost")).await;
        // Nothing to assert beyond "did not error"; no profile exists
        assert!(store.find_by_customer("cus_ghost").unwrap().is_none());
    }
}
