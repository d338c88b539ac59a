//! # memento-billing
//!
//! Stripe checkout, webhook reconciliation and paywall state for Memento.
//!
//! ## Payment flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Dashboard  │────▶│  Stripe Hosted  │────▶│  Dashboard  │
//! │  (pricing)  │     │  Checkout Page  │     │  (success)  │
//! └─────────────┘     └─────────────────┘     └──────┬──────┘
//!                                                    │ polls
//!        ┌─────────────┐      webhook        ┌───────▼──────┐
//!        │   Stripe    │─────────────────────▶│   Profile   │
//!        │   events    │  (reconciliation)   │  is_paid,... │
//!        └─────────────┘                     └──────────────┘
//! ```
//!
//! Two price types exist: a recurring **monthly** subscription and a one-time
//! **lifetime** purchase. The mapping from price type to Stripe session mode
//! is an explicit configuration table ([`checkout::PriceConfig`]), never an
//! inline literal.
//!
//! Webhook reconciliation is a small state machine over a profile's payment
//! flags, driven by three Stripe events and matched to the profile by
//! `stripe_customer_id`:
//!
//! | Event                           | Precondition            | Effect                              |
//! |---------------------------------|-------------------------|-------------------------------------|
//! | `checkout.session.completed`    | customer present        | `is_paid = true`, plan, date        |
//! | `customer.subscription.deleted` | payment_type = monthly  | `is_paid = false`                   |
//! | `invoice.payment_failed`        | payment_type = monthly  | `is_paid = false`                   |
//! | other                           | —                       | logged, ignored                     |
//!
//! Every mutation writes the target state, not a delta, so replaying an
//! event is safe. A cancellation never clears a lifetime grant.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memento_billing::{CheckoutRequest, PriceType, StripeClient};
//!
//! let client = StripeClient::from_env()?;
//!
//! let session = client.create_checkout_session(CheckoutRequest {
//!     price_type: PriceType::Monthly,
//!     customer_email: Some("user@example.com".into()),
//!     user_id: Some("user-1".into()),
//!     success_url: "https://memento.example/?success=true".into(),
//!     cancel_url: "https://memento.example/?canceled=true".into(),
//! }).await?;
//!
//! // Redirect user to: session.url
//! ```

mod checkout;
mod profile;
mod webhook;
mod error;

pub use checkout::{CheckoutRequest, CheckoutSession, PriceConfig, SessionMode, StripeClient};
pub use error::{BillingError, Result};
pub use profile::{access_state, AccessState, MemoryProfileStore, PriceType, Profile, ProfileStore};
pub use webhook::{WebhookEvent, WebhookHandler};
