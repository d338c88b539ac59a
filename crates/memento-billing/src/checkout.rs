//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: the server creates a
//! session and redirects the user to Stripe's hosted payment page.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionLineItemsPriceDataRecurring,
    CreateCheckoutSessionLineItemsPriceDataRecurringInterval, Currency, Customer, CustomerId,
    ListCustomers,
};

use crate::error::{BillingError, Result};
use crate::profile::PriceType;

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| BillingError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| BillingError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Reuse the Stripe customer already attached to this email, if any
    async fn find_customer(&self, email: &str) -> Result<Option<CustomerId>> {
        let mut list = ListCustomers::new();
        list.email = Some(email);
        list.limit = Some(1);

        let customers = Customer::list(&self.client, &list)
            .await
            .map_err(|e| BillingError::Stripe(e.to_string()))?;

        Ok(customers.data.into_iter().next().map(|c| c.id))
    }

    /// Create a Stripe Checkout session.
    ///
    /// Returns a URL to redirect the user to Stripe's hosted checkout page.
    pub async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession> {
        let config = request.price_type.config();

        tracing::info!(
            price_type = %request.price_type,
            mode = ?config.mode,
            "Creating checkout session"
        );

        let existing = match &request.customer_email {
            Some(email) => self.find_customer(email).await?,
            None => None,
        };
        if let Some(customer) = &existing {
            tracing::info!(customer_id = %customer, "Existing customer found");
        }

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(config.mode.to_stripe());

        match (&existing, &request.customer_email) {
            (Some(customer), _) => params.customer = Some(customer.clone()),
            (None, Some(email)) => params.customer_email = Some(email),
            (None, None) => {}
        }

        // Metadata for webhook matching
        let mut metadata = HashMap::new();
        metadata.insert("plan".to_string(), request.price_type.as_str().to_string());
        if let Some(ref user_id) = request.user_id {
            metadata.insert("user_id".to_string(), user_id.clone());
        }
        params.metadata = Some(metadata);

        // Line items
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::GBP,
                unit_amount: Some(config.amount_pence),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: config.name.to_string(),
                    description: Some(config.description.to_string()),
                    ..Default::default()
                }),
                recurring: match config.mode {
                    SessionMode::Subscription => {
                        Some(CreateCheckoutSessionLineItemsPriceDataRecurring {
                            interval: CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Month,
                            interval_count: Some(1),
                        })
                    }
                    SessionMode::Payment => None,
                },
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| BillingError::Stripe(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| BillingError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(session_id = %session.id, "Checkout session created");

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
            price_type: request.price_type,
            customer_id: session.customer.as_ref().map(|c| c.id().to_string()),
        })
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Price type to purchase
    pub price_type: PriceType,

    /// Authenticated customer email (attaches/reuses the Stripe customer)
    #[serde(default)]
    pub customer_email: Option<String>,

    /// User id carried in session metadata for webhook matching
    #[serde(default)]
    pub user_id: Option<String>,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session id
    pub id: String,

    /// URL to redirect user to
    pub url: String,

    /// Price type being purchased
    pub price_type: PriceType,

    /// Stripe customer, when one was attached at creation time
    pub customer_id: Option<String>,
}

/// Stripe session mode for a price type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Recurring billing
    Subscription,
    /// One-time payment
    Payment,
}

impl SessionMode {
    fn to_stripe(self) -> CheckoutSessionMode {
        match self {
            SessionMode::Subscription => CheckoutSessionMode::Subscription,
            SessionMode::Payment => CheckoutSessionMode::Payment,
        }
    }
}

/// Pricing configuration
#[derive(Clone, Debug)]
pub struct PriceConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub amount_pence: i64,
    pub mode: SessionMode,
}

impl PriceType {
    /// The explicit price/mode table.
    ///
    /// Monthly is a subscription; lifetime is a one-time payment. This is
    /// the single place the mapping lives.
    pub fn config(&self) -> PriceConfig {
        match self {
            PriceType::Monthly => PriceConfig {
                name: "Monthly Access",
                description: "Full access to Marcus, the journal and the trackers",
                amount_pence: 900, // £9.00/month
                mode: SessionMode::Subscription,
            },
            PriceType::Lifetime => PriceConfig {
                name: "Lifetime Access",
                description: "Everything in monthly, once, forever",
                amount_pence: 4900, // £49.00 one-time
                mode: SessionMode::Payment,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_table_modes() {
        assert_eq!(PriceType::Monthly.config().mode, SessionMode::Subscription);
        assert_eq!(PriceType::Lifetime.config().mode, SessionMode::Payment);
    }

    #[test]
    fn test_price_table_amounts() {
        assert_eq!(PriceType::Monthly.config().amount_pence, 900);
        assert_eq!(PriceType::Lifetime.config().amount_pence, 4900);
    }
}
