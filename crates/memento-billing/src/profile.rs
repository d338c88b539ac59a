//! Profile Payment State
//!
//! One profile row per user, holding the payment flags the webhook handler
//! reconciles and the `birth_year` the life-grid widget reads. Rows are
//! created lazily on first checkout attempt or first read, updated with
//! absolute target state, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{BillingError, Result};

/// Purchasable price types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Recurring monthly subscription
    Monthly,
    /// One-time lifetime purchase
    Lifetime,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Monthly => "monthly",
            PriceType::Lifetime => "lifetime",
        }
    }

    /// Parse a client-supplied price type
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(PriceType::Monthly),
            "lifetime" => Some(PriceType::Lifetime),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's profile record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    /// Owning key, set once at first write
    pub user_id: String,

    /// Whether the paywall is open for this user
    pub is_paid: bool,

    /// Plan behind the current grant (None until first successful checkout)
    pub payment_type: Option<PriceType>,

    /// When the current grant was made
    pub payment_date: Option<DateTime<Utc>>,

    /// Stripe customer this profile is matched to by the webhook handler
    pub stripe_customer_id: Option<String>,

    /// Last checkout session, kept for traceability only
    pub stripe_session_id: Option<String>,

    /// Birth year for the memento-mori grid
    pub birth_year: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create an empty (unpaid) profile
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            is_paid: false,
            payment_type: None,
            payment_date: None,
            stripe_customer_id: None,
            stripe_session_id: None,
            birth_year: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a successful checkout: absolute target state, safe to replay
    pub fn grant(
        &mut self,
        price_type: PriceType,
        customer_id: Option<&str>,
        session_id: Option<&str>,
    ) {
        self.is_paid = true;
        self.payment_type = Some(price_type);
        self.payment_date = Some(Utc::now());
        if let Some(customer) = customer_id {
            self.stripe_customer_id = Some(customer.to_string());
        }
        if let Some(session) = session_id {
            self.stripe_session_id = Some(session.to_string());
        }
        self.touch();
    }

    /// Apply a cancellation or payment failure.
    ///
    /// Only a monthly grant is revocable; a lifetime grant is never cleared.
    /// Returns whether the profile changed.
    pub fn revoke(&mut self) -> bool {
        if self.payment_type == Some(PriceType::Monthly) && self.is_paid {
            self.is_paid = false;
            self.touch();
            return true;
        }
        false
    }

    /// Remember the Stripe customer/session from a checkout attempt so the
    /// webhook can match this profile later
    pub fn record_checkout(&mut self, customer_id: Option<&str>, session_id: &str) {
        if let Some(customer) = customer_id {
            self.stripe_customer_id = Some(customer.to_string());
        }
        self.stripe_session_id = Some(session_id.to_string());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The three UI states the client gates between
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    /// Anonymous landing page
    Landing,
    /// Authenticated but unpaid: show the paywall
    Paywall,
    /// Authenticated and paid: full dashboard
    Dashboard,
}

/// Pure gating function of the two observed booleans.
///
/// A UX convenience, not a security boundary.
pub fn access_state(authenticated: bool, paid: bool) -> AccessState {
    match (authenticated, paid) {
        (false, _) => AccessState::Landing,
        (true, false) => AccessState::Paywall,
        (true, true) => AccessState::Dashboard,
    }
}

/// Profile storage trait
pub trait ProfileStore: Send + Sync {
    /// Save or update a profile
    fn upsert(&self, profile: &Profile) -> Result<()>;

    /// Get profile by user id
    fn get(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Get profile by user id, creating the row lazily if absent
    fn get_or_create(&self, user_id: &str) -> Result<Profile> {
        if let Some(profile) = self.get(user_id)? {
            return Ok(profile);
        }
        let profile = Profile::new(user_id);
        self.upsert(&profile)?;
        Ok(profile)
    }

    /// Find the profile matched to a Stripe customer
    fn find_by_customer(&self, customer_id: &str) -> Result<Option<Profile>>;
}

/// In-memory profile store (for development)
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
    by_customer: RwLock<HashMap<String, String>>,
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            by_customer: RwLock::new(HashMap::new()),
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn upsert(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| BillingError::Storage("profile lock poisoned".into()))?;
        let mut by_customer = self
            .by_customer
            .write()
            .map_err(|_| BillingError::Storage("customer index lock poisoned".into()))?;

        if let Some(customer) = &profile.stripe_customer_id {
            by_customer.insert(customer.clone(), profile.user_id.clone());
        }
        profiles.insert(profile.user_id.clone(), profile.clone());

        Ok(())
    }

    fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| BillingError::Storage("profile lock poisoned".into()))?;
        Ok(profiles.get(user_id).cloned())
    }

    fn find_by_customer(&self, customer_id: &str) -> Result<Option<Profile>> {
        let by_customer = self
            .by_customer
            .read()
            .map_err(|_| BillingError::Storage("customer index lock poisoned".into()))?;
        let profiles = self
            .profiles
            .read()
            .map_err(|_| BillingError::Storage("profile lock poisoned".into()))?;

        if let Some(user_id) = by_customer.get(customer_id) {
            Ok(profiles.get(user_id).cloned())
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_type_parse() {
        assert_eq!(PriceType::parse("monthly"), Some(PriceType::Monthly));
        assert_eq!(PriceType::parse("LIFETIME"), Some(PriceType::Lifetime));
        assert_eq!(PriceType::parse("weekly"), None);
    }

    #[test]
    fn test_gating_table() {
        assert_eq!(access_state(false, false), AccessState::Landing);
        assert_eq!(access_state(false, true), AccessState::Landing);
        assert_eq!(access_state(true, false), AccessState::Paywall);
        assert_eq!(access_state(true, true), AccessState::Dashboard);
    }

    #[test]
    fn test_revoke_clears_monthly() {
        let mut profile = Profile::new("user-1");
        profile.grant(PriceType::Monthly, Some("cus_1"), Some("cs_1"));
        assert!(profile.is_paid);

        assert!(profile.revoke());
        assert!(!profile.is_paid);
        // The plan record survives for traceability
        assert_eq!(profile.payment_type, Some(PriceType::Monthly));
    }

    #[test]
    fn test_revoke_never_clears_lifetime() {
        let mut profile = Profile::new("user-1");
        profile.grant(PriceType::Lifetime, Some("cus_1"), Some("cs_1"));

        assert!(!profile.revoke());
        assert!(profile.is_paid);
        assert_eq!(profile.payment_type, Some(PriceType::Lifetime));
    }

    #[test]
    fn test_grant_is_replay_safe() {
        let mut profile = Profile::new("user-1");
        profile.grant(PriceType::Monthly, Some("cus_1"), Some("cs_1"));
        profile.grant(PriceType::Monthly, Some("cus_1"), Some("cs_1"));

        assert!(profile.is_paid);
        assert_eq!(profile.payment_type, Some(PriceType::Monthly));
        assert_eq!(profile.stripe_customer_id.as_deref(), Some("cus_1"));
    }

    #[test]
    fn test_store_customer_index() {
        let store = MemoryProfileStore::new();
        let mut profile = Profile::new("user-1");
        profile.record_checkout(Some("cus_42"), "cs_live_1");
        store.upsert(&profile).unwrap();

        let found = store.find_by_customer("cus_42").unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
        assert!(store.find_by_customer("cus_unknown").unwrap().is_none());
    }

    #[test]
    fn test_get_or_create_is_lazy_upsert() {
        let store = MemoryProfileStore::new();
        assert!(store.get("user-1").unwrap().is_none());

        let created = store.get_or_create("user-1").unwrap();
        assert!(!created.is_paid);

        // Second call returns the same row rather than resetting it
        let mut paid = created.clone();
        paid.grant(PriceType::Lifetime, Some("cus_1"), None);
        store.upsert(&paid).unwrap();

        let again = store.get_or_create("user-1").unwrap();
        assert!(again.is_paid);
    }
}
