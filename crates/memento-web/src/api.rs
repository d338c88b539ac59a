//! API Client
//!
//! One place talks to the backend. Payment status in particular has exactly
//! one query here; every widget reads the signal fed by it.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

const TOKEN_KEY: &str = "memento_token";

// ============================================================================
// Token storage
// ============================================================================

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn stored_token() -> Option<String> {
    storage()?.get_item(TOKEN_KEY).ok()?
}

pub fn store_token(token: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

pub fn clear_token() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: AuthUser,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PaymentStatus {
    pub is_paid: bool,
    pub payment_type: Option<String>,
    pub payment_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub user_message: String,
    pub ai_response: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtueRatings {
    pub courage: u8,
    pub wisdom: u8,
    pub justice: u8,
    pub temperance: u8,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VirtueEntry {
    pub date: String,
    pub ratings: VirtueRatings,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LifeGrid {
    pub age: u32,
    pub years_remaining: u32,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Profile {
    pub is_paid: bool,
    pub birth_year: Option<i32>,
}

// ============================================================================
// Request plumbing
// ============================================================================

enum Method {
    Get,
    Post,
    Put,
}

async fn request(
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<reqwest::Response, String> {
    let client = reqwest::Client::new();

    let mut builder = match method {
        Method::Get => client.get(path),
        Method::Post => client.post(path),
        Method::Put => client.put(path),
    };

    if let Some(token) = stored_token() {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    if let Some(body) = body {
        builder = builder.json(&body);
    }

    builder.send().await.map_err(|e| e.to_string())
}

async fn expect<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        Err(data["error"].as_str().unwrap_or("Request failed").to_string())
    }
}

// ============================================================================
// Auth
// ============================================================================

async fn credentials(path: &str, email: &str, password: &str) -> Result<AuthUser, String> {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = request(Method::Post, path, Some(body)).await?;
    let auth: AuthResponse = expect(response).await?;
    store_token(&auth.token);
    Ok(auth.user)
}

pub async fn signup(email: &str, password: &str) -> Result<AuthUser, String> {
    credentials("/api/auth/signup", email, password).await
}

pub async fn login(email: &str, password: &str) -> Result<AuthUser, String> {
    credentials("/api/auth/login", email, password).await
}

pub fn logout() {
    clear_token();
}

pub async fn me() -> Option<AuthUser> {
    stored_token()?;
    let response = request(Method::Get, "/api/auth/me", None).await.ok()?;
    expect(response).await.ok()
}

// ============================================================================
// Payments
// ============================================================================

/// The single payment-status query
pub async fn payment_status() -> Result<PaymentStatus, String> {
    let response = request(Method::Get, "/api/payment-status", None).await?;
    expect(response).await
}

/// Create a Stripe checkout session; returns the redirect URL
pub async fn create_checkout(price_type: &str) -> Result<String, String> {
    let body = serde_json::json!({ "priceType": price_type });
    let response = request(Method::Post, "/api/checkout", Some(body)).await?;
    let data: serde_json::Value = expect(response).await?;
    data["url"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| "No checkout URL returned".to_string())
}

// ============================================================================
// Marcus
// ============================================================================

pub async fn send_chat(message: &str) -> Result<String, String> {
    let body = serde_json::json!({ "message": message });
    let response = request(Method::Post, "/api/chat", Some(body)).await?;
    let data: serde_json::Value = expect(response).await?;
    Ok(data["reply"].as_str().unwrap_or("No response").to_string())
}

pub async fn chat_history(limit: usize) -> Result<Vec<Exchange>, String> {
    let response = request(Method::Get, &format!("/api/chat/history?limit={limit}"), None).await?;
    expect(response).await
}

// ============================================================================
// Practice
// ============================================================================

pub async fn journal_entries(limit: usize) -> Result<Vec<JournalEntry>, String> {
    let response = request(Method::Get, &format!("/api/journal?limit={limit}"), None).await?;
    expect(response).await
}

pub async fn add_journal_entry(content: &str) -> Result<JournalEntry, String> {
    let body = serde_json::json!({ "content": content });
    let response = request(Method::Post, "/api/journal", Some(body)).await?;
    expect(response).await
}

pub async fn virtue_entries(limit: usize) -> Result<Vec<VirtueEntry>, String> {
    let response = request(Method::Get, &format!("/api/virtues?limit={limit}"), None).await?;
    expect(response).await
}

pub async fn submit_virtues(ratings: VirtueRatings) -> Result<VirtueEntry, String> {
    let body = serde_json::to_value(ratings).map_err(|e| e.to_string())?;
    let response = request(Method::Post, "/api/virtues", Some(body)).await?;
    expect(response).await
}

/// The life grid; `Ok(None)` means no birth year is set yet
pub async fn life_grid() -> Result<Option<LifeGrid>, String> {
    let response = request(Method::Get, "/api/memento-mori", None).await?;
    if response.status().as_u16() == 404 {
        return Ok(None);
    }
    expect(response).await.map(Some)
}

pub async fn set_birth_year(birth_year: i32) -> Result<Profile, String> {
    let body = serde_json::json!({ "birth_year": birth_year });
    let response = request(Method::Put, "/api/profile", Some(body)).await?;
    expect(response).await
}

pub async fn fetch_quote() -> Result<Quote, String> {
    let response = request(Method::Get, "/api/quote", None).await?;
    expect(response).await
}
