//! HTTP/WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use memento_billing::{
    access_state, AccessState, BillingError, CheckoutRequest, PriceType, ProfileStore,
    WebhookHandler,
};
use memento_core::{ChatHistoryStore, Exchange, LlmProvider, MentorBuilder};
use memento_practice::{
    daily_quote, JournalEntry, LifeGrid, PracticeStore, Quote, VirtueEntry, VirtueRatings,
    MARCUS_PROMPT,
};

use crate::auth::{authenticate, token_user, AuthedUser};
use crate::state::AppState;

/// Default number of exchanges replayed as chat context
const CHAT_CONTEXT_EXCHANGES: usize = 10;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_connected: bool,
    pub stripe_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    fn with_status(status: StatusCode, error: impl Into<String>, code: &str) -> HandlerError {
        (
            status,
            Json(ErrorResponse {
                error: error.into(),
                code: code.into(),
            }),
        )
    }

    pub fn bad_request(error: impl Into<String>, code: &str) -> HandlerError {
        Self::with_status(StatusCode::BAD_REQUEST, error, code)
    }

    pub fn internal(error: impl Into<String>, code: &str) -> HandlerError {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error, code)
    }

    pub fn unauthorized() -> HandlerError {
        Self::with_status(StatusCode::UNAUTHORIZED, "Authentication required", "UNAUTHORIZED")
    }

    pub fn not_found(error: impl Into<String>, code: &str) -> HandlerError {
        Self::with_status(StatusCode::NOT_FOUND, error, code)
    }

    pub fn payments_disabled() -> HandlerError {
        Self::with_status(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    }
}

fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<AuthedUser, HandlerError> {
    authenticate(state, headers).ok_or_else(ErrorResponse::unauthorized)
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

// ============================================================================
// Health & Models
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ollama_connected,
        stripe_configured: state.stripe.is_some(),
    })
}

/// List available models
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<memento_core::provider::ModelInfo>>, HandlerError> {
    state.provider.list_models().await.map(Json).map_err(|e| {
        tracing::warn!("Model listing failed: {}", e);
        ErrorResponse::internal(e.user_message(), "PROVIDER_ERROR")
    })
}

// ============================================================================
// Marcus Chat
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub exchange_id: String,
    pub model: String,
}

fn build_mentor(state: &AppState, model: Option<String>) -> Result<memento_core::Mentor, HandlerError> {
    let mut builder = MentorBuilder::new()
        .provider(state.provider.clone())
        .system_prompt(MARCUS_PROMPT)
        .max_context_exchanges(CHAT_CONTEXT_EXCHANGES);

    if let Some(model) = model {
        builder = builder.model(model);
    }

    builder.build().map_err(|e| {
        tracing::error!("Mentor construction failed: {}", e);
        ErrorResponse::internal(e.user_message(), "MENTOR_ERROR")
    })
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HandlerError> {
    let user = require_auth(&state, &headers)?;

    if payload.message.trim().is_empty() {
        return Err(ErrorResponse::bad_request("Message is empty", "EMPTY_MESSAGE"));
    }

    let recent = state
        .history
        .recent(&user.id, CHAT_CONTEXT_EXCHANGES)
        .map_err(|e| {
            tracing::error!("History load failed: {}", e);
            ErrorResponse::internal(e.user_message(), "HISTORY_ERROR")
        })?;

    let mentor = build_mentor(&state, payload.model)?;
    let model = mentor.config().generation.model.clone();

    let reply = mentor.reply(&recent, &payload.message).await.map_err(|e| {
        tracing::error!("Mentor error: {}", e);
        ErrorResponse::internal(e.user_message(), "MENTOR_ERROR")
    })?;

    let exchange = Exchange::new(&user.id, &payload.message, &reply);
    if let Err(e) = state.history.append(&exchange) {
        // The reply was produced; losing the record is logged, not fatal
        tracing::warn!(user_id = %user.id, "Failed to persist exchange: {}", e);
    }

    Ok(Json(ChatResponse {
        reply,
        exchange_id: exchange.id.to_string(),
        model,
    }))
}

/// Recent chat exchanges, newest first
pub async fn chat_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Exchange>>, HandlerError> {
    let user = require_auth(&state, &headers)?;
    let limit = params.limit.unwrap_or(memento_core::history::DEFAULT_HISTORY_LIMIT);

    state.history.recent(&user.id, limit).map(Json).map_err(|e| {
        tracing::error!("History load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "HISTORY_ERROR")
    })
}

#[derive(Debug, Deserialize)]
struct ChatStreamRequest {
    token: String,
    message: String,
    #[serde(default)]
    model: Option<String>,
}

/// WebSocket streaming chat
pub async fn chat_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        // Parse request
        let request: ChatStreamRequest = match serde_json::from_str(&msg) {
            Ok(r) => r,
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string()});
                let _ = sender.send(Message::Text(error.to_string().into())).await;
                continue;
            }
        };

        // The browser WebSocket API cannot set headers; the token rides in
        // the message instead
        let Some(user) = token_user(&state, &request.token) else {
            let error = serde_json::json!({"type": "error", "error": "Authentication required"});
            let _ = sender.send(Message::Text(error.to_string().into())).await;
            continue;
        };

        let recent = state
            .history
            .recent(&user.id, CHAT_CONTEXT_EXCHANGES)
            .unwrap_or_default();

        let mentor = match build_mentor(&state, request.model) {
            Ok(mentor) => mentor,
            Err((_, Json(body))) => {
                let error = serde_json::json!({"type": "error", "error": body.error});
                let _ = sender.send(Message::Text(error.to_string().into())).await;
                continue;
            }
        };

        // Stream response, accumulating the full reply for the history
        match mentor.reply_stream(&recent, &request.message).await {
            Ok(mut stream) => {
                let mut full_reply = String::new();

                while let Some(result) = stream.next().await {
                    match result {
                        Ok(chunk) => {
                            full_reply.push_str(&chunk.delta);
                            let response = serde_json::json!({
                                "type": "chunk",
                                "content": chunk.delta,
                                "done": chunk.done,
                            });
                            if sender.send(Message::Text(response.to_string().into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            let error = serde_json::json!({"type": "error", "error": e.to_string()});
                            let _ = sender.send(Message::Text(error.to_string().into())).await;
                            break;
                        }
                    }
                }

                if !full_reply.is_empty() {
                    let exchange = Exchange::new(&user.id, &request.message, &full_reply);
                    if let Err(e) = state.history.append(&exchange) {
                        tracing::warn!(user_id = %user.id, "Failed to persist exchange: {}", e);
                    }
                }
            }
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string()});
                let _ = sender.send(Message::Text(error.to_string().into())).await;
            }
        }
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    #[serde(rename = "priceType")]
    pub price_type: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Create a Stripe checkout session
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, HandlerError> {
    let user = require_auth(&state, &headers)?;
    let stripe = state.stripe.as_ref().ok_or_else(ErrorResponse::payments_disabled)?;

    let Some(price_type) = PriceType::parse(&payload.price_type) else {
        return Err(ErrorResponse::bad_request(
            format!("Invalid price type: {}", payload.price_type),
            "INVALID_PRICE_TYPE",
        ));
    };

    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http://localhost:3000");

    tracing::info!(user_id = %user.id, price_type = %price_type, "Checkout requested");

    let request = CheckoutRequest {
        price_type,
        customer_email: Some(user.email.clone()),
        user_id: Some(user.id.clone()),
        success_url: format!("{origin}/?success=true"),
        cancel_url: format!("{origin}/?canceled=true"),
    };

    let session = stripe.create_checkout_session(request).await.map_err(|e| {
        tracing::error!("Checkout error: {}", e);
        ErrorResponse::internal(e.user_message(), "CHECKOUT_ERROR")
    })?;

    // Remember the customer/session so the webhook can match this profile
    let mut profile = state.profiles.get_or_create(&user.id).map_err(|e| {
        tracing::error!("Profile load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;
    profile.record_checkout(session.customer_id.as_deref(), &session.id);
    state.profiles.upsert(&profile).map_err(|e| {
        tracing::error!("Profile save failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
    }))
}

/// Stripe webhook endpoint
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let stripe = state.stripe.as_ref().ok_or_else(ErrorResponse::payments_disabled)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ErrorResponse::bad_request("Missing Stripe signature", "MISSING_SIGNATURE")
        })?;

    let handler = WebhookHandler::new(state.profiles.clone());

    let event = handler
        .verify_and_parse(&body, signature, stripe.webhook_secret())
        .map_err(|e| {
            tracing::warn!("Webhook rejected: {}", e);
            match e {
                BillingError::WebhookSignature(_) => {
                    ErrorResponse::bad_request("Invalid signature", "INVALID_SIGNATURE")
                }
                _ => ErrorResponse::bad_request("Malformed webhook payload", "WEBHOOK_PARSE_ERROR"),
            }
        })?;

    handler.handle(&event).await.map_err(|e| {
        tracing::error!("Webhook processing error: {}", e);
        ErrorResponse::internal("Webhook processing failed", "WEBHOOK_ERROR")
    })?;

    Ok(Json(serde_json::json!({ "received": true })))
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub is_paid: bool,
    pub payment_type: Option<PriceType>,
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    /// Gating state for this (authenticated) caller
    pub access: AccessState,
}

/// The single payment-status query the client polls
pub async fn payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PaymentStatusResponse>, HandlerError> {
    let user = require_auth(&state, &headers)?;

    let profile = state.profiles.get_or_create(&user.id).map_err(|e| {
        tracing::error!("Profile load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;

    Ok(Json(PaymentStatusResponse {
        is_paid: profile.is_paid,
        payment_type: profile.payment_type,
        payment_date: profile.payment_date,
        access: access_state(true, profile.is_paid),
    }))
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub is_paid: bool,
    pub payment_type: Option<PriceType>,
    pub birth_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub birth_year: i32,
}

/// Fetch the profile, creating the row lazily on first read
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let user = require_auth(&state, &headers)?;

    let profile = state.profiles.get_or_create(&user.id).map_err(|e| {
        tracing::error!("Profile load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        is_paid: profile.is_paid,
        payment_type: profile.payment_type,
        birth_year: profile.birth_year,
    }))
}

/// Set the birth year behind the memento-mori grid
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileBody>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let user = require_auth(&state, &headers)?;

    // Validate through the grid calculation before persisting
    LifeGrid::from_birth_year(payload.birth_year).map_err(|e| {
        ErrorResponse::bad_request(e.to_string(), "INVALID_BIRTH_YEAR")
    })?;

    let mut profile = state.profiles.get_or_create(&user.id).map_err(|e| {
        tracing::error!("Profile load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;
    profile.birth_year = Some(payload.birth_year);
    state.profiles.upsert(&profile).map_err(|e| {
        tracing::error!("Profile save failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;

    tracing::info!(user_id = %user.id, birth_year = payload.birth_year, "Birth year updated");

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        is_paid: profile.is_paid,
        payment_type: profile.payment_type,
        birth_year: profile.birth_year,
    }))
}

// ============================================================================
// Practice
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VirtueBody {
    pub courage: u8,
    pub wisdom: u8,
    pub justice: u8,
    pub temperance: u8,
}

/// Recent virtue entries, newest first
pub async fn list_virtues(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<VirtueEntry>>, HandlerError> {
    let user = require_auth(&state, &headers)?;
    let limit = params.limit.unwrap_or(7);

    state
        .practice
        .virtue_entries(&user.id, limit)
        .map(Json)
        .map_err(|e| {
            tracing::error!("Virtue listing failed: {}", e);
            ErrorResponse::internal("Could not load virtue entries", "STORAGE_ERROR")
        })
}

/// Submit today's virtue ratings
pub async fn create_virtue_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VirtueBody>,
) -> Result<(StatusCode, Json<VirtueEntry>), HandlerError> {
    let user = require_auth(&state, &headers)?;

    let ratings = VirtueRatings::new(
        payload.courage,
        payload.wisdom,
        payload.justice,
        payload.temperance,
    );

    let entry = VirtueEntry::today(&user.id, ratings)
        .map_err(|e| ErrorResponse::bad_request(e.to_string(), "INVALID_RATINGS"))?;

    state.practice.add_virtue_entry(&entry).map_err(|e| {
        tracing::error!("Virtue save failed: {}", e);
        ErrorResponse::internal("Could not save virtue entry", "STORAGE_ERROR")
    })?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
pub struct JournalBody {
    pub content: String,
}

/// Recent journal entries, newest first
pub async fn list_journal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<JournalEntry>>, HandlerError> {
    let user = require_auth(&state, &headers)?;
    let limit = params.limit.unwrap_or(5);

    state
        .practice
        .journal_entries(&user.id, limit)
        .map(Json)
        .map_err(|e| {
            tracing::error!("Journal listing failed: {}", e);
            ErrorResponse::internal("Could not load journal entries", "STORAGE_ERROR")
        })
}

/// Create a journal entry
pub async fn create_journal_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JournalBody>,
) -> Result<(StatusCode, Json<JournalEntry>), HandlerError> {
    let user = require_auth(&state, &headers)?;

    let entry = JournalEntry::new(&user.id, payload.content)
        .map_err(|e| ErrorResponse::bad_request(e.to_string(), "INVALID_ENTRY"))?;

    state.practice.add_journal_entry(&entry).map_err(|e| {
        tracing::error!("Journal save failed: {}", e);
        ErrorResponse::internal("Could not save journal entry", "STORAGE_ERROR")
    })?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// The memento-mori life grid for the authenticated user
pub async fn memento_mori(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LifeGrid>, HandlerError> {
    let user = require_auth(&state, &headers)?;

    let profile = state.profiles.get_or_create(&user.id).map_err(|e| {
        tracing::error!("Profile load failed: {}", e);
        ErrorResponse::internal(e.user_message(), "STORAGE_ERROR")
    })?;

    let Some(birth_year) = profile.birth_year else {
        return Err(ErrorResponse::not_found(
            "Set your birth year first",
            "BIRTH_YEAR_MISSING",
        ));
    };

    LifeGrid::from_birth_year(birth_year)
        .map(Json)
        .map_err(|e| ErrorResponse::bad_request(e.to_string(), "INVALID_BIRTH_YEAR"))
}

/// Today's Stoic quote
pub async fn quote_of_the_day() -> Json<Quote> {
    Json(*daily_quote())
}
