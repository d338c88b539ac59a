//! Memento HTTP Server
//!
//! Axum-based server providing the REST API and WebSocket endpoints behind
//! the Memento web client: the Marcus chat persona, Stoic practice features,
//! and the Stripe checkout/webhook pair that drives the paywall.

mod auth;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memento_billing::{MemoryProfileStore, StripeClient};
use memento_core::{LlmProvider, MemoryChatHistory};
use memento_practice::MemoryPracticeStore;
use memento_runtime::OllamaProvider;

use crate::auth::{AuthKeys, MemoryUserStore};
use crate::handlers::{
    chat_handler, chat_history, chat_stream_handler, create_checkout, create_journal_entry,
    create_virtue_entry, get_profile, health_check, list_journal, list_models, list_virtues,
    memento_mori, payment_status, quote_of_the_day, stripe_webhook, update_profile,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_env());

    // Verify Ollama connection
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - Marcus will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Initialize payments
    let stripe = StripeClient::from_env().ok();

    if stripe.is_some() {
        tracing::info!("✓ Stripe configured");
    } else {
        tracing::warn!("⚠ Stripe not configured - payments disabled");
        tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
    }

    // Build application state
    let state = AppState {
        provider,
        users: Arc::new(MemoryUserStore::new()),
        auth: Arc::new(AuthKeys::from_env()),
        profiles: Arc::new(MemoryProfileStore::new()),
        practice: Arc::new(MemoryPracticeStore::new()),
        history: Arc::new(MemoryChatHistory::new()),
        stripe: stripe.map(Arc::new),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Marcus
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        .route("/api/chat/history", get(chat_history))
        // Practice
        .route("/api/virtues", get(list_virtues).post(create_virtue_entry))
        .route("/api/journal", get(list_journal).post(create_journal_entry))
        .route("/api/memento-mori", get(memento_mori))
        .route("/api/quote", get(quote_of_the_day))
        // Profile & payments
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/payment-status", get(payment_status))
        .route("/api/checkout", post(create_checkout))
        .route("/webhook/stripe", post(stripe_webhook))
        // Static files (WASM frontend)
        .nest_service("/", tower_http::services::ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🏛  memento server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/auth/signup     - Create an account");
    tracing::info!("  POST /api/auth/login      - Log in");
    tracing::info!("  POST /api/chat            - Ask Marcus");
    tracing::info!("  GET  /api/chat/stream     - WebSocket streaming");
    tracing::info!("  GET  /api/virtues         - Virtue tracker");
    tracing::info!("  GET  /api/journal         - Journal");
    tracing::info!("  GET  /api/memento-mori    - Life grid");
    tracing::info!("  POST /api/checkout        - Create Stripe checkout");
    tracing::info!("  POST /webhook/stripe      - Stripe webhook");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
