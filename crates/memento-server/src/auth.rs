//! Authentication
//!
//! Email/password signup and login with bcrypt-hashed credentials and HS256
//! bearer tokens. Handlers that need an identity call [`authenticate`] on
//! the request headers.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::{extract::State, http::{HeaderMap, StatusCode}, Json};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Bcrypt work factor
const BCRYPT_COST: u32 = 12;

/// Token lifetime
const TOKEN_HOURS: i64 = 24;

/// A registered user
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory user store (for development)
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    by_email: RwLock<HashMap<String, String>>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new user; `None` if the email is taken
    pub fn create(&self, email: &str, password_hash: &str) -> Option<User> {
        let email = email.to_lowercase();
        let mut by_email = self.by_email.write().ok()?;
        if by_email.contains_key(&email) {
            return None;
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        by_email.insert(email, user.id.clone());
        self.users.write().ok()?.insert(user.id.clone(), user.clone());
        Some(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let by_email = self.by_email.read().ok()?;
        let id = by_email.get(&email.to_lowercase())?;
        self.users.read().ok()?.get(id).cloned()
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users.read().ok()?.get(id).cloned()
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// JWT signing and verification keys
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Read `JWT_SECRET`, falling back to a development secret
    pub fn from_env() -> Self {
        match std::env::var("JWT_SECRET") {
            Ok(secret) => Self::new(secret.as_bytes()),
            Err(_) => {
                tracing::warn!("JWT_SECRET not set - using insecure development secret");
                Self::new(b"memento-dev-secret")
            }
        }
    }

    /// Issue a bearer token for a user
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: (Utc::now() + Duration::hours(TOKEN_HOURS)).timestamp() as usize,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a bearer token
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
    }
}

/// The authenticated identity handlers work with
#[derive(Clone, Debug, Serialize)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

/// Resolve the `Authorization: Bearer` header to an identity
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthedUser> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;

    token_user(state, token)
}

/// Resolve a raw bearer token to an identity (used by the WebSocket path)
pub fn token_user(state: &AppState, token: &str) -> Option<AuthedUser> {
    let claims = state.auth.verify(token).ok()?;
    // The store is authoritative; a token for a deleted user is invalid
    let user = state.users.get(&claims.sub)?;
    Some(AuthedUser {
        id: user.id,
        email: user.email,
    })
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthedUser,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ErrorResponse::bad_request("Invalid email address", "INVALID_EMAIL"));
    }
    if payload.password.len() < 8 {
        return Err(ErrorResponse::bad_request(
            "Password must be at least 8 characters",
            "WEAK_PASSWORD",
        ));
    }

    let hash = bcrypt::hash(&payload.password, BCRYPT_COST).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ErrorResponse::internal("Could not create account", "HASH_ERROR")
    })?;

    let Some(user) = state.users.create(&email, &hash) else {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Email already registered".into(),
                code: "EMAIL_TAKEN".into(),
            }),
        ));
    };

    tracing::info!(user_id = %user.id, email = %user.email, "User registered");

    let token = state.auth.issue(&user).map_err(|e| {
        tracing::error!("Token creation failed: {}", e);
        ErrorResponse::internal("Could not create session", "TOKEN_ERROR")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: AuthedUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid credentials".into(),
                code: "INVALID_CREDENTIALS".into(),
            }),
        )
    };

    let Some(user) = state.users.find_by_email(&payload.email) else {
        return Err(invalid());
    };

    match bcrypt::verify(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(invalid()),
        Err(e) => {
            tracing::error!("Password verification failed: {}", e);
            return Err(ErrorResponse::internal("Could not verify credentials", "VERIFY_ERROR"));
        }
    }

    let token = state.auth.issue(&user).map_err(|e| {
        tracing::error!("Token creation failed: {}", e);
        ErrorResponse::internal("Could not create session", "TOKEN_ERROR")
    })?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: AuthedUser {
            id: user.id,
            email: user.email,
        },
    }))
}

/// Who am I
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthedUser>, (StatusCode, Json<ErrorResponse>)> {
    authenticate(&state, &headers)
        .map(Json)
        .ok_or_else(ErrorResponse::unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_store_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        assert!(store.create("seneca@example.com", "hash").is_some());
        assert!(store.create("SENECA@example.com", "hash").is_none());
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = AuthKeys::new(b"test-secret");
        let store = MemoryUserStore::new();
        let user = store.create("marcus@example.com", "hash").unwrap();

        let token = keys.issue(&user).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "marcus@example.com");
    }

    #[test]
    fn test_verify_rejects_foreign_token() {
        let keys = AuthKeys::new(b"test-secret");
        let other = AuthKeys::new(b"other-secret");
        let store = MemoryUserStore::new();
        let user = store.create("marcus@example.com", "hash").unwrap();

        let token = other.issue(&user).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
