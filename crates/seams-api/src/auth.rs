use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Extension, Json, extract::State};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;
use tracing::{debug, error, info};

use seams_db::Database;
use seams_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::{blocking, commit, empty};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::AuthUser;

const MIN_PASSWORD_LEN: usize = 6;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn create_token(secret: &str, claims: &Claims) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Decode and verify a token's signature. Tokens carry no expiry; liveness is
/// checked against the store separately.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::invalid_token())
}

fn issue(secret: &str, claims: &Claims) -> Result<Json<AuthResponse>, ApiError> {
    let token = create_token(secret, claims).map_err(|e| {
        error!("Token encoding failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(AuthResponse {
        token,
        auth_user_id: claims.user_id,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(
            "Invalid password, must be at least 6 characters".to_string(),
        ));
    }

    let db = state.clone();
    let claims = blocking(move || {
        let password_hash = hash_password(&req.password)?;
        db.db
            .write(|s| s.register(&req.email, &password_hash, &req.name_first, &req.name_last))
            .map_err(ApiError::from)
    })
    .await?;

    info!("New account {} registered", claims.user_id);
    issue(&state.jwt_secret, &claims)
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let db = state.clone();
    let claims = blocking(move || {
        // Verify outside the store lock; only the session write takes it.
        let (user_id, password_hash) = db.db.read(|s| s.credentials(&req.email))?;
        if !verify_password(&req.password, &password_hash) {
            debug!("Password mismatch for user {}", user_id);
            return Err(ApiError::InvalidInput("Incorrect password".to_string()));
        }
        db.db.write(|s| s.login(user_id)).map_err(ApiError::from)
    })
    .await?;

    issue(&state.jwt_secret, &claims)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.logout(&auth.claims)).await?;
    Ok(empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_without_expiry() {
        let claims = Claims {
            user_id: 3,
            session: "2026-01-01T00:00:00.000000000Z#1".to_string(),
            total_sessions: 1,
        };

        let token = create_token("secret", &claims).unwrap();
        assert_eq!(decode_token("secret", &token).unwrap(), claims);
        assert!(matches!(
            decode_token("other-secret", &token),
            Err(ApiError::AccessDenied(_))
        ));
        assert!(decode_token("secret", "not.a.token").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }
}
