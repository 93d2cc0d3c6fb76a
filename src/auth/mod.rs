//! Password hashing and session-token authentication.
//!
//! Passwords are hashed with PBKDF2-HMAC-SHA256 (100,000 iterations, 16-byte
//! random salt) and stored as base64(salt || hash). Hash comparison is
//! constant-time to mitigate timing attacks.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

/// Header name for the session token (alternative to `Authorization: Bearer`).
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Identity of the authenticated user, stored as a request extension by the
/// session middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    let mut combined = Vec::with_capacity(SALT_LEN + HASH_LEN);
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&hash);
    BASE64.encode(combined)
}

/// Verify a password against a stored base64(salt || hash) value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(decoded) = BASE64.decode(stored) else {
        return false;
    };
    if decoded.len() != SALT_LEN + HASH_LEN {
        return false;
    }
    let (salt, expected) = decoded.split_at(SALT_LEN);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);

    // Constant-time comparison to prevent timing attacks
    hash.ct_eq(expected).into()
}

/// Extract the session token from request headers. `Authorization: Bearer`
/// wins over the dedicated header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    bearer.or_else(|| {
        headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    })
}

/// Session authentication middleware.
///
/// Resolves the presented token to a live session and stores its user id as
/// an [`AuthUser`] extension for downstream handlers.
pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = token_from_headers(request.headers()) else {
        return AppError::Unauthorized("Missing session token".to_string()).into_response();
    };

    match state.repo.get_session(&token).await {
        Ok(Some(session)) if !session.is_expired() => {
            request.extensions_mut().insert(AuthUser {
                user_id: session.user_id,
            });
            next.run(request).await
        }
        Ok(_) => {
            AppError::Unauthorized("Invalid or expired session token".to_string()).into_response()
        }
        Err(e) => e.into_response(),
    }
}
