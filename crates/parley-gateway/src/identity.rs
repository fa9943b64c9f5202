use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use parley_types::api::Claims;

/// An authenticated `(userId, username)` pair, bound to a connection for its
/// whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credential presented")]
    Missing,
    #[error("credential rejected")]
    Invalid,
    #[error("credential expired")]
    Expired,
}

/// Verify a JWT and produce the identity it carries. Pure: no registry or
/// store I/O happens here.
pub fn verify(secret: &str, token: &str) -> Result<Identity, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    })?;

    Ok(Identity {
        user_id: data.claims.sub,
        username: data.claims.username,
    })
}

/// Pull the `token` cookie out of a raw `Cookie` header value.
pub fn token_from_cookies(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("token="))
}

/// Bind an identity from the upgrade request's `Cookie` header. A failure
/// here means the connection is refused outright: it never reaches the
/// registry and is never heartbeated.
pub fn bind(secret: &str, cookie_header: Option<&str>) -> Result<Identity, AuthError> {
    let token = cookie_header
        .and_then(token_from_cookies)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Missing)?;
    verify(secret, token)
}
