use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;
use tracing::{debug, warn};

use cms_types::models::AuthUser;

use crate::error::{ApiError, StoreError};
use crate::state::AppState;

const BASIC_PREFIX: &str = "Basic ";

#[derive(Debug, Error)]
pub enum AuthFormatError {
    #[error("authorization header missing")]
    Missing,

    #[error("authorization header is not visible ASCII")]
    NotText,

    #[error("authorization header shorter than the Basic prefix")]
    TooShort,

    #[error("authorization scheme is not Basic")]
    WrongScheme,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("credentials have no ':' separator")]
    MissingSeparator,

    #[error("credentials are not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parses `Basic base64(base64(handle):password)` into `(handle, password)`.
///
/// The outer layer is the usual Basic encoding; the handle inside it is
/// base64 encoded once more so it may itself contain a colon.
pub fn parse_basic_authorization(value: &str) -> Result<(String, String), AuthFormatError> {
    if value.len() < BASIC_PREFIX.len() {
        return Err(AuthFormatError::TooShort);
    }
    let encoded = value
        .strip_prefix(BASIC_PREFIX)
        .ok_or(AuthFormatError::WrongScheme)?;

    let payload = B64.decode(encoded)?;
    let colon = payload
        .iter()
        .position(|&b| b == b':')
        .ok_or(AuthFormatError::MissingSeparator)?;

    let handle = B64.decode(&payload[..colon])?;
    let password = payload[colon + 1..].to_vec();

    Ok((String::from_utf8(handle)?, String::from_utf8(password)?))
}

/// Every route behind this layer sees the caller as an `AuthUser` extension.
/// Format and credential failures both answer 401; only the log tells them apart.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let parsed = match req.headers().get(header::AUTHORIZATION) {
        None => Err(AuthFormatError::Missing),
        Some(value) => value
            .to_str()
            .map_err(|_| AuthFormatError::NotText)
            .and_then(parse_basic_authorization),
    };

    let (handle, password) = parsed.map_err(|e| {
        debug!("Rejected authorization header: {}", e);
        ApiError::Unauthorized
    })?;

    let user = match state.credentials.verify_password(&handle, &password).await {
        Ok(user) => user,
        Err(e @ (StoreError::NotFound | StoreError::BadCredential)) => {
            warn!("Failed login for '{}': {}", handle, e);
            return Err(ApiError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        handle: user.handle,
        is_admin: user.is_admin,
    });
    Ok(next.run(req).await)
}
