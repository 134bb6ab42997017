//! WhatsApp webhook payload authentication
//!
//! Meta signs every webhook delivery with an HMAC-SHA256 of the raw body
//! under the app secret, carried in `X-Hub-Signature-256` as
//! `sha256=<hex>`. Requests with a missing or wrong signature are rejected
//! before any parsing happens.

use crate::{
    error::{Error, Result},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

/// Rejects webhook posts whose body signature does not match the shared
/// app secret. The body is buffered, verified, and handed back to the
/// inner handler untouched.
///
/// # Usage
/// Apply to the webhook POST route using `route_layer()`:
///
/// ```ignore
/// Router::new()
///     .route("/webhook", post(receive_whatsapp))
///     .route_layer(middleware::from_fn_with_state(state.clone(), verify_signature))
/// ```
pub async fn verify_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(SIGNATURE_PREFIX))
        .map(str::to_string)
        .ok_or_else(|| Error::Unauthorized("missing webhook signature".to_string()))?;

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| Error::InvalidPayload(format!("unreadable body: {e}")))?;

    verify_hmac(
        state.config.whatsapp.app_secret.expose_secret().as_bytes(),
        &bytes,
        &signature,
    )?;

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

/// Constant-time check of `hex_signature` against HMAC-SHA256(secret, body).
pub fn verify_hmac(secret: &[u8], body: &[u8], hex_signature: &str) -> Result<()> {
    let expected = hex::decode(hex_signature)
        .map_err(|_| Error::Unauthorized("malformed webhook signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::Internal(format!("invalid HMAC key: {e}")))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| Error::Unauthorized("invalid webhook signature".to_string()))?;

    Ok(())
}

/// Hex signature for a body, as test clients need to produce it.
pub fn sign_body(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
