//! Bearer Token Verification
//!
//! Verifies HS256 JSON Web Tokens issued by the platform backend. The raw
//! token is forwarded to the backend on vault fetches, so verification only
//! decides whether the request is let in and which wallet it speaks for.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No bearer token provided")]
    MissingToken,

    #[error("Malformed token: {0}")]
    Malformed(&'static str),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Claims the service reads from a verified token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Wallet the token holder owns
    #[serde(default, rename = "solanaPubkey", skip_serializing_if = "Option::is_none")]
    pub solana_pubkey: Option<String>,

    /// Expiry, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// A verified token: its claims plus the raw text for forwarding
#[derive(Clone, Debug)]
pub struct Authenticated {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::BadSignature)
    }

    /// Verify the request's `Authorization: Bearer` token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Authenticated, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verify(token, chrono::Utc::now().timestamp())?;
        Ok(Authenticated {
            token: token.to_string(),
            claims,
        })
    }

    /// Check signature, algorithm and expiry against `now` (epoch seconds).
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or(AuthError::Malformed("expected three segments"))?;
        let (header, payload) = signing_input
            .split_once('.')
            .filter(|(_, payload)| !payload.contains('.'))
            .ok_or(AuthError::Malformed("expected three segments"))?;

        let header: Header = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed("signature is not base64url"))?;

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::BadSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if claims.exp.is_some_and(|exp| now >= exp) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    #[cfg(test)]
    pub fn sign(&self, claims: &Claims) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("claims serialize"));
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac().expect("hmac key");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{signature}")
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed("segment is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed("segment is not JSON"))
}

/// The token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
