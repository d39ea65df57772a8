use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use bmb_core::auth::Claims;
use bmb_core::config::AuthSettings;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;

use super::response::ApiError;
use super::AppState;
use crate::store::{record_id, Record};

/// Model that authenticated principals are looked up in.
pub const USER_MODEL: &str = "User";

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    lifetime_hours: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime_hours", &self.lifetime_hours)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            lifetime_hours,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(&settings.jwt_secret, settings.jwt_expiration_hours)
    }

    /// Issue a token for a user, valid from now.
    pub fn issue(&self, user_id: i64, email: Option<&str>) -> Result<String, AuthError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token as if it were `at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        email: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let mut builder = Claims::builder()
            .user_id(user_id)
            .issued_at(at)
            .lifetime_hours(self.lifetime_hours);
        if let Some(email) = email {
            builder = builder.email(email);
        }
        let claims = builder
            .build()
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and structure, then check expiry at `now`.
    ///
    /// Expiry is checked here rather than by `jsonwebtoken` so there is no
    /// leeway and the clock can be pinned.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Invalid token format".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims)
    }
}

/// Authentication errors. Everything except `Signing` is a 401.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Token missing or malformed")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("User not found")]
    UnknownUser,
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingToken),
    }
}

/// The authenticated user, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub record: Record,
}

impl CurrentUser {
    /// The user record without its password hash.
    pub fn public(&self) -> Value {
        Value::Object(public_record(self.record.clone()))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.tokens.verify(token)?;

        let record = state
            .store
            .get(USER_MODEL, claims.user_id)?
            .ok_or(AuthError::UnknownUser)?;
        let id = record_id(&record).ok_or(AuthError::UnknownUser)?;

        Ok(Self { id, record })
    }
}

/// Drop the password hash from a record before it leaves the server.
pub fn public_record(mut record: Record) -> Record {
    record.remove("password");
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, TimeZone};

    fn service() -> TokenService {
        TokenService::new("test-secret", 24)
    }

    #[test]
    fn test_round_trip() {
        let tokens = service();
        let token = tokens.issue(42, Some("ada@example.com")).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_expiry_window() {
        let tokens = service();
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let token = tokens.issue_at(1, None, issued).unwrap();

        let almost = issued + Duration::hours(23) + Duration::minutes(59);
        assert!(tokens.verify_at(&token, almost).is_ok());

        let after = issued + Duration::hours(24) + Duration::minutes(1);
        assert!(matches!(
            tokens.verify_at(&token, after),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = TokenService::new("other", 24).issue(1, None).unwrap();
        assert!(matches!(
            service().verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_token() {
        let tokens = service();
        let token = tokens.issue(1, None).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;
        let flipped = if token[sig_start..].starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}{}{}", &token[..sig_start], flipped, &token[sig_start + 1..]);
        assert!(tokens.verify(&tampered).is_err());
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().verify("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn test_public_record_drops_password() {
        let record = serde_json::json!({"id": 1, "email": "a@x.io", "password": "$argon2"})
            .as_object()
            .cloned()
            .unwrap();
        let public = public_record(record);
        assert!(public.get("password").is_none());
        assert_eq!(public["email"], "a@x.io");
    }
}
