use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BmbError, Result};

/// JWT claims carried by bearer tokens.
///
/// The field names match what generated projects put in their tokens, so a
/// token minted by either side verifies on the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric id of the authenticated user.
    pub user_id: i64,
    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Email of the user, when the issuer includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Check if the token is expired at the given instant.
    ///
    /// A token is no longer valid from its `exp` second onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Create a builder for constructing claims.
    pub fn builder() -> ClaimsBuilder {
        ClaimsBuilder::new()
    }
}

/// Builder for JWT claims.
#[derive(Debug)]
pub struct ClaimsBuilder {
    user_id: Option<i64>,
    email: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    /// `None` when the requested lifetime does not fit a `Duration`.
    lifetime: Option<Duration>,
}

impl Default for ClaimsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsBuilder {
    /// Create a new builder with a 24 hour lifetime.
    pub fn new() -> Self {
        Self {
            user_id: None,
            email: None,
            issued_at: None,
            lifetime: Some(Duration::hours(24)),
        }
    }

    /// Set the subject user id.
    pub fn user_id(mut self, id: i64) -> Self {
        self.user_id = Some(id);
        self
    }

    /// Attach the user's email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Pin the issue time (defaults to now).
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Set the token lifetime in hours.
    pub fn lifetime_hours(mut self, hours: i64) -> Self {
        self.lifetime = Duration::try_hours(hours);
        self
    }

    /// Build the claims.
    pub fn build(self) -> Result<Claims> {
        let user_id = self
            .user_id
            .ok_or_else(|| BmbError::Validation("user id is required".to_string()))?;
        let issued_at = self.issued_at.unwrap_or_else(Utc::now);
        let expires_at = self
            .lifetime
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| BmbError::Validation("token lifetime is out of range".to_string()))?;

        Ok(Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            email: self.email,
        })
    }
}
