//! Bearer token authentication.
//!
//! Access tokens are HMAC-signed JWTs issued by whatever service owns user identity. The storefront only needs the
//! shared secret to verify them. The `sub` claim carries the numeric user id.
use std::{
    fmt::{Display, Formatter},
    future::{ready, Ready},
    str::FromStr,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use storefront_engine::db_types::Customer;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::PoorlyFormattedToken(format!("Unknown role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id, as a string.
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Expiry, in seconds since the unix epoch.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new<S: Into<String>>(user_id: i64, username: S, roles: Vec<Role>, exp: i64) -> Self {
        Self { sub: user_id.to_string(), username: username.into(), email: String::default(), roles, exp }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = email.into();
        self
    }

    pub fn has_roles(&self, required: &[Role]) -> bool {
        required.iter().all(|role| self.roles.contains(role))
    }

    pub fn to_customer(&self) -> Result<Customer, AuthError> {
        let id = self
            .sub
            .parse::<i64>()
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("The subject claim is not a user id. {e}")))?;
        Ok(Customer::new(id, self.username.as_str(), self.email.as_str()))
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
            warn!("💻️ No access token claims found for {}. Is the route missing an ACL?", req.path());
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

/// Verifies access tokens against the shared secret.
#[derive(Clone)]
pub struct JwtAuthority {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthority {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let mut validation = Validation::new(config.jwt_algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self { key, validation }
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("💻️ Access token was rejected. {e}");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidToken | jsonwebtoken::errors::ErrorKind::Base64(_) => {
                    AuthError::PoorlyFormattedToken(e.to_string())
                },
                _ => AuthError::ValidationError(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }
}

/// Signs access tokens with the shared secret. The storefront does not issue tokens to users itself, but tooling and
/// tests that share the secret use this to mint them.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    algorithm: Algorithm,
    expiry: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, algorithm: config.jwt_algorithm, expiry: config.access_token_expiry }
    }

    /// Issues a token for the user that expires after the configured access token lifetime.
    pub fn issue_token(&self, user_id: i64, username: &str, roles: Vec<Role>) -> Result<String, AuthError> {
        let exp = (Utc::now() + self.expiry).timestamp();
        self.sign(&JwtClaims::new(user_id, username, roles, exp))
    }

    pub fn sign(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm), claims, &self.key).map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
