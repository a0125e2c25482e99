//! Bearer token verification.
//!
//! Tokens are issued by the external identity service; this crate only
//! verifies them (HS256, shared secret) and turns the claims into a
//! [`Caller`]. `issue` exists for tests and local tooling.

use std::future::{ready, Ready};
use actix_web::{
    dev::Payload, http::header::AUTHORIZATION, http::StatusCode, web, FromRequest, HttpRequest,
    HttpResponse, ResponseError,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::{Caller, ErrorResponse, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User id as carried by older tokens; `sub` wins when both are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Legacy role flag, consulted when `role` is absent
    #[serde(rename = "isFaculty", default)]
    pub is_faculty: bool,
    pub exp: i64,
}

impl Claims {
    /// The caller named by the token, or `None` when it carries no user id
    pub fn caller(&self) -> Option<Caller> {
        let user_id = self
            .sub
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())?;

        let role = self.role.unwrap_or(if self.is_faculty {
            Role::Faculty
        } else {
            Role::Student
        });

        Some(Caller {
            user_id: user_id.to_string(),
            role,
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token does not identify a user")]
    MissingSubject,

    #[error("Authentication is not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: "unauthenticated".to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// HMAC verifier for bearer tokens
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Sign a token for `caller` valid for `ttl_secs`
    pub fn issue(&self, caller: &Caller, ttl_secs: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: Some(caller.user_id.clone()),
            id: None,
            role: Some(caller.role),
            is_faculty: caller.role == Role::Faculty,
            exp: chrono::Utc::now().timestamp() + ttl_secs,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }
}

/// Extractor yielding the verified caller of a request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Caller);

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn bearer_token(header: &str) -> &str {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim()
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let verifier = req
        .app_data::<web::Data<JwtVerifier>>()
        .ok_or(AuthError::NotConfigured)?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = verifier.verify(bearer_token(header)).map_err(|e| {
        tracing::debug!("Rejected bearer token on {}: {}", req.path(), e);
        e
    })?;

    claims
        .caller()
        .map(AuthenticatedUser)
        .ok_or(AuthError::MissingSubject)
}
