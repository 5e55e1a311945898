//! Request identity.
//!
//! Issuing and validating credentials belongs to an external collaborator.
//! This module only asks an [`Authenticator`] to turn a bearer token into an
//! [`OwnerId`] and attaches the result to the request as an
//! [`AuthenticatedUser`] extension. Requests without a valid identity are
//! refused here, before any task handler runs.

use async_trait::async_trait;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::types::MessageEnvelope;
use crate::task::domain::OwnerId;

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The requester's identity, compared against task owners.
    pub owner: OwnerId,
}

/// Resolves bearer tokens to user identities.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the identity for `token`, or `None` when the token is not
    /// valid.
    async fn authenticate(&self, token: &str) -> Option<OwnerId>;
}

/// Authenticator backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, OwnerId>,
}

impl StaticTokenAuthenticator {
    /// Creates an authenticator accepting exactly the given tokens.
    #[must_use]
    pub fn new(tokens: impl IntoIterator<Item = (String, OwnerId)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Option<OwnerId> {
        self.tokens.get(token).cloned()
    }
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn refuse(message: &str) -> Response {
    let body = MessageEnvelope {
        success: false,
        message: message.to_owned(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Middleware that resolves the bearer token and attaches the identity.
pub async fn require_identity(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return refuse("Not authorized, no token");
    };
    let Some(owner) = authenticator.authenticate(token).await else {
        tracing::debug!("rejected request with unknown token");
        return refuse("Not authorized, token failed");
    };

    req.extensions_mut().insert(AuthenticatedUser { owner });
    next.run(req).await
}
