use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::cookies::read_token;
use crate::{error::AppError, state::AppState};

pub const LOGIN_REQUIRED: &str = "Please log in to access this page";

/// Caller with a live session. Rejects with 401 before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub token: String,
}

/// Session if the caller has one; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

async fn resolve(parts: &Parts, state: &AppState) -> anyhow::Result<Option<AuthUser>> {
    let Some(token) = read_token(&parts.headers, &state.config.session.cookie_name) else {
        return Ok(None);
    };
    let session = state.sessions.lookup(&token).await?;
    Ok(session.map(|s| AuthUser {
        user_id: s.user_id,
        token,
    }))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                warn!(uri = %parts.uri, "unauthenticated request to protected route");
                Err(AppError::auth(LOGIN_REQUIRED))
            }
            Err(e) => {
                error!(error = ?e, "session lookup failed");
                Err(AppError::Internal(e))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                error!(error = ?e, "session lookup failed; treating caller as anonymous");
                Ok(MaybeUser(None))
            }
        }
    }
}

/// `Json` whose rejection is a 400 carrying a `message` body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "malformed request body");
                Err(AppError::validation("Malformed request body"))
            }
        }
    }
}
