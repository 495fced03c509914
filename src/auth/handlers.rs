use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        cookies::{removal_cookie, session_cookie},
        dto::{LoginRequest, LoginResponse, MessageResponse},
        extractors::{AuthUser, JsonBody, MaybeUser},
        password::{verify_dummy, verify_password},
    },
    error::{AppError, Result},
    state::AppState,
    users::repo_types::User,
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", get(logout).post(logout))
        .route("/api/is_logged_in", get(is_logged_in))
}

#[instrument(skip(state, current, payload))]
pub async fn login(
    State(state): State<AppState>,
    MaybeUser(current): MaybeUser,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let Some((username, password)) = payload.credentials() else {
        warn!("login with missing credentials");
        return Err(AppError::validation("Username or password is missing"));
    };

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        verify_dummy(password);
        warn!(username, "login unknown username");
        return Err(AppError::auth(INVALID_CREDENTIALS));
    };

    let ok = match verify_password(password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, user_id = user.user_id, "stored password hash is unreadable");
            false
        }
    };

    if !ok {
        warn!(username, user_id = user.user_id, "login invalid password");
        return Err(AppError::auth(INVALID_CREDENTIALS));
    }

    if let Some(previous) = current {
        state.sessions.destroy(&previous.token).await?;
    }

    let token = state.sessions.create(user.user_id).await?;
    let cookie = session_cookie(&state.config.session, &token);

    info!(user_id = user.user_id, username = %user.username, "user logged in");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(LoginResponse {
            username: user.username,
            message: "Login successful".into(),
        }),
    ))
}

#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse> {
    state.sessions.destroy(&user.token).await.map_err(|e| {
        error!(error = ?e, "error logging out");
        AppError::Internal(e)
    })?;

    let cookie = removal_cookie(&state.config.session);
    info!(user_id = user.user_id, "user logged out");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    ))
}

pub async fn is_logged_in(MaybeUser(current): MaybeUser) -> Json<bool> {
    Json(current.is_some())
}
