use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::{AuthUser, JsonBody, MaybeUser, LOGIN_REQUIRED},
        password::hash_password,
    },
    db::DbError,
    error::{AppError, Result},
    state::AppState,
    users::{
        dto::{ModifyProfileRequest, ProfileResponse, RegisterRequest, RegisterResponse},
        repo_types::User,
    },
};

const MIN_PASSWORD_CHARS: usize = 8;

/// Path segment that means "the caller's own profile".
pub const SELF_ALIAS: &str = "self";

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile/:username", get(get_profile))
        .route("/api/modify_profile", post(modify_profile))
        .route("/api/register", post(register))
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    username != SELF_ALIAS && USERNAME_RE.is_match(username)
}

/// Loads the session's user; a session whose user is gone is destroyed.
async fn session_user(state: &AppState, caller: &AuthUser) -> Result<User> {
    match User::find_by_id(&state.db, caller.user_id).await? {
        Some(user) => Ok(user),
        None => {
            warn!(user_id = caller.user_id, "session refers to a missing user; dropping it");
            state.sessions.destroy(&caller.token).await?;
            Err(AppError::auth(LOGIN_REQUIRED))
        }
    }
}

#[instrument(skip(state, caller))]
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user = if username == SELF_ALIAS {
        let Some(caller) = caller else {
            return Err(AppError::auth(LOGIN_REQUIRED));
        };
        session_user(&state, &caller).await?
    } else {
        User::find_by_username(&state.db, &username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?
    };

    Ok(Json(ProfileResponse::from(user)))
}

#[instrument(skip_all, fields(user_id = caller.user_id))]
pub async fn modify_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<ModifyProfileRequest>,
) -> Result<StatusCode> {
    let Some(display_name) = payload.display_name() else {
        return Err(AppError::validation("Display name is missing"));
    };

    let user = session_user(&state, &caller).await?;

    let bio = payload.bio.as_deref();
    match User::update_profile(&state.db, user.user_id, display_name, bio).await {
        Ok(()) => {}
        Err(DbError::Conflict(_)) => {
            return Err(AppError::Conflict("Display name is already taken".into()));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = user.user_id, "profile updated");
    Ok(StatusCode::OK)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let Some((username, display_name, password)) = payload.fields() else {
        return Err(AppError::validation(
            "Username, display name or password is missing",
        ));
    };

    if !is_valid_username(username) {
        warn!(username, "invalid username");
        return Err(AppError::validation("Invalid username"));
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }

    let hash = hash_password(password)?;

    let user = match User::create(&state.db, username, display_name, &hash).await {
        Ok(user) => user,
        Err(DbError::Conflict(_)) => {
            warn!(username, "username or display name already taken");
            return Err(AppError::Conflict(
                "Username or display name is already taken".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.user_id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: user.username,
            message: "Registration successful".into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("data"));
        assert!(is_valid_username("chef_anna.b-2"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(SELF_ALIAS));
    }
}
