use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::CurrentUser,
        password::hash_password,
    },
    error::{is_unique_violation, ApiError, Result},
    state::AppState,
    users::{
        dto::{CreateUser, MeResponse, Pagination, PublicUser, UpdateUser},
        repo::{User, UserChanges},
    },
};

const MAX_PAGE_SIZE: i64 = 100;
const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Pre-check; the unique constraint below closes the remaining race.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!("email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let language = payload.language.as_deref().unwrap_or("en");

    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        payload.username.as_deref(),
        language,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".into())
        } else {
            e.into()
        }
    })?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PublicUser>>> {
    let (skip, limit) = p.clamped(MAX_PAGE_SIZE);
    let users = User::list(&state.db, limit, skip).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(current))]
pub async fn me(CurrentUser(current): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: current.id,
        language: current.language,
    })
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.into()))
}

/// True when `email_owner` is a different user than the update target, i.e.
/// the new email is already taken.
pub(crate) fn email_taken_by_other(target_id: i64, email_owner: Option<i64>) -> bool {
    email_owner.map_or(false, |owner| owner != target_id)
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<PublicUser>> {
    // A missing target is a 404 before any field is inspected; an unknown id
    // must not leak whether a supplied email belongs to someone else.
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let email = match payload.email {
        Some(email) => {
            let email = email.trim().to_string();
            if !is_valid_email(&email) {
                return Err(ApiError::Validation("Invalid email".into()));
            }
            let owner = User::find_by_email(&state.db, &email).await?.map(|u| u.id);
            if email_taken_by_other(id, owner) {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
            Some(email)
        }
        None => None,
    };

    // A supplied plaintext password is re-hashed, never stored raw.
    let password_hash = match payload.password.as_deref() {
        Some(plain) => {
            if plain.len() < MIN_PASSWORD_LEN {
                return Err(ApiError::Validation("Password too short".into()));
            }
            Some(hash_password(plain)?)
        }
        None => None,
    };

    let changes = UserChanges {
        email,
        username: payload.username,
        language: payload.language,
        password_hash,
    };

    let user = User::update_partial(&state.db, id, changes)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".into())
            } else {
                e.into()
            }
        })?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user.name+tag@sub.example.org"));
    }

    #[test]
    fn update_conflicts_only_on_someone_elses_email() {
        // Keeping one's own email is not a conflict.
        assert!(!email_taken_by_other(1, Some(1)));
        // A free email is not a conflict.
        assert!(!email_taken_by_other(1, None));
        // Another user's email is.
        assert!(email_taken_by_other(1, Some(2)));
    }

    #[test]
    fn email_validation_rejects_garbage() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("no-tld@example"));
    }
}
