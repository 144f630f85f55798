use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_cookies::Cookies;
use tracing::warn;

use crate::{
    auth::jwt::{JwtKeys, ACCESS_TOKEN_COOKIE},
    error::ApiError,
    state::AppState,
    users::repo::User,
};

/// Resolves the session cookie to a live user row.
///
/// A missing cookie, a token that fails verification for any reason, and a
/// subject that no longer exists all produce the same rejection.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthenticated)?;
        let token = cookies
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("session token rejected");
            ApiError::Unauthenticated
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}
