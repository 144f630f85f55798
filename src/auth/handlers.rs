use axum::{
    extract::{FromRef, State},
    Json,
};
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        jwt::{JwtKeys, ACCESS_TOKEN_COOKIE},
        password::verify_password,
    },
    error::{ApiError, Result},
    state::AppState,
    users::repo::User,
};

/// Session cookie carrying the signed token; lifetime matches token expiry.
fn session_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");
    cookie
}

#[instrument(skip(state, cookies, payload))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload.email = payload.email.trim().to_string();

    // Unknown email and wrong password must be indistinguishable outward.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::Unauthenticated);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::Unauthenticated);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;
    cookies.add(session_cookie(&token, keys.ttl.as_secs() as i64));

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        user: user.into(),
    }))
}

#[instrument(skip(cookies))]
pub async fn logout(cookies: Cookies) -> Json<serde_json::Value> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
    Json(serde_json::json!({ "message": "Logout successful" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_sets_required_attributes() {
        let cookie = session_cookie("tok123", 30 * 60);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("access_token=tok123"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=1800"));
        assert!(rendered.contains("Path=/"));
    }
}
