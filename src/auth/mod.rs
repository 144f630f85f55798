use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::{error::ApiError, state::AppState};

mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub(crate) mod extractors;

/// Login is throttled per peer address: a burst of 5 attempts, refilled at
/// one every 12 seconds (~5 per rolling minute). The limiter fails closed
/// before the handler runs.
pub fn router() -> Router<AppState> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(12)
            .burst_size(5)
            .error_handler(|_| ApiError::RateLimited.into_response())
            .finish()
            .expect("login rate limiter config"),
    );

    Router::new()
        .route("/auth/login", post(handlers::login))
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .merge(Router::new().route("/auth/logout", post(handlers::logout)))
}
