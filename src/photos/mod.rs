use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photos/upload", post(handlers::upload))
        .route("/photos", get(handlers::list_photos))
        .route("/photos/:id", delete(handlers::delete_photo))
}
