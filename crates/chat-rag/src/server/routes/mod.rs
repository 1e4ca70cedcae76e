//! HTTP routes for the chat server

pub mod chat;

use axum::{routing::post, Router};
use crate::server::state::AppState;

/// Build the chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new().route(
        "/chat",
        post(chat::chat).fallback(chat::method_not_allowed),
    )
}
