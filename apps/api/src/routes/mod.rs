pub mod health;
pub mod navigation;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::chat::handlers as chat;
use crate::content::handlers as content;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/navigation", get(navigation::navigation_handler))
        .route("/api/v1/sections/:key", get(content::handle_get_section))
        .route(
            "/api/v1/sections/:key/items",
            post(content::handle_add_item),
        )
        .route(
            "/api/v1/sections/:key/items/:id",
            put(content::handle_edit_item).delete(content::handle_delete_item),
        )
        .route(
            "/api/v1/sections/:key/items/:id/asset",
            post(content::handle_attach_asset).delete(content::handle_detach_asset),
        )
        .route("/api/v1/chat", post(chat::handle_chat))
        .with_state(state)
}
