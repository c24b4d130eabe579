mod dto;
mod error;
pub mod handlers;
mod machine;
mod services;
mod slot;

use crate::state::AppState;
use axum::Router;

pub use services::SessionService;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes(max_upload_bytes))
}
