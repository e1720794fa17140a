use crate::state::AppState;
use axum::Router;

mod audit;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod role;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::admin_routes())
}
