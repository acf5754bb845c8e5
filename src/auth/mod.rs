use crate::state::AppState;
use axum::Router;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod repo;
pub mod services;

pub use extractors::SessionUser;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
