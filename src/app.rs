use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/user_cycle/:cycle_type/", get(handlers::user_cycle))
        .route("/api/cycle_view/:cycle_type/", get(handlers::cycle_view))
        .route("/profile/update/", post(handlers::profile_update))
        .route("/businesses/add/", post(handlers::business_add))
        .route("/businesses/:id/delete/json/", post(handlers::business_delete))
        .with_state(state)
}
