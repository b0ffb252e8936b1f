use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/activities",
            get(handlers::list_activities).post(handlers::add_activity),
        )
        .route(
            "/api/activities/:id",
            put(handlers::edit_activity).delete(handlers::delete_activity),
        )
        .route("/api/activities/:id/complete", post(handlers::complete_activity))
        .route("/api/activities/:id/share", post(handlers::share_activity))
        .route("/api/alerts", get(handlers::get_alerts))
        .route("/api/notifications/permission", post(handlers::set_permission))
        .with_state(state)
}
