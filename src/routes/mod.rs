use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::attendance::{attend_event, unattend_event};
use crate::handlers::events::{
    create_event, delete_event, get_attending_event_ids, get_event, get_events_by_month,
    get_my_attending_events, get_my_events, update_event,
};
use crate::handlers::health_check;
use crate::handlers::images::upload_image;
use crate::services::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the multipart framing around a maximum-size image, so files
/// just over the limit reach the service's size check.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

pub struct RouterOptions {
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
    /// Directory served read-only under `/images`.
    pub images_dir: Option<PathBuf>,
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event))
        .route("/mine", get(get_my_events))
        .route("/month", get(get_events_by_month))
        .route("/attending", get(get_attending_event_ids))
        .route("/my-attending", get(get_my_attending_events))
        .route(
            "/upload-image",
            put(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/:id/attend", post(attend_event).delete(unattend_event))
}

pub fn create_routes(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/events", event_routes())
        .with_state(state);

    if let Some(dir) = options.images_dir {
        router = router.nest_service("/images", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(options.production))
        .layer(create_cors_layer(options.cors_allowed_origins.as_deref()))
}
