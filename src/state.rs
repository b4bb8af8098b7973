use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::JwtValidator;
use crate::services::EventService;

/// Shared handles for every request, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub jwt: Arc<JwtValidator>,
}

impl AppState {
    pub fn new(events: EventService, jwt: JwtValidator) -> Self {
        Self {
            events: Arc::new(events),
            jwt: Arc::new(jwt),
        }
    }
}

impl FromRef<AppState> for Arc<JwtValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
