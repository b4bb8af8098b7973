pub mod event_service;

pub use event_service::{EventService, ImageUpload, MAX_IMAGE_BYTES};
