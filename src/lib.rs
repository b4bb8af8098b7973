//! Event records over HTTP/JSON: owner-checked CRUD, attendee membership and
//! image uploads, backed by Postgres and a blob container.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;
