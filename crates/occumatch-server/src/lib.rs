//! # occumatch-server
//!
//! Axum HTTP surface for OccuMatch: `POST /search`, a static landing page
//! at `GET /`, and `GET /health`. CORS is wide open on every route; the
//! server is built to sit on a public demo endpoint, not behind auth.
//!
//! ## Crate Position
//!
//! Depends on: occumatch-search.
//! Depended on by: occumatch-api (the binary).

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod routes;
pub mod server;
pub mod ui;

pub use config::ServerConfig;
pub use health::HealthResponse;
pub use routes::{build_router, AppState, SearchRequest};
pub use server::serve;
