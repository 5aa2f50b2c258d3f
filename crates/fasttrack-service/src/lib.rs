//! FastTrack HTTP API Service.
//!
//! This crate exposes the booking engine over HTTP:
//!
//! - Customer registration and bookings
//! - Trip lifecycle (edit, complete, cancel)
//! - Operator dispatch views and assignment
//! - Driver administration
//! - Payment history
//!
//! Every endpoint is a plain request/response call into `fasttrack-engine`. Ids travel in
//! the path or body; the service keeps no per-client state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler is async for the router

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
