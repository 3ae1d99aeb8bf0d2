//! HTTP API layer for pollapi.
//!
//! - **Endpoints**: active polls, answer submission, completion report,
//!   and poll administration
//! - **Extractors**: authenticated and administrator users
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8. The server crate adds the Tower layers.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
