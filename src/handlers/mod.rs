//! Query Service Boundary: request validation, delegation and response shaping.
//!
//! Each endpoint has a `handle_*` function holding the logic (shared by the HTTP
//! routes and the CLI) and a thin axum handler that maps failures to
//! [`ApiError`](crate::error::ApiError).

mod batch;
mod corpus;
mod search;

pub use batch::*;
pub use corpus::*;
pub use search::*;
