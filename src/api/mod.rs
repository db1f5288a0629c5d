//! API Module
//!
//! HTTP handler and routing for node-to-node traffic.
//!
//! # Endpoints
//! - `GET {base_path}{group}/{key}` - Protobuf-encoded value of `key` in `group`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
