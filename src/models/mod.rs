//! Wire models for peer-to-peer traffic
//!
//! Binary messages encoded with prost.

pub mod messages;

pub use messages::{Request, Response};
