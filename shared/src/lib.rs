//! Shared types for the Comanda order backend
//!
//! Common types used by the server and client crates: data models,
//! API request/response structures and message bus payloads.

pub mod message;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, topics};
