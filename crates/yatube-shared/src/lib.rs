//! # Yatube Shared
//!
//! Wire types shared between the server and its clients.

pub mod dto;
pub mod response;

pub use dto::{HealthResponse, Viewer};
pub use response::{ErrorResponse, PageResponse};
