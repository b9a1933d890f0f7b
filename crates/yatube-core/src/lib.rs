//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! Records, ports, forms, pagination and the feed/follow/submission
//! services live here; nothing in this crate talks to a database directly.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use pagination::{Page, PageWindow, Paginator};
