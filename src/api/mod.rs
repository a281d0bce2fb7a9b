//! Thin client for the SavolaLab backend.

pub mod client;
pub mod error;

pub use client::{ApiClient, UserProfile};
pub use error::ApiError;
