//! Middleware for the Payments Service.
//!
//! # Components
//!
//! - `auth` - The request authentication/authorization pipeline

pub mod auth;

pub use auth::{authenticate, AuthState};
