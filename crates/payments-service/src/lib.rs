//! Payments Service Library
//!
//! An OAuth 2.0 resource server guarding a simulated payments API. Every
//! inbound request passes through a bearer-token pipeline: JWKS-backed
//! signature verification, issuer/audience claim validation, and per-route
//! scope authorization. The business endpoints themselves are trivial glue
//! that receive the authenticated principal.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> auth/*.rs
//!                                     -> handlers/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `auth` - Key resolution, token verification, claim validation, policy
//! - `middleware` - The request authentication pipeline
//! - `handlers` - HTTP request handlers
//! - `models` - Request/response bodies
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
