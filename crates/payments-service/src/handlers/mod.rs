//! HTTP request handlers for the Payments Service.
//!
//! Handlers behind protected routes receive the authenticated identity as
//! an explicit `Extension` value; the auth middleware guarantees it is
//! present and already authorized for the route.

pub mod balance;
pub mod health;
pub mod info;
pub mod transfer;

pub use balance::get_balance;
pub use health::health_check;
pub use info::token_info;
pub use transfer::create_transfer;
