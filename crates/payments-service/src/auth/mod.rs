//! Authentication and authorization for the Payments Service.
//!
//! # Components
//!
//! - `claims` - Verified token claims and the derived request principal
//! - `jwks` - Issuer key resolution (discovery, caching, rotation)
//! - `verifier` - Signature and temporal claim verification
//! - `validators` - Issuer/audience claim validator chain
//! - `policy` - Per-route scope requirements and the authorization gate

pub mod claims;
pub mod jwks;
pub mod policy;
pub mod validators;
pub mod verifier;

pub use claims::{Claims, Principal};
pub use jwks::JwksClient;
pub use policy::{authorize, RouteAccess, RoutePolicy};
pub use validators::ValidatorChain;
pub use verifier::TokenVerifier;
