//! `keydrop-auth`: the admin capability check and token claims.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod principal;

pub use authorize::{AdminCheck, AuthzError, RoleAdminCheck, StaticAdminCheck, authorize_admin};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::Actor;
