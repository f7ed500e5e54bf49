//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- requires the `editor` role or above.

pub mod auth;
pub mod rbac;
