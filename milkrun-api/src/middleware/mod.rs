pub mod auth;

pub use auth::{admin_auth_middleware, owner_auth_middleware, AdminClaims, OwnerClaims};
