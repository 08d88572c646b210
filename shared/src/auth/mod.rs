//! # Authentication Primitives
//!
//! Low-level auth building blocks shared by the authorization service.
//!
//! ## Module Structure
//!
//! ```text
//! auth/
//! ├── jwt.rs      - HS256 access-token signing and verification
//! └── password.rs - bcrypt password hashing
//! ```
//!
//! ## Overview
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`JwtSigner`] | Sign and verify HS256 access tokens with the `jwt-key` key id |
//! | [`AccessClaims`] | The `{sub, scope, exp, iat}` claim set carried by access tokens |
//! | [`PasswordHasher`] | bcrypt digests for stored user passwords |
//!
//! The policy around these primitives (which scopes a token may carry, when
//! a token resolves in the store) lives in the service crate; this module
//! only does the cryptography.

pub mod jwt;
pub mod password;

// Re-export main types for convenient access
pub use jwt::{AccessClaims, JwtSigner};
pub use password::PasswordHasher;
