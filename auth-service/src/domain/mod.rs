//! Domain layer: persistent entities and the token bundle.

pub mod entities;

pub use entities::{ApiClient, ApiClientScope, TokenBundle, User};
