//! Repository layer: database and key-value access.
//!
//! | Module | Backing store | Purpose |
//! |--------|---------------|---------|
//! | [`token_store`] | Redis / memory | Issued token bundles |
//! | [`user_repository`] | Postgres | Users and their effective scopes |
//! | [`client_repository`] | Postgres | API clients and permitted scopes |
//! | [`registration_repository`] | Postgres | Registration codes, consume-and-create |

pub mod client_repository;
pub mod registration_repository;
pub mod token_store;
pub mod user_repository;

pub use client_repository::ClientRepository;
pub use registration_repository::RegistrationRepository;
pub use token_store::{MemoryTokenStore, RedisTokenStore, TokenStore};
pub use user_repository::UserRepository;
