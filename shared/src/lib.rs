//! # Gatehouse - Shared Library
//!
//! Core shared functionality for the Gatehouse authorization server.
//!
//! This crate provides the cross-cutting pieces the service crate builds on:
//! configuration, error handling, storage clients and the low-level auth
//! primitives (JWT signing, password hashing).
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`config`] | Environment-based configuration | [`AppConfig`] |
//! | [`errors`] | Error taxonomy with stable response codes | [`ApiError`], [`ApiResult`] |
//! | [`auth`] | JWT signing/verification, bcrypt hashing | [`auth::JwtSigner`], [`auth::PasswordHasher`] |
//! | [`database`] | PostgreSQL connection pool | [`database::create_pool`] |
//! | [`redis_client`] | Redis client for the token store | [`redis_client::RedisClient`] |
//! | [`tracing_config`] | Structured logging setup | [`tracing_config::init_tracing`] |
//! | [`validation`] | Request validation helpers | [`validation::validate_request`] |
//!
//! ## Design Decisions
//!
//! 1. **Single source of truth**: shared types live here to prevent drift
//! 2. **Security first**: HS256 key handling and bcrypt digests are confined
//!    to this crate; secrets never appear in `Debug` output
//! 3. **Observable by default**: structured logging and tracing built-in

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod redis_client;
pub mod tracing_config;
pub mod validation;

// Re-exports for convenience - import commonly used types directly from `shared`
pub use config::AppConfig;
pub use errors::{ApiError, ApiResult};
