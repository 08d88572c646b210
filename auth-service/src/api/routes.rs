//! # Route Configuration
//!
//! Maps URL patterns to handlers. The two route groups are prefixed by the
//! configured service names (canonically `auth` and `account`):
//!
//! ```text
//! /{auth}/
//! ├── health             GET  → health_check
//! ├── authorize          GET  → authorize_page      (login form)
//! ├── authorize          POST → authorize_submit    (code issuance)
//! ├── token              POST → token               (code exchange)
//! └── bcrypt             GET  → bcrypt_hash         (dev only)
//!
//! /{account}/
//! ├── code               GET  → registration_code   (bearer + scope admin)
//! └── register           POST → register_account
//! ```
//!
//! Protection is handler-level: `registration_code` runs the token verifier
//! before touching the registration manager.

use actix_web::web;

use super::handlers;

/// Configures all routes under the given prefixes.
///
/// Called from `main.rs` during app initialization:
///
/// ```rust,ignore
/// App::new().configure(|cfg| routes::configure(cfg, "auth", "account"))
/// ```
pub fn configure(cfg: &mut web::ServiceConfig, auth_prefix: &str, account_prefix: &str) {
    cfg.service(
        web::scope(&format!("/{}", auth_prefix))
            .route("/health", web::get().to(handlers::health_check))
            .route("/authorize", web::get().to(handlers::authorize_page))
            .route("/authorize", web::post().to(handlers::authorize_submit))
            .route("/token", web::post().to(handlers::token))
            .route("/bcrypt", web::get().to(handlers::bcrypt_hash)),
    )
    .service(
        web::scope(&format!("/{}", account_prefix))
            .route("/code", web::get().to(handlers::registration_code))
            .route("/register", web::post().to(handlers::register_account)),
    );
}
