//! Service layer: the business logic of the authorization server.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`oauth`] | Authorization-code grant state machine |
//! | [`state_store`] | In-memory OAuth state registry |
//! | [`client_registry`] | Startup-loaded API client map |
//! | [`scope_authority`] | Client ∩ user scope authorization |
//! | [`access_token`] | Signed access tokens, opaque secrets |
//! | [`registration`] | Registration codes and account creation |
//! | [`token_verifier`] | Scope-gated bearer admission |

pub mod access_token;
pub mod client_registry;
pub mod oauth;
pub mod registration;
pub mod scope_authority;
pub mod state_store;
pub mod token_verifier;

pub use access_token::AccessTokenGenerator;
pub use client_registry::ClientRegistry;
pub use oauth::{OAuthService, TokenLifetimes};
pub use registration::RegistrationManager;
pub use scope_authority::ScopeAuthority;
pub use state_store::StateStore;
pub use token_verifier::TokenVerifier;
