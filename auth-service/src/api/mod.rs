//! HTTP layer: routes, handlers, DTOs and the login page.

pub mod dto;
pub mod handlers;
pub mod login_page;
pub mod routes;

pub use handlers::AppState;
