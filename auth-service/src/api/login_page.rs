//! # Login Page Rendering
//!
//! Renders the credential form served on `GET /authorize`. The template is
//! a collaborator: the handler only feeds it the flow parameters it must
//! carry through the form post.

use handlebars::Handlebars;
use serde::Serialize;
use shared::errors::ApiError;

/// Template variables for the login form.
///
/// Every field is posted back through hidden inputs except `error`, which
/// is shown to the user after a failed attempt.
#[derive(Debug, Serialize)]
pub struct LoginPageData {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: String,
    pub response_type: String,
    pub scope: String,
    pub error: String,
    /// Route prefix the form posts back to (e.g. `/auth`).
    pub base_path: String,
}

/// Compiled login template.
pub struct LoginPage {
    registry: Handlebars<'static>,
}

impl LoginPage {
    /// Compiles the embedded template. Fails only if the template text is
    /// syntactically broken, which is a build defect - so surface it at
    /// startup, not per request.
    pub fn new() -> Result<Self, ApiError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("login", include_str!("../../templates/login.html"))
            .map_err(|e| ApiError::InternalError {
                message: format!("failed to compile login template: {}", e),
            })?;

        Ok(Self { registry })
    }

    /// Renders the login form.
    pub fn render(&self, data: &LoginPageData) -> Result<String, ApiError> {
        self.registry
            .render("login", data)
            .map_err(|e| ApiError::InternalError {
                message: format!("failed to render login template: {}", e),
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> LoginPageData {
        LoginPageData {
            client_id: "client-1".to_string(),
            redirect_uri: "http://ex/cb".to_string(),
            state: "s1".to_string(),
            response_type: "code".to_string(),
            scope: "profile".to_string(),
            error: String::new(),
            base_path: "/auth".to_string(),
        }
    }

    #[test]
    fn test_renders_flow_parameters_into_form() {
        let page = LoginPage::new().unwrap();
        let html = page.render(&data()).unwrap();

        assert!(html.contains(r#"action="/auth/authorize""#));
        assert!(html.contains(r#"name="client_id" value="client-1""#));
        assert!(html.contains(r#"name="state" value="s1""#));
        assert!(html.contains(r#"name="scope" value="profile""#));
        // no error block without an error
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_renders_error_message() {
        let page = LoginPage::new().unwrap();
        let mut d = data();
        d.error = "invalid email or password".to_string();

        let html = page.render(&d).unwrap();
        assert!(html.contains("invalid email or password"));
    }

    #[test]
    fn test_escapes_injected_values() {
        let page = LoginPage::new().unwrap();
        let mut d = data();
        d.state = "\"><script>alert(1)</script>".to_string();

        let html = page.render(&d).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
