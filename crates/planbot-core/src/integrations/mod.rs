//! Productivity-service integrations.
//!
//! Thin REST wrappers around Google Calendar and Todoist plus the OAuth
//! authorization-code helpers both services share. Access tokens are
//! per-chat and live in the [`crate::session::SessionStore`], never in
//! process-wide state.

pub mod google;
pub mod oauth;
pub mod todoist;

pub use google::{EventRef, GoogleCalendar};
pub use oauth::OAuthConfig;
pub use todoist::{Project, TaskRef, Todoist};

use serde_json::Value;

use crate::error::ServiceError;

/// Turn a response into its JSON body, or a [`ServiceError::Api`] carrying
/// the status and body text.
pub(crate) async fn into_api_json(
    resp: reqwest::Response,
    service: &'static str,
) -> Result<Value, ServiceError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ServiceError::Api {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}

/// Like [`into_api_json`] for endpoints that reply with an empty body.
pub(crate) async fn into_api_unit(
    resp: reqwest::Response,
    service: &'static str,
) -> Result<(), ServiceError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ServiceError::Api {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
