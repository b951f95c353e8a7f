//! Google Calendar REST wrapper.
//!
//! Creates, lists and deletes events on the user's primary calendar. The
//! caller supplies the per-chat access token with every call; this client
//! keeps no credentials of its own.

use reqwest::Client;
use serde_json::json;

use super::oauth::OAuthConfig;
use super::{into_api_json, into_api_unit};
use crate::config::GoogleConfig;
use crate::error::ServiceError;

const SERVICE: &str = "google";

/// A calendar event as surfaced to the chat layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRef {
    pub id: String,
    pub summary: String,
    /// RFC3339 datetime, or a bare date for all-day events.
    pub start: String,
}

/// Google Calendar client.
pub struct GoogleCalendar {
    http: Client,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// OAuth endpoints for Google; redirect lands on the "/google" callback.
    pub fn oauth_config(config: &GoogleConfig, redirect_uri: &str) -> OAuthConfig {
        OAuthConfig {
            service: SERVICE,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: config.token_url.clone(),
            scope: "https://www.googleapis.com/auth/calendar".into(),
            redirect_uri: format!("{redirect_uri}/google"),
            grant_type: Some("authorization_code"),
        }
    }

    /// Authorization link for the user, requesting offline access so the
    /// token survives beyond the first session.
    pub fn auth_url(config: &GoogleConfig, redirect_uri: &str) -> String {
        Self::oauth_config(config, redirect_uri).authorization_url(&[
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ])
    }

    /// Create an event on the primary calendar; start/end are RFC3339.
    pub async fn create_event(
        &self,
        token: &str,
        summary: &str,
        start: &str,
        end: &str,
    ) -> Result<EventRef, ServiceError> {
        let body = json!({
            "summary": summary,
            "start": { "dateTime": start },
            "end": { "dateTime": end },
        });
        let resp = self
            .http
            .post(format!(
                "{}/calendar/v3/calendars/primary/events",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let value = into_api_json(resp, SERVICE).await?;

        let id = value["id"]
            .as_str()
            .ok_or(ServiceError::MissingField {
                service: SERVICE,
                field: "id",
            })?
            .to_string();
        let summary = value["summary"].as_str().unwrap_or(summary).to_string();
        let start = value["start"]["dateTime"]
            .as_str()
            .unwrap_or(start)
            .to_string();
        Ok(EventRef { id, summary, start })
    }

    /// List the next upcoming events, soonest first.
    pub async fn list_events(
        &self,
        token: &str,
        time_min: &str,
    ) -> Result<Vec<EventRef>, ServiceError> {
        let resp = self
            .http
            .get(format!(
                "{}/calendar/v3/calendars/primary/events",
                self.base_url
            ))
            .query(&[
                ("timeMin", time_min),
                ("maxResults", "10"),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .bearer_auth(token)
            .send()
            .await?;
        let value = into_api_json(resp, SERVICE).await?;

        let mut events = Vec::new();
        for item in value["items"].as_array().into_iter().flatten() {
            let id = match item["id"].as_str() {
                Some(id) => id.to_string(),
                None => continue,
            };
            let summary = item["summary"].as_str().unwrap_or("(No title)").to_string();
            // All-day events carry "date" instead of "dateTime".
            let start = item["start"]["dateTime"]
                .as_str()
                .or_else(|| item["start"]["date"].as_str())
                .unwrap_or_default()
                .to_string();
            events.push(EventRef { id, summary, start });
        }
        Ok(events)
    }

    /// Delete an event by id.
    pub async fn delete_event(&self, token: &str, event_id: &str) -> Result<(), ServiceError> {
        let resp = self
            .http
            .delete(format!(
                "{}/calendar/v3/calendars/primary/events/{event_id}",
                self.base_url
            ))
            .bearer_auth(token)
            .send()
            .await?;
        into_api_unit(resp, SERVICE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_url_requests_offline_calendar_access() {
        let config = GoogleConfig {
            client_id: "gid".into(),
            ..GoogleConfig::default()
        };
        let url = GoogleCalendar::auth_url(&config, "http://127.0.0.1:8000/callback");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=gid"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("callback%2Fgoogle"));
    }
}
