//! Todoist REST wrapper.
//!
//! Lists projects and creates, lists and deletes tasks via the Todoist REST
//! v2 API. Like the calendar client, the per-chat access token comes in with
//! every call.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::oauth::OAuthConfig;
use super::{into_api_json, into_api_unit};
use crate::config::TodoistConfig;
use crate::error::ServiceError;

const SERVICE: &str = "todoist";

/// A Todoist project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A task as surfaced to the chat layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub id: String,
    pub content: String,
    /// Human-readable due string, when the task has one.
    pub due: Option<String>,
}

/// Todoist client.
pub struct Todoist {
    http: Client,
    base_url: String,
}

impl Todoist {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// OAuth endpoints for Todoist; redirect lands on the "/todoist" callback.
    pub fn oauth_config(config: &TodoistConfig, redirect_uri: &str) -> OAuthConfig {
        OAuthConfig {
            service: SERVICE,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: "https://todoist.com/oauth/authorize".into(),
            token_url: config.token_url.clone(),
            scope: "data:read_write".into(),
            redirect_uri: format!("{redirect_uri}/todoist"),
            grant_type: None,
        }
    }

    /// Authorization link for the user.
    pub fn auth_url(config: &TodoistConfig, redirect_uri: &str) -> String {
        Self::oauth_config(config, redirect_uri).authorization_url(&[])
    }

    /// List the user's projects.
    pub async fn projects(&self, token: &str) -> Result<Vec<Project>, ServiceError> {
        let resp = self
            .http
            .get(format!("{}/rest/v2/projects", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let value = into_api_json(resp, SERVICE).await?;
        serde_json::from_value(value).map_err(|_| ServiceError::MissingField {
            service: SERVICE,
            field: "projects",
        })
    }

    /// Create a task in a project, optionally with a due string.
    pub async fn create_task(
        &self,
        token: &str,
        content: &str,
        project_id: &str,
        due_string: Option<&str>,
    ) -> Result<TaskRef, ServiceError> {
        let mut body = json!({
            "content": content,
            "project_id": project_id,
        });
        if let Some(due) = due_string {
            body["due_string"] = json!(due);
        }

        let resp = self
            .http
            .post(format!("{}/rest/v2/tasks", self.base_url))
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
        let content = value["content"].as_str().unwrap_or(content).to_string();
        let due = value["due"]["string"].as_str().map(String::from);
        Ok(TaskRef { id, content, due })
    }

    /// List active tasks.
    pub async fn tasks(&self, token: &str) -> Result<Vec<TaskRef>, ServiceError> {
        let resp = self
            .http
            .get(format!("{}/rest/v2/tasks", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let value = into_api_json(resp, SERVICE).await?;

        let mut tasks = Vec::new();
        for item in value.as_array().into_iter().flatten() {
            let id = match item["id"].as_str() {
                Some(id) => id.to_string(),
                None => continue,
            };
            let content = item["content"].as_str().unwrap_or_default().to_string();
            let due = item["due"]["string"].as_str().map(String::from);
            tasks.push(TaskRef { id, content, due });
        }
        Ok(tasks)
    }

    /// Delete a task by id; the API replies 204 on success.
    pub async fn delete_task(&self, token: &str, task_id: &str) -> Result<(), ServiceError> {
        let resp = self
            .http
            .delete(format!("{}/rest/v2/tasks/{task_id}", self.base_url))
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
    fn auth_url_requests_read_write_scope() {
        let config = TodoistConfig {
            client_id: "tid".into(),
            ..TodoistConfig::default()
        };
        let url = Todoist::auth_url(&config, "http://127.0.0.1:8000/callback");
        assert!(url.starts_with("https://todoist.com/oauth/authorize?"));
        assert!(url.contains("client_id=tid"));
        assert!(url.contains("scope=data%3Aread_write"));
        assert!(url.contains("callback%2Ftodoist"));
    }
}
