//! Completion-service client.
//!
//! Builds a mode-specific instruction payload (event vs. task wording),
//! sends one synchronous completion request and returns the raw reply text.
//! No retries live here; whether to re-prompt the user is the caller's call.

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::CompletionConfig;
use crate::error::ExtractionError;

/// Which system prompt the completion call is built with, and hence whether
/// calendar-event or task-list wording is expected back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Event,
    Task,
}

/// Both prompts demand the exact reply grammar the parser expects, including
/// the literal «К» closing the start field.
const SYSTEM_PROMPT_EVENT: &str = "Ты - ассистент, который помогает планировать события. \
    Анализируй запрос пользователя и возвращай следующую информацию: \
    1. Название события, 2. Время начала события, 3. Время окончания события \
    (если не указано, напиши 'не указан'). \
    Формат ответа строго: 'Событие: <название>. Начало: <дата и время>К Конец: <дата и время>'. \
    Сразу после времени начала обязательно поставь букву К.";

const SYSTEM_PROMPT_TASK: &str = "Ты - ассистент, который помогает вести список задач. \
    Анализируй запрос пользователя и возвращай следующую информацию: \
    1. Название задачи, 2. Срок начала, 3. Срок окончания \
    (если не указан, напиши 'не указан'). \
    Формат ответа строго: 'Задача: <название>. Начало: <дата и время>К Конец: <дата и время>'. \
    Сразу после срока начала обязательно поставь букву К.";

/// Client for the text-completion endpoint.
///
/// Holds a shared `reqwest::Client`; safe to call from concurrent tasks.
pub struct CompletionClient {
    http: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.config.folder_id, self.config.model)
    }

    fn payload(&self, request_text: &str, mode: ExtractionMode) -> Value {
        let system = match mode {
            ExtractionMode::Event => SYSTEM_PROMPT_EVENT,
            ExtractionMode::Task => SYSTEM_PROMPT_TASK,
        };
        json!({
            "modelUri": self.model_uri(),
            "completionOptions": {
                "stream": false,
                "temperature": self.config.temperature,
                "maxTokens": self.config.max_tokens,
            },
            "messages": [
                { "role": "system", "text": system },
                { "role": "user", "text": request_text },
            ],
        })
    }

    /// One completion round trip; returns the raw reply text.
    pub async fn complete(
        &self,
        request_text: &str,
        mode: ExtractionMode,
    ) -> Result<String, ExtractionError> {
        let url = format!(
            "{}/foundationModels/v1/completion",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.iam_token)
            .json(&self.payload(request_text, mode))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        let text = body["result"]["alternatives"][0]["message"]["text"]
            .as_str()
            .ok_or(ExtractionError::MissingCompletion)?;
        log::debug!("completion reply: {text:?}");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CompletionClient {
        CompletionClient::new(CompletionConfig {
            folder_id: "b1gtest".into(),
            ..CompletionConfig::default()
        })
    }

    #[test]
    fn payload_carries_model_uri_and_options() {
        let payload = client().payload("встреча завтра", ExtractionMode::Event);
        assert_eq!(
            payload["modelUri"],
            "gpt://b1gtest/yandexgpt-lite/latest"
        );
        assert_eq!(payload["completionOptions"]["stream"], false);
        assert_eq!(payload["completionOptions"]["temperature"], 0.2);
        assert_eq!(payload["completionOptions"]["maxTokens"], 2000);
    }

    #[test]
    fn payload_is_system_plus_user() {
        let payload = client().payload("встреча завтра", ExtractionMode::Event);
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["text"], "встреча завтра");
    }

    #[test]
    fn mode_selects_prompt_wording() {
        let event = client().payload("x", ExtractionMode::Event);
        let task = client().payload("x", ExtractionMode::Task);
        let event_system = event["messages"][0]["text"].as_str().unwrap();
        let task_system = task["messages"][0]["text"].as_str().unwrap();
        assert!(event_system.contains("Событие:"));
        assert!(task_system.contains("Задача:"));
        // Both demand the start-field sentinel.
        assert!(event_system.contains('К'));
        assert!(task_system.contains('К'));
    }
}
