//! Chat command layer.
//!
//! Routes incoming chat messages to the extraction pipeline and the
//! productivity-service clients. Transport-agnostic: the caller feeds in
//! `(chat_id, text)` plus a clock snapshot and sends back the returned reply
//! lines. Multi-step conversations (project choice, numbered deletion) are
//! driven by the [`PendingAction`] state machine in the session store.
//!
//! Errors during extraction or resolution never crash a session: the reply
//! asks the user to restate and the pending step stays armed.

use chrono::NaiveDateTime;
use reqwest::Client;

use crate::config::Config;
use crate::error::CoreError;
use crate::extract::{CompletionClient, ExtractionMode};
use crate::integrations::{oauth, GoogleCalendar, Todoist};
use crate::session::{ChatId, PendingAction, SessionStore};

const WELCOME: &str = "Hi! I'm Planbot. I help you manage your meetings and tasks.\n\n\
    Try messages like:\n\
    - 'Поставь встречу с коллегами завтра в 15:00'\n\
    - 'Напомни позвонить врачу до 28 декабря'\n\n\
    Use /setup to connect Google Calendar and Todoist, /help for the command list.";

const HELP: &str = "Available commands:\n\n\
    /start — welcome message\n\
    /setup — connect Google Calendar and Todoist\n\
    /add_event — add an event to Google Calendar\n\
    /list_events — show upcoming events\n\
    /delete_event — delete an event\n\
    /add_task — add a task to Todoist\n\
    /list_tasks — show active tasks\n\
    /delete_task — delete a task";

/// The assistant: configuration plus one client per external service.
pub struct Assistant {
    config: Config,
    http: Client,
    completion: CompletionClient,
    google: GoogleCalendar,
    todoist: Todoist,
}

impl Assistant {
    pub fn new(config: Config) -> Self {
        let completion = CompletionClient::new(config.completion.clone());
        let google = GoogleCalendar::new(config.google.api_base.clone());
        let todoist = Todoist::new(config.todoist.api_base.clone());
        Self {
            config,
            http: Client::new(),
            completion,
            google,
            todoist,
        }
    }

    /// Handle one incoming message; returns the reply lines to send back.
    ///
    /// `now` is injected so relative dates resolve deterministically; the
    /// transport passes the current wall clock.
    pub async fn handle_message(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        text: &str,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let text = text.trim();

        if let Some(pending) = store.take_pending(chat_id) {
            return self.handle_pending(store, chat_id, pending, text, now).await;
        }

        match text {
            "/start" => vec![WELCOME.to_string()],
            "/help" => vec![HELP.to_string()],
            "/setup" => self.setup_links(),
            _ if text.starts_with("Google:") => {
                self.link_service(store, chat_id, text, Linked::Google).await
            }
            _ if text.starts_with("Todoist:") => {
                self.link_service(store, chat_id, text, Linked::Todoist).await
            }
            "/add_event" => self.start_add_event(store, chat_id),
            "/list_events" => self.list_events(store, chat_id, now).await,
            "/delete_event" => self.start_delete_event(store, chat_id, now).await,
            "/add_task" => self.start_add_task(store, chat_id).await,
            "/list_tasks" => self.list_tasks(store, chat_id).await,
            "/delete_task" => self.start_delete_task(store, chat_id).await,
            _ => vec!["I did not understand that. Send /help for the command list.".into()],
        }
    }

    fn setup_links(&self) -> Vec<String> {
        let google_url = GoogleCalendar::auth_url(&self.config.google, &self.config.redirect_uri);
        let todoist_url = Todoist::auth_url(&self.config.todoist, &self.config.redirect_uri);
        vec![format!(
            "To connect your services:\n\n\
             1. Authorize Google: {google_url}\n\
             2. Authorize Todoist: {todoist_url}\n\n\
             After authorizing you will receive codes. Send them back as:\n\
             - `Google: <your code>`\n\
             - `Todoist: <your code>`"
        )]
    }

    async fn link_service(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        text: &str,
        which: Linked,
    ) -> Vec<String> {
        let (prefix, name) = match which {
            Linked::Google => ("Google:", "Google"),
            Linked::Todoist => ("Todoist:", "Todoist"),
        };
        let code = text.trim_start_matches(prefix).trim();
        if code.is_empty() {
            return vec![format!("Could not read the {name} code. Try again.")];
        }

        let oauth_config = match which {
            Linked::Google => {
                GoogleCalendar::oauth_config(&self.config.google, &self.config.redirect_uri)
            }
            Linked::Todoist => {
                Todoist::oauth_config(&self.config.todoist, &self.config.redirect_uri)
            }
        };

        match oauth::exchange_code(&self.http, &oauth_config, code).await {
            Ok(token) => {
                match which {
                    Linked::Google => store.set_google_token(chat_id, token),
                    Linked::Todoist => store.set_todoist_token(chat_id, token),
                }
                let hint = match which {
                    Linked::Google => "/add_event, /list_events and /delete_event",
                    Linked::Todoist => "/add_task, /list_tasks and /delete_task",
                };
                vec![format!("{name} linked! You can now use {hint}.")]
            }
            Err(e) => {
                log::warn!("{name} code exchange failed for chat {chat_id}: {e}");
                vec![format!("Could not link {name}: {e}. Run /setup and try again.")]
            }
        }
    }

    fn start_add_event(&self, store: &mut SessionStore, chat_id: ChatId) -> Vec<String> {
        if store.google_token(chat_id).is_none() {
            return vec![NOT_LINKED_GOOGLE.into()];
        }
        store.set_pending(chat_id, PendingAction::AwaitingEventText);
        vec!["Please describe the event:".into()]
    }

    async fn list_events(
        &self,
        store: &SessionStore,
        chat_id: ChatId,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let Some(token) = store.google_token(chat_id) else {
            return vec![NOT_LINKED_GOOGLE.into()];
        };
        match self
            .google
            .list_events(token, &self.rfc3339(now))
            .await
        {
            Ok(events) if events.is_empty() => vec!["You have no upcoming events.".into()],
            Ok(events) => {
                let mut reply = String::from("Your upcoming events:\n");
                for event in &events {
                    reply.push_str(&format!("- {} ({})\n", event.summary, event.start));
                }
                vec![reply]
            }
            Err(e) => vec![format!("Failed to fetch events: {e}")],
        }
    }

    async fn start_delete_event(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let Some(token) = store.google_token(chat_id) else {
            return vec![NOT_LINKED_GOOGLE.into()];
        };
        match self.google.list_events(token, &self.rfc3339(now)).await {
            Ok(events) if events.is_empty() => {
                vec!["You have no upcoming events to delete.".into()]
            }
            Ok(events) => {
                let mut reply = String::from("Your upcoming events:\n");
                for (idx, event) in events.iter().enumerate() {
                    reply.push_str(&format!("{}. {} ({})\n", idx + 1, event.summary, event.start));
                }
                reply.push_str("\nSend the number of the event to delete.");
                store.set_pending(chat_id, PendingAction::AwaitingEventDeletion { events });
                vec![reply]
            }
            Err(e) => vec![format!("Failed to fetch events: {e}")],
        }
    }

    async fn start_add_task(&self, store: &mut SessionStore, chat_id: ChatId) -> Vec<String> {
        let Some(token) = store.todoist_token(chat_id) else {
            return vec![NOT_LINKED_TODOIST.into()];
        };
        match self.todoist.projects(token).await {
            Ok(projects) if projects.is_empty() => {
                vec!["You have no Todoist projects to add tasks to.".into()]
            }
            Ok(projects) => {
                let mut reply = String::from("Pick a project (send its number):\n");
                for (idx, project) in projects.iter().enumerate() {
                    reply.push_str(&format!("{}. {}\n", idx + 1, project.name));
                }
                store.set_pending(chat_id, PendingAction::AwaitingProjectChoice { projects });
                vec![reply]
            }
            Err(e) => vec![format!("Failed to fetch your projects: {e}")],
        }
    }

    async fn list_tasks(&self, store: &SessionStore, chat_id: ChatId) -> Vec<String> {
        let Some(token) = store.todoist_token(chat_id) else {
            return vec![NOT_LINKED_TODOIST.into()];
        };
        match self.todoist.tasks(token).await {
            Ok(tasks) if tasks.is_empty() => vec!["You have no active tasks.".into()],
            Ok(tasks) => {
                let mut reply = String::from("Your tasks:\n");
                for (idx, task) in tasks.iter().enumerate() {
                    match &task.due {
                        Some(due) => {
                            reply.push_str(&format!("{}. {} (due: {})\n", idx + 1, task.content, due))
                        }
                        None => reply.push_str(&format!("{}. {}\n", idx + 1, task.content)),
                    }
                }
                vec![reply]
            }
            Err(e) => vec![format!("Failed to fetch tasks: {e}")],
        }
    }

    async fn start_delete_task(&self, store: &mut SessionStore, chat_id: ChatId) -> Vec<String> {
        let Some(token) = store.todoist_token(chat_id) else {
            return vec![NOT_LINKED_TODOIST.into()];
        };
        match self.todoist.tasks(token).await {
            Ok(tasks) if tasks.is_empty() => vec!["You have no active tasks.".into()],
            Ok(tasks) => {
                let mut reply = String::from("Pick a task to delete (send its number):\n");
                for (idx, task) in tasks.iter().enumerate() {
                    reply.push_str(&format!("{}. {}\n", idx + 1, task.content));
                }
                store.set_pending(chat_id, PendingAction::AwaitingTaskDeletion { tasks });
                vec![reply]
            }
            Err(e) => vec![format!("Failed to fetch tasks: {e}")],
        }
    }

    async fn handle_pending(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        pending: PendingAction,
        text: &str,
        now: NaiveDateTime,
    ) -> Vec<String> {
        match pending {
            PendingAction::AwaitingEventText => {
                self.create_event_from_text(store, chat_id, text, now).await
            }
            PendingAction::AwaitingProjectChoice { projects } => {
                match parse_choice(text, projects.len()) {
                    Some(idx) => {
                        let project_id = projects[idx].id.clone();
                        store.set_pending(chat_id, PendingAction::AwaitingTaskText { project_id });
                        vec!["Please describe the task:".into()]
                    }
                    None => {
                        store.set_pending(
                            chat_id,
                            PendingAction::AwaitingProjectChoice { projects },
                        );
                        vec!["Invalid choice. Send a project number from the list.".into()]
                    }
                }
            }
            PendingAction::AwaitingTaskText { project_id } => {
                self.create_task_from_text(store, chat_id, &project_id, text, now)
                    .await
            }
            PendingAction::AwaitingEventDeletion { events } => {
                let Some(token) = store.google_token(chat_id).map(String::from) else {
                    return vec![NOT_LINKED_GOOGLE.into()];
                };
                match parse_choice(text, events.len()) {
                    Some(idx) => match self.google.delete_event(&token, &events[idx].id).await {
                        Ok(()) => vec![format!("Event '{}' was deleted.", events[idx].summary)],
                        Err(e) => vec![format!("Failed to delete the event: {e}")],
                    },
                    None => {
                        store.set_pending(chat_id, PendingAction::AwaitingEventDeletion { events });
                        vec!["Invalid event number. Pick a number from the list.".into()]
                    }
                }
            }
            PendingAction::AwaitingTaskDeletion { tasks } => {
                let Some(token) = store.todoist_token(chat_id).map(String::from) else {
                    return vec![NOT_LINKED_TODOIST.into()];
                };
                match parse_choice(text, tasks.len()) {
                    Some(idx) => match self.todoist.delete_task(&token, &tasks[idx].id).await {
                        Ok(()) => vec![format!("Task '{}' was deleted.", tasks[idx].content)],
                        Err(e) => vec![format!("Failed to delete the task: {e}")],
                    },
                    None => {
                        store.set_pending(chat_id, PendingAction::AwaitingTaskDeletion { tasks });
                        vec!["Invalid task number. Pick a number from the list.".into()]
                    }
                }
            }
        }
    }

    async fn create_event_from_text(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        text: &str,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let Some(token) = store.google_token(chat_id).map(String::from) else {
            return vec![NOT_LINKED_GOOGLE.into()];
        };

        let event = match self
            .completion
            .extract_details(text, ExtractionMode::Event, now)
            .await
        {
            Ok(event) => event,
            Err(e) => return self.reprompt_event(store, chat_id, e),
        };

        let Some(start) = event.start_time else {
            store.set_pending(chat_id, PendingAction::AwaitingEventText);
            return vec![
                "I could not recognize the event. Please describe it again.".into(),
            ];
        };
        // No end expression supplied: the event gets the start time as its end.
        let end = event.end_time.unwrap_or(start);

        match self
            .google
            .create_event(&token, &event.title, &self.rfc3339(start), &self.rfc3339(end))
            .await
        {
            Ok(created) => vec![format!(
                "Event '{}' was added to Google Calendar.",
                created.summary
            )],
            Err(e) => vec![format!("Failed to create the event: {e}")],
        }
    }

    async fn create_task_from_text(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        project_id: &str,
        text: &str,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let Some(token) = store.todoist_token(chat_id).map(String::from) else {
            return vec![NOT_LINKED_TODOIST.into()];
        };

        let task = match self
            .completion
            .extract_details(text, ExtractionMode::Task, now)
            .await
        {
            Ok(task) => task,
            Err(e) => {
                store.set_pending(
                    chat_id,
                    PendingAction::AwaitingTaskText {
                        project_id: project_id.to_string(),
                    },
                );
                return vec![format!(
                    "I could not understand the task ({e}). Please describe it again."
                )];
            }
        };

        let due = task
            .start_time
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        match self
            .todoist
            .create_task(&token, &task.title, project_id, due.as_deref())
            .await
        {
            Ok(created) => vec![format!("Task '{}' was added to the project.", created.content)],
            Err(e) => vec![format!("Failed to create the task: {e}")],
        }
    }

    /// Extraction failed: explain, and keep the conversation at the same
    /// step so the user can simply restate the event.
    fn reprompt_event(
        &self,
        store: &mut SessionStore,
        chat_id: ChatId,
        error: CoreError,
    ) -> Vec<String> {
        store.set_pending(chat_id, PendingAction::AwaitingEventText);
        match error {
            CoreError::Date(e) => vec![format!(
                "I could not work out the date ({e}). Please describe the event again."
            )],
            e => vec![format!(
                "Could not analyze the message ({e}). Please describe the event again."
            )],
        }
    }

    /// Timestamps go to the calendar with the configured fixed UTC offset.
    fn rfc3339(&self, dt: NaiveDateTime) -> String {
        format!("{}{}", dt.format("%Y-%m-%dT%H:%M:%S"), self.config.utc_offset)
    }
}

#[derive(Clone, Copy)]
enum Linked {
    Google,
    Todoist,
}

const NOT_LINKED_GOOGLE: &str = "You are not linked to Google Calendar. Use /setup.";
const NOT_LINKED_TODOIST: &str = "You are not linked to Todoist. Use /setup.";

/// Parse a 1-based list choice into a 0-based index.
fn parse_choice(text: &str, len: usize) -> Option<usize> {
    let n: usize = text.trim().parse().ok()?;
    if n >= 1 && n <= len {
        Some(n - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_choice_accepts_one_based_numbers() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice(" 3 ", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("two", 3), None);
    }
}
