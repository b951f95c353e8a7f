//! # Planbot Core Library
//!
//! This library provides the core logic for Planbot, a conversational
//! assistant that turns free-form chat messages into Google Calendar events
//! and Todoist tasks. The chat transport is a thin layer on top; everything
//! with behavior lives here.
//!
//! ## Architecture
//!
//! - **Extraction**: a completion-service client pulls a title plus textual
//!   start/end expressions out of user text, and a deterministic resolver
//!   turns relative Russian date expressions ("завтра", "в пятницу",
//!   "14 декабря") into absolute timestamps
//! - **Integrations**: REST wrappers for Google Calendar and Todoist plus
//!   OAuth authorization-code helpers
//! - **Assistant**: transport-agnostic chat command router with a per-chat
//!   conversation state machine
//! - **Storage**: TOML-based configuration, in-memory per-chat session store
//!
//! ## Key Components
//!
//! - [`extract::CompletionClient`]: completion-service round trips
//! - [`extract::resolver`]: the date resolution rule cascade
//! - [`Assistant`]: chat command layer
//! - [`SessionStore`]: per-chat tokens and pending conversation state

pub mod assistant;
pub mod config;
pub mod error;
pub mod extract;
pub mod integrations;
pub mod session;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{ConfigError, CoreError, DateError, ExtractionError, ServiceError};
pub use extract::{ExtractionMode, NormalizedEvent};
pub use session::{ChatId, PendingAction, SessionStore};
