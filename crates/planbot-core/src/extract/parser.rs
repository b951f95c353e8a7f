//! Parsing of the completion service's semi-structured reply.
//!
//! The reply grammar is a contract with a non-deterministic system, so
//! nothing here is allowed to fail: missing markers degrade to defaults and
//! the resolver is simply never invoked for the absent field.

use once_cell::sync::Lazy;
use regex::Regex;

/// Title used when the reply carries no recognizable label.
pub const UNKNOWN_TITLE: &str = "Unknown event";

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Событие|Задача):\s*(.+?)\.").unwrap());
/// The prompt asks the model to close the start field with a literal «К»
/// sentinel, since periods can occur inside date expressions like
/// "14.12.2024" and cannot terminate the field.
static START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Начало:\s*(.+?)К").unwrap());
/// The end field is the last one; it runs to the end of the reply.
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)Конец:\s*(.*)").unwrap());

/// Title plus raw date expressions, pre-resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub title: String,
    pub start_expr: Option<String>,
    pub end_expr: Option<String>,
}

/// Best-effort extraction of title and date expressions from a reply.
pub fn parse_reply(text: &str) -> ParsedEvent {
    let title = match TITLE_RE.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => {
            log::warn!("reply carries no event/task label: {text:?}");
            UNKNOWN_TITLE.to_string()
        }
    };
    let start_expr = START_RE.captures(text).map(|caps| caps[1].trim().to_string());
    let end_expr = END_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|expr| !expr.is_empty());

    ParsedEvent {
        title,
        start_expr,
        end_expr,
    }
}
