//! Natural-language event/task extraction pipeline.
//!
//! Flow: user text -> completion client (one network call) -> reply parser
//! (total function) -> date resolver (pure) -> [`NormalizedEvent`].

pub mod client;
pub mod parser;
pub mod resolver;

pub use client::{CompletionClient, ExtractionMode};
pub use parser::{parse_reply, ParsedEvent, UNKNOWN_TITLE};
pub use resolver::{classify, resolve, DateExpression};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, DateError};

/// Already-ISO timestamps from the model are passed through unresolved.
static ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").unwrap());

/// Final output of the extraction pipeline.
///
/// `end_time` stays `None` when the end expression is absent or explicitly
/// "not specified"; defaulting it to the start time is the caller's policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    pub title: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

/// Resolve one raw expression: ISO literals pass through, everything else
/// goes through the rule cascade.
fn resolve_expr(expr: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>, DateError> {
    if let Some(m) = ISO_RE.find(expr) {
        let parsed = NaiveDateTime::parse_from_str(m.as_str(), "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| DateError::InvalidDate {
                expr: expr.to_string(),
            })?;
        return Ok(Some(parsed));
    }
    resolver::resolve(expr, now)
}

/// Turn a parsed reply into a normalized event against a clock snapshot.
pub fn normalize(parsed: ParsedEvent, now: NaiveDateTime) -> Result<NormalizedEvent, DateError> {
    let start_time = match &parsed.start_expr {
        Some(expr) => resolve_expr(expr, now)?,
        None => None,
    };
    let end_time = match &parsed.end_expr {
        Some(expr) => resolve_expr(expr, now)?,
        None => None,
    };
    Ok(NormalizedEvent {
        title: parsed.title,
        start_time,
        end_time,
    })
}

impl CompletionClient {
    /// The single public entry point of the extraction core: raw utterance
    /// in, normalized `{title, start, end}` out.
    ///
    /// `now` is injected rather than read from the system clock so that
    /// relative-date resolution stays deterministic under test.
    pub async fn extract_details(
        &self,
        raw_text: &str,
        mode: ExtractionMode,
        now: NaiveDateTime,
    ) -> Result<NormalizedEvent, CoreError> {
        let reply = self.complete(raw_text, mode).await?;
        let parsed = parse_reply(&reply);
        Ok(normalize(parsed, now)?)
    }
}
