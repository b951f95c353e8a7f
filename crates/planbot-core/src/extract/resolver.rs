//! Resolution of natural-language date expressions to absolute timestamps.
//!
//! An ordered list of matchers classifies an expression into a
//! [`DateExpression`]; resolution then turns the variant into a concrete
//! `NaiveDateTime` against a caller-supplied clock snapshot. The order is
//! load-bearing: a badly formatted completion reply can contain both a
//! weekday word and a date literal, and the first matching branch wins.
//!
//! Resolution is a pure function of `(expression, now)`. Callers supply
//! `now` explicitly so relative dates stay deterministic under test.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DateError;

static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{1,2})\s+(января|февраля|марта|апреля|мая|июня|июля|августа|сентября|октября|ноября|декабря)",
    )
    .unwrap()
});
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})\s+года").unwrap());
static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

/// Weekday stems, inflection-tolerant ("в пятницу", "до пятницы").
const WEEKDAYS: &[(&str, Weekday)] = &[
    ("понедельник", Weekday::Mon),
    ("вторник", Weekday::Tue),
    ("сред", Weekday::Wed),
    ("четверг", Weekday::Thu),
    ("пятниц", Weekday::Fri),
    ("суббот", Weekday::Sat),
    ("воскресень", Weekday::Sun),
];

const MONTHS: &[&str] = &[
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// A classified natural-language date/time fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpression {
    /// Explicit "не указан" marker from the model.
    Unspecified,
    /// Today (0), tomorrow (+1) or day after tomorrow (+2).
    RelativeDay { offset: i64 },
    /// A named weekday; always means the next future occurrence.
    Weekday(Weekday),
    /// "<day> <month-name>", with an optional explicit "<yyyy> года".
    MonthDay {
        day: u32,
        month: u32,
        year: Option<i32>,
    },
    /// `D.M.YYYY` literal with an optional trailing `HH:MM`.
    Numeric {
        day: u32,
        month: u32,
        year: i32,
        time: Option<(u32, u32)>,
    },
}

/// Classify an expression by trying each matcher in cascade order.
///
/// Fails with [`DateError::Unrecognized`] when nothing matches, or with
/// [`DateError::InvalidTime`] when a numeric date literal carries a time
/// component that is present but unparsable.
pub fn classify(expr: &str) -> Result<DateExpression, DateError> {
    let s = normalize(expr);
    let lower = s.to_lowercase();

    if lower.contains("не указан") {
        return Ok(DateExpression::Unspecified);
    }
    // "послезавтра" contains "завтра"; check the longer keyword first.
    if lower.contains("послезавтра") {
        return Ok(DateExpression::RelativeDay { offset: 2 });
    }
    if lower.contains("завтра") {
        return Ok(DateExpression::RelativeDay { offset: 1 });
    }
    if lower.contains("сегодня") {
        return Ok(DateExpression::RelativeDay { offset: 0 });
    }
    if let Some(weekday) = match_weekday(&lower) {
        return Ok(DateExpression::Weekday(weekday));
    }
    if let Some(caps) = MONTH_DAY_RE.captures(&lower) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month = month_number(&caps[2]);
        let year = YEAR_RE
            .captures(&lower)
            .and_then(|c| c[1].parse::<i32>().ok());
        return Ok(DateExpression::MonthDay { day, month, year });
    }
    if NUMERIC_DATE_RE.is_match(&s) {
        return classify_numeric(&s);
    }

    Err(DateError::Unrecognized(expr.to_string()))
}

/// Resolve an expression to an absolute timestamp.
///
/// Returns `Ok(None)` for the explicit "not specified" marker. Resolved
/// values carry zero seconds and sub-second precision.
pub fn resolve(expr: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>, DateError> {
    let classified = classify(expr)?;
    resolve_classified(&classified, expr, now)
}

/// Resolve an already-classified expression.
///
/// `original` is the full expression string: after the date branch fixes the
/// day, a second independent scan for an `HH:MM` substring runs over the
/// whole expression, because date and time phrases are not co-located in all
/// reply shapes the model produces.
pub fn resolve_classified(
    classified: &DateExpression,
    original: &str,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, DateError> {
    let date: NaiveDate = match classified {
        DateExpression::Unspecified => return Ok(None),
        // The numeric branch carries its own time component and skips the
        // overlay scan entirely.
        DateExpression::Numeric {
            day,
            month,
            year,
            time,
        } => {
            let date = NaiveDate::from_ymd_opt(*year, *month, *day).ok_or_else(|| {
                DateError::InvalidDate {
                    expr: original.to_string(),
                }
            })?;
            let (hour, minute) = time.unwrap_or((0, 0));
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                DateError::InvalidTime {
                    expr: original.to_string(),
                    reason: format!("{hour:02}:{minute:02} is out of range"),
                }
            })?;
            return Ok(Some(date.and_time(time)));
        }
        DateExpression::RelativeDay { offset } => (now + Duration::days(*offset)).date(),
        DateExpression::Weekday(target) => {
            let mut ahead = (target.num_days_from_monday() as i64
                - now.weekday().num_days_from_monday() as i64
                + 7)
                % 7;
            // Naming today's weekday always means next week, never today.
            if ahead == 0 {
                ahead = 7;
            }
            (now + Duration::days(ahead)).date()
        }
        DateExpression::MonthDay { day, month, year } => {
            let year = year.unwrap_or_else(|| infer_year(*day, *month, now));
            NaiveDate::from_ymd_opt(year, *month, *day).ok_or_else(|| DateError::InvalidDate {
                expr: original.to_string(),
            })?
        }
    };

    let time = overlay_time(original)?.unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    Ok(Some(date.and_time(time)))
}

/// Trim whitespace and strip one trailing punctuation character left over
/// from the reply's field terminator.
fn normalize(expr: &str) -> String {
    let trimmed = expr.trim();
    trimmed
        .strip_suffix(['.', ','])
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

fn match_weekday(lower: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(stem, _)| lower.contains(stem))
        .map(|(_, weekday)| *weekday)
}

fn month_number(genitive: &str) -> u32 {
    MONTHS
        .iter()
        .position(|m| *m == genitive)
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

/// Year inference for "<day> <month-name>" without an explicit year: assume
/// next calendar year, unless the date falls in the trailing week of the
/// current December (users naming a near-term December date almost always
/// mean the current one).
fn infer_year(day: u32, month: u32, now: NaiveDateTime) -> i32 {
    if month == 12 && (23..=31).contains(&day) {
        now.year()
    } else {
        now.year() + 1
    }
}

fn classify_numeric(s: &str) -> Result<DateExpression, DateError> {
    let caps = NUMERIC_DATE_RE
        .captures(s)
        .ok_or_else(|| DateError::Unrecognized(s.to_string()))?;
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year: i32 = caps[3].parse().unwrap_or(0);

    let rest = s[caps.get(0).map(|m| m.end()).unwrap_or(s.len())..]
        .trim_start_matches([',', ' '])
        .trim();
    let time = if rest.is_empty() {
        None
    } else {
        // A trailing token exists: it must be a well-formed HH:MM. Silently
        // guessing a wrong time for a literal the user typed exactly is
        // worse than failing loudly.
        let caps = TIME_RE.captures(rest).ok_or_else(|| DateError::InvalidTime {
            expr: s.to_string(),
            reason: format!("expected HH:MM, got {rest:?}"),
        })?;
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps[2].parse().unwrap_or(99);
        if hour > 23 || minute > 59 {
            return Err(DateError::InvalidTime {
                expr: s.to_string(),
                reason: format!("{hour:02}:{minute:02} is out of range"),
            });
        }
        Some((hour, minute))
    };

    Ok(DateExpression::Numeric {
        day,
        month,
        year,
        time,
    })
}

/// Scan the whole expression for an `HH:MM` time of day.
fn overlay_time(expr: &str) -> Result<Option<NaiveTime>, DateError> {
    match TIME_RE.captures(expr) {
        None => Ok(None),
        Some(caps) => {
            let hour: u32 = caps[1].parse().unwrap_or(99);
            let minute: u32 = caps[2].parse().unwrap_or(99);
            let time =
                NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| DateError::InvalidTime {
                    expr: expr.to_string(),
                    reason: format!("{hour:02}:{minute:02} is out of range"),
                })?;
            Ok(Some(time))
        }
    }
}
