//! Property tests for the date resolution cascade.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use proptest::prelude::*;

use planbot_core::extract::resolve;

const WEEKDAY_WORDS: &[(&str, Weekday)] = &[
    ("понедельник", Weekday::Mon),
    ("вторник", Weekday::Tue),
    ("среда", Weekday::Wed),
    ("четверг", Weekday::Thu),
    ("пятница", Weekday::Fri),
    ("суббота", Weekday::Sat),
    ("воскресенье", Weekday::Sun),
];

const MONTH_WORDS: &[&str] = &[
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

fn arb_now() -> impl Strategy<Value = NaiveDateTime> {
    (2015i32..2035, 1u32..=365, 0u32..24, 0u32..60).prop_map(|(year, ordinal, hour, minute)| {
        NaiveDate::from_yo_opt(year, ordinal)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    })
}

proptest! {
    #[test]
    fn weekday_is_always_one_to_seven_days_ahead(
        now in arb_now(),
        idx in 0usize..WEEKDAY_WORDS.len(),
    ) {
        let (word, target) = WEEKDAY_WORDS[idx];
        let resolved = resolve(word, now).unwrap().unwrap();

        let ahead = (resolved.date() - now.date()).num_days();
        prop_assert!((1..=7).contains(&ahead), "ahead was {ahead}");
        prop_assert_eq!(resolved.weekday(), target);
        prop_assert_eq!(resolved.time().num_seconds_from_midnight(), 0);
    }

    #[test]
    fn relative_day_keywords_offset_from_now(
        now in arb_now(),
        choice in 0usize..3,
    ) {
        let (word, offset) = [("сегодня", 0i64), ("завтра", 1), ("послезавтра", 2)][choice];
        let resolved = resolve(word, now).unwrap().unwrap();
        prop_assert_eq!(
            resolved.date(),
            now.date() + chrono::Duration::days(offset)
        );
    }

    #[test]
    fn month_day_year_matches_the_december_window_rule(
        now in arb_now(),
        day in 1u32..=28,
        month_idx in 0usize..12,
    ) {
        let expr = format!("{day} {}", MONTH_WORDS[month_idx]);
        let resolved = resolve(&expr, now).unwrap().unwrap();

        let month = month_idx as u32 + 1;
        let expected_year = if month == 12 && (23..=31).contains(&day) {
            now.year()
        } else {
            now.year() + 1
        };
        prop_assert_eq!(resolved.year(), expected_year);
        prop_assert_eq!(resolved.month(), month);
        prop_assert_eq!(resolved.day(), day);
    }

    #[test]
    fn time_of_day_overlays_any_relative_date(
        now in arb_now(),
        hour in 0u32..24,
        minute in 0u32..60,
    ) {
        let expr = format!("завтра в {hour:02}:{minute:02}");
        let resolved = resolve(&expr, now).unwrap().unwrap();
        prop_assert_eq!(resolved.hour(), hour);
        prop_assert_eq!(resolved.minute(), minute);
        prop_assert_eq!(resolved.second(), 0);
    }

    #[test]
    fn numeric_literal_ignores_the_clock_snapshot(
        now in arb_now(),
        day in 1u32..=28,
        month in 1u32..=12,
        year in 2015i32..2035,
    ) {
        let expr = format!("{day:02}.{month:02}.{year}");
        let resolved = resolve(&expr, now).unwrap().unwrap();
        prop_assert_eq!(
            resolved.date(),
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        );
        prop_assert_eq!(resolved.time().num_seconds_from_midnight(), 0);
    }
}
