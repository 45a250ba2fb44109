//! Timestamp parsing and rendering.
//!
//! Every format carries its own timestamp grammar. Reading goes through an ordered fallback
//! chain so that a bad date never loses a note:
//!
//! 1. strict parse against the format's [`DateGrammar`]
//! 2. loose parse against a table of common layouts (after whitespace cleanup)
//! 3. the injected clock's current instant
//!
//! Offset-less timestamps are taken to be UTC.

use crate::clock::Clock;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const ENEX_LAYOUT: &str = "%Y%m%dT%H%M%SZ";
const KEEP_LAYOUTS: &[&str] = &["%b %d, %Y, %I:%M:%S %p", "%b %d, %Y, %I:%M %p"];
const KEEP_RENDER: &str = "%b %-d, %Y, %-I:%M:%S %p";

const NAIVE_LAYOUTS: &[&str] = &[
    "%b %d %Y %I:%M:%S %p",
    "%b %d %Y %I:%M %p",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%a %b %d %H:%M:%S %z %Y",
];

static YEAR_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}),").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Timestamp grammar native to a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGrammar {
    /// `20210103T101500Z`
    Enex,
    /// `Jan 3, 2021, 10:15:00 AM`
    Keep,
    /// RFC 3339, used in Markdown front matter
    Iso8601,
}

impl DateGrammar {
    /// Parse `raw` against this grammar only.
    pub fn parse_strict(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        match self {
            DateGrammar::Enex => naive_utc(raw, ENEX_LAYOUT),
            DateGrammar::Keep => KEEP_LAYOUTS.iter().find_map(|layout| naive_utc(raw, layout)),
            DateGrammar::Iso8601 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Render an instant in this grammar. Always succeeds.
    pub fn render(&self, instant: &DateTime<Utc>) -> String {
        match self {
            DateGrammar::Enex => instant.format(ENEX_LAYOUT).to_string(),
            DateGrammar::Keep => instant.format(KEEP_RENDER).to_string(),
            DateGrammar::Iso8601 => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    fn all() -> [DateGrammar; 3] {
        [DateGrammar::Enex, DateGrammar::Keep, DateGrammar::Iso8601]
    }
}

/// Reads timestamps for one format, falling back to the clock when nothing parses.
pub struct DateNormalizer<'a> {
    grammar: DateGrammar,
    clock: &'a dyn Clock,
}

impl<'a> DateNormalizer<'a> {
    pub fn new(grammar: DateGrammar, clock: &'a dyn Clock) -> Self {
        Self { grammar, clock }
    }

    /// Total: returns the clock's current instant when `raw` cannot be read.
    pub fn normalize(&self, raw: &str) -> DateTime<Utc> {
        self.try_normalize(raw).unwrap_or_else(|| {
            log::debug!("unparseable timestamp {raw:?}, using current time");
            self.clock.now()
        })
    }

    /// Strict grammar first, then the loose layout table.
    pub fn try_normalize(&self, raw: &str) -> Option<DateTime<Utc>> {
        self.grammar.parse_strict(raw).or_else(|| parse_loose(raw))
    }
}

/// Best-effort parse of a timestamp in any common layout.
pub fn parse_loose(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = raw.replace(['\u{202f}', '\u{a0}'], " ");
    let cleaned = SPACES.replace_all(cleaned.trim(), " ");
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = DateGrammar::all()
        .iter()
        .find_map(|grammar| grammar.parse_strict(&cleaned))
    {
        return Some(dt);
    }

    let flattened = YEAR_COMMA.replace_all(&cleaned, "$1").replace(',', "");
    let flattened = flattened.trim();
    if let Some(dt) = NAIVE_LAYOUTS.iter().find_map(|layout| naive_utc(flattened, layout)) {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(flattened, layout).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    DATE_LAYOUTS.iter().find_map(|layout| {
        NaiveDate::parse_from_str(flattened, layout)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}

fn naive_utc(raw: &str, layout: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, layout)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use proptest::prelude::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_enex_strict() {
        let dt = DateGrammar::Enex.parse_strict("20210103T101500Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_keep_strict_without_seconds() {
        let dt = DateGrammar::Keep.parse_strict("Jan 3, 2021, 10:15 AM").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_keep_strict_pm_with_seconds() {
        let dt = DateGrammar::Keep.parse_strict("Dec 24, 2019, 9:05:30 PM").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2019, 12, 24, 21, 5, 30).unwrap());
    }

    #[test]
    fn test_keep_narrow_space_goes_through_loose() {
        let clock = clock();
        let normalizer = DateNormalizer::new(DateGrammar::Keep, &clock);
        let dt = normalizer.normalize("Jan 3, 2021, 10:15\u{202f}AM");
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_loose_layouts() {
        let expected = Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap();
        for raw in [
            "2021-01-03T10:15:00Z",
            "2021-01-03 10:15:00",
            "2021-01-03T12:15:00+02:00",
            "Sun, 03 Jan 2021 10:15:00 +0000",
            "January 3, 2021 10:15 AM",
            "01/03/2021 10:15",
        ] {
            assert_eq!(parse_loose(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_loose_date_only_is_midnight() {
        assert_eq!(
            parse_loose("2021-01-03"),
            Some(Utc.with_ymd_and_hms(2021, 1, 3, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_fallback_to_clock() {
        let clock = clock();
        let normalizer = DateNormalizer::new(DateGrammar::Enex, &clock);
        assert_eq!(normalizer.normalize(""), clock.0);
        assert_eq!(normalizer.normalize("yesterday-ish"), clock.0);
    }

    #[test]
    fn test_render_grammars() {
        let dt = Utc.with_ymd_and_hms(2021, 1, 3, 22, 15, 0).unwrap();
        assert_eq!(DateGrammar::Enex.render(&dt), "20210103T221500Z");
        assert_eq!(DateGrammar::Keep.render(&dt), "Jan 3, 2021, 10:15:00 PM");
        assert_eq!(DateGrammar::Iso8601.render(&dt), "2021-01-03T22:15:00Z");
    }

    #[test]
    fn test_render_then_parse_each_grammar() {
        let dt = Utc.with_ymd_and_hms(2022, 11, 30, 0, 5, 9).unwrap();
        for grammar in DateGrammar::all() {
            assert_eq!(grammar.parse_strict(&grammar.render(&dt)), Some(dt));
        }
    }

    proptest! {
        #[test]
        fn normalize_is_total(raw in any::<String>()) {
            let clock = clock();
            for grammar in DateGrammar::all() {
                let _ = DateNormalizer::new(grammar, &clock).normalize(&raw);
            }
        }

        #[test]
        fn normalize_reads_rendered_enex(secs in 0i64..4_000_000_000) {
            let clock = clock();
            let dt = Utc.timestamp_opt(secs, 0).unwrap();
            let normalizer = DateNormalizer::new(DateGrammar::Enex, &clock);
            prop_assert_eq!(normalizer.normalize(&DateGrammar::Enex.render(&dt)), dt);
        }
    }
}
