use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::normalize::contains_word;

pub const DEFAULT_REFERENCE_START_YEAR: i32 = 2024;
const MAX_RELATIVE_SEASONS: u32 = 50;
const START_YEARS: std::ops::RangeInclusive<i32> = 1900..=2099;
// Season rolls over in August.
const SEASON_START_MONTH: u32 = 8;

static YEAR_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:19|20)\d{2})\s*[-/–]\s*(\d{4}|\d{2})\b").expect("valid year range regex")
});

static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"));

static LAST_N_SEASONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:last|past|previous)\s+(\d{1,3}|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty)\s+seasons?\b",
    )
    .expect("valid relative seasons regex")
});

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
    "twenty",
];

/// The season "this season" refers to, identified by its start year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSeason {
    pub start_year: i32,
}

impl Default for ReferenceSeason {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_REFERENCE_START_YEAR,
        }
    }
}

impl ReferenceSeason {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Accepts a start year (`2024`) or a compact code (`2425`, `2324`).
    ///
    /// Any value in 1900..=2099 is read as a start year, so `2021` means
    /// 2021/22 and never the 2020/21 code. Use [`Self::parse_code`] for
    /// codes only.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_start_year(raw).or_else(|| Self::parse_code(raw))
    }

    pub fn parse_start_year(raw: &str) -> Option<Self> {
        let value = four_digits(raw)?;
        START_YEARS.contains(&value).then(|| Self::new(value))
    }

    /// Compact code of two consecutive two-digit years, taken as 20xx.
    pub fn parse_code(raw: &str) -> Option<Self> {
        let value = four_digits(raw)?;
        let start = value / 100;
        let end = value % 100;
        ((start + 1) % 100 == end).then(|| Self::new(2000 + start))
    }

    /// Season in progress on `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= SEASON_START_MONTH {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn previous(self) -> Self {
        Self::new(self.start_year.saturating_sub(1))
    }

    pub fn code(self) -> String {
        season_code_for_start(self.start_year)
    }
}

fn four_digits(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

pub fn two_digit(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// Two-year compact code for a season starting in `year` (`2023` -> `2324`).
pub fn season_code_for_start(year: i32) -> String {
    format!("{}{}", two_digit(year), two_digit(year.rem_euclid(100) + 1))
}

/// Season codes referenced by the query, first matching rule wins:
/// explicit ranges, bare years, "this season", "last season", then
/// "last/past N seasons".
pub fn extract_seasons(raw: &str, normalized: &str, reference: ReferenceSeason) -> Vec<String> {
    let ranges = dedup(YEAR_RANGE.captures_iter(raw).filter_map(|caps| {
        let start: i32 = caps.get(1)?.as_str().parse().ok()?;
        let end_raw = caps.get(2)?.as_str();
        let end: i32 = end_raw.parse().ok()?;
        Some(format!("{}{}", two_digit(start), two_digit(end)))
    }));
    if !ranges.is_empty() {
        debug!(seasons = ?ranges, "season range");
        return ranges;
    }

    let years = dedup(BARE_YEAR.find_iter(raw).filter_map(|m| {
        let year: i32 = m.as_str().parse().ok()?;
        Some(two_digit(year))
    }));
    if !years.is_empty() {
        return years;
    }

    if contains_word(normalized, "this season") {
        return vec![reference.code()];
    }
    if contains_word(normalized, "last season") {
        return vec![reference.previous().code()];
    }

    if let Some(n) = relative_season_count(normalized) {
        let start = reference.start_year;
        return (0..n as i32).rev().map(|back| two_digit(start.saturating_sub(back))).collect();
    }

    Vec::new()
}

fn relative_season_count(normalized: &str) -> Option<u32> {
    let caps = LAST_N_SEASONS.captures(normalized)?;
    let raw = caps.get(1)?.as_str();
    let n = match raw.parse::<u32>() {
        Ok(n) => n,
        Err(_) => NUMBER_WORDS.iter().position(|w| *w == raw)? as u32 + 1,
    };
    (n >= 1).then(|| n.min(MAX_RELATIVE_SEASONS))
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
