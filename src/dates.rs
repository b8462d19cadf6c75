//! Turns a free-text report request into a date range.
//!
//! Two strategies run in order: an ordinal month word plus a four-digit year
//! ("el segundo mes de 2021"), then an explicit pair of ISO dates
//! ("from 2021-05-01 to 2021-05-31"). The first strategy that yields a range wins.

use crate::config::{MonthTable, ReportConfig};
use crate::error::{ReportError, Result};
use crate::schema::DateRange;
use crate::utils::fixed_month_end;
use chrono::NaiveDate;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{4}").expect("invalid year regex"))
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("invalid iso date regex"))
}

pub trait DateStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, text: &str) -> Option<DateRange>;
}

/// Whole-month ranges from ordinal month words.
///
/// The first table entry found anywhere in the text picks the month, and the
/// first run of four digits picks the year. The month ends on the fixed
/// calendar rule in [`fixed_month_end`], so February always ends on the 28th.
#[derive(Debug, Clone)]
pub struct OrdinalMonthStrategy {
    table: MonthTable,
}

impl OrdinalMonthStrategy {
    pub fn new(table: MonthTable) -> Self {
        Self { table }
    }
}

impl DateStrategy for OrdinalMonthStrategy {
    fn name(&self) -> &'static str {
        "ordinal-month"
    }

    fn extract(&self, text: &str) -> Option<DateRange> {
        let entry = self.table.first_match(text)?;
        let year: i32 = year_regex().find(text)?.as_str().parse().ok()?;
        let start = NaiveDate::from_ymd_opt(year, entry.month, 1)?;
        let end = fixed_month_end(year, entry.month)?;
        Some(DateRange::new(start, end))
    }
}

/// Exactly two `YYYY-MM-DD` dates, taken in the order they appear.
#[derive(Debug, Clone, Default)]
pub struct IsoPairStrategy;

impl DateStrategy for IsoPairStrategy {
    fn name(&self) -> &'static str {
        "iso-pair"
    }

    fn extract(&self, text: &str) -> Option<DateRange> {
        let found: Vec<&str> = iso_date_regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        if found.len() != 2 {
            return None;
        }
        let start = NaiveDate::parse_from_str(found[0], "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(found[1], "%Y-%m-%d").ok()?;
        Some(DateRange::new(start, end))
    }
}

pub struct DateExtractor {
    strategies: Vec<Box<dyn DateStrategy + Send + Sync>>,
}

impl DateExtractor {
    pub fn new(table: MonthTable) -> Self {
        Self {
            strategies: vec![
                Box::new(OrdinalMonthStrategy::new(table)),
                Box::new(IsoPairStrategy),
            ],
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.month_table.clone())
    }

    pub fn with_strategies(strategies: Vec<Box<dyn DateStrategy + Send + Sync>>) -> Self {
        Self { strategies }
    }

    /// Range from the first strategy that recognises the text, or `None`.
    pub fn extract(&self, text: &str) -> Option<DateRange> {
        for strategy in &self.strategies {
            if let Some(range) = strategy.extract(text) {
                debug!(
                    "Date strategy '{}' resolved {} to {}",
                    strategy.name(),
                    range.start,
                    range.end
                );
                return Some(range);
            }
        }
        None
    }

    /// Like [`DateExtractor::extract`], but a miss is a [`ReportError::DateNotFound`].
    pub fn require(&self, text: &str) -> Result<DateRange> {
        self.extract(text)
            .ok_or_else(|| ReportError::DateNotFound(text.to_string()))
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new(MonthTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_spanish_ordinal_month() {
        let extractor = DateExtractor::default();
        let range = extractor
            .extract("Quiero un informe del segundo mes de 2021, por favor")
            .unwrap();
        assert_eq!(range, DateRange::new(date(2021, 2, 1), date(2021, 2, 28)));
    }

    #[test]
    fn test_february_ignores_leap_years() {
        let extractor = DateExtractor::default();
        let range = extractor.extract("second month of 2024").unwrap();
        assert_eq!(range.end, date(2024, 2, 28));
    }

    #[test]
    fn test_month_lengths() {
        let extractor = DateExtractor::default();
        assert_eq!(
            extractor.extract("the sixth month of 2022").unwrap().end,
            date(2022, 6, 30)
        );
        assert_eq!(
            extractor.extract("the twelfth month of 2022").unwrap().end,
            date(2022, 12, 31)
        );
    }

    #[test]
    fn test_first_table_entry_wins() {
        let extractor = DateExtractor::default();
        // Both "first" and "third" appear; "first" comes earlier in the table.
        let range = extractor
            .extract("compare the third month with the first month of 2020")
            .unwrap();
        assert_eq!(range.start, date(2020, 1, 1));

        // "undécimo" contains "décimo", which precedes it in the table.
        let range = extractor.extract("undécimo mes de 2020").unwrap();
        assert_eq!(range.start, date(2020, 10, 1));
    }

    #[test]
    fn test_year_is_first_four_digit_run() {
        let extractor = DateExtractor::default();
        let range = extractor
            .extract("cliente 12345, cuarto mes de 2021")
            .unwrap();
        assert_eq!(range.start, date(1234, 4, 1));
    }

    #[test]
    fn test_month_word_takes_precedence_over_iso_pair() {
        let extractor = DateExtractor::default();
        let range = extractor
            .extract("first half: 2021-01-01 until 2021-06-30")
            .unwrap();
        assert_eq!(range, DateRange::new(date(2021, 1, 1), date(2021, 1, 31)));
    }

    #[test]
    fn test_month_word_without_year_does_not_match() {
        let extractor = DateExtractor::default();
        assert!(extractor.extract("report for the first days").is_none());
    }

    #[test]
    fn test_iso_pair() {
        let extractor = DateExtractor::default();
        let range = extractor
            .extract("Report between 2021-05-01 and 2021-05-31")
            .unwrap();
        assert_eq!(range, DateRange::new(date(2021, 5, 1), date(2021, 5, 31)));
    }

    #[test]
    fn test_iso_pair_keeps_source_order() {
        let range = IsoPairStrategy
            .extract("from 2021-05-31 back to 2021-05-01")
            .unwrap();
        assert_eq!(range.start, date(2021, 5, 31));
        assert_eq!(range.end, date(2021, 5, 1));
    }

    #[test]
    fn test_iso_pair_requires_exactly_two() {
        let strategy = IsoPairStrategy;
        assert!(strategy.extract("only 2021-05-01").is_none());
        assert!(strategy
            .extract("2021-05-01, 2021-05-15 and 2021-05-31")
            .is_none());
        assert!(strategy.extract("2021-13-01 to 2021-14-01").is_none());
    }

    #[test]
    fn test_nothing_found() {
        let extractor = DateExtractor::default();
        assert!(extractor.extract("give me a report").is_none());
        assert!(matches!(
            extractor.require("give me a report"),
            Err(ReportError::DateNotFound(_))
        ));
    }
}
