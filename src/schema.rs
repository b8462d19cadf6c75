use crate::error::{ReportError, Result};
use crate::utils::{parse_amount, parse_timestamp};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One row of the source transactions table.
///
/// Fields are kept as they arrive from the dataset: `date` may be a plain ISO
/// date or an ISO timestamp, `amount` may carry a `$` sign, and `mcc` is the
/// merchant category code in string form. Coercion happens when a row is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub client_id: i64,
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_string")]
    pub mcc: String,
}

impl Transaction {
    pub fn new(
        client_id: i64,
        date: impl Into<String>,
        amount: impl Into<String>,
        mcc: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            date: date.into(),
            amount: amount.into(),
            mcc: mcc.into(),
        }
    }

    /// Numeric amount, or `None` when the raw value cannot be coerced.
    pub fn amount_value(&self) -> Option<f64> {
        parse_amount(&self.amount)
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawField::deserialize(deserializer)? {
        RawField::Int(v) => v.to_string(),
        RawField::Float(v) => v.to_string(),
        RawField::Text(v) => v,
    })
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses a `YYYY-MM-DD` pair, rejecting malformed or reversed bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ReportError::InvalidDateRange(format!(
                    "'{}' is not a valid date. Expected YYYY-MM-DD",
                    raw
                ))
            })
        };
        let range = Self::new(parse(start)?, parse(end)?);
        range.ensure_ordered()?;
        Ok(range)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn ensure_ordered(&self) -> Result<()> {
        if self.is_ordered() {
            Ok(())
        } else {
            Err(ReportError::InvalidDateRange(format!(
                "start {} is after end {}",
                self.start, self.end
            )))
        }
    }

    /// Number of days from start to end (`end - start`, not counting both ends).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Both bounds are taken at midnight, so a timestamp later in the day on
    /// `end` falls outside the range.
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let day = ts.date();
        let at_midnight = ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0;
        day >= self.start && (day < self.end || (day == self.end && at_midnight))
    }

    /// Compares the raw `date` text against the `YYYY-MM-DD` bounds as strings.
    /// Any time component sorts after the bare end date, so every timestamp on
    /// `end`, midnight included, falls outside the range.
    pub fn contains_iso_text(&self, raw: &str) -> bool {
        let start = self.start.format("%Y-%m-%d").to_string();
        let end = self.end.format("%Y-%m-%d").to_string();
        raw >= start.as_str() && raw <= end.as_str()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} a {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EarningsExpenses {
    #[serde(rename = "Earnings")]
    pub earnings: f64,
    #[serde(rename = "Expenses")]
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySummaryRow {
    /// `None` when the category code has no entry in the lookup table.
    #[serde(rename = "Expenses Type")]
    pub category: Option<String>,
    #[serde(rename = "Total Amount")]
    pub total: f64,
    #[serde(rename = "Average")]
    pub average: f64,
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Num. Transactions")]
    pub transactions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Granularity {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashFlowRow {
    /// `YYYY-MM` for monthly buckets, the closing Sunday as `YYYY-MM-DD` for weekly ones.
    #[serde(rename = "Date")]
    pub period: String,
    #[serde(rename = "Inflows")]
    pub inflows: f64,
    #[serde(rename = "Outflows")]
    pub outflows: f64,
    #[serde(rename = "Net Cash Flow")]
    pub net: f64,
    #[serde(rename = "% Savings")]
    pub savings_pct: f64,
}

/// What the report agent hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub start_date: String,
    pub end_date: String,
    pub client_id: i64,
    pub create_report: bool,
    #[serde(skip)]
    pub report_path: Option<PathBuf>,
}
