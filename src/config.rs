use crate::cash_flow::DEFAULT_WEEKLY_THRESHOLD_DAYS;
use crate::error::{ReportError, Result};
use crate::schema::DateRange;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered mapping from ordinal month words to month numbers.
///
/// Order matters: the date extractor takes the first entry whose word occurs
/// anywhere in the request text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthTable {
    #[schemars(description = "Ordered (word, month) pairs. The first word found in the text wins.")]
    pub entries: Vec<MonthWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthWord {
    pub word: String,
    #[schemars(description = "Month number, 1 = January")]
    pub month: u32,
}

impl MonthTable {
    pub fn new(entries: Vec<(&str, u32)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(word, month)| MonthWord {
                    word: word.to_string(),
                    month,
                })
                .collect(),
        }
    }

    /// First table entry whose word is a substring of `text`.
    pub fn first_match(&self, text: &str) -> Option<&MonthWord> {
        self.entries.iter().find(|entry| text.contains(&entry.word))
    }

    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ReportError::InvalidConfig(
                "month table must contain at least one entry".to_string(),
            ));
        }
        for entry in &self.entries {
            if entry.word.is_empty() {
                return Err(ReportError::InvalidConfig(
                    "month table contains an empty word".to_string(),
                ));
            }
            if !(1..=12).contains(&entry.month) {
                return Err(ReportError::InvalidConfig(format!(
                    "month word '{}' maps to {}: must be between 1 and 12",
                    entry.word, entry.month
                )));
            }
        }
        Ok(())
    }
}

impl Default for MonthTable {
    /// Spanish and English ordinals, Spanish first for each month.
    fn default() -> Self {
        Self::new(vec![
            ("primer", 1),
            ("first", 1),
            ("segundo", 2),
            ("second", 2),
            ("tercer", 3),
            ("third", 3),
            ("cuarto", 4),
            ("fourth", 4),
            ("quinto", 5),
            ("fifth", 5),
            ("sexto", 6),
            ("sixth", 6),
            ("séptimo", 7),
            ("seventh", 7),
            ("octavo", 8),
            ("eighth", 8),
            ("noveno", 9),
            ("ninth", 9),
            ("décimo", 10),
            ("tenth", 10),
            ("undécimo", 11),
            ("eleventh", 11),
            ("duodécimo", 12),
            ("twelfth", 12),
        ])
    }
}

/// Where charts and reports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputPaths {
    pub reports_dir: PathBuf,
    pub earnings_chart: PathBuf,
    pub expenses_chart: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            earnings_chart: PathBuf::from("reports/figures/earnings_and_expenses.png"),
            expenses_chart: PathBuf::from("reports/figures/expenses_summary.png"),
        }
    }
}

impl OutputPaths {
    /// All outputs rooted under `dir` with the default file names.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            reports_dir: dir.to_path_buf(),
            earnings_chart: dir.join("figures").join("earnings_and_expenses.png"),
            expenses_chart: dir.join("figures").join("expenses_summary.png"),
        }
    }

    pub fn report_path(&self, client_id: i64, range: &DateRange) -> PathBuf {
        self.reports_dir.join(format!(
            "reporte_cliente_{}_{}_{}.pdf",
            client_id,
            range.start.format("%Y%m%d"),
            range.end.format("%Y%m%d")
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    #[schemars(description = "Ordinal month words recognised in report requests")]
    pub month_table: MonthTable,

    pub paths: OutputPaths,

    #[schemars(
        description = "Cash-flow ranges spanning more days than this are bucketed by month, otherwise by week"
    )]
    pub weekly_threshold_days: i64,

    #[schemars(description = "Model name passed to the text-generation service")]
    pub model: String,

    #[schemars(description = "Sampling temperature for the text-generation service")]
    pub temperature: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            month_table: MonthTable::default(),
            paths: OutputPaths::default(),
            weekly_threshold_days: DEFAULT_WEEKLY_THRESHOLD_DAYS,
            model: "llama3.2:1b".to_string(),
            temperature: 0.0,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.month_table.validate()?;
        if self.weekly_threshold_days < 0 {
            return Err(ReportError::InvalidConfig(format!(
                "weekly_threshold_days must not be negative, got {}",
                self.weekly_threshold_days
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ReportError::InvalidConfig(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
