//! # Client Financial Reports
//!
//! A library for summarising one client's card transactions over a date range
//! and turning free-text report requests into narrative PDF reports.
//!
//! ## Core Concepts
//!
//! - **Transactions**: Raw rows (`client_id`, `date`, `amount`, `mcc`) as they come from the dataset
//! - **Date Range**: Inclusive calendar bounds, either given directly or extracted from a request
//! - **Earnings and Expenses**: Signed totals of the client's positive and negative amounts
//! - **Expense Categories**: Per-category spend statistics keyed by merchant category code
//! - **Cash Flow**: Weekly or monthly inflows, outflows, net flow and savings rate
//! - **Report Agent**: Request text in, narrative PDF out, through pluggable generator and writer seams
//!
//! ## Example
//!
//! ```rust,ignore
//! use client_financial_reports::*;
//!
//! let transactions = load_transactions("data/transactions.csv")?;
//! let catalog = MccCatalog::from_json_file("data/mcc_codes.json")?;
//! let range = DateRange::parse("2021-01-01", "2021-03-31")?;
//!
//! let reporter = ClientReporter::new(&ReportConfig::default(), PngChartRenderer::default());
//! let totals = reporter.earnings_and_expenses(&transactions, 126, &range)?;
//! let categories = reporter.expenses_summary(&transactions, 126, &range, &catalog)?;
//! let flow = reporter.cash_flow_summary(&transactions, 126, &range);
//! ```

pub mod agent;
pub mod cash_flow;
pub mod categories;
pub mod charts;
pub mod config;
pub mod dates;
pub mod earnings;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod llm;
pub mod pdf;
pub mod schema;
pub mod utils;

pub use agent::ReportAgent;
pub use cash_flow::{cash_flow_summary, CashFlowAggregator};
pub use categories::{expenses_chart, expenses_summary, UNKNOWN_CATEGORY_LABEL};
pub use charts::{Bar, BarChart, ChartRenderer, PngChartRenderer, SvgChartRenderer};
pub use config::{MonthTable, MonthWord, OutputPaths, ReportConfig};
pub use dates::{DateExtractor, DateStrategy, IsoPairStrategy, OrdinalMonthStrategy};
pub use earnings::{earnings_and_expenses, earnings_chart};
pub use error::{ReportError, Result};
pub use filter::{select_client_window, select_client_window_by, DateBound, SelectedRow};
pub use ingestion::*;
pub use llm::{narrative_prompt, TextGenerator};
pub use pdf::{NarrativeReport, PdfReportWriter, ReportWriter};
pub use schema::*;
pub use utils::*;

#[cfg(feature = "ollama")]
pub use llm::OllamaClient;

use log::info;

/// Runs the client aggregations and persists the charts that go with them.
///
/// Chart paths and the cash-flow threshold come from [`ReportConfig`]; the
/// renderer is the plotting seam.
pub struct ClientReporter<C: ChartRenderer = PngChartRenderer> {
    paths: OutputPaths,
    cash_flow: CashFlowAggregator,
    renderer: C,
}

impl<C: ChartRenderer> ClientReporter<C> {
    pub fn new(config: &ReportConfig, renderer: C) -> Self {
        Self {
            paths: config.paths.clone(),
            cash_flow: CashFlowAggregator::new(config.weekly_threshold_days),
            renderer,
        }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn earnings_and_expenses(
        &self,
        transactions: &[Transaction],
        client_id: i64,
        range: &DateRange,
    ) -> Result<EarningsExpenses> {
        info!("Client {}: earnings and expenses for {}", client_id, range);
        let result = earnings::earnings_and_expenses(transactions, client_id, range);
        self.renderer
            .render(&earnings_chart(&result), &self.paths.earnings_chart)?;
        Ok(result)
    }

    pub fn expenses_summary<L>(
        &self,
        transactions: &[Transaction],
        client_id: i64,
        range: &DateRange,
        lookup: &L,
    ) -> Result<Vec<CategorySummaryRow>>
    where
        L: CategoryLookup + ?Sized,
    {
        info!("Client {}: expenses by category for {}", client_id, range);
        let rows = categories::expenses_summary(transactions, client_id, range, lookup);
        self.renderer.render(
            &expenses_chart(&rows, client_id, range),
            &self.paths.expenses_chart,
        )?;
        Ok(rows)
    }

    /// Cash flow has no chart; this only applies the configured threshold.
    pub fn cash_flow_summary(
        &self,
        transactions: &[Transaction],
        client_id: i64,
        range: &DateRange,
    ) -> Vec<CashFlowRow> {
        info!("Client {}: cash flow for {}", client_id, range);
        self.cash_flow.summarize(transactions, client_id, range)
    }
}

impl Default for ClientReporter<PngChartRenderer> {
    fn default() -> Self {
        Self::new(&ReportConfig::default(), PngChartRenderer::default())
    }
}
