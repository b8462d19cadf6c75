use crate::config::{OutputPaths, ReportConfig};
use crate::dates::DateExtractor;
use crate::error::Result;
use crate::filter::select_client_window;
use crate::llm::{narrative_prompt, TextGenerator};
use crate::pdf::{NarrativeReport, ReportWriter};
use crate::schema::{ReportOutcome, Transaction};
use log::{debug, info};

/// Turns a free-text request into a narrative PDF report for one client.
///
/// The agent resolves the date range from the request, checks that the
/// client has transactions in it, asks the generator for prose and hands the
/// prose to the writer. With no matching transactions nothing is generated
/// and the outcome carries `create_report: false`.
pub struct ReportAgent<G, W> {
    extractor: DateExtractor,
    paths: OutputPaths,
    generator: G,
    writer: W,
}

impl<G, W> ReportAgent<G, W>
where
    G: TextGenerator,
    W: ReportWriter,
{
    pub fn new(config: &ReportConfig, generator: G, writer: W) -> Self {
        Self {
            extractor: DateExtractor::from_config(config),
            paths: config.paths.clone(),
            generator,
            writer,
        }
    }

    pub fn with_extractor(mut self, extractor: DateExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn run(
        &self,
        transactions: &[Transaction],
        client_id: i64,
        prompt: &str,
    ) -> Result<ReportOutcome> {
        let range = self.extractor.require(prompt)?;
        range.ensure_ordered()?;
        info!("Client {}: report requested for {}", client_id, range);

        let selected = select_client_window(transactions, client_id, &range);
        let mut outcome = ReportOutcome {
            start_date: range.start.format("%Y-%m-%d").to_string(),
            end_date: range.end.format("%Y-%m-%d").to_string(),
            client_id,
            create_report: !selected.is_empty(),
            report_path: None,
        };

        if selected.is_empty() {
            info!(
                "Client {}: no transactions between {}, skipping report",
                client_id, range
            );
            return Ok(outcome);
        }

        debug!(
            "Client {}: {} transactions in range, generating narrative",
            client_id,
            selected.len()
        );
        let body = self
            .generator
            .generate(&narrative_prompt(client_id, &range))?;

        let path = self.paths.report_path(client_id, &range);
        let report = NarrativeReport {
            client_id,
            range,
            body,
        };
        let written = self.writer.write(&report, &path)?;
        info!("Client {}: report written to {}", client_id, written.display());

        outcome.report_path = Some(written);
        Ok(outcome)
    }
}
