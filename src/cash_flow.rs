use crate::filter::select_client_window;
use crate::schema::{CashFlowRow, DateRange, Granularity, Transaction};
use crate::utils::{day_label, month_label, round_cents, week_ending};
use log::debug;
use std::collections::BTreeMap;

pub const DEFAULT_WEEKLY_THRESHOLD_DAYS: i64 = 60;

/// Buckets a client's transactions by calendar week or month and reports
/// inflows, outflows, net cash flow and savings rate per bucket.
#[derive(Debug, Clone, Copy)]
pub struct CashFlowAggregator {
    weekly_threshold_days: i64,
}

impl Default for CashFlowAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WEEKLY_THRESHOLD_DAYS)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    inflows: f64,
    outflows: f64,
}

impl CashFlowAggregator {
    pub fn new(weekly_threshold_days: i64) -> Self {
        Self {
            weekly_threshold_days,
        }
    }

    /// Monthly when `end - start` exceeds the threshold, weekly otherwise.
    pub fn granularity(&self, range: &DateRange) -> Granularity {
        if range.span_days() > self.weekly_threshold_days {
            Granularity::Monthly
        } else {
            Granularity::Weekly
        }
    }

    pub fn summarize(
        &self,
        transactions: &[Transaction],
        client_id: i64,
        range: &DateRange,
    ) -> Vec<CashFlowRow> {
        let granularity = self.granularity(range);
        let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

        for row in select_client_window(transactions, client_id, range) {
            let day = row.timestamp.date();
            let label = match granularity {
                Granularity::Monthly => month_label(day),
                Granularity::Weekly => day_label(week_ending(day)),
            };
            // Rows with unparsable amounts still open their bucket.
            let bucket = buckets.entry(label).or_default();
            match row.amount {
                Some(amount) if amount >= 0.0 => bucket.inflows += amount,
                Some(amount) => bucket.outflows += amount.abs(),
                None => {}
            }
        }

        debug!(
            "Client {}: {} {:?} cash-flow buckets",
            client_id,
            buckets.len(),
            granularity
        );

        buckets
            .into_iter()
            .map(|(period, bucket)| {
                let inflows = round_cents(bucket.inflows);
                let outflows = round_cents(bucket.outflows);
                // Exact on the rounded columns: Net == Inflows - Outflows.
                let net = inflows - outflows;
                let savings_pct = if inflows == 0.0 {
                    0.0
                } else {
                    round_cents(net / inflows * 100.0)
                };
                CashFlowRow {
                    period,
                    inflows,
                    outflows,
                    net,
                    savings_pct,
                }
            })
            .collect()
    }
}

/// Cash-flow summary with the default 60-day weekly threshold.
pub fn cash_flow_summary(
    transactions: &[Transaction],
    client_id: i64,
    range: &DateRange,
) -> Vec<CashFlowRow> {
    CashFlowAggregator::default().summarize(transactions, client_id, range)
}
