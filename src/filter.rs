use crate::schema::{DateRange, Transaction};
use chrono::NaiveDateTime;
use log::{debug, warn};

/// A transaction that passed the client/date filter, with its coerced fields.
#[derive(Debug, Clone, Copy)]
pub struct SelectedRow<'a> {
    pub transaction: &'a Transaction,
    pub timestamp: NaiveDateTime,
    /// `None` when the raw amount could not be coerced.
    pub amount: Option<f64>,
}

/// How a row's date is tested against a [`DateRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateBound {
    /// Parsed timestamp against midnight bounds, see [`DateRange::contains`].
    #[default]
    Timestamp,
    /// Raw date text against the ISO bounds, see [`DateRange::contains_iso_text`].
    IsoText,
}

impl DateBound {
    fn admits(self, range: &DateRange, transaction: &Transaction, ts: &NaiveDateTime) -> bool {
        match self {
            DateBound::Timestamp => range.contains(ts),
            DateBound::IsoText => range.contains_iso_text(&transaction.date),
        }
    }
}

/// Rows belonging to `client_id` whose date lies inside `range`, in input order.
/// Rows with an unparsable date never match.
pub fn select_client_window<'a>(
    transactions: &'a [Transaction],
    client_id: i64,
    range: &DateRange,
) -> Vec<SelectedRow<'a>> {
    select_client_window_by(transactions, client_id, range, DateBound::Timestamp)
}

/// [`select_client_window`] with an explicit date comparison.
pub fn select_client_window_by<'a>(
    transactions: &'a [Transaction],
    client_id: i64,
    range: &DateRange,
    bound: DateBound,
) -> Vec<SelectedRow<'a>> {
    let mut unparsed_dates = 0usize;
    let mut unparsed_amounts = 0usize;

    let selected: Vec<SelectedRow<'a>> = transactions
        .iter()
        .filter(|t| t.client_id == client_id)
        .filter_map(|t| {
            let Some(timestamp) = t.timestamp() else {
                unparsed_dates += 1;
                return None;
            };
            if !bound.admits(range, t, &timestamp) {
                return None;
            }
            let amount = t.amount_value();
            if amount.is_none() {
                unparsed_amounts += 1;
            }
            Some(SelectedRow {
                transaction: t,
                timestamp,
                amount,
            })
        })
        .collect();

    if unparsed_dates > 0 {
        warn!(
            "Client {}: skipped {} rows with unparsable dates",
            client_id, unparsed_dates
        );
    }
    if unparsed_amounts > 0 {
        warn!(
            "Client {}: {} rows in range have unparsable amounts and are left out of totals",
            client_id, unparsed_amounts
        );
    }
    debug!(
        "Client {}: selected {} of {} rows for {}",
        client_id,
        selected.len(),
        transactions.len(),
        range
    );

    selected
}
