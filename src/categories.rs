use crate::charts::{Bar, BarChart};
use crate::filter::select_client_window;
use crate::ingestion::CategoryLookup;
use crate::schema::{CategorySummaryRow, DateRange, Transaction};
use crate::utils::round_cents;
use log::debug;
use std::collections::BTreeMap;

/// Label used in charts for codes missing from the lookup table.
pub const UNKNOWN_CATEGORY_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy)]
struct GroupStats {
    sum: f64,
    count: usize,
    max: f64,
    min: f64,
}

impl GroupStats {
    fn new(amount: f64) -> Self {
        Self {
            sum: amount,
            count: 1,
            max: amount,
            min: amount,
        }
    }

    fn push(&mut self, amount: f64) {
        self.sum += amount;
        self.count += 1;
        self.max = self.max.max(amount);
        self.min = self.min.min(amount);
    }

    /// Statistics are computed on the signed amounts, rounded, and only then
    /// made absolute. For an all-negative group `max` is the expense closest
    /// to zero, so the reported `Max` can be smaller than `Min`.
    fn into_row(self, category: Option<String>) -> CategorySummaryRow {
        CategorySummaryRow {
            category,
            total: round_cents(self.sum).abs(),
            average: round_cents(self.sum / self.count as f64).abs(),
            max: round_cents(self.max).abs(),
            min: round_cents(self.min).abs(),
            transactions: self.count,
        }
    }
}

/// Expense statistics per merchant category for one client and date range.
///
/// Only rows with a negative amount count. Codes are resolved through
/// `lookup`; codes it does not know are grouped under a `None` category
/// instead of being dropped. Rows come back sorted by category name, with
/// the `None` group last.
pub fn expenses_summary<L>(
    transactions: &[Transaction],
    client_id: i64,
    range: &DateRange,
    lookup: &L,
) -> Vec<CategorySummaryRow>
where
    L: CategoryLookup + ?Sized,
{
    let mut named: BTreeMap<String, GroupStats> = BTreeMap::new();
    let mut unmapped: Option<GroupStats> = None;

    for row in select_client_window(transactions, client_id, range) {
        let Some(amount) = row.amount.filter(|a| *a < 0.0) else {
            continue;
        };
        match lookup.category_name(&row.transaction.mcc) {
            Some(name) => {
                named
                    .entry(name)
                    .and_modify(|stats| stats.push(amount))
                    .or_insert_with(|| GroupStats::new(amount));
            }
            None => match unmapped.as_mut() {
                Some(stats) => stats.push(amount),
                None => unmapped = Some(GroupStats::new(amount)),
            },
        }
    }

    let mut rows: Vec<CategorySummaryRow> = named
        .into_iter()
        .map(|(name, stats)| stats.into_row(Some(name)))
        .collect();
    if let Some(stats) = unmapped {
        debug!(
            "Client {}: {} expense rows have unmapped category codes",
            client_id, stats.count
        );
        rows.push(stats.into_row(None));
    }
    debug!("Client {}: {} expense categories", client_id, rows.len());
    rows
}

/// Bar chart of total spend per category with slanted labels.
pub fn expenses_chart(
    rows: &[CategorySummaryRow],
    client_id: i64,
    range: &DateRange,
) -> BarChart {
    BarChart {
        title: format!("Expenses Summary by Category for Client {}", client_id),
        subtitle: Some(format!(
            "{} to {}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        )),
        x_label: Some("Expenses Type".to_string()),
        y_label: "Total Amount".to_string(),
        bars: rows
            .iter()
            .map(|row| {
                Bar::new(
                    row.category
                        .as_deref()
                        .unwrap_or(UNKNOWN_CATEGORY_LABEL),
                    row.total,
                    "steelblue",
                )
            })
            .collect(),
        rotate_labels: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::MccCatalog;

    fn catalog() -> MccCatalog {
        MccCatalog::from([
            ("5411", "Grocery Stores, Supermarkets"),
            ("5812", "Eating Places and Restaurants"),
            ("4121", "Taxicabs and Limousines"),
        ])
    }

    fn may_2021() -> DateRange {
        DateRange::parse("2021-05-01", "2021-05-31").unwrap()
    }

    #[test]
    fn test_groups_sorted_by_name() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "-$10.00", "5812"),
            Transaction::new(1, "2021-05-03", "-$30.00", "5411"),
            Transaction::new(1, "2021-05-04", "-$20.00", "5812"),
            Transaction::new(1, "2021-05-05", "-$7.50", "4121"),
        ];
        let summary = expenses_summary(&rows, 1, &may_2021(), &catalog());
        let names: Vec<&str> = summary
            .iter()
            .map(|r| r.category.as_deref().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "Eating Places and Restaurants",
                "Grocery Stores, Supermarkets",
                "Taxicabs and Limousines"
            ]
        );

        let eating = &summary[0];
        assert_eq!(eating.total, 30.0);
        assert_eq!(eating.average, 15.0);
        assert_eq!(eating.transactions, 2);
    }

    #[test]
    fn test_abs_applied_after_max_and_min() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "-$10.00", "5812"),
            Transaction::new(1, "2021-05-04", "-$20.00", "5812"),
        ];
        let summary = expenses_summary(&rows, 1, &may_2021(), &catalog());
        // max of the signed amounts is -10, min is -20
        assert_eq!(summary[0].max, 10.0);
        assert_eq!(summary[0].min, 20.0);
    }

    #[test]
    fn test_only_expenses_counted() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "$100.00", "5411"),
            Transaction::new(1, "2021-05-03", "$0.00", "5411"),
            Transaction::new(1, "2021-05-04", "-$12.345", "5411"),
            Transaction::new(1, "2021-05-05", "broken", "5411"),
        ];
        let summary = expenses_summary(&rows, 1, &may_2021(), &catalog());
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].transactions, 1);
        assert_eq!(summary[0].total, 12.34);
    }

    #[test]
    fn test_unmapped_codes_kept_last() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "-$5.00", "9999"),
            Transaction::new(1, "2021-05-03", "-$15.00", "5411"),
            Transaction::new(1, "2021-05-04", "-$1.00", "0000"),
        ];
        let summary = expenses_summary(&rows, 1, &may_2021(), &catalog());
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0].category.as_deref(),
            Some("Grocery Stores, Supermarkets")
        );
        assert_eq!(summary[1].category, None);
        assert_eq!(summary[1].transactions, 2);
        assert_eq!(summary[1].total, 6.0);
        assert_eq!(summary[1].max, 1.0);
        assert_eq!(summary[1].min, 5.0);
    }

    #[test]
    fn test_chart_labels() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "-$5.00", "9999"),
            Transaction::new(1, "2021-05-03", "-$15.00", "5411"),
        ];
        let summary = expenses_summary(&rows, 1, &may_2021(), &catalog());
        let chart = expenses_chart(&summary, 1, &may_2021());
        assert!(chart.rotate_labels);
        assert_eq!(chart.bars[1].label, UNKNOWN_CATEGORY_LABEL);
        assert_eq!(chart.bars[0].value, 15.0);
        assert_eq!(chart.subtitle.as_deref(), Some("2021-05-01 to 2021-05-31"));
    }
}
