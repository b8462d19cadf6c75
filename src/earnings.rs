use crate::charts::{Bar, BarChart};
use crate::filter::{select_client_window_by, DateBound};
use crate::schema::{DateRange, EarningsExpenses, Transaction};
use crate::utils::round_cents;
use log::debug;

/// Total earnings (positive amounts) and expenses (negative amounts) for one
/// client over an inclusive date range.
///
/// Dates are compared as ISO text, so a row stamped with any time on the end
/// date (even `00:00:00`) is outside the range.
///
/// Each row's split is rounded to cents before summing and both totals are
/// rounded again, so `earnings >= 0` and `expenses <= 0` always hold. Rows
/// whose amount cannot be coerced contribute nothing.
pub fn earnings_and_expenses(
    transactions: &[Transaction],
    client_id: i64,
    range: &DateRange,
) -> EarningsExpenses {
    let rows = select_client_window_by(transactions, client_id, range, DateBound::IsoText);

    let (earnings, expenses) = rows
        .iter()
        .filter_map(|row| row.amount)
        .fold((0.0_f64, 0.0_f64), |(earned, spent), amount| {
            let earning = if amount > 0.0 { amount } else { 0.0 };
            let expense = if amount < 0.0 { amount } else { 0.0 };
            (earned + round_cents(earning), spent + round_cents(expense))
        });

    let result = EarningsExpenses {
        earnings: round_cents(earnings),
        expenses: round_cents(expenses),
    };
    debug!(
        "Client {}: earnings {:.2}, expenses {:.2} over {} rows",
        client_id,
        result.earnings,
        result.expenses,
        rows.len()
    );
    result
}

/// Two-bar chart of the absolute totals, earnings in green and expenses in red.
pub fn earnings_chart(result: &EarningsExpenses) -> BarChart {
    BarChart {
        title: "Earnings and Expenses".to_string(),
        subtitle: None,
        x_label: None,
        y_label: "Amount".to_string(),
        bars: vec![
            Bar::new("Earnings", result.earnings.abs(), "green"),
            Bar::new("Expenses", result.expenses.abs(), "red"),
        ],
        rotate_labels: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_2021() -> DateRange {
        DateRange::parse("2021-05-01", "2021-05-31").unwrap()
    }

    #[test]
    fn test_basic_totals() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "$100", "5411"),
            Transaction::new(1, "2021-05-10", "-$40", "5812"),
        ];
        let result = earnings_and_expenses(&rows, 1, &may_2021());
        assert_eq!(
            result,
            EarningsExpenses {
                earnings: 100.0,
                expenses: -40.0
            }
        );
    }

    #[test]
    fn test_other_clients_and_dates_ignored() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "$100", "5411"),
            Transaction::new(2, "2021-05-02", "$500", "5411"),
            Transaction::new(1, "2021-06-01", "-$70", "5411"),
            Transaction::new(1, "2021-05-31 09:00:00", "-$5", "5411"),
        ];
        let result = earnings_and_expenses(&rows, 1, &may_2021());
        assert_eq!(result.earnings, 100.0);
        assert_eq!(result.expenses, 0.0);
    }

    #[test]
    fn test_end_date_timestamps_compare_as_text() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "$100", "5411"),
            Transaction::new(1, "2021-05-31 00:00:00", "-$40", "5411"),
            Transaction::new(1, "2021-05-31", "-$15", "5411"),
        ];
        let result = earnings_and_expenses(&rows, 1, &may_2021());
        assert_eq!(result.earnings, 100.0);
        assert_eq!(result.expenses, -15.0);
    }

    #[test]
    fn test_unparsable_amounts_are_skipped() {
        let rows = vec![
            Transaction::new(1, "2021-05-02", "$10.10", "5411"),
            Transaction::new(1, "2021-05-03", "n/a", "5411"),
            Transaction::new(1, "2021-05-04", "-$0.30", "5411"),
            Transaction::new(1, "2021-05-05", "-$0.10", "5411"),
        ];
        let result = earnings_and_expenses(&rows, 1, &may_2021());
        assert_eq!(result.earnings, 10.1);
        assert_eq!(result.expenses, -0.4);
    }

    #[test]
    fn test_no_rows_gives_zero() {
        let result = earnings_and_expenses(&[], 1, &may_2021());
        assert_eq!(result.earnings, 0.0);
        assert_eq!(result.expenses, 0.0);
    }

    #[test]
    fn test_chart_uses_absolute_values() {
        let chart = earnings_chart(&EarningsExpenses {
            earnings: 100.0,
            expenses: -40.0,
        });
        assert_eq!(chart.bars[0], Bar::new("Earnings", 100.0, "green"));
        assert_eq!(chart.bars[1], Bar::new("Expenses", 40.0, "red"));
    }
}
