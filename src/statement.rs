use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::period::Period;
use crate::schemas::Bill;

/// Number of months in the trailing history, the requested one included.
pub const HISTORY_MONTHS: u32 = 6;

const MONEY_SCALE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statement {
    pub period: Period,
    pub bills: Vec<Bill>,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub previous: Period,
    pub next: Period,
    pub history: Vec<HistoryPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub label: String,
    pub period: Period,
    pub total_due: Decimal,
    pub total_paid: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Totals {
    due: Decimal,
    paid: Decimal,
}

/// Sums in cents; empty sums are `0.00` like any other.
fn totals<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> Totals {
    let mut totals = bills.into_iter().fold(Totals::default(), |mut acc, bill| {
        acc.due += bill.amount;
        if bill.paid {
            acc.paid += bill.amount;
        }
        acc
    });
    totals.due.rescale(MONEY_SCALE);
    totals.paid.rescale(MONEY_SCALE);
    totals
}

fn bills_in(bills: &[Bill], period: Period) -> impl Iterator<Item = &Bill> {
    bills.iter().filter(move |bill| period.contains(bill.due_on))
}

/// Aggregates one group's bills for `month`/`year`.
///
/// `bills` must already be restricted to what the requester may see. Fails
/// with [`AppError::InvalidPeriod`](crate::error::AppError::InvalidPeriod)
/// when `month` is not a calendar month or `year` is beyond the calendar
/// range of [`chrono::NaiveDate`].
pub fn compute_statement(bills: &[Bill], month: i64, year: i32) -> Result<Statement> {
    Ok(statement_for_period(bills, Period::new(month, year)?))
}

pub fn statement_for_period(bills: &[Bill], period: Period) -> Statement {
    let mut period_bills: Vec<Bill> = bills_in(bills, period).cloned().collect();
    period_bills.sort_by(|a, b| {
        a.due_on
            .cmp(&b.due_on)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let Totals { due, paid } = totals(&period_bills);

    let history = (0..HISTORY_MONTHS)
        .rev()
        .map(|offset| {
            let point = period.months_back(offset);
            let Totals { due, paid } = totals(bills_in(bills, point));
            HistoryPoint {
                label: point.label(),
                period: point,
                total_due: due,
                total_paid: paid,
            }
        })
        .collect();

    Statement {
        period,
        bills: period_bills,
        total_due: due,
        total_paid: paid,
        total_outstanding: due - paid,
        previous: period.previous(),
        next: period.next(),
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn bill(id: &str, due: (i32, u32, u32), cents: i64, paid: bool) -> Bill {
        Bill {
            id: id.into(),
            group_id: "casa".into(),
            description: format!("conta {id}"),
            amount: Decimal::new(cents, 2),
            due_on: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            paid,
            paid_on: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn period(month: i64, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    #[test]
    fn march_scenario() {
        let bills = vec![
            bill("late", (2024, 3, 20), 5000, false),
            bill("early", (2024, 3, 5), 10000, true),
            bill("april", (2024, 4, 1), 7000, true),
        ];
        let statement = compute_statement(&bills, 3, 2024).unwrap();

        assert_eq!(statement.total_due, Decimal::new(15000, 2));
        assert_eq!(statement.total_paid, Decimal::new(10000, 2));
        assert_eq!(statement.total_outstanding, Decimal::new(5000, 2));
        let ids: Vec<_> = statement.bills.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[test]
    fn empty_period_has_zero_totals() {
        let bills = vec![bill("other", (2024, 5, 1), 1234, true)];
        let statement = compute_statement(&bills, 3, 2024).unwrap();

        assert!(statement.bills.is_empty());
        assert_eq!(statement.total_due, Decimal::ZERO);
        assert_eq!(statement.total_paid, Decimal::ZERO);
        assert_eq!(statement.total_outstanding, Decimal::ZERO);

        let none = compute_statement(&[], 3, 2024).unwrap();
        assert!(none.history.iter().all(|p| p.total_due.is_zero()));
    }

    #[test]
    fn totals_keep_two_decimal_places() {
        let empty = compute_statement(&[], 3, 2024).unwrap();
        assert_eq!(empty.total_due.to_string(), "0.00");
        assert_eq!(empty.total_paid.to_string(), "0.00");
        assert_eq!(empty.total_outstanding.to_string(), "0.00");
        assert!(empty
            .history
            .iter()
            .all(|p| p.total_due.to_string() == "0.00" && p.total_paid.to_string() == "0.00"));

        let mut whole = bill("whole", (2024, 3, 1), 0, true);
        whole.amount = Decimal::from(80);
        let statement = compute_statement(&[whole], 3, 2024).unwrap();
        assert_eq!(statement.total_paid.to_string(), "80.00");
        assert_eq!(statement.total_outstanding.to_string(), "0.00");
    }

    #[test]
    fn extreme_years_are_rejected_instead_of_overflowing() {
        assert!(matches!(
            compute_statement(&[], 1, i32::MIN),
            Err(AppError::InvalidPeriod { year: i32::MIN, .. })
        ));
        assert!(matches!(
            compute_statement(&[], 12, i32::MAX),
            Err(AppError::InvalidPeriod { year: i32::MAX, .. })
        ));
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(matches!(
            compute_statement(&[], 13, 2024),
            Err(AppError::InvalidPeriod { month: 13, .. })
        ));
        assert!(matches!(
            compute_statement(&[], 0, 2024),
            Err(AppError::InvalidPeriod { month: 0, .. })
        ));
    }

    #[test]
    fn navigation_rolls_over_year() {
        let january = compute_statement(&[], 1, 2024).unwrap();
        assert_eq!(january.previous, period(12, 2023));
        assert_eq!(january.next, period(2, 2024));

        let december = compute_statement(&[], 12, 2024).unwrap();
        assert_eq!(december.previous, period(11, 2024));
        assert_eq!(december.next, period(1, 2025));
    }

    #[test]
    fn history_is_six_increasing_months_ending_at_request() {
        for (month, year) in [(1, 2024), (2, 2024), (6, 2024), (12, 2024)] {
            let statement = compute_statement(&[], month, year).unwrap();
            assert_eq!(statement.history.len(), HISTORY_MONTHS as usize);
            assert!(statement
                .history
                .windows(2)
                .all(|w| w[0].period < w[1].period && w[0].period.next() == w[1].period));
            assert_eq!(statement.history.last().unwrap().period, period(month, year));
        }
    }

    #[test]
    fn history_wraps_through_prior_year() {
        let bills = vec![
            bill("sep", (2023, 9, 10), 2000, true),
            bill("sep-pending", (2023, 9, 28), 500, false),
            bill("aug", (2023, 8, 10), 9900, true),
            bill("feb", (2024, 2, 1), 100, false),
        ];
        let statement = compute_statement(&bills, 2, 2024).unwrap();

        let labels: Vec<_> = statement.history.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Set/2023", "Out/2023", "Nov/2023", "Dez/2023", "Jan/2024", "Fev/2024"]
        );
        let september = &statement.history[0];
        assert_eq!(september.period, period(9, 2023));
        assert_eq!(september.total_due, Decimal::new(2500, 2));
        assert_eq!(september.total_paid, Decimal::new(2000, 2));
        assert_eq!(statement.history[5].total_due, Decimal::new(100, 2));
        assert_eq!(statement.history[5].total_paid, Decimal::ZERO);

        let january = compute_statement(&bills, 1, 2024).unwrap();
        assert_eq!(january.history[0].period, period(8, 2023));
        assert_eq!(january.history[0].total_due, Decimal::new(9900, 2));
    }

    #[test]
    fn outstanding_is_due_minus_paid_and_never_negative() {
        let bills: Vec<Bill> = (1..=28)
            .map(|day| bill(&day.to_string(), (2024, 7, day), i64::from(day) * 137, day % 3 == 0))
            .collect();
        for month in 1..=12 {
            let statement = compute_statement(&bills, month, 2024).unwrap();
            assert_eq!(
                statement.total_outstanding,
                statement.total_due - statement.total_paid
            );
            assert!(statement.total_outstanding >= Decimal::ZERO);
        }
    }

    #[test]
    fn fixed_point_sums_do_not_drift() {
        let bills: Vec<Bill> = (0..10)
            .map(|i| bill(&i.to_string(), (2024, 3, 1), 10, true))
            .collect();
        let statement = compute_statement(&bills, 3, 2024).unwrap();
        assert_eq!(statement.total_paid, Decimal::new(100, 2));
        assert_eq!(statement.history[5].total_paid, Decimal::ONE);
    }

    #[test]
    fn same_input_same_statement() {
        let bills = vec![
            bill("a", (2024, 3, 5), 10000, true),
            bill("b", (2024, 3, 20), 5000, false),
        ];
        assert_eq!(
            compute_statement(&bills, 3, 2024).unwrap(),
            compute_statement(&bills, 3, 2024).unwrap()
        );
    }
}
