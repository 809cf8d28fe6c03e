use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::error::{AppError, Result};

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// A calendar month used to bucket bills by their due date.
///
/// The month is always in `1..=12` and the year within the range of
/// [`NaiveDate`]; construct through [`Period::new`] or [`Period::containing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period {
    // Field order matters for the derived ordering.
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(month: i64, year: i32) -> Result<Period> {
        let years = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
        match u32::try_from(month) {
            Ok(month @ 1..=12) if years.contains(&year) => Ok(Period { year, month }),
            _ => Err(AppError::InvalidPeriod { month, year }),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn containing(date: NaiveDate) -> Period {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Period {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Period {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The period `offset` months before this one.
    pub fn months_back(self, offset: u32) -> Period {
        let mut month = i64::from(self.month) - i64::from(offset);
        let mut year = self.year;
        while month <= 0 {
            month += 12;
            year -= 1;
        }
        Period {
            year,
            month: month as u32,
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn short_name(self) -> &'static str {
        SHORT_MONTH_NAMES[self.month as usize - 1]
    }

    pub fn long_name(self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }

    /// Chart label such as `Mar/2024`.
    pub fn label(self) -> String {
        format!("{}/{}", self.short_name(), self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: i64, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    #[test]
    fn rejects_months_outside_the_calendar() {
        for month in [0, 13, -1, i64::from(u32::MAX) + 1] {
            assert!(matches!(
                Period::new(month, 2024),
                Err(AppError::InvalidPeriod { month: m, .. }) if m == month
            ));
        }
    }

    #[test]
    fn rejects_years_outside_the_calendar() {
        for year in [i32::MIN, i32::MAX, NaiveDate::MAX.year() + 1] {
            assert!(matches!(
                Period::new(6, year),
                Err(AppError::InvalidPeriod { year: y, .. }) if y == year
            ));
        }
    }

    #[test]
    fn extreme_valid_years_roll_over_without_overflow() {
        let first = period(1, NaiveDate::MIN.year());
        assert_eq!(first.previous().year(), NaiveDate::MIN.year() - 1);
        assert_eq!(first.months_back(5).month(), 8);

        let last = period(12, NaiveDate::MAX.year());
        assert_eq!(last.next().year(), NaiveDate::MAX.year() + 1);
        assert_eq!(last.next().month(), 1);
    }

    #[test]
    fn previous_and_next_roll_over_the_year() {
        assert_eq!(period(1, 2024).previous(), period(12, 2023));
        assert_eq!(period(12, 2024).next(), period(1, 2025));
        assert_eq!(period(6, 2024).previous(), period(5, 2024));
        assert_eq!(period(6, 2024).next(), period(7, 2024));
    }

    #[test]
    fn months_back_wraps_into_prior_years() {
        assert_eq!(period(2, 2024).months_back(5), period(9, 2023));
        assert_eq!(period(1, 2024).months_back(5), period(8, 2023));
        assert_eq!(period(3, 2024).months_back(0), period(3, 2024));
        assert_eq!(period(3, 2024).months_back(27), period(12, 2021));
    }

    #[test]
    fn periods_order_chronologically() {
        assert!(period(12, 2023) < period(1, 2024));
        assert!(period(2, 2024) < period(3, 2024));
    }

    #[test]
    fn names_and_labels() {
        let march = period(3, 2024);
        assert_eq!(march.short_name(), "Mar");
        assert_eq!(march.long_name(), "Março");
        assert_eq!(march.label(), "Mar/2024");
        assert_eq!(march.to_string(), "03/2024");
    }

    #[test]
    fn contains_matches_month_and_year() {
        let march = period(3, 2024);
        assert!(march.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!march.contains(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()));
        assert_eq!(
            Period::containing(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            march
        );
    }
}
