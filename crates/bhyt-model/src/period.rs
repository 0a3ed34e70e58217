//! Settlement periods.
//!
//! A settlement month is the (`nam_qt`, `thang_qt`) pair carried by every
//! fact row. Periods are inclusive month ranges compared through the
//! `year * 100 + month` encoding, so `2025-12 < 2026-01` holds numerically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BhytError;

/// A settlement (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Range-comparison encoding: `year * 100 + month`.
    pub fn ym(self) -> i32 {
        self.year * 100 + self.month as i32
    }

    /// First-of-month key in `YYYYMMDD` form, used for lookup validity
    /// containment.
    pub fn first_day_key(self) -> i64 {
        i64::from(self.year) * 10_000 + i64::from(self.month) * 100 + 1
    }

    /// Short `mm.yy` label used in period headers.
    pub fn short_label(self) -> String {
        format!("{:02}.{:02}", self.month, self.year.rem_euclid(100))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = BhytError;

    /// Parses `YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parse = |value: &str| -> Option<YearMonth> {
            let (year, month) = value.trim().split_once('-')?;
            let year: i32 = year.parse().ok()?;
            let month: u32 = month.parse().ok()?;
            if !(1..=12).contains(&month) {
                return None;
            }
            Some(YearMonth::new(year, month))
        };
        parse(value)
            .ok_or_else(|| BhytError::Message(format!("invalid year-month '{value}', expected YYYY-MM")))
    }
}

/// An inclusive settlement-month range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub from: YearMonth,
    pub to: YearMonth,
}

impl Period {
    pub fn new(from: YearMonth, to: YearMonth) -> Self {
        Self { from, to }
    }

    pub fn single(month: YearMonth) -> Self {
        Self::new(month, month)
    }

    /// Rejects ranges whose start is after their end.
    pub fn validate(&self) -> Result<(), BhytError> {
        if self.from.ym() > self.to.ym() {
            return Err(BhytError::InvalidPeriod {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    /// Both endpoints inclusive.
    pub fn contains(&self, month: YearMonth) -> bool {
        let ym = month.ym();
        self.from.ym() <= ym && ym <= self.to.ym()
    }

    /// Header label: `mm.yy` for a single month, `mm.yy-mm.yy` otherwise.
    pub fn label(&self) -> String {
        if self.from == self.to {
            self.from.short_label()
        } else {
            format!("{}-{}", self.from.short_label(), self.to.short_label())
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}..{}", self.from, self.to)
        }
    }
}

impl FromStr for Period {
    type Err = BhytError;

    /// Parses `YYYY-MM` or `YYYY-MM..YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let period = match value.split_once("..") {
            Some((from, to)) => Period::new(from.parse()?, to.parse()?),
            None => Period::single(value.parse()?),
        };
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ym_encoding_orders_across_years() {
        assert!(YearMonth::new(2025, 12).ym() < YearMonth::new(2026, 1).ym());
        assert_eq!(YearMonth::new(2026, 5).ym(), 202_605);
    }

    #[test]
    fn first_day_key_matches_validity_encoding() {
        assert_eq!(YearMonth::new(2026, 3).first_day_key(), 20_260_301);
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let period: Period = "2026-01..2026-03".parse().unwrap();
        assert!(period.contains(YearMonth::new(2026, 1)));
        assert!(period.contains(YearMonth::new(2026, 3)));
        assert!(!period.contains(YearMonth::new(2026, 4)));
        assert!(!period.contains(YearMonth::new(2025, 12)));
    }

    #[test]
    fn labels_match_display_convention() {
        let single: Period = "2026-01".parse().unwrap();
        assert_eq!(single.label(), "01.26");
        let range: Period = "2025-11..2026-02".parse().unwrap();
        assert_eq!(range.label(), "11.25-02.26");
    }

    #[test]
    fn reversed_period_is_rejected() {
        let period: Period = "2026-03..2026-01".parse().unwrap();
        assert!(period.validate().is_err());
        assert!("2026-01..2026-03".parse::<Period>().unwrap().validate().is_ok());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("2026-00".parse::<YearMonth>().is_err());
    }
}
