use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar unit a recurring template advances by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the date `n * every` units after `anchor`.
    ///
    /// Month and year steps are always measured from the anchor, so a day-of-month
    /// that does not exist in the target month is clamped to that month's last day
    /// without drifting later occurrences. Returns `None` when the result falls
    /// outside the representable calendar.
    pub fn nth_date(self, anchor: NaiveDate, every: u32, n: u32) -> Option<NaiveDate> {
        let steps = u64::from(every).checked_mul(u64::from(n))?;
        match self {
            Frequency::Daily => anchor.checked_add_days(Days::new(steps)),
            Frequency::Weekly => anchor.checked_add_days(Days::new(steps.checked_mul(7)?)),
            Frequency::Monthly => shift_month(anchor, i32::try_from(steps).ok()?),
            Frequency::Yearly => shift_year(anchor, i32::try_from(steps).ok()?),
        }
    }

    /// Number of whole steps that can be skipped from `anchor` while staying on or
    /// before `target`. Used to jump close to a window start instead of walking
    /// every occurrence since the anchor.
    pub fn steps_before(self, anchor: NaiveDate, every: u32, target: NaiveDate) -> u32 {
        if every == 0 || target <= anchor {
            return 0;
        }
        let every = i64::from(every);
        let steps = match self {
            Frequency::Daily => (target - anchor).num_days() / every,
            Frequency::Weekly => (target - anchor).num_days() / (every * 7),
            Frequency::Monthly => {
                let months = month_index(target) - month_index(anchor);
                (months - 1).max(0) / every
            }
            Frequency::Yearly => {
                let years = i64::from(target.year() - anchor.year());
                (years - 1).max(0) / every
            }
        };
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    pub fn label(self, every: u32) -> String {
        match (every, self) {
            (1, Frequency::Daily) => "Daily".into(),
            (1, Frequency::Weekly) => "Weekly".into(),
            (1, Frequency::Monthly) => "Monthly".into(),
            (1, Frequency::Yearly) => "Yearly".into(),
            (n, unit) => format!("Every {} {}s", n, unit.unit_name()),
        }
    }

    fn unit_name(self) -> &'static str {
        match self {
            Frequency::Daily => "Day",
            Frequency::Weekly => "Week",
            Frequency::Monthly => "Month",
            Frequency::Yearly => "Year",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(1))
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = date.year().checked_mul(12)? + date.month0() as i32;
    let shifted = total.checked_add(months)?;
    let year = shifted.div_euclid(12);
    let month = shifted.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    let month = date.month();
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in the given calendar month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_steps_clamp_without_drift() {
        let anchor = date(2024, 1, 31);
        let dates: Vec<_> = (0..4)
            .map(|n| Frequency::Monthly.nth_date(anchor, 1, n).unwrap())
            .collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30)
            ]
        );
    }

    #[test]
    fn yearly_leap_day_clamps_in_common_years() {
        let anchor = date(2024, 2, 29);
        assert_eq!(Frequency::Yearly.nth_date(anchor, 1, 1), Some(date(2025, 2, 28)));
        assert_eq!(Frequency::Yearly.nth_date(anchor, 1, 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn steps_before_never_overshoots_target() {
        let anchor = date(2020, 1, 31);
        let target = date(2024, 6, 15);
        for freq in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Yearly,
        ] {
            for every in 1..5 {
                let skip = freq.steps_before(anchor, every, target);
                let landed = freq.nth_date(anchor, every, skip).unwrap();
                assert!(landed <= target, "{freq:?} every {every} landed on {landed}");
            }
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Frequency::Monthly.label(1), "Monthly");
        assert_eq!(Frequency::Weekly.label(2), "Every 2 Weeks");
    }

    #[test]
    fn days_in_february() {
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2024, 12), Some(31));
    }
}
