//! Relative date windows usable as values on temporal fields.

use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    Today,
    Yesterday,
    Tomorrow,
    ThisWeek,
    LastWeek,
    ThisMonth,
    All,
}

impl DatePreset {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "tomorrow" => Self::Tomorrow,
            "this_week" => Self::ThisWeek,
            "last_week" => Self::LastWeek,
            "this_month" => Self::ThisMonth,
            "All" => Self::All,
            _ => return None,
        })
    }

    /// Inclusive `[start, end]` window relative to `today`; `All` has none.
    pub fn window(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Today => Some((today, today)),
            Self::Yesterday => {
                let d = today - Duration::days(1);
                Some((d, d))
            }
            Self::Tomorrow => {
                let d = today + Duration::days(1);
                Some((d, d))
            }
            Self::ThisWeek => Some(week_of(today)),
            Self::LastWeek => Some(week_of(today - Duration::days(7))),
            Self::ThisMonth => Some(month_of(today)),
            Self::All => None,
        }
    }
}

// Monday..Sunday
fn week_of(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = d - Duration::days(i64::from(d.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

fn month_of(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = d.with_day(1).unwrap_or(d);
    let next_first = if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    };
    let last = next_first.map(|n| n - Duration::days(1)).unwrap_or(d);
    (first, last)
}
