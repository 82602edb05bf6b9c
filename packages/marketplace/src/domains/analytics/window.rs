use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{MarketplaceError, MarketplaceResult, TimeRange};

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReferenceWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> MarketplaceResult<Self> {
        if end <= start {
            return Err(MarketplaceError::validation(format!(
                "window end {} must be after start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn last_30_days(now: DateTime<Utc>) -> Self {
        Self::last_days(now, 30)
    }

    pub fn last_90_days(now: DateTime<Utc>) -> Self {
        Self::last_days(now, 90)
    }

    pub fn last_6_months(now: DateTime<Utc>) -> Self {
        Self::last_months(now, 6)
    }

    pub fn last_year(now: DateTime<Utc>) -> Self {
        Self::last_months(now, 12)
    }

    fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now
                .checked_sub_signed(Duration::days(days))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: now,
        }
    }

    /// Calendar months: Aug 31 minus six months clamps to Feb 28/29.
    fn last_months(now: DateTime<Utc>, months: u32) -> Self {
        Self {
            start: now
                .checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: now,
        }
    }

    /// The adjacent window of equal length that ends where this one starts
    pub fn previous(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self
                .start
                .checked_sub_signed(length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self.start,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::between(self.start, self.end)
    }
}

/// Named windows accepted on the command line (`30d`, `90d`, `6m`, `1y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPreset {
    Last30Days,
    Last90Days,
    Last6Months,
    LastYear,
}

impl WindowPreset {
    pub fn resolve(&self, now: DateTime<Utc>) -> ReferenceWindow {
        match self {
            WindowPreset::Last30Days => ReferenceWindow::last_30_days(now),
            WindowPreset::Last90Days => ReferenceWindow::last_90_days(now),
            WindowPreset::Last6Months => ReferenceWindow::last_6_months(now),
            WindowPreset::LastYear => ReferenceWindow::last_year(now),
        }
    }
}

impl std::fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowPreset::Last30Days => write!(f, "30d"),
            WindowPreset::Last90Days => write!(f, "90d"),
            WindowPreset::Last6Months => write!(f, "6m"),
            WindowPreset::LastYear => write!(f, "1y"),
        }
    }
}

impl std::str::FromStr for WindowPreset {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30d" | "last_30_days" => Ok(WindowPreset::Last30Days),
            "90d" | "last_90_days" => Ok(WindowPreset::Last90Days),
            "6m" | "last_6_months" => Ok(WindowPreset::Last6Months),
            "1y" | "last_year" => Ok(WindowPreset::LastYear),
            _ => Err(MarketplaceError::validation(format!(
                "Invalid window: {} (expected 30d, 90d, 6m or 1y)",
                s
            ))),
        }
    }
}

/// Relative change from `previous` to `current`, in percent, one decimal.
///
/// Growth from nothing reports 100; nothing to nothing reports 0.
pub fn percent_change(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (change * 10.0).round() / 10.0
}

/// Midnight UTC on the first day of `at`'s month
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    Utc.from_utc_datetime(&first.and_time(NaiveTime::default()))
}

/// `[start, end)` of each of the last `months_back` calendar months, oldest
/// first, ending with the month containing `now`.
pub fn calendar_months(now: DateTime<Utc>, months_back: u32) -> Vec<ReferenceWindow> {
    let current = month_start(now);
    (0..months_back)
        .rev()
        .filter_map(|offset| {
            let start = current.checked_sub_months(Months::new(offset))?;
            let end = start.checked_add_months(Months::new(1))?;
            Some(ReferenceWindow { start, end })
        })
        .collect()
}
