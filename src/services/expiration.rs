// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Renewal expiration calculator.
//!
//! Finds the renewal period that contains "today" and how many calendar
//! days are left in it. Missing or unusable data degrades to sentinel
//! results that callers turn into "add a renewal period" prompts.

use chrono::{Days, Months, NaiveDate};
use uuid::Uuid;

use crate::models::RenewalPeriod;
use crate::time_utils::days_between;

/// Days value reported when no period is current.
pub const NO_CURRENT_PERIOD_DAYS: i64 = -1;

/// Where a credential stands relative to its renewal periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiration {
    /// The credential has no renewal periods at all.
    NoPeriods,
    /// Periods exist but none contains today.
    NoCurrentPeriod,
    /// Today falls inside this period.
    Current {
        period_id: Uuid,
        display_name: String,
        /// Calendar days until the period's end; 0 on the last day
        days_remaining: i64,
    },
}

impl Expiration {
    /// Days left in the current period, or [`NO_CURRENT_PERIOD_DAYS`].
    pub fn days_remaining(&self) -> i64 {
        match self {
            Expiration::Current { days_remaining, .. } => *days_remaining,
            Expiration::NoPeriods | Expiration::NoCurrentPeriod => NO_CURRENT_PERIOD_DAYS,
        }
    }

    /// Display name of the current period, if any.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Expiration::Current { display_name, .. } => Some(display_name),
            _ => None,
        }
    }

    /// Stable machine-readable tag for API responses.
    pub fn status(&self) -> &'static str {
        match self {
            Expiration::NoPeriods => "no_periods",
            Expiration::NoCurrentPeriod => "no_current_period",
            Expiration::Current { .. } => "current",
        }
    }
}

/// Locate the period containing `today` and count the days left in it.
///
/// `periods` is scanned in the order given (the store hands them out newest
/// start first), so with overlapping periods the first match wins.
pub fn calculate(periods: &[RenewalPeriod], today: NaiveDate) -> Expiration {
    if periods.is_empty() {
        return Expiration::NoPeriods;
    }

    current_period(periods, today)
        .and_then(|period| {
            let end = period.end_date?;
            Some(Expiration::Current {
                period_id: period.id,
                display_name: period.display_name(),
                days_remaining: days_between(today, end),
            })
        })
        .unwrap_or(Expiration::NoCurrentPeriod)
}

/// First period in `periods` whose span contains `today`.
pub fn current_period(periods: &[RenewalPeriod], today: NaiveDate) -> Option<&RenewalPeriod> {
    periods.iter().find(|p| p.contains(today))
}

/// Dates for a new period that would contain `today`, for the
/// "add a renewal period" prompt.
///
/// Periods roll forward back-to-back from the latest period that has
/// already ended, `renewal_months` at a time; with no history the new
/// period starts today. Returns `None` when a period already contains
/// today, the length is zero, or the suggestion would overlap an
/// existing period.
pub fn suggest_next_period(
    periods: &[RenewalPeriod],
    renewal_months: u32,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    if renewal_months == 0 || current_period(periods, today).is_some() {
        return None;
    }

    let last_end = periods
        .iter()
        .filter_map(|p| p.end_date)
        .filter(|end| *end < today)
        .max();

    let anchor = match last_end {
        Some(end) => end.checked_add_days(Days::new(1))?,
        None => today,
    };
    // Each start is measured from the anchor so month-end clamping
    // (Jan 31 -> Feb 28) does not carry into later periods.
    let nth_start = |k: u32| anchor.checked_add_months(Months::new(k.checked_mul(renewal_months)?));

    let mut k = 0;
    loop {
        let start = nth_start(k)?;
        let next_start = nth_start(k + 1)?;
        if next_start > today {
            let end = next_start.pred_opt()?;
            let candidate = RenewalPeriod {
                id: Uuid::nil(),
                credential_id: Uuid::nil(),
                label: None,
                start_date: start,
                end_date: Some(end),
                late_fee_start_date: None,
                late_fee_amount: None,
                reinstatement_hours: None,
            };
            if periods.iter().any(|p| p.overlaps(&candidate)) {
                return None;
            }
            return Some((start, end));
        }
        k += 1;
    }
}
