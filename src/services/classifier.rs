// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity expiration classifier.
//!
//! Sorts a CE activity into the status buckets used for list icons and
//! filtering, from its completion flag and expiration date alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::CeActivity;
use crate::time_utils::days_between;

/// Activities expiring within this many days (after today) are "expiring soon".
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Expiration status of an activity.
///
/// `All` is only a filter wildcard; [`classify`] never returns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityStatus {
    #[default]
    All,
    Completed,
    Expired,
    ExpiringSoon,
    FinalDay,
    StillValid,
}

impl ActivityStatus {
    /// Whether an item classified as `status` passes this filter.
    pub fn matches(self, status: ActivityStatus) -> bool {
        self == ActivityStatus::All || self == status
    }
}

/// Classify an activity. First matching rule wins:
/// completed, no expiration, already past, today, inside the window, later.
pub fn classify(
    today: NaiveDate,
    completed: bool,
    expiration_date: Option<NaiveDate>,
) -> ActivityStatus {
    if completed {
        return ActivityStatus::Completed;
    }

    let Some(expires) = expiration_date else {
        return ActivityStatus::StillValid;
    };

    match days_between(today, expires) {
        d if d < 0 => ActivityStatus::Expired,
        0 => ActivityStatus::FinalDay,
        d if d <= EXPIRING_SOON_WINDOW_DAYS => ActivityStatus::ExpiringSoon,
        _ => ActivityStatus::StillValid,
    }
}

/// Convenience wrapper over [`classify`] for a stored activity.
pub fn classify_activity(activity: &CeActivity, today: NaiveDate) -> ActivityStatus {
    classify(today, activity.completed, activity.expiration_date)
}
