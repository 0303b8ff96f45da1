// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Renewal period model: the date-bounded window a credential's CE quota
//! must be earned in.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Stored renewal period for one credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RenewalPeriod {
    pub id: Uuid,
    pub credential_id: Uuid,
    /// Optional user-supplied name; see [`RenewalPeriod::display_name`]
    pub label: Option<String>,
    pub start_date: NaiveDate,
    /// Missing only for records created before an end was known
    pub end_date: Option<NaiveDate>,
    /// First day a late fee is charged for renewing
    pub late_fee_start_date: Option<NaiveDate>,
    pub late_fee_amount: Option<f64>,
    /// CE credit needed to reinstate after lapsing
    pub reinstatement_hours: Option<f64>,
}

impl RenewalPeriod {
    /// Name shown to the user.
    ///
    /// Falls back to the year span: `"2025"` for a single-year period,
    /// `"2024-2026"` otherwise and `"2024-"` while the end is unknown.
    pub fn display_name(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            return label.to_string();
        }

        let start_year = self.start_date.year();
        match self.end_date.map(|d| d.year()) {
            Some(end_year) if end_year == start_year => start_year.to_string(),
            Some(end_year) => format!("{}-{}", start_year, end_year),
            None => format!("{}-", start_year),
        }
    }

    /// Inclusive on both ends; a period without an end contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.end_date {
            Some(end) => self.start_date <= date && date <= end,
            None => false,
        }
    }

    /// True when renewing on `today` incurs the late fee.
    pub fn late_fee_applies(&self, today: NaiveDate) -> bool {
        match (self.late_fee_start_date, self.end_date) {
            (Some(fee_start), Some(end)) => fee_start <= today && today <= end,
            _ => false,
        }
    }

    /// True when the two periods share at least one calendar day.
    ///
    /// Open-ended periods are treated as extending indefinitely.
    pub fn overlaps(&self, other: &RenewalPeriod) -> bool {
        let self_end = self.end_date.unwrap_or(NaiveDate::MAX);
        let other_end = other.end_date.unwrap_or(NaiveDate::MAX);
        self.start_date <= other_end && other.start_date <= self_end
    }
}
