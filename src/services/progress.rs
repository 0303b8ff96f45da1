// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CE progress toward a renewal period's requirement.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::models::{CeActivity, Credential, MeasurementUnit, RenewalPeriod};

/// Earned-vs-required summary for one renewal period.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RenewalProgress {
    pub renewal_period_id: Uuid,
    pub measurement_unit: MeasurementUnit,
    pub required: f64,
    /// Credit earned in the credential's unit
    pub earned: f64,
    /// Credit earned in the other unit; not counted toward `required`
    pub other_unit_earned: f64,
    pub remaining: f64,
    /// 0 to 100, capped
    pub percent_complete: f64,
    pub completed_activities: u32,
}

/// Tally completed activities linked to `period` against the credential's quota.
///
/// Activities linked to other periods, or not yet completed, are ignored.
pub fn progress_for_period(
    credential: &Credential,
    period: &RenewalPeriod,
    activities: &[CeActivity],
) -> RenewalProgress {
    let mut earned = 0.0;
    let mut other_unit_earned = 0.0;
    let mut completed_activities = 0;

    for activity in activities
        .iter()
        .filter(|a| a.completed && a.renewal_period_id == Some(period.id))
    {
        completed_activities += 1;
        if activity.measurement_unit == credential.measurement_unit {
            earned += activity.ce_awarded;
        } else {
            other_unit_earned += activity.ce_awarded;
        }
    }

    let required = credential.ces_required;
    let percent_complete = if required <= 0.0 {
        100.0
    } else {
        (earned / required * 100.0).min(100.0)
    };

    RenewalProgress {
        renewal_period_id: period.id,
        measurement_unit: credential.measurement_unit,
        required,
        earned,
        other_unit_earned,
        remaining: (required - earned).max(0.0),
        percent_complete,
        completed_activities,
    }
}
