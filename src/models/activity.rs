// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CE activity model and the records hanging off it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::models::MeasurementUnit;
use crate::services::sniffer::FileType;

/// How an activity was delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityFormat {
    LiveInPerson,
    LiveVirtual,
    Recorded,
    SelfStudy,
    Conference,
    #[default]
    Other,
}

/// A single continuing-education activity.
///
/// Activities exist on their own: deleting the credential or renewal period
/// they point to only clears the link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CeActivity {
    pub id: Uuid,
    pub credential_id: Option<Uuid>,
    /// Renewal period this activity counts toward, once assigned
    pub renewal_period_id: Option<Uuid>,
    pub title: String,
    pub cost: f64,
    /// CE credit awarded on completion
    pub ce_awarded: f64,
    pub measurement_unit: MeasurementUnit,
    pub activity_format: ActivityFormat,
    pub completed: bool,
    pub completion_date: Option<NaiveDate>,
    /// Last day the activity can be completed (e.g. on-demand course access)
    pub expiration_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Learning reflection written after an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityReflection {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub three_main_points: Option<String>,
    pub new_info: Option<String>,
    pub surprises: Option<String>,
    pub general_reflection: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Uploaded completion certificate for an activity.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub activity_id: Uuid,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}
