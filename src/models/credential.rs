// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Professional credential (license, certification, ...) model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Kind of credential being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum CredentialType {
    License,
    Certification,
    Endorsement,
    Membership,
    Other,
}

/// How CE credit is measured for a credential or awarded by an activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeasurementUnit {
    #[default]
    Hours,
    Units,
}

/// A license or certification the user keeps current.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Credential {
    pub id: Uuid,
    /// Display name (e.g. "RN License - Ohio")
    pub name: String,
    pub credential_type: CredentialType,
    pub issue_date: Option<NaiveDate>,
    /// Length of one renewal period in months
    pub renewal_period_months: u32,
    /// CE credit required per renewal period, in `measurement_unit`
    pub ces_required: f64,
    pub measurement_unit: MeasurementUnit,
    pub created_at: DateTime<Utc>,
}
