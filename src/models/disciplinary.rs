// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Disciplinary action recorded against a credential.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Board action taken against a credential (fine, probation, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DisciplinaryAction {
    pub id: Uuid,
    pub credential_id: Uuid,
    pub action_type: String,
    pub action_date: NaiveDate,
    pub description: Option<String>,
    /// Fine or penalty amount, if any
    pub fine_amount: Option<f64>,
    /// Extra CE hours the board required
    pub required_ce_hours: Option<f64>,
    pub resolved: bool,
}
