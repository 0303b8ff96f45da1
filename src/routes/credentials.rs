// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential routes: CRUD, expiration status and disciplinary actions.

use crate::db::EntityKind;
use crate::error::{AppError, Result};
use crate::models::{Credential, CredentialType, DisciplinaryAction, MeasurementUnit};
use crate::routes::{not_blank, AsOfQuery};
use crate::services::expiration::{self, Expiration};
use crate::session::SessionCommand;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/credentials",
            get(list_credentials).post(create_credential),
        )
        .route(
            "/api/credentials/{id}",
            get(get_credential)
                .put(update_credential)
                .delete(delete_credential),
        )
        .route("/api/credentials/{id}/expiration", get(get_expiration))
        .route(
            "/api/credentials/{id}/disciplinary-actions",
            get(list_disciplinary_actions).post(create_disciplinary_action),
        )
}

/// Fetch a credential or fail with 404.
pub(crate) fn load_credential(state: &AppState, id: Uuid) -> Result<Credential> {
    state
        .db
        .get_credential(id)
        .ok_or_else(|| AppError::not_found("Credential", id))
}

// ─── CRUD ────────────────────────────────────────────────────

/// Body for creating or replacing a credential.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialRequest {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    pub credential_type: CredentialType,
    pub issue_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 120))]
    pub renewal_period_months: u32,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub ces_required: f64,
    #[serde(default)]
    pub measurement_unit: MeasurementUnit,
}

impl CredentialRequest {
    fn into_credential(self, id: Uuid, created_at: chrono::DateTime<chrono::Utc>) -> Credential {
        Credential {
            id,
            name: self.name.trim().to_string(),
            credential_type: self.credential_type,
            issue_date: self.issue_date,
            renewal_period_months: self.renewal_period_months,
            ces_required: self.ces_required,
            measurement_unit: self.measurement_unit,
            created_at,
        }
    }
}

async fn list_credentials(State(state): State<Arc<AppState>>) -> Json<Vec<Credential>> {
    Json(state.db.list_credentials())
}

/// Create a credential, subject to the purchase tier's credential limit.
async fn create_credential(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialRequest>,
) -> Result<(StatusCode, Json<Credential>)> {
    body.validate()?;

    let limit = state
        .session
        .snapshot()
        .purchase_tier
        .credential_limit(state.config.free_credential_limit);

    let credential = body.into_credential(Uuid::new_v4(), chrono::Utc::now());
    state.db.insert_credential_within(credential.clone(), limit)?;
    Ok((StatusCode::CREATED, Json(credential)))
}

async fn get_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Credential>> {
    Ok(Json(load_credential(&state, id)?))
}

async fn update_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CredentialRequest>,
) -> Result<Json<Credential>> {
    body.validate()?;
    let existing = load_credential(&state, id)?;

    let credential = body.into_credential(id, existing.created_at);
    state.db.update_credential(credential.clone())?;
    Ok(Json(credential))
}

/// Delete a credential with its renewal periods and disciplinary actions.
async fn delete_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.db.delete_credential(id)?;
    state.session.dispatch(SessionCommand::RecordDeleted {
        entity: EntityKind::Credential,
        id,
    });
    Ok(StatusCode::NO_CONTENT)
}

// ─── Expiration ──────────────────────────────────────────────

/// Suggested dates for a new current renewal period.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SuggestedPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Expiration status of a credential.
///
/// `days_remaining` is `-1` whenever no period contains the date.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExpirationResponse {
    pub credential_id: Uuid,
    pub as_of: NaiveDate,
    /// "current", "no_current_period" or "no_periods"
    pub status: String,
    pub period_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub days_remaining: i64,
    pub late_fee_applies: bool,
    pub suggested_period: Option<SuggestedPeriod>,
}

async fn get_expiration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ExpirationResponse>> {
    let credential = load_credential(&state, id)?;
    let today = query.resolve(&state);
    let periods = state.db.list_renewal_periods(id);

    let result = expiration::calculate(&periods, today);
    tracing::debug!(
        credential_id = %id,
        status = result.status(),
        days_remaining = result.days_remaining(),
        "Computed expiration"
    );

    let (period_id, late_fee_applies) = match &result {
        Expiration::Current { period_id, .. } => {
            let late = periods
                .iter()
                .find(|p| p.id == *period_id)
                .is_some_and(|p| p.late_fee_applies(today));
            (Some(*period_id), late)
        }
        Expiration::NoPeriods | Expiration::NoCurrentPeriod => (None, false),
    };

    let suggested_period =
        expiration::suggest_next_period(&periods, credential.renewal_period_months, today)
            .map(|(start_date, end_date)| SuggestedPeriod {
                start_date,
                end_date,
            });

    Ok(Json(ExpirationResponse {
        credential_id: id,
        as_of: today,
        status: result.status().to_string(),
        period_id,
        display_name: result.display_name().map(str::to_string),
        days_remaining: result.days_remaining(),
        late_fee_applies,
        suggested_period,
    }))
}

// ─── Disciplinary Actions ────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct DisciplinaryActionRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub action_type: String,
    pub action_date: NaiveDate,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub fine_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub required_ce_hours: Option<f64>,
    #[serde(default)]
    pub resolved: bool,
}

async fn list_disciplinary_actions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DisciplinaryAction>>> {
    load_credential(&state, id)?;
    Ok(Json(state.db.list_disciplinary_actions(id)))
}

async fn create_disciplinary_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<DisciplinaryActionRequest>,
) -> Result<(StatusCode, Json<DisciplinaryAction>)> {
    body.validate()?;

    let action = DisciplinaryAction {
        id: Uuid::new_v4(),
        credential_id: id,
        action_type: body.action_type.trim().to_string(),
        action_date: body.action_date,
        description: body.description,
        fine_amount: body.fine_amount,
        required_ce_hours: body.required_ce_hours,
        resolved: body.resolved,
    };
    state.db.insert_disciplinary_action(action.clone())?;
    Ok((StatusCode::CREATED, Json(action)))
}
