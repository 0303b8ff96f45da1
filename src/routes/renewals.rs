// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Renewal period routes.

use crate::db::{ActivityQuery, EntityKind};
use crate::error::{AppError, Result};
use crate::models::RenewalPeriod;
use crate::routes::credentials::load_credential;
use crate::services::{progress_for_period, RenewalProgress};
use crate::session::SessionCommand;
use crate::AppState;
use axum::{
    extract::{Path, State},
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
            "/api/credentials/{id}/renewals",
            get(list_renewal_periods).post(create_renewal_period),
        )
        .route(
            "/api/renewals/{id}",
            get(get_renewal_period)
                .put(update_renewal_period)
                .delete(delete_renewal_period),
        )
        .route("/api/renewals/{id}/progress", get(get_progress))
}

/// Body for creating or replacing a renewal period.
///
/// Date ordering and overlap are checked by the store.
#[derive(Debug, Deserialize, Validate)]
pub struct RenewalPeriodRequest {
    #[validate(length(max = 100))]
    pub label: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub late_fee_start_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub late_fee_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub reinstatement_hours: Option<f64>,
}

impl RenewalPeriodRequest {
    fn into_period(self, id: Uuid, credential_id: Uuid) -> RenewalPeriod {
        RenewalPeriod {
            id,
            credential_id,
            label: self
                .label
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            start_date: self.start_date,
            end_date: Some(self.end_date),
            late_fee_start_date: self.late_fee_start_date,
            late_fee_amount: self.late_fee_amount,
            reinstatement_hours: self.reinstatement_hours,
        }
    }
}

/// Renewal period with its computed display name.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RenewalPeriodResponse {
    #[serde(flatten)]
    pub period: RenewalPeriod,
    pub display_name: String,
}

impl From<RenewalPeriod> for RenewalPeriodResponse {
    fn from(period: RenewalPeriod) -> Self {
        Self {
            display_name: period.display_name(),
            period,
        }
    }
}

fn load_period(state: &AppState, id: Uuid) -> Result<RenewalPeriod> {
    state
        .db
        .get_renewal_period(id)
        .ok_or_else(|| AppError::not_found("Renewal period", id))
}

/// Periods for a credential, newest first.
async fn list_renewal_periods(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<Uuid>,
) -> Result<Json<Vec<RenewalPeriodResponse>>> {
    load_credential(&state, credential_id)?;
    let periods = state
        .db
        .list_renewal_periods(credential_id)
        .into_iter()
        .map(RenewalPeriodResponse::from)
        .collect();
    Ok(Json(periods))
}

async fn create_renewal_period(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<Uuid>,
    Json(body): Json<RenewalPeriodRequest>,
) -> Result<(StatusCode, Json<RenewalPeriodResponse>)> {
    body.validate()?;

    let period = body.into_period(Uuid::new_v4(), credential_id);
    state.db.insert_renewal_period(period.clone())?;
    Ok((StatusCode::CREATED, Json(period.into())))
}

async fn get_renewal_period(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalPeriodResponse>> {
    Ok(Json(load_period(&state, id)?.into()))
}

async fn update_renewal_period(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RenewalPeriodRequest>,
) -> Result<Json<RenewalPeriodResponse>> {
    body.validate()?;
    let existing = load_period(&state, id)?;

    let period = body.into_period(id, existing.credential_id);
    state.db.update_renewal_period(period.clone())?;
    Ok(Json(period.into()))
}

/// Delete a renewal period; its activities stay, unlinked.
async fn delete_renewal_period(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.db.delete_renewal_period(id)?;
    state.session.dispatch(SessionCommand::RecordDeleted {
        entity: EntityKind::RenewalPeriod,
        id,
    });
    Ok(StatusCode::NO_CONTENT)
}

/// CE earned toward this period's requirement.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalProgress>> {
    let period = load_period(&state, id)?;
    // Deleting a credential removes its periods, so this is a broken store
    let credential = state.db.get_credential(period.credential_id).ok_or_else(|| {
        anyhow::anyhow!(
            "Renewal period {} refers to missing credential {}",
            id,
            period.credential_id
        )
    })?;
    let activities = state.db.list_activities(ActivityQuery {
        credential_id: None,
        renewal_period_id: Some(id),
    });

    Ok(Json(progress_for_period(&credential, &period, &activities)))
}
