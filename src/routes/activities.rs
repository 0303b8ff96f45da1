// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CE activity routes: CRUD, status filtering, reflections and certificates.

use crate::db::{ActivityQuery, EntityKind};
use crate::error::{AppError, Result};
use crate::models::{ActivityFormat, ActivityReflection, CeActivity, Certificate, MeasurementUnit};
use crate::routes::{not_blank, AsOfQuery};
use crate::services::{classify_activity, sniff, ActivityStatus, FileType};
use crate::session::{SessionCommand, MAX_SEARCH_CHARS};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes(max_certificate_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route(
            "/api/activities/{id}/reflections",
            get(list_reflections).post(create_reflection),
        )
        .route(
            "/api/activities/{id}/certificate",
            get(get_certificate)
                .put(put_certificate)
                .layer(DefaultBodyLimit::max(max_certificate_bytes)),
        )
}

fn load_activity(state: &AppState, id: Uuid) -> Result<CeActivity> {
    state
        .db
        .get_activity(id)
        .ok_or_else(|| AppError::not_found("Activity", id))
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ActivitiesQuery {
    /// Status filter; falls back to the session's filter
    status: Option<ActivityStatus>,
    credential_id: Option<Uuid>,
    renewal_period_id: Option<Uuid>,
    /// Case-insensitive search over title and notes; falls back to the
    /// session's search text
    q: Option<String>,
    as_of: Option<NaiveDate>,
}

/// Activity with its classified expiration status.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    #[serde(flatten)]
    pub activity: CeActivity,
    pub status: ActivityStatus,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivitySummary>,
    pub as_of: NaiveDate,
    pub filter: ActivityStatus,
    pub total: usize,
}

fn matches_search(activity: &CeActivity, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    activity.title.to_lowercase().contains(needle)
        || activity
            .notes
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(needle))
}

/// List activities, newest first, each tagged with its expiration status.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let session = state.session.snapshot();
    let filter = params.status.unwrap_or(session.activity_filter);
    let search = params.q.unwrap_or(session.search_text);
    if search.chars().count() > MAX_SEARCH_CHARS {
        return Err(AppError::BadRequest(format!(
            "Search text must be at most {} characters",
            MAX_SEARCH_CHARS
        )));
    }
    let needle = search.trim().to_lowercase();

    let today = AsOfQuery {
        as_of: params.as_of,
    }
    .resolve(&state);

    tracing::debug!(
        filter = ?filter,
        search = %needle,
        credential_id = ?params.credential_id,
        renewal_period_id = ?params.renewal_period_id,
        "Listing activities"
    );

    let activities: Vec<ActivitySummary> = state
        .db
        .list_activities(ActivityQuery {
            credential_id: params.credential_id,
            renewal_period_id: params.renewal_period_id,
        })
        .into_iter()
        .filter(|a| matches_search(a, &needle))
        .map(|activity| ActivitySummary {
            status: classify_activity(&activity, today),
            activity,
        })
        .filter(|summary| filter.matches(summary.status))
        .collect();

    Ok(Json(ActivitiesResponse {
        total: activities.len(),
        activities,
        as_of: today,
        filter,
    }))
}

// ─── CRUD ────────────────────────────────────────────────────

/// Body for creating or replacing an activity.
#[derive(Debug, Deserialize, Validate)]
pub struct ActivityRequest {
    pub credential_id: Option<Uuid>,
    pub renewal_period_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub cost: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub ce_awarded: f64,
    #[serde(default)]
    pub measurement_unit: MeasurementUnit,
    #[serde(default)]
    pub activity_format: ActivityFormat,
    #[serde(default)]
    pub completed: bool,
    pub completion_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

impl ActivityRequest {
    /// Completing without a date records today as the completion date.
    fn into_activity(self, id: Uuid, created_at: DateTime<Utc>, today: NaiveDate) -> CeActivity {
        let completion_date = match (self.completed, self.completion_date) {
            (true, None) => Some(today),
            (_, date) => date,
        };
        CeActivity {
            id,
            credential_id: self.credential_id,
            renewal_period_id: self.renewal_period_id,
            title: self.title.trim().to_string(),
            cost: self.cost,
            ce_awarded: self.ce_awarded,
            measurement_unit: self.measurement_unit,
            activity_format: self.activity_format,
            completed: self.completed,
            completion_date,
            expiration_date: self.expiration_date,
            notes: self.notes,
            created_at,
        }
    }
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivityRequest>,
) -> Result<(StatusCode, Json<ActivitySummary>)> {
    body.validate()?;

    let today = AsOfQuery::default().resolve(&state);
    let activity = body.into_activity(Uuid::new_v4(), Utc::now(), today);
    state.db.insert_activity(activity.clone())?;

    Ok((
        StatusCode::CREATED,
        Json(ActivitySummary {
            status: classify_activity(&activity, today),
            activity,
        }),
    ))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ActivitySummary>> {
    let activity = load_activity(&state, id)?;
    let today = query.resolve(&state);
    Ok(Json(ActivitySummary {
        status: classify_activity(&activity, today),
        activity,
    }))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActivityRequest>,
) -> Result<Json<ActivitySummary>> {
    body.validate()?;
    let existing = load_activity(&state, id)?;

    let today = AsOfQuery::default().resolve(&state);
    let activity = body.into_activity(id, existing.created_at, today);
    state.db.update_activity(activity.clone())?;

    Ok(Json(ActivitySummary {
        status: classify_activity(&activity, today),
        activity,
    }))
}

/// Delete an activity with its reflections and certificate.
async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.db.delete_activity(id)?;
    state.session.dispatch(SessionCommand::RecordDeleted {
        entity: EntityKind::Activity,
        id,
    });
    Ok(StatusCode::NO_CONTENT)
}

// ─── Reflections ─────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ReflectionRequest {
    #[validate(length(max = 5000))]
    pub three_main_points: Option<String>,
    #[validate(length(max = 5000))]
    pub new_info: Option<String>,
    #[validate(length(max = 5000))]
    pub surprises: Option<String>,
    #[validate(length(max = 5000))]
    pub general_reflection: Option<String>,
}

impl ReflectionRequest {
    fn is_empty(&self) -> bool {
        [
            &self.three_main_points,
            &self.new_info,
            &self.surprises,
            &self.general_reflection,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

async fn list_reflections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ActivityReflection>>> {
    load_activity(&state, id)?;
    Ok(Json(state.db.list_reflections(id)))
}

async fn create_reflection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReflectionRequest>,
) -> Result<(StatusCode, Json<ActivityReflection>)> {
    body.validate()?;
    if body.is_empty() {
        return Err(AppError::BadRequest(
            "Reflection must have at least one answer".to_string(),
        ));
    }

    let reflection = ActivityReflection {
        id: Uuid::new_v4(),
        activity_id: id,
        three_main_points: body.three_main_points,
        new_info: body.new_info,
        surprises: body.surprises,
        general_reflection: body.general_reflection,
        created_at: Utc::now(),
    };
    state.db.insert_reflection(reflection.clone())?;
    Ok((StatusCode::CREATED, Json(reflection)))
}

// ─── Certificates ────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CertificateResponse {
    pub activity_id: Uuid,
    pub file_type: FileType,
    pub mime_type: String,
    /// Images get a thumbnail, PDFs an icon
    pub is_image: bool,
    pub size_bytes: u64,
    /// RFC3339, UTC
    pub uploaded_at: String,
}

/// Upload a completion certificate. The type is taken from the bytes,
/// not from any client-supplied header.
async fn put_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<CertificateResponse>> {
    let file_type = sniff(&body);
    if file_type == FileType::Unknown {
        tracing::info!(activity_id = %id, size = body.len(), "Rejected unrecognised certificate");
        return Err(AppError::UnsupportedMediaType(
            "Certificates must be JPEG, PNG, GIF, TIFF, HEIC or PDF".to_string(),
        ));
    }

    let size_bytes = body.len() as u64;
    let uploaded_at = Utc::now();
    state.db.put_certificate(Certificate {
        activity_id: id,
        file_type,
        bytes: body.to_vec(),
        uploaded_at,
    })?;

    Ok(Json(CertificateResponse {
        activity_id: id,
        file_type,
        mime_type: file_type.mime_type().to_string(),
        is_image: file_type.is_image(),
        size_bytes,
        uploaded_at: format_utc_rfc3339(uploaded_at),
    }))
}

/// Download the certificate with its sniffed content type.
async fn get_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let certificate = state
        .db
        .get_certificate(id)
        .ok_or_else(|| AppError::not_found("Certificate for activity", id))?;

    let disposition = format!(
        "inline; filename=\"certificate.{}\"",
        certificate.file_type.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, certificate.file_type.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        certificate.bytes,
    ))
}
