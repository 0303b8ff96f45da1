// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store with typed operations.
//!
//! Provides high-level operations for:
//! - Credentials (and the cascade on delete)
//! - Renewal periods (validated: ordered dates, no overlap per credential)
//! - CE activities, their reflections and certificates
//! - Disciplinary actions
//!
//! Every mutation is announced on a broadcast channel so presentation
//! layers can refresh without polling.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::{ChangeEvent, ChangeKind, EntityKind, EVENT_CHANNEL_CAPACITY};
use crate::error::AppError;
use crate::models::{
    ActivityReflection, CeActivity, Certificate, Credential, DisciplinaryAction, RenewalPeriod,
};

/// Filter for [`MemoryDb::list_activities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityQuery {
    pub credential_id: Option<Uuid>,
    pub renewal_period_id: Option<Uuid>,
}

/// In-memory database handle. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: DashMap<Uuid, Credential>,
    renewal_periods: DashMap<Uuid, RenewalPeriod>,
    activities: DashMap<Uuid, CeActivity>,
    reflections: DashMap<Uuid, ActivityReflection>,
    disciplinary_actions: DashMap<Uuid, DisciplinaryAction>,
    certificates: DashMap<Uuid, Certificate>,
    /// Serializes check-then-write and multi-collection mutations.
    write_lock: Mutex<()>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDb {
    /// Create an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                credentials: DashMap::new(),
                renewal_periods: DashMap::new(),
                activities: DashMap::new(),
                reflections: DashMap::new(),
                disciplinary_actions: DashMap::new(),
                certificates: DashMap::new(),
                write_lock: Mutex::new(()),
                events,
            }),
        }
    }

    /// Subscribe to change events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.events.subscribe()
    }

    fn publish(&self, entity: EntityKind, id: Uuid, kind: ChangeKind) {
        // No subscribers is fine
        let _ = self.inner.events.send(ChangeEvent { entity, id, kind });
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ─── Credential Operations ───────────────────────────────────

    /// Store a new credential.
    pub fn insert_credential(&self, credential: Credential) -> Result<(), AppError> {
        self.insert_credential_within(credential, None)
    }

    /// Store a new credential unless `limit` credentials already exist.
    ///
    /// The count and the insert happen under the write lock, so concurrent
    /// creators cannot both take the last free slot.
    pub fn insert_credential_within(
        &self,
        credential: Credential,
        limit: Option<usize>,
    ) -> Result<(), AppError> {
        let _guard = self.lock();

        if let Some(limit) = limit {
            let count = self.inner.credentials.len();
            if count >= limit {
                tracing::info!(limit, count, "Credential limit reached");
                return Err(AppError::Forbidden(format!(
                    "The current plan tracks at most {} credential(s)",
                    limit
                )));
            }
        }

        let id = credential.id;
        if self.inner.credentials.contains_key(&id) {
            return Err(AppError::Conflict(format!("Credential {} already exists", id)));
        }
        self.inner.credentials.insert(id, credential);

        tracing::info!(credential_id = %id, "Credential created");
        self.publish(EntityKind::Credential, id, ChangeKind::Created);
        Ok(())
    }

    /// Get a credential by ID.
    pub fn get_credential(&self, id: Uuid) -> Option<Credential> {
        self.inner.credentials.get(&id).map(|c| c.clone())
    }

    /// All credentials, sorted by name.
    pub fn list_credentials(&self) -> Vec<Credential> {
        let mut credentials: Vec<Credential> = self
            .inner
            .credentials
            .iter()
            .map(|c| c.value().clone())
            .collect();
        credentials.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        credentials
    }

    /// Replace an existing credential.
    pub fn update_credential(&self, credential: Credential) -> Result<(), AppError> {
        let id = credential.id;
        match self.inner.credentials.get_mut(&id) {
            Some(mut existing) => *existing = credential,
            None => return Err(AppError::not_found("Credential", id)),
        }

        tracing::info!(credential_id = %id, "Credential updated");
        self.publish(EntityKind::Credential, id, ChangeKind::Updated);
        Ok(())
    }

    /// Delete a credential with its renewal periods and disciplinary actions.
    ///
    /// Activities survive; links to the credential and its periods are cleared.
    pub fn delete_credential(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.lock();

        if self.inner.credentials.remove(&id).is_none() {
            return Err(AppError::not_found("Credential", id));
        }

        let period_ids: Vec<Uuid> = self
            .inner
            .renewal_periods
            .iter()
            .filter(|p| p.credential_id == id)
            .map(|p| p.id)
            .collect();
        for period_id in &period_ids {
            self.inner.renewal_periods.remove(period_id);
        }

        let action_ids: Vec<Uuid> = self
            .inner
            .disciplinary_actions
            .iter()
            .filter(|a| a.credential_id == id)
            .map(|a| a.id)
            .collect();
        for action_id in &action_ids {
            self.inner.disciplinary_actions.remove(action_id);
        }

        let mut unlinked = Vec::new();
        for mut activity in self.inner.activities.iter_mut() {
            let mut changed = false;
            if activity.credential_id == Some(id) {
                activity.credential_id = None;
                changed = true;
            }
            if activity
                .renewal_period_id
                .is_some_and(|p| period_ids.contains(&p))
            {
                activity.renewal_period_id = None;
                changed = true;
            }
            if changed {
                unlinked.push(activity.id);
            }
        }

        tracing::info!(
            credential_id = %id,
            renewal_periods = period_ids.len(),
            disciplinary_actions = action_ids.len(),
            activities_unlinked = unlinked.len(),
            "Credential deleted"
        );

        self.publish(EntityKind::Credential, id, ChangeKind::Deleted);
        for period_id in period_ids {
            self.publish(EntityKind::RenewalPeriod, period_id, ChangeKind::Deleted);
        }
        for action_id in action_ids {
            self.publish(EntityKind::DisciplinaryAction, action_id, ChangeKind::Deleted);
        }
        for activity_id in unlinked {
            self.publish(EntityKind::Activity, activity_id, ChangeKind::Updated);
        }
        Ok(())
    }

    // ─── Renewal Period Operations ───────────────────────────────

    /// Store a new renewal period after validating it against its siblings.
    pub fn insert_renewal_period(&self, period: RenewalPeriod) -> Result<(), AppError> {
        let _guard = self.lock();
        self.validate_period(&period)?;

        let id = period.id;
        let credential_id = period.credential_id;
        self.inner.renewal_periods.insert(id, period);

        tracing::info!(renewal_period_id = %id, credential_id = %credential_id, "Renewal period created");
        self.publish(EntityKind::RenewalPeriod, id, ChangeKind::Created);
        Ok(())
    }

    /// Insert without validation, to build inconsistent stores in tests.
    #[cfg(test)]
    pub(crate) fn insert_renewal_period_unchecked(&self, period: RenewalPeriod) {
        self.inner.renewal_periods.insert(period.id, period);
    }

    /// Get a renewal period by ID.
    pub fn get_renewal_period(&self, id: Uuid) -> Option<RenewalPeriod> {
        self.inner.renewal_periods.get(&id).map(|p| p.clone())
    }

    /// Periods for a credential, newest start date first.
    pub fn list_renewal_periods(&self, credential_id: Uuid) -> Vec<RenewalPeriod> {
        let mut periods: Vec<RenewalPeriod> = self
            .inner
            .renewal_periods
            .iter()
            .filter(|p| p.credential_id == credential_id)
            .map(|p| p.value().clone())
            .collect();
        periods.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));
        periods
    }

    /// Replace an existing renewal period. The owning credential cannot change.
    pub fn update_renewal_period(&self, period: RenewalPeriod) -> Result<(), AppError> {
        let _guard = self.lock();

        let id = period.id;
        let existing_owner = self
            .inner
            .renewal_periods
            .get(&id)
            .map(|p| p.credential_id)
            .ok_or_else(|| AppError::not_found("Renewal period", id))?;
        if existing_owner != period.credential_id {
            return Err(AppError::BadRequest(
                "A renewal period cannot move to another credential".to_string(),
            ));
        }

        self.validate_period(&period)?;
        self.inner.renewal_periods.insert(id, period);

        tracing::info!(renewal_period_id = %id, "Renewal period updated");
        self.publish(EntityKind::RenewalPeriod, id, ChangeKind::Updated);
        Ok(())
    }

    /// Delete a renewal period. Linked activities are kept but unlinked.
    pub fn delete_renewal_period(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.lock();

        if self.inner.renewal_periods.remove(&id).is_none() {
            return Err(AppError::not_found("Renewal period", id));
        }

        let mut unlinked = Vec::new();
        for mut activity in self.inner.activities.iter_mut() {
            if activity.renewal_period_id == Some(id) {
                activity.renewal_period_id = None;
                unlinked.push(activity.id);
            }
        }

        tracing::info!(
            renewal_period_id = %id,
            activities_unlinked = unlinked.len(),
            "Renewal period deleted"
        );

        self.publish(EntityKind::RenewalPeriod, id, ChangeKind::Deleted);
        for activity_id in unlinked {
            self.publish(EntityKind::Activity, activity_id, ChangeKind::Updated);
        }
        Ok(())
    }

    /// Owning credential must exist, end must follow start, and no other
    /// period of the same credential may share a day with this one.
    fn validate_period(&self, period: &RenewalPeriod) -> Result<(), AppError> {
        if !self.inner.credentials.contains_key(&period.credential_id) {
            return Err(AppError::not_found("Credential", period.credential_id));
        }

        match period.end_date {
            Some(end) if end <= period.start_date => {
                return Err(AppError::BadRequest(
                    "Renewal period end date must be after its start date".to_string(),
                ));
            }
            Some(_) => {}
            None => {
                return Err(AppError::BadRequest(
                    "Renewal period end date is required".to_string(),
                ));
            }
        }

        if let Some(late_fee_start) = period.late_fee_start_date {
            if !period.contains(late_fee_start) {
                return Err(AppError::BadRequest(
                    "Late fee start date must fall within the renewal period".to_string(),
                ));
            }
        }

        let clash = self.inner.renewal_periods.iter().find_map(|other| {
            (other.id != period.id
                && other.credential_id == period.credential_id
                && other.overlaps(period))
            .then(|| other.display_name())
        });
        if let Some(other_name) = clash {
            return Err(AppError::Conflict(format!(
                "Renewal period overlaps existing period {}",
                other_name
            )));
        }

        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Store a new activity.
    pub fn insert_activity(&self, activity: CeActivity) -> Result<(), AppError> {
        let _guard = self.lock();
        self.validate_activity_links(&activity)?;

        let id = activity.id;
        self.inner.activities.insert(id, activity);

        tracing::info!(activity_id = %id, "Activity created");
        self.publish(EntityKind::Activity, id, ChangeKind::Created);
        Ok(())
    }

    /// Get an activity by ID.
    pub fn get_activity(&self, id: Uuid) -> Option<CeActivity> {
        self.inner.activities.get(&id).map(|a| a.clone())
    }

    /// Activities matching `query`, newest first.
    pub fn list_activities(&self, query: ActivityQuery) -> Vec<CeActivity> {
        let mut activities: Vec<CeActivity> = self
            .inner
            .activities
            .iter()
            .filter(|a| query.credential_id.is_none() || a.credential_id == query.credential_id)
            .filter(|a| {
                query.renewal_period_id.is_none()
                    || a.renewal_period_id == query.renewal_period_id
            })
            .map(|a| a.value().clone())
            .collect();
        activities.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        activities
    }

    /// Replace an existing activity.
    pub fn update_activity(&self, activity: CeActivity) -> Result<(), AppError> {
        let _guard = self.lock();

        let id = activity.id;
        if !self.inner.activities.contains_key(&id) {
            return Err(AppError::not_found("Activity", id));
        }
        self.validate_activity_links(&activity)?;
        self.inner.activities.insert(id, activity);

        tracing::info!(activity_id = %id, "Activity updated");
        self.publish(EntityKind::Activity, id, ChangeKind::Updated);
        Ok(())
    }

    /// Delete an activity with its reflections and certificate.
    pub fn delete_activity(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.lock();

        if self.inner.activities.remove(&id).is_none() {
            return Err(AppError::not_found("Activity", id));
        }

        let reflection_ids: Vec<Uuid> = self
            .inner
            .reflections
            .iter()
            .filter(|r| r.activity_id == id)
            .map(|r| r.id)
            .collect();
        for reflection_id in &reflection_ids {
            self.inner.reflections.remove(reflection_id);
        }
        let had_certificate = self.inner.certificates.remove(&id).is_some();

        tracing::info!(
            activity_id = %id,
            reflections = reflection_ids.len(),
            had_certificate,
            "Activity deleted"
        );

        self.publish(EntityKind::Activity, id, ChangeKind::Deleted);
        for reflection_id in reflection_ids {
            self.publish(EntityKind::Reflection, reflection_id, ChangeKind::Deleted);
        }
        if had_certificate {
            self.publish(EntityKind::Certificate, id, ChangeKind::Deleted);
        }
        Ok(())
    }

    /// Linked credential and period must exist, and agree with each other.
    fn validate_activity_links(&self, activity: &CeActivity) -> Result<(), AppError> {
        if let Some(credential_id) = activity.credential_id {
            if !self.inner.credentials.contains_key(&credential_id) {
                return Err(AppError::not_found("Credential", credential_id));
            }
        }

        if let Some(period_id) = activity.renewal_period_id {
            let owner = self
                .inner
                .renewal_periods
                .get(&period_id)
                .map(|p| p.credential_id)
                .ok_or_else(|| AppError::not_found("Renewal period", period_id))?;
            if activity.credential_id.is_some_and(|c| c != owner) {
                return Err(AppError::BadRequest(
                    "Renewal period belongs to a different credential".to_string(),
                ));
            }
        }

        Ok(())
    }

    // ─── Reflection Operations ───────────────────────────────────

    /// Attach a reflection to an existing activity.
    pub fn insert_reflection(&self, reflection: ActivityReflection) -> Result<(), AppError> {
        let _guard = self.lock();

        if !self.inner.activities.contains_key(&reflection.activity_id) {
            return Err(AppError::not_found("Activity", reflection.activity_id));
        }
        let id = reflection.id;
        self.inner.reflections.insert(id, reflection);

        tracing::debug!(reflection_id = %id, "Reflection created");
        self.publish(EntityKind::Reflection, id, ChangeKind::Created);
        Ok(())
    }

    /// Reflections for an activity, oldest first.
    pub fn list_reflections(&self, activity_id: Uuid) -> Vec<ActivityReflection> {
        let mut reflections: Vec<ActivityReflection> = self
            .inner
            .reflections
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .map(|r| r.value().clone())
            .collect();
        reflections.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        reflections
    }

    // ─── Disciplinary Action Operations ──────────────────────────

    /// Record a disciplinary action against an existing credential.
    pub fn insert_disciplinary_action(&self, action: DisciplinaryAction) -> Result<(), AppError> {
        let _guard = self.lock();

        if !self.inner.credentials.contains_key(&action.credential_id) {
            return Err(AppError::not_found("Credential", action.credential_id));
        }
        let id = action.id;
        self.inner.disciplinary_actions.insert(id, action);

        tracing::info!(disciplinary_action_id = %id, "Disciplinary action recorded");
        self.publish(EntityKind::DisciplinaryAction, id, ChangeKind::Created);
        Ok(())
    }

    /// Disciplinary actions for a credential, most recent first.
    pub fn list_disciplinary_actions(&self, credential_id: Uuid) -> Vec<DisciplinaryAction> {
        let mut actions: Vec<DisciplinaryAction> = self
            .inner
            .disciplinary_actions
            .iter()
            .filter(|a| a.credential_id == credential_id)
            .map(|a| a.value().clone())
            .collect();
        actions.sort_by(|a, b| b.action_date.cmp(&a.action_date));
        actions
    }

    // ─── Certificate Operations ──────────────────────────────────

    /// Store (or replace) the certificate for an existing activity.
    pub fn put_certificate(&self, certificate: Certificate) -> Result<(), AppError> {
        let _guard = self.lock();

        let activity_id = certificate.activity_id;
        if !self.inner.activities.contains_key(&activity_id) {
            return Err(AppError::not_found("Activity", activity_id));
        }
        let kind = match self.inner.certificates.insert(activity_id, certificate) {
            Some(_) => ChangeKind::Updated,
            None => ChangeKind::Created,
        };

        tracing::info!(activity_id = %activity_id, "Certificate stored");
        self.publish(EntityKind::Certificate, activity_id, kind);
        Ok(())
    }

    /// Certificate for an activity, if one was uploaded.
    pub fn get_certificate(&self, activity_id: Uuid) -> Option<Certificate> {
        self.inner.certificates.get(&activity_id).map(|c| c.clone())
    }
}
