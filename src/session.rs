// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state: purchase tier, list filters and what the UI is presenting.
//!
//! State only changes through [`SessionCommand`]s applied by [`reduce`];
//! observers follow along through a watch channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::db::EntityKind;
use crate::services::ActivityStatus;

/// In-app purchase tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PurchaseTier {
    #[default]
    Free,
    Basic,
    Pro,
}

impl PurchaseTier {
    /// Maximum number of credentials on this tier; `None` means unlimited.
    pub fn credential_limit(self, free_limit: usize) -> Option<usize> {
        match self {
            PurchaseTier::Free => Some(free_limit),
            PurchaseTier::Basic | PurchaseTier::Pro => None,
        }
    }
}

/// The one sheet or alert currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presentation {
    #[default]
    None,
    Editing { entity: PresentedEntity, id: Uuid },
    ConfirmingDelete { entity: PresentedEntity, id: Uuid },
    AddingRenewalPeriod { credential_id: Uuid },
}

/// Records that can be edited or deleted from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentedEntity {
    Credential,
    RenewalPeriod,
    Activity,
}

impl From<PresentedEntity> for EntityKind {
    fn from(entity: PresentedEntity) -> Self {
        match entity {
            PresentedEntity::Credential => EntityKind::Credential,
            PresentedEntity::RenewalPeriod => EntityKind::RenewalPeriod,
            PresentedEntity::Activity => EntityKind::Activity,
        }
    }
}

/// Snapshot of session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub purchase_tier: PurchaseTier,
    pub activity_filter: ActivityStatus,
    pub search_text: String,
    pub presentation: Presentation,
}

/// Longest search text, in characters, that activity listing accepts.
pub const MAX_SEARCH_CHARS: usize = 100;

/// Everything that may change the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    SetPurchaseTier { tier: PurchaseTier },
    SetActivityFilter { filter: ActivityStatus },
    SetSearchText { text: String },
    Present { presentation: Presentation },
    Dismiss,
    /// A record went away; drop any presentation that refers to it.
    RecordDeleted { entity: EntityKind, id: Uuid },
}

/// Apply one command. Pure: the previous state is consumed, the next returned.
pub fn reduce(mut state: SessionState, command: SessionCommand) -> SessionState {
    match command {
        SessionCommand::SetPurchaseTier { tier } => state.purchase_tier = tier,
        SessionCommand::SetActivityFilter { filter } => state.activity_filter = filter,
        SessionCommand::SetSearchText { text } => {
            state.search_text = text.trim().chars().take(MAX_SEARCH_CHARS).collect()
        }
        SessionCommand::Present { presentation } => state.presentation = presentation,
        SessionCommand::Dismiss => state.presentation = Presentation::None,
        SessionCommand::RecordDeleted { entity, id } => {
            if presentation_refers_to(&state.presentation, entity, id) {
                state.presentation = Presentation::None;
            }
        }
    }
    state
}

fn presentation_refers_to(presentation: &Presentation, entity: EntityKind, id: Uuid) -> bool {
    match presentation {
        Presentation::None => false,
        Presentation::Editing {
            entity: shown,
            id: shown_id,
        }
        | Presentation::ConfirmingDelete {
            entity: shown,
            id: shown_id,
        } => EntityKind::from(*shown) == entity && *shown_id == id,
        Presentation::AddingRenewalPeriod { credential_id } => {
            entity == EntityKind::Credential && *credential_id == id
        }
    }
}

/// Holder of the session state. All writes go through [`SessionStore::dispatch`].
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl SessionStore {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Reduce `command` into the current state and return the result.
    pub fn dispatch(&self, command: SessionCommand) -> SessionState {
        tracing::debug!(command = ?command, "Session command");
        self.tx.send_modify(|state| {
            *state = reduce(std::mem::take(state), command);
        });
        self.snapshot()
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every state change after this call.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_presentation_replaces_previous() {
        let id_a = Uuid::new_v4();
        let id_b = Uuid::new_v4();

        let state = reduce(
            SessionState::default(),
            SessionCommand::Present {
                presentation: Presentation::Editing {
                    entity: PresentedEntity::Activity,
                    id: id_a,
                },
            },
        );
        let state = reduce(
            state,
            SessionCommand::Present {
                presentation: Presentation::ConfirmingDelete {
                    entity: PresentedEntity::Credential,
                    id: id_b,
                },
            },
        );

        assert_eq!(
            state.presentation,
            Presentation::ConfirmingDelete {
                entity: PresentedEntity::Credential,
                id: id_b,
            }
        );

        let state = reduce(state, SessionCommand::Dismiss);
        assert_eq!(state.presentation, Presentation::None);
    }

    #[test]
    fn test_record_deleted_clears_matching_presentation_only() {
        let id = Uuid::new_v4();
        let editing = SessionState {
            presentation: Presentation::Editing {
                entity: PresentedEntity::Activity,
                id,
            },
            ..Default::default()
        };

        let unrelated = reduce(
            editing.clone(),
            SessionCommand::RecordDeleted {
                entity: EntityKind::Activity,
                id: Uuid::new_v4(),
            },
        );
        assert_eq!(unrelated.presentation, editing.presentation);

        let wrong_kind = reduce(
            editing.clone(),
            SessionCommand::RecordDeleted {
                entity: EntityKind::Credential,
                id,
            },
        );
        assert_eq!(wrong_kind.presentation, editing.presentation);

        let cleared = reduce(
            editing,
            SessionCommand::RecordDeleted {
                entity: EntityKind::Activity,
                id,
            },
        );
        assert_eq!(cleared.presentation, Presentation::None);
    }

    #[test]
    fn test_filters_and_tier() {
        let state = reduce(
            SessionState::default(),
            SessionCommand::SetSearchText {
                text: "  ethics ".to_string(),
            },
        );
        let state = reduce(
            state,
            SessionCommand::SetActivityFilter {
                filter: ActivityStatus::ExpiringSoon,
            },
        );
        let state = reduce(
            state,
            SessionCommand::SetPurchaseTier {
                tier: PurchaseTier::Pro,
            },
        );

        assert_eq!(state.search_text, "ethics");
        assert_eq!(state.activity_filter, ActivityStatus::ExpiringSoon);
        assert_eq!(state.purchase_tier.credential_limit(1), None);
        assert_eq!(PurchaseTier::Free.credential_limit(1), Some(1));
    }

    #[test]
    fn test_search_text_capped_in_characters() {
        let state = reduce(
            SessionState::default(),
            SessionCommand::SetSearchText {
                text: "é".repeat(MAX_SEARCH_CHARS + 50),
            },
        );
        assert_eq!(state.search_text.chars().count(), MAX_SEARCH_CHARS);
    }

    #[test]
    fn test_store_notifies_subscribers() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        let next = store.dispatch(SessionCommand::SetPurchaseTier {
            tier: PurchaseTier::Basic,
        });

        assert_eq!(next.purchase_tier, PurchaseTier::Basic);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().purchase_tier, PurchaseTier::Basic);
    }

    #[test]
    fn test_command_json_shape() {
        let command: SessionCommand = serde_json::from_str(
            r#"{"type":"set_activity_filter","filter":"final_day"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            SessionCommand::SetActivityFilter {
                filter: ActivityStatus::FinalDay
            }
        );
    }
}
