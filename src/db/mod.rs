// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (in-memory) and change notifications.

pub mod memory;

pub use memory::{ActivityQuery, MemoryDb};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capacity of the change-event channel; slow subscribers see `Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Kind of record a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Credential,
    RenewalPeriod,
    Activity,
    Reflection,
    DisciplinaryAction,
    Certificate,
}

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Published by the store after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub entity: EntityKind,
    pub id: Uuid,
    pub kind: ChangeKind,
}
