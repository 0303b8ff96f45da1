// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - pure domain logic over in-memory records.

pub mod classifier;
pub mod expiration;
pub mod progress;
pub mod sniffer;

pub use classifier::{classify, classify_activity, ActivityStatus};
pub use expiration::{calculate as calculate_expiration, Expiration};
pub use progress::{progress_for_period, RenewalProgress};
pub use sniffer::{sniff, FileType};
