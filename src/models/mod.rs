// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod disciplinary;
pub mod renewal;

pub use activity::{ActivityFormat, ActivityReflection, CeActivity, Certificate};
pub use credential::{Credential, CredentialType, MeasurementUnit};
pub use disciplinary::DisciplinaryAction;
pub use renewal::RenewalPeriod;
