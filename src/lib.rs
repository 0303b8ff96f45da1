// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CE Cache: track professional credentials and continuing education.
//!
//! This crate provides the backend API for recording credentials, their
//! renewal periods and CE activities, and for working out what is current,
//! expiring or overdue.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use db::MemoryDb;
use session::SessionStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
    pub session: SessionStore,
}

impl AppState {
    /// Fresh state with an empty store and default session.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            db: MemoryDb::new(),
            session: SessionStore::default(),
        }
    }
}
