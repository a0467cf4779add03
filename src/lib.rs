//! padel-cms - Content management backend for a padel club website
//!
//! This crate provides the public site API and the admin console API with:
//! - A draft/published lifecycle shared by every kind of club content
//! - An asset store that owns the images behind content records
//! - redb embedded database for records (ACID, MVCC, crash-safe)
//! - Bearer-token sessions gating the admin API

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod content;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use assets::AssetStore;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub assets: AssetStore,
}
