//! Libris Library Catalog Server
//!
//! A Rust backend for a library catalog: registration and login, book
//! browsing, the borrowing lifecycle with overdue fines, OTP-guarded
//! password recovery, and scheduled reminder/cleanup sweeps.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
