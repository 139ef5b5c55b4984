//! HMA Console - operator console service for hasher-matcher-actioner
//!
//! Validates operator input, drives the HMA REST API (match lookups, bank
//! curation, exchange setup, stats) and returns JSON view-models for the UI.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ContentSubmission, MatchView, QuerySubmission, RemovalSummary};
pub use error::ConsoleError;
pub use services::{Console, HmaClient, HmaError};
