//! Shared types and configuration for Cachet.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Settlement period type used by the cashflow pipeline
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
