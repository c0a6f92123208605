//! # extvet Common Library
//!
//! Shared code for extvet services including:
//! - Domain model (catalog items, requests, recommendations)
//! - Common error types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
