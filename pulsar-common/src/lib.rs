//! # Pulsar Common Library
//!
//! Shared code for the Pulsar diagnosis service:
//! - Error type used by storage and configuration
//! - Root folder resolution and configuration loading
//! - Diagnosis Store: schema creation, migrations, knowledge base, history

pub mod config;
pub mod db;
pub mod error;

pub use db::DiagnosisStore;
pub use error::{Error, Result};
