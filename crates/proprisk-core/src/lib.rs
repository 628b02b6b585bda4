//! Proprisk Core - Domain models, errors, and configuration
//!
//! This crate contains the shared domain types used by the GIS utility layer
//! and the valuation indexation routine.

pub mod config;
pub mod error;
pub mod fields;
pub mod models;

pub use error::{PropriskError, Result};
