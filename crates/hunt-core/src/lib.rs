//! Core types and utilities for the predator/prey hunt simulation.

pub mod attributes;
pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use attributes::{derive_stats, Attribute, Genes, Stats};
pub use config::*;
pub use error::{Error, Result};
pub use report::*;
pub use types::*;
