//! # OpenMedicaid Common Library
//!
//! Shared code for the OpenMedicaid site including:
//! - Fixture models and the in-memory dataset
//! - Display formatting and reference tables
//! - Data shaping (aggregation, watchlist merge, search, trends, state risk,
//!   provider comparison)
//! - Configuration loading
//! - The investigations catalog

pub mod aggregate;
pub mod articles;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod models;
pub mod params;
pub mod reference;
pub mod risk;
pub mod search;
pub mod trends;
pub mod watchlist;

pub use dataset::Dataset;
pub use error::{Error, Result};
