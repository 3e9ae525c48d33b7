//! Configuration module for listing scrapes
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder,
//! plus `WarehouseConfig` for the optional upload and load-job stage.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;
pub mod warehouse;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithOutputPath, WithStartUrl};
pub use types::{ListingSelectors, ScrapeConfig, SinkFormat};
pub use warehouse::WarehouseConfig;
