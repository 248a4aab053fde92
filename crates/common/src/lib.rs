//! Common library for the Network Prioritisation Tool.
//!
//! This crate provides everything the dashboard service needs besides HTTP:
//! configuration management, error handling, telemetry utilities, loading of
//! the pre-computed prioritisation datasets, and the selection table that
//! turns dropdown choices into map layers and summary statistics.

// Configuration management
pub mod config;
pub use config::Config;

// Error handling types
pub mod error;
pub use error::{NptError, Result};

// Telemetry and observability
pub mod telemetry;
pub use telemetry::init_tracing;

// Prioritisation datasets
pub mod dataset;
pub use dataset::{Dataset, DatasetId, DatasetStore, GeometryKind};

// Dropdown/radio decision table
pub mod selection;
pub use selection::{layers, Analysis, DataSelection, LayerSpec, LayerStyle};

pub mod summary;
pub use summary::{Statistic, Summary};

pub mod view;
pub use view::{DashboardView, MapLayer, RawTable, TileLayer};
