use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::DatasetId;

// Custom Result type alias for convenient use across the project
pub type Result<T> = std::result::Result<T, NptError>;

#[derive(Error, Debug)]
pub enum NptError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Dataset {0} is not a FeatureCollection")]
    NotFeatureCollection(DatasetId),

    #[error("Dataset {0} is not loaded")]
    MissingDataset(DatasetId),

    #[error("Dataset {dataset} has no column '{column}'")]
    MissingColumn { dataset: DatasetId, column: String },

    #[error("Dataset {dataset}, feature {feature}: '{column}' is not numeric ({value})")]
    NonNumeric {
        dataset: DatasetId,
        feature: usize,
        column: String,
        value: serde_json::Value,
    },

    #[error("Unknown analysis: '{0}'")]
    UnknownAnalysis(String),

    #[error("Unknown data selection: '{0}'")]
    UnknownDataSelection(String),
}
