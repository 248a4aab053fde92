//! Prioritisation dataset loading.
//!
//! The upstream analysis delivers one GeoJSON FeatureCollection per
//! (analysis, geometry kind) pair. This module reads them once at startup and
//! exposes the attribute columns the dashboard aggregates over.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use geo::{BoundingRect, Coord, Rect};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use serde_json::Value;

use crate::error::{NptError, Result};
use crate::selection::Analysis;

/// Forecast average daily public-transport users.
pub const ADT_PT: &str = "ADT_PT";
/// Forecast AM-peak public-transport users.
pub const AM_PT: &str = "AM_PT";
/// Level-of-service classification of a road link.
pub const LOS: &str = "LOS";
/// Weighted average delay per bus movement at an intersection, in seconds per hour.
pub const DELAY_WAVG: &str = "DELAY_WAVG";
pub const LINE_NAME: &str = "line_name";
pub const VEHICLE_COUNT: &str = "vehicle_co";

/// Which network element a dataset describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Road segments (links), drawn as polylines
    Roads,
    /// Intersections (nodes), drawn as circle markers
    Intersections,
}

/// Identifies one of the six input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetId {
    pub analysis: Analysis,
    pub kind: GeometryKind,
}

impl DatasetId {
    pub const fn new(analysis: Analysis, kind: GeometryKind) -> Self {
        Self { analysis, kind }
    }

    pub fn all() -> impl Iterator<Item = DatasetId> {
        Analysis::ALL.into_iter().flat_map(|analysis| {
            [GeometryKind::Roads, GeometryKind::Intersections]
                .into_iter()
                .map(move |kind| DatasetId::new(analysis, kind))
        })
    }

    /// File stem used by the upstream export.
    pub fn stem(&self) -> &'static str {
        match (self.analysis, self.kind) {
            (Analysis::KeyLocations, GeometryKind::Roads) => "links_key_locations",
            (Analysis::KeyLocations, GeometryKind::Intersections) => "key_locations",
            (Analysis::Delay, GeometryKind::Roads) => "links_delay",
            (Analysis::Delay, GeometryKind::Intersections) => "delay",
            (Analysis::Demand, GeometryKind::Roads) => "links_demand",
            (Analysis::Demand, GeometryKind::Intersections) => "demand",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.geojson", self.stem())
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// A loaded FeatureCollection tagged with the dataset it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: DatasetId,
    pub features: FeatureCollection,
}

impl Dataset {
    pub fn from_geojson(id: DatasetId, geojson: GeoJson) -> Result<Self> {
        match geojson {
            GeoJson::FeatureCollection(features) => Ok(Self { id, features }),
            _ => Err(NptError::NotFeatureCollection(id)),
        }
    }

    /// Reads and parses a single GeoJSON file.
    pub fn load(id: DatasetId, path: &Path) -> Result<Self> {
        tracing::debug!("Parsing {} from {}", id, path.display());
        let raw = fs::read_to_string(path).map_err(|source| NptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let geojson = raw.parse::<GeoJson>()?;
        Self::from_geojson(id, geojson)
    }

    pub fn len(&self) -> usize {
        self.features.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.features.iter()
    }

    /// Numeric values of `column` in feature order.
    ///
    /// `null`, empty strings and absent keys are missing values. Numeric
    /// strings are accepted since some exports quote their numbers. A column
    /// absent from every feature of a non-empty dataset is an error.
    pub fn column(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let mut seen = false;
        let mut values = Vec::with_capacity(self.len());

        for (index, feature) in self.iter().enumerate() {
            let raw = feature.properties.as_ref().and_then(|p| p.get(column));
            if raw.is_some() {
                seen = true;
            }
            let value = match raw {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) if s.trim().is_empty() => None,
                Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| {
                    NptError::NonNumeric {
                        dataset: self.id,
                        feature: index,
                        column: column.to_string(),
                        value: Value::String(s.clone()),
                    }
                })?),
                Some(other) => {
                    return Err(NptError::NonNumeric {
                        dataset: self.id,
                        feature: index,
                        column: column.to_string(),
                        value: other.clone(),
                    })
                }
            };
            values.push(value);
        }

        if !seen && !self.is_empty() {
            return Err(NptError::MissingColumn {
                dataset: self.id,
                column: column.to_string(),
            });
        }
        Ok(values)
    }

    /// Mean over the non-missing values of `column`, `None` if there are none.
    pub fn mean(&self, column: &str) -> Result<Option<f64>> {
        let (sum, count) = self
            .column(column)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            Ok(None)
        } else {
            Ok(Some(sum / count as f64))
        }
    }

    /// Bounding rectangle over every feature geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .filter_map(|geometry| {
                match geo::Geometry::<f64>::try_from(geometry.value.clone()) {
                    Ok(geometry) => geometry.bounding_rect(),
                    Err(e) => {
                        tracing::debug!("{}: skipping geometry in bounds: {}", self.id, e);
                        None
                    }
                }
            })
            .reduce(merge_rects)
    }
}

/// Smallest rectangle containing both inputs.
pub fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// All six datasets, loaded once and shared read-only by every request.
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: HashMap<DatasetId, Dataset>,
}

impl DatasetStore {
    pub fn from_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        Self {
            datasets: datasets.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    /// Loads every dataset from `dir`, failing on the first unreadable file.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        tracing::info!("🗺️ Loading prioritisation datasets from: {}", dir.display());

        let mut store = DatasetStore::default();
        for id in DatasetId::all() {
            let dataset = Dataset::load(id, &dir.join(id.file_name()))?;
            tracing::info!("Loaded {}: {} features", id, dataset.len());
            store.datasets.insert(id, dataset);
        }

        tracing::info!("✅ Datasets loaded: {}", store.datasets.len());
        Ok(store)
    }

    pub fn get(&self, id: DatasetId) -> Result<&Dataset> {
        self.datasets.get(&id).ok_or(NptError::MissingDataset(id))
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Feature count per loaded dataset, in the canonical dataset order.
    pub fn counts(&self) -> Vec<(DatasetId, usize)> {
        DatasetId::all()
            .filter_map(|id| self.datasets.get(&id).map(|d| (id, d.len())))
            .collect()
    }
}
