//! Assembles what the dashboard page needs for one selection.

use std::collections::HashSet;

use geo::Rect;
use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::dataset::{merge_rects, DatasetStore};
use crate::error::Result;
use crate::selection::{layers, Analysis, DataSelection, LayerSpec};
use crate::summary::Summary;

/// Basemap tile source.
#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

/// A layer ready to be handed to Leaflet.
#[derive(Debug, Serialize)]
pub struct MapLayer<'a> {
    #[serde(flatten)]
    pub spec: LayerSpec,
    pub feature_count: usize,
    pub features: &'a FeatureCollection,
}

/// Map layers plus summary panel for a selection.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub analysis: Analysis,
    pub data: DataSelection,
    pub tiles: TileLayer,
    /// Leaflet `fitBounds` order: `[[south, west], [north, east]]`
    pub bounds: Option<[[f64; 2]; 2]>,
    pub layers: Vec<MapLayer<'a>>,
    pub summary: Option<Summary>,
    /// Summary panel rendered as Markdown
    pub summary_markdown: Option<String>,
}

fn leaflet_bounds(rect: Rect<f64>) -> [[f64; 2]; 2] {
    [[rect.min().y, rect.min().x], [rect.max().y, rect.max().x]]
}

impl<'a> DashboardView<'a> {
    pub fn build(
        store: &'a DatasetStore,
        analysis: Analysis,
        data: DataSelection,
        tiles: TileLayer,
    ) -> Result<Self> {
        let mut map_layers = Vec::new();
        let mut bounds: Option<Rect<f64>> = None;

        for spec in layers(analysis, data) {
            let dataset = store.get(spec.dataset)?;
            if let Some(rect) = dataset.bounds() {
                bounds = Some(match bounds {
                    Some(current) => merge_rects(current, rect),
                    None => rect,
                });
            }
            map_layers.push(MapLayer {
                feature_count: dataset.len(),
                features: &dataset.features,
                spec,
            });
        }

        let summary = Summary::compute(store, analysis, data)?;
        let summary_markdown = summary.as_ref().map(Summary::to_markdown);

        Ok(Self {
            analysis,
            data,
            tiles,
            bounds: bounds.map(leaflet_bounds),
            layers: map_layers,
            summary,
            summary_markdown,
        })
    }
}

/// The "show raw data" table: attribute rows of every selected layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

impl RawTable {
    pub const LAYER_COLUMN: &'static str = "layer";
    pub const GEOMETRY_COLUMN: &'static str = "geometry";

    /// Concatenates the selected layers; columns are the union of all keys in
    /// first-seen order, framed by the layer name and the geometry type.
    pub fn build(store: &DatasetStore, analysis: Analysis, data: DataSelection) -> Result<Self> {
        let mut columns = vec![Self::LAYER_COLUMN.to_string()];
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows = Vec::new();

        for spec in layers(analysis, data) {
            let dataset = store.get(spec.dataset)?;
            for feature in dataset.iter() {
                let mut row = Map::new();
                row.insert(Self::LAYER_COLUMN.to_string(), Value::String(spec.name.clone()));

                if let Some(properties) = &feature.properties {
                    for (key, value) in properties {
                        if seen.insert(key.clone()) {
                            columns.push(key.clone());
                        }
                        row.insert(key.clone(), value.clone());
                    }
                }

                let geometry = feature
                    .geometry
                    .as_ref()
                    .map(|g| Value::String(geometry_type(&g.value).to_string()))
                    .unwrap_or(Value::Null);
                row.insert(Self::GEOMETRY_COLUMN.to_string(), geometry);
                rows.push(row);
            }
        }

        columns.push(Self::GEOMETRY_COLUMN.to_string());
        Ok(Self { columns, rows })
    }
}
