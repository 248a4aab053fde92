//! The dashboard's decision table.
//!
//! Every (analysis, data selection) pair maps to zero, one or two map layers,
//! each drawn from one of the pre-computed datasets with a fixed style.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::dataset::{DatasetId, GeometryKind, ADT_PT, AM_PT, DELAY_WAVG, LINE_NAME, LOS, VEHICLE_COUNT};
use crate::error::NptError;

/// Analysis category offered in the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Analysis {
    /// Highest priority: significant bus delay, bus volumes and passenger demand
    #[default]
    KeyLocations,
    /// Secondary locations with reasonable levels of forecast bus delay
    Delay,
    /// Secondary locations with greater levels of bus demand
    Demand,
}

impl Analysis {
    pub const ALL: [Analysis; 3] = [Analysis::KeyLocations, Analysis::Delay, Analysis::Demand];

    pub fn label(&self) -> &'static str {
        match self {
            Analysis::KeyLocations => "Key locations",
            Analysis::Delay => "Delay",
            Analysis::Demand => "Demand",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Analysis::KeyLocations => "key-locations",
            Analysis::Delay => "delay",
            Analysis::Demand => "demand",
        }
    }

    /// Suffix shared by this analysis' layer names.
    pub fn layer_suffix(&self) -> &'static str {
        match self {
            Analysis::KeyLocations => "Critical locations",
            Analysis::Delay => "Prioritised by delay",
            Analysis::Demand => "Prioritised by demand",
        }
    }

    pub fn summary_title(&self) -> &'static str {
        match self {
            Analysis::KeyLocations => "Key Locations Summary",
            Analysis::Delay => "Delay Locations Summary",
            Analysis::Demand => "Demand Locations Summary",
        }
    }

    /// How user figures are reported when roads and intersections are shown together.
    pub fn combined_users(&self) -> CombinedUsers {
        match self {
            Analysis::KeyLocations => CombinedUsers::IntersectionsOnly,
            Analysis::Delay | Analysis::Demand => CombinedUsers::SumOfLayerMeans,
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Analysis {
    type Err = NptError;

    /// Accepts either the dropdown label or the slug, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Analysis::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(wanted) || a.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| NptError::UnknownAnalysis(s.to_string()))
    }
}

/// Geometry selection offered by the radio buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DataSelection {
    /// Placeholder: nothing is rendered until the user picks something
    #[default]
    Select,
    Roads,
    Intersections,
    Both,
}

impl DataSelection {
    pub const ALL: [DataSelection; 4] = [
        DataSelection::Select,
        DataSelection::Roads,
        DataSelection::Intersections,
        DataSelection::Both,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DataSelection::Select => "Select",
            DataSelection::Roads => "Roads",
            DataSelection::Intersections => "Intersections",
            DataSelection::Both => "Both roads and intersections",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            DataSelection::Select => "select",
            DataSelection::Roads => "roads",
            DataSelection::Intersections => "intersections",
            DataSelection::Both => "both",
        }
    }

    /// Geometry kinds to draw, in draw order. Intersections go first so the
    /// road layer is overlaid on top of them.
    pub fn kinds(&self) -> &'static [GeometryKind] {
        match self {
            DataSelection::Select => &[],
            DataSelection::Roads => &[GeometryKind::Roads],
            DataSelection::Intersections => &[GeometryKind::Intersections],
            DataSelection::Both => &[GeometryKind::Intersections, GeometryKind::Roads],
        }
    }
}

impl fmt::Display for DataSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataSelection {
    type Err = NptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DataSelection::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(wanted) || d.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| NptError::UnknownDataSelection(s.to_string()))
    }
}

/// Aggregation rule for daily and AM-peak users in the combined view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedUsers {
    /// Report the intersection layer's means
    IntersectionsOnly,
    /// Report the truncated link mean plus the truncated intersection mean
    SumOfLayerMeans,
}

/// Leaflet styling for one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerStyle {
    Polyline {
        color: &'static str,
        weight: f32,
        opacity: f32,
    },
    CircleMarker {
        radius: f32,
        fill_color: &'static str,
        stroke: bool,
        weight: f32,
        opacity: f32,
    },
}

impl LayerStyle {
    pub fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Roads => LayerStyle::Polyline {
                color: "red",
                weight: 3.0,
                opacity: 0.7,
            },
            GeometryKind::Intersections => LayerStyle::CircleMarker {
                radius: 6.0,
                fill_color: "red",
                stroke: true,
                weight: 0.6,
                opacity: 0.7,
            },
        }
    }
}

/// Everything needed to draw one dataset as a map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub dataset: DatasetId,
    pub name: String,
    pub style: LayerStyle,
    /// Properties shown in the hover tooltip and the click popup
    pub fields: &'static [&'static str],
    /// Legends are switched off; the layer control lists layer names instead
    pub legend: bool,
}

impl LayerSpec {
    pub fn new(analysis: Analysis, kind: GeometryKind) -> Self {
        let (prefix, fields): (&str, &'static [&'static str]) = match kind {
            GeometryKind::Roads => ("Links", &[LOS, ADT_PT, AM_PT, LINE_NAME, VEHICLE_COUNT]),
            GeometryKind::Intersections => ("Intersections", &[AM_PT, ADT_PT, DELAY_WAVG]),
        };
        Self {
            dataset: DatasetId::new(analysis, kind),
            name: format!("{} - {}", prefix, analysis.layer_suffix()),
            style: LayerStyle::for_kind(kind),
            fields,
            legend: false,
        }
    }
}

/// The layers to render for a selection, in draw order.
pub fn layers(analysis: Analysis, data: DataSelection) -> Vec<LayerSpec> {
    data.kinds()
        .iter()
        .map(|&kind| LayerSpec::new(analysis, kind))
        .collect()
}
