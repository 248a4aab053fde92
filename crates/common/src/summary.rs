//! Aggregate statistics shown beside the map.

use std::fmt::Write as _;

use serde::Serialize;

use crate::dataset::{Dataset, DatasetId, DatasetStore, GeometryKind, ADT_PT, AM_PT, DELAY_WAVG, LOS};
use crate::error::Result;
use crate::selection::{Analysis, CombinedUsers, DataSelection};

/// All figures come from the 2048 forecast model year.
pub const FORECAST_YEAR: u16 = 2048;

/// One bullet of the summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    /// Source column
    pub column: &'static str,
    /// Mean truncated toward zero; `None` when the column has no values
    pub value: Option<i64>,
    pub lead: &'static str,
    pub trail: &'static str,
}

impl Statistic {
    fn render(&self) -> String {
        let value = self
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let mut line = format!("{} **{}**", self.lead, value);
        if !self.trail.is_empty() {
            line.push(' ');
            line.push_str(self.trail);
        }
        format!("{} ({}).", line, FORECAST_YEAR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub title: &'static str,
    pub analysis: Analysis,
    pub data: DataSelection,
    pub intersections: Option<usize>,
    pub road_segments: Option<usize>,
    pub statistics: Vec<Statistic>,
}

fn truncated_mean(dataset: &Dataset, column: &str) -> Result<Option<i64>> {
    Ok(dataset.mean(column)?.map(|mean| mean.trunc() as i64))
}

/// Adds two optional figures, keeping whichever side is present. Saturates
/// rather than overflowing on absurd inputs.
fn add_figures(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn daily_users(value: Option<i64>, trail: &'static str) -> Statistic {
    Statistic {
        column: ADT_PT,
        value,
        lead: "an average of",
        trail,
    }
}

fn am_peak_users(value: Option<i64>) -> Statistic {
    Statistic {
        column: AM_PT,
        value,
        lead: "an average of",
        trail: "bus users in the AM peak",
    }
}

fn delay(value: Option<i64>) -> Statistic {
    Statistic {
        column: DELAY_WAVG,
        value,
        lead: "average delays of",
        trail: "seconds every hour per bus movement",
    }
}

impl Summary {
    /// Computes the panel for a selection; `Select` has no panel.
    pub fn compute(store: &DatasetStore, analysis: Analysis, data: DataSelection) -> Result<Option<Self>> {
        let roads = || store.get(DatasetId::new(analysis, GeometryKind::Roads));
        let nodes = || store.get(DatasetId::new(analysis, GeometryKind::Intersections));

        let (intersections, road_segments, statistics) = match data {
            DataSelection::Select => return Ok(None),
            DataSelection::Roads => {
                let links = roads()?;
                let statistics = vec![
                    daily_users(truncated_mean(links, ADT_PT)?, "bus users per day"),
                    am_peak_users(truncated_mean(links, AM_PT)?),
                    Statistic {
                        column: LOS,
                        value: truncated_mean(links, LOS)?,
                        lead: "average level of service (LoS) classification of",
                        trail: "",
                    },
                ];
                (None, Some(links.len()), statistics)
            }
            DataSelection::Intersections => {
                let nodes = nodes()?;
                let statistics = vec![
                    daily_users(
                        truncated_mean(nodes, ADT_PT)?,
                        "bus users travelling through them every day",
                    ),
                    am_peak_users(truncated_mean(nodes, AM_PT)?),
                    delay(truncated_mean(nodes, DELAY_WAVG)?),
                ];
                (Some(nodes.len()), None, statistics)
            }
            DataSelection::Both => {
                let nodes = nodes()?;
                let links = roads()?;
                let (adt, am) = match analysis.combined_users() {
                    CombinedUsers::IntersectionsOnly => {
                        (truncated_mean(nodes, ADT_PT)?, truncated_mean(nodes, AM_PT)?)
                    }
                    CombinedUsers::SumOfLayerMeans => (
                        add_figures(truncated_mean(links, ADT_PT)?, truncated_mean(nodes, ADT_PT)?),
                        add_figures(truncated_mean(nodes, AM_PT)?, truncated_mean(links, AM_PT)?),
                    ),
                };
                let statistics = vec![
                    daily_users(adt, "bus users travelling through them every day"),
                    am_peak_users(am),
                    delay(truncated_mean(nodes, DELAY_WAVG)?),
                ];
                (Some(nodes.len()), Some(links.len()), statistics)
            }
        };

        Ok(Some(Summary {
            title: analysis.summary_title(),
            analysis,
            data,
            intersections,
            road_segments,
            statistics,
        }))
    }

    /// Renders the panel as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "### {}\n", self.title);
        let _ = writeln!(out, "This shows the results of analysis for:");
        let _ = writeln!(out, "- {}; where,", self.analysis.label());
        let _ = writeln!(out, "- {} has been selected.\n", self.data.label());

        let (counts, subject, verb) = match (self.intersections, self.road_segments) {
            (Some(n), Some(r)) => (
                format!("**{}** intersections and **{}** road segments", n, r),
                "These roads and intersections",
                "they accommodate",
            ),
            (Some(n), None) => (format!("**{}** Intersections", n), "These intersections", "they accommodate"),
            (None, Some(r)) => (
                format!("**{}** road segments", r),
                "These roads",
                "they are forecast to accommodate",
            ),
            (None, None) => (String::from("no locations"), "These locations", "they accommodate"),
        };
        let _ = writeln!(out, "There are {} identified in this analysis.\n", counts);
        let _ = writeln!(out, "{} have been selected because {}:", subject, verb);
        for statistic in &self.statistics {
            let _ = writeln!(out, "- {}", statistic.render());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{collection, dataset, line, point};
    use serde_json::json;

    fn store(analysis: Analysis) -> DatasetStore {
        let links = dataset(
            DatasetId::new(analysis, GeometryKind::Roads),
            collection(vec![
                line(
                    &[[176.10, -37.70], [176.11, -37.69]],
                    json!({ "LOS": 4.0, "ADT_PT": 1200.0, "AM_PT": 180.0, "line_name": "1", "vehicle_co": 30 }),
                ),
                line(
                    &[[176.11, -37.69], [176.12, -37.68]],
                    json!({ "LOS": 5.0, "ADT_PT": 901.0, "AM_PT": 151.0, "line_name": "2", "vehicle_co": 22 }),
                ),
            ]),
        );
        let nodes = dataset(
            DatasetId::new(analysis, GeometryKind::Intersections),
            collection(vec![
                point(176.10, -37.70, json!({ "AM_PT": 200.0, "ADT_PT": 1500.0, "DELAY_WAVG": 45.9 })),
                point(176.12, -37.68, json!({ "AM_PT": 161.0, "ADT_PT": 1001.0, "DELAY_WAVG": 30.0 })),
                point(176.14, -37.66, json!({ "AM_PT": 150.0, "ADT_PT": 1000.0, "DELAY_WAVG": null })),
            ]),
        );
        DatasetStore::from_datasets(vec![links, nodes])
    }

    fn values(summary: &Summary) -> Vec<(&'static str, Option<i64>)> {
        summary.statistics.iter().map(|s| (s.column, s.value)).collect()
    }

    #[test]
    fn select_has_no_summary() {
        let store = store(Analysis::Delay);
        assert!(Summary::compute(&store, Analysis::Delay, DataSelection::Select)
            .unwrap()
            .is_none());
    }

    #[test]
    fn roads_summary_truncates_means() {
        let store = store(Analysis::KeyLocations);
        let summary = Summary::compute(&store, Analysis::KeyLocations, DataSelection::Roads)
            .unwrap()
            .unwrap();
        assert_eq!(summary.title, "Key Locations Summary");
        assert_eq!(summary.road_segments, Some(2));
        assert_eq!(summary.intersections, None);
        // ADT 1050.5, AM 165.5, LOS 4.5
        assert_eq!(values(&summary), vec![("ADT_PT", Some(1050)), ("AM_PT", Some(165)), ("LOS", Some(4))]);
    }

    #[test]
    fn intersections_summary_reports_delay() {
        let store = store(Analysis::Demand);
        let summary = Summary::compute(&store, Analysis::Demand, DataSelection::Intersections)
            .unwrap()
            .unwrap();
        assert_eq!(summary.title, "Demand Locations Summary");
        assert_eq!(summary.intersections, Some(3));
        // ADT 1167, AM 170.33, delay 37.95 over the two non-null values
        assert_eq!(
            values(&summary),
            vec![("ADT_PT", Some(1167)), ("AM_PT", Some(170)), ("DELAY_WAVG", Some(37))]
        );
    }

    #[test]
    fn key_locations_combined_uses_intersections_only() {
        let store = store(Analysis::KeyLocations);
        let summary = Summary::compute(&store, Analysis::KeyLocations, DataSelection::Both)
            .unwrap()
            .unwrap();
        assert_eq!(summary.intersections, Some(3));
        assert_eq!(summary.road_segments, Some(2));
        assert_eq!(
            values(&summary),
            vec![("ADT_PT", Some(1167)), ("AM_PT", Some(170)), ("DELAY_WAVG", Some(37))]
        );
    }

    #[test]
    fn delay_combined_sums_truncated_layer_means() {
        let store = store(Analysis::Delay);
        let summary = Summary::compute(&store, Analysis::Delay, DataSelection::Both)
            .unwrap()
            .unwrap();
        // 1050 + 1167 and 170 + 165
        assert_eq!(
            values(&summary),
            vec![("ADT_PT", Some(2217)), ("AM_PT", Some(335)), ("DELAY_WAVG", Some(37))]
        );
    }

    #[test]
    fn combined_sum_saturates_on_huge_means() {
        let analysis = Analysis::Delay;
        let links = dataset(
            DatasetId::new(analysis, GeometryKind::Roads),
            collection(vec![line(
                &[[176.10, -37.70], [176.11, -37.69]],
                json!({ "LOS": 4.0, "ADT_PT": 9.0e18, "AM_PT": 10.0 }),
            )]),
        );
        let nodes = dataset(
            DatasetId::new(analysis, GeometryKind::Intersections),
            collection(vec![point(
                176.10,
                -37.70,
                json!({ "AM_PT": 20.0, "ADT_PT": 9.0e18, "DELAY_WAVG": 5.0 }),
            )]),
        );
        let store = DatasetStore::from_datasets(vec![links, nodes]);
        let summary = Summary::compute(&store, analysis, DataSelection::Both)
            .unwrap()
            .unwrap();
        assert_eq!(
            values(&summary),
            vec![("ADT_PT", Some(i64::MAX)), ("AM_PT", Some(30)), ("DELAY_WAVG", Some(5))]
        );
    }

    #[test]
    fn combined_sum_keeps_the_populated_layer() {
        let analysis = Analysis::Delay;
        let links = dataset(
            DatasetId::new(analysis, GeometryKind::Roads),
            collection(vec![line(
                &[[176.10, -37.70], [176.11, -37.69]],
                json!({ "LOS": 4.0, "ADT_PT": 500.0, "AM_PT": 50.0 }),
            )]),
        );
        let nodes = dataset(DatasetId::new(analysis, GeometryKind::Intersections), collection(vec![]));
        let store = DatasetStore::from_datasets(vec![links, nodes]);
        let summary = Summary::compute(&store, analysis, DataSelection::Both)
            .unwrap()
            .unwrap();
        assert_eq!(summary.intersections, Some(0));
        assert_eq!(summary.road_segments, Some(1));
        assert_eq!(
            values(&summary),
            vec![("ADT_PT", Some(500)), ("AM_PT", Some(50)), ("DELAY_WAVG", None)]
        );
        assert!(summary
            .to_markdown()
            .contains("There are **0** intersections and **1** road segments identified"));
    }

    #[test]
    fn intersections_count_line_echoes_the_selection_label() {
        let store = store(Analysis::Demand);
        let text = Summary::compute(&store, Analysis::Demand, DataSelection::Intersections)
            .unwrap()
            .unwrap()
            .to_markdown();
        assert!(text.contains("There are **3** Intersections identified in this analysis."));
    }

    #[test]
    fn empty_layers_render_as_not_available() {
        let id = DatasetId::new(Analysis::Delay, GeometryKind::Roads);
        let store = DatasetStore::from_datasets(vec![dataset(id, collection(vec![]))]);
        let summary = Summary::compute(&store, Analysis::Delay, DataSelection::Roads)
            .unwrap()
            .unwrap();
        assert_eq!(summary.road_segments, Some(0));
        assert!(summary.statistics.iter().all(|s| s.value.is_none()));
        assert!(summary.to_markdown().contains("an average of **n/a** bus users per day (2048)."));
    }

    #[test]
    fn missing_dataset_is_reported() {
        let id = DatasetId::new(Analysis::Delay, GeometryKind::Roads);
        let store = DatasetStore::from_datasets(vec![dataset(id, collection(vec![]))]);
        assert!(Summary::compute(&store, Analysis::Delay, DataSelection::Both).is_err());
    }

    #[test]
    fn markdown_panel_text() {
        let store = store(Analysis::Delay);
        let summary = Summary::compute(&store, Analysis::Delay, DataSelection::Both)
            .unwrap()
            .unwrap();
        let text = summary.to_markdown();
        assert!(text.starts_with("### Delay Locations Summary\n"));
        assert!(text.contains("- Delay; where,\n- Both roads and intersections has been selected."));
        assert!(text.contains("There are **3** intersections and **2** road segments identified"));
        assert!(text.contains("- an average of **2217** bus users travelling through them every day (2048)."));
        assert!(text.contains("- average delays of **37** seconds every hour per bus movement (2048)."));
    }

    #[test]
    fn los_line_has_no_trailing_unit() {
        let store = store(Analysis::Demand);
        let text = Summary::compute(&store, Analysis::Demand, DataSelection::Roads)
            .unwrap()
            .unwrap()
            .to_markdown();
        assert!(text.contains("These roads have been selected because they are forecast to accommodate:"));
        assert!(text.contains("- average level of service (LoS) classification of **4** (2048)."));
    }
}
