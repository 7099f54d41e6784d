#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! GeoJSON rendering of heatmaps and recommendations.
//!
//! Heatmap cells become polygon features carrying every layer value;
//! recommendations become point features at the selected centroid.

use serde::{Deserialize, Serialize};
use uhi_greening_core::{CellBounds, CellId, GeoPoint, Recommendation};
use uhi_greening_system_scenario::{Heatmap, HeatmapCell};

/// Marker serialized as the `type` of a feature collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    /// The only valid value.
    #[default]
    FeatureCollection,
}

/// Marker serialized as the `type` of a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    /// The only valid value.
    #[default]
    Feature,
}

/// Geometry attached to a feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Polygon given as closed linear rings, exterior first.
    Polygon {
        /// Rings of `[longitude, latitude]` positions.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    /// Single position.
    Point {
        /// `[longitude, latitude]` position.
        coordinates: [f64; 2],
    },
}

impl Geometry {
    /// Polygon covering a cell rectangle.
    #[must_use]
    pub fn cell(bounds: &CellBounds) -> Self {
        Self::Polygon {
            coordinates: vec![bounds.exterior_ring().to_vec()],
        }
    }

    /// Point at a geographic position.
    #[must_use]
    pub const fn point(point: GeoPoint) -> Self {
        Self::Point {
            coordinates: [point.longitude, point.latitude],
        }
    }
}

/// Geometry plus properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    /// Always `"Feature"`.
    #[serde(rename = "type")]
    pub kind: FeatureType,
    /// Shape of the feature.
    pub geometry: Geometry,
    /// Values attached to the shape.
    pub properties: P,
}

impl<P> Feature<P> {
    /// Creates a feature from its geometry and properties.
    #[must_use]
    pub const fn new(geometry: Geometry, properties: P) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry,
            properties,
        }
    }
}

/// Ordered list of features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    /// Features in output order.
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    /// Creates a collection from its features.
    #[must_use]
    pub const fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features,
        }
    }
}

impl<P: Serialize> FeatureCollection<P> {
    /// Renders the collection as indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Properties of a heatmap cell feature.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapProperties {
    /// Identifier of the cell.
    pub cell_id: CellId,
    /// Normalized surface temperature signal.
    pub surface_temp: f64,
    /// Normalized building density signal.
    pub building_density: f64,
    /// Normalized traffic signal.
    pub traffic: f64,
    /// Normalized composite heat score.
    pub heat_score: f64,
}

impl From<&HeatmapCell> for HeatmapProperties {
    fn from(cell: &HeatmapCell) -> Self {
        Self {
            cell_id: cell.cell_id,
            surface_temp: cell.surface_temp,
            building_density: cell.building_density,
            traffic: cell.traffic,
            heat_score: cell.heat_score,
        }
    }
}

/// Properties of a recommendation feature.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationProperties {
    /// Identifier of the selected cell.
    pub cell_id: CellId,
    /// Composite heat score of that cell.
    pub score: f64,
}

/// One polygon feature per heatmap cell, in cell order.
#[must_use]
pub fn heatmap_features(heatmap: &Heatmap) -> FeatureCollection<HeatmapProperties> {
    FeatureCollection::new(
        heatmap
            .cells()
            .iter()
            .map(|cell| {
                Feature::new(Geometry::cell(&cell.bounds), HeatmapProperties::from(cell))
            })
            .collect(),
    )
}

/// One point feature per recommendation, in selection order.
#[must_use]
pub fn recommendation_features(
    recommendations: &[Recommendation],
) -> FeatureCollection<RecommendationProperties> {
    FeatureCollection::new(
        recommendations
            .iter()
            .map(|recommendation| {
                Feature::new(
                    Geometry::point(recommendation.location),
                    RecommendationProperties {
                        cell_id: recommendation.cell_id,
                        score: recommendation.score,
                    },
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{heatmap_features, recommendation_features, FeatureCollection, Geometry};
    use serde_json::json;
    use uhi_greening_core::{BoundingBox, CellId, GeoPoint, Recommendation};
    use uhi_greening_system_scenario::{HeatmapRequest, Scenario};

    #[test]
    fn recommendations_render_as_points() {
        let collection = recommendation_features(&[Recommendation {
            cell_id: CellId::new(3),
            location: GeoPoint::new(0.75, 0.25),
            score: 0.5,
        }]);

        let value = serde_json::to_value(&collection).expect("collection serializes");
        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [0.75, 0.25]},
                    "properties": {"cell_id": 3, "score": 0.5}
                }]
            })
        );
    }

    #[test]
    fn empty_recommendations_render_an_empty_collection() {
        let value = serde_json::to_value(recommendation_features(&[])).expect("serializes");
        assert_eq!(value, json!({"type": "FeatureCollection", "features": []}));
    }

    #[test]
    fn heatmap_cells_render_as_closed_polygons() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).expect("valid bbox");
        let heatmap = Scenario::default()
            .heatmap(&HeatmapRequest {
                bbox,
                grid_size: 2,
                seed: 42,
            })
            .expect("heatmap succeeds");
        let collection = heatmap_features(&heatmap);

        assert_eq!(collection.features.len(), 4);
        let first = &collection.features[0];
        assert_eq!(
            first.geometry,
            Geometry::Polygon {
                coordinates: vec![vec![
                    [0.5, 0.0],
                    [0.5, 0.5],
                    [0.0, 0.5],
                    [0.0, 0.0],
                    [0.5, 0.0],
                ]],
            }
        );
        assert_eq!(first.properties.cell_id, CellId::new(0));
        assert_eq!(first.properties.heat_score, heatmap.cells()[0].heat_score);

        let value = serde_json::to_value(&collection).expect("collection serializes");
        let properties = &value["features"][2]["properties"];
        for key in [
            "cell_id",
            "surface_temp",
            "building_density",
            "traffic",
            "heat_score",
        ] {
            assert!(properties.get(key).is_some(), "missing property {key}");
        }
        assert_eq!(value["features"][2]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn collections_parse_back() {
        let collection = recommendation_features(&[Recommendation {
            cell_id: CellId::new(1),
            location: GeoPoint::new(-73.97, 40.75),
            score: 1.0,
        }]);
        let json = collection.to_json_pretty().expect("collection serializes");
        let parsed: FeatureCollection<super::RecommendationProperties> =
            serde_json::from_str(&json).expect("collection parses");
        assert_eq!(parsed, collection);
    }
}
