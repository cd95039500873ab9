use foundation::LonLat;
use serde::Serialize;
use serde_json::Value;

/// A rendered Point feature that reports clicks back to the session.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ClickablePoint {
    /// Index of the feature in the rendered document.
    pub feature_index: usize,
    pub position: LonLat,
}

/// The point feature the user last clicked.
///
/// Lookup-only: it records where the feature was when clicked and does not
/// keep the document or overlay alive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SelectedPoint {
    pub feature_index: usize,
    pub position: LonLat,
}

impl From<ClickablePoint> for SelectedPoint {
    fn from(p: ClickablePoint) -> Self {
        Self {
            feature_index: p.feature_index,
            position: p.position,
        }
    }
}

/// Collects every Feature whose geometry is a Point.
///
/// A FeatureCollection yields its point features by index; a lone Feature is
/// index 0. Bare geometries carry no feature and yield nothing.
pub fn clickable_points(document: &Value) -> Vec<ClickablePoint> {
    match formats::geojson_type(document) {
        Some("FeatureCollection") => document
            .get("features")
            .and_then(Value::as_array)
            .map(|features| {
                features
                    .iter()
                    .enumerate()
                    .filter_map(|(i, f)| point_of_feature(f).map(|p| (i, p)))
                    .map(|(feature_index, position)| ClickablePoint {
                        feature_index,
                        position,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        Some("Feature") => point_of_feature(document)
            .map(|position| {
                vec![ClickablePoint {
                    feature_index: 0,
                    position,
                }]
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn point_of_feature(feature: &Value) -> Option<LonLat> {
    if formats::geojson_type(feature) != Some("Feature") {
        return None;
    }
    let geometry = feature.get("geometry")?;
    match formats::Geometry::from_geojson_value(geometry).ok()? {
        formats::Geometry::Point(p) => Some(p),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ClickablePoint, clickable_points};
    use foundation::LonLat;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collects_point_features_by_index() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [2, 3]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        });
        assert_eq!(
            clickable_points(&doc),
            vec![ClickablePoint {
                feature_index: 1,
                position: LonLat::new(2.0, 3.0)
            }]
        );
    }

    #[test]
    fn lone_feature_and_bare_geometry() {
        let feature = json!({"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [5, 6]}});
        assert_eq!(clickable_points(&feature).len(), 1);
        let bare = json!({"type": "Point", "coordinates": [5, 6]});
        assert!(clickable_points(&bare).is_empty());
    }
}
