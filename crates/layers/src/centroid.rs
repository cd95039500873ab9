use foundation::LonLat;
use formats::{Geometry, geojson_type};
use geo::Centroid;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum CentroidError {
    /// The document holds no geometry at all (e.g. an empty FeatureCollection).
    Empty,
    Unsupported(String),
}

impl std::fmt::Display for CentroidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CentroidError::Empty => write!(f, "document has no geometry"),
            CentroidError::Unsupported(msg) => write!(f, "cannot compute centroid: {msg}"),
        }
    }
}

impl std::error::Error for CentroidError {}

/// Geometry capability used to recentre the map on a document.
pub trait CentroidProvider {
    fn centroid(&self, document: &Value) -> Result<LonLat, CentroidError>;
}

/// Centroid of a FeatureCollection, Feature, geometry or GeometryCollection,
/// computed by the `geo` crate.
///
/// The centroid is dimension-weighted: when any areal geometry is present,
/// points and lines do not move it, and lines likewise outweigh points.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoCentroid;

impl CentroidProvider for GeoCentroid {
    fn centroid(&self, document: &Value) -> Result<LonLat, CentroidError> {
        let mut geometries = Vec::new();
        collect_geometries(document, &mut geometries)?;
        if geometries.is_empty() {
            return Err(CentroidError::Empty);
        }
        let collection = geo::GeometryCollection(geometries);
        let center = collection.centroid().ok_or(CentroidError::Empty)?;
        let out = LonLat::new(center.x(), center.y());
        if !out.is_finite() {
            return Err(CentroidError::Unsupported("non-finite centroid".to_string()));
        }
        Ok(out)
    }
}

fn collect_geometries(
    value: &Value,
    out: &mut Vec<geo::Geometry<f64>>,
) -> Result<(), CentroidError> {
    match geojson_type(value) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| CentroidError::Unsupported("features must be an array".into()))?;
            for f in features {
                collect_geometries(f, out)?;
            }
            Ok(())
        }
        Some("Feature") => match value.get("geometry") {
            None | Some(Value::Null) => Ok(()),
            Some(g) => collect_geometries(g, out),
        },
        Some("GeometryCollection") => {
            let members = value
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| CentroidError::Unsupported("geometries must be an array".into()))?;
            for g in members {
                collect_geometries(g, out)?;
            }
            Ok(())
        }
        Some(_) => {
            let geometry = Geometry::from_geojson_value(value)
                .map_err(|e| CentroidError::Unsupported(e.to_string()))?;
            // Empty geometries carry no position to weigh.
            if geometry.first_position().is_none() {
                return Ok(());
            }
            let converted = geo::Geometry::<f64>::try_from(geojson::Value::from(&geometry))
                .map_err(|e| CentroidError::Unsupported(e.to_string()))?;
            out.push(converted);
            Ok(())
        }
        None => Err(CentroidError::Unsupported("not a GeoJSON object".into())),
    }
}
