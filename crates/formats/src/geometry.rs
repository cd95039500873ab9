use foundation::LonLat;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    MultiPoint(Vec<LonLat>),
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonError {
    InvalidGeometry(String),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// Returns the `type` member of a GeoJSON object, if any.
pub fn geojson_type(value: &Value) -> Option<&str> {
    value.as_object()?.get("type")?.as_str()
}

pub fn is_feature_collection(value: &Value) -> bool {
    geojson_type(value) == Some("FeatureCollection")
        && value.get("features").is_some_and(Value::is_array)
}

impl Geometry {
    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        parse_geometry(value).map_err(GeoJsonError::InvalidGeometry)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// First position of the geometry in document order.
    pub fn first_position(&self) -> Option<LonLat> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.first().copied(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().find_map(|l| l.first().copied())
            }
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter())
                .find_map(|r| r.first().copied()),
        }
    }

    /// GeoJSON geometry object, `type` first.
    pub fn to_geojson_value(&self) -> Value {
        let geometry = geojson::Geometry::new(geojson::Value::from(self));
        Value::Object(geojson::JsonObject::from(&geometry))
    }
}

impl From<&Geometry> for geojson::Value {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => geojson::Value::Point(position(p)),
            Geometry::MultiPoint(ps) => geojson::Value::MultiPoint(positions(ps)),
            Geometry::LineString(ps) => geojson::Value::LineString(positions(ps)),
            Geometry::MultiLineString(lines) => {
                geojson::Value::MultiLineString(lines.iter().map(|l| positions(l)).collect())
            }
            Geometry::Polygon(rings) => {
                geojson::Value::Polygon(rings.iter().map(|r| positions(r)).collect())
            }
            Geometry::MultiPolygon(polys) => geojson::Value::MultiPolygon(
                polys
                    .iter()
                    .map(|rings| rings.iter().map(|r| positions(r)).collect())
                    .collect(),
            ),
        }
    }
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            properties: Map::new(),
            geometry,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn to_geojson_value(&self) -> Value {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        fobj.insert(
            "geometry".to_string(),
            self.geometry.to_geojson_value(),
        );
        fobj.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        Value::Object(fobj)
    }
}

fn position(p: &LonLat) -> geojson::Position {
    vec![p.lon_deg, p.lat_deg]
}

fn positions(ps: &[LonLat]) -> Vec<geojson::Position> {
    ps.iter().map(position).collect()
}

pub fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_lines(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_lines(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

pub fn parse_point(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0]
        .as_f64()
        .ok_or("position lon must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("position lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<LonLat>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of position arrays".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for line in arr {
        out.push(parse_points(line)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<LonLat>>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_lines(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{Feature, GeoJsonError, Geometry, is_feature_collection};
    use foundation::LonLat;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_geometries_with_typed_errors() {
        let poly = Geometry::from_geojson_value(&json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
        }))
        .expect("polygon");
        assert_eq!(poly.type_name(), "Polygon");
        assert_eq!(poly.first_position(), Some(LonLat::new(0.0, 0.0)));

        assert_eq!(
            Geometry::from_geojson_value(&json!({"type": "Circle", "coordinates": []})),
            Err(GeoJsonError::InvalidGeometry(
                "unsupported geometry type: Circle".to_string()
            ))
        );
    }

    #[test]
    fn geometry_serializes_type_first() {
        let line = Geometry::LineString(vec![LonLat::new(2.0, 48.0), LonLat::new(-0.1, 51.5)]);
        let value = line.to_geojson_value();
        assert_eq!(
            value,
            json!({"type": "LineString", "coordinates": [[2.0, 48.0], [-0.1, 51.5]]})
        );
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["type", "coordinates"]);
    }

    #[test]
    fn feature_serializes_with_properties() {
        let f = Feature::new(Geometry::Point(LonLat::new(-0.1, 51.5)))
            .with_property("address", "Main St");
        assert_eq!(
            f.to_geojson_value(),
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-0.1, 51.5]},
                "properties": {"address": "Main St"}
            })
        );
    }

    #[test]
    fn first_position_walks_nested_geometries() {
        let poly = Geometry::MultiPolygon(vec![
            vec![],
            vec![vec![LonLat::new(3.0, 4.0), LonLat::new(5.0, 6.0)]],
        ]);
        assert_eq!(poly.first_position(), Some(LonLat::new(3.0, 4.0)));
        assert_eq!(Geometry::LineString(vec![]).first_position(), None);
    }

    #[test]
    fn detects_feature_collections() {
        assert!(is_feature_collection(
            &json!({"type": "FeatureCollection", "features": []})
        ));
        assert!(!is_feature_collection(&json!({"type": "FeatureCollection"})));
        assert!(!is_feature_collection(&json!([1, 2])));
    }
}
