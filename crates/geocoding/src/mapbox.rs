use std::env;

use formats::Geometry;
use foundation::LonLat;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{GeocodeError, SearchCandidate};

pub const DEFAULT_API_BASE: &str = "https://api.mapbox.com";
pub const DEFAULT_PROFILE: &str = "driving";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "missing required setting {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Access settings for the Mapbox geocoding and directions APIs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct MapboxConfig {
    pub access_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Directions routing profile (`driving`, `walking`, `cycling`, ...).
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

// The token must never end up in logs.
impl std::fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxConfig")
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("profile", &self.profile)
            .finish()
    }
}

impl MapboxConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: default_api_base(),
            profile: default_profile(),
        }
    }

    /// Reads `MAPBOX_ACCESS_TOKEN` (required), `MAPBOX_API_BASE` and
    /// `MAPBOX_PROFILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access_token = lookup("MAPBOX_ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("MAPBOX_ACCESS_TOKEN"))?;
        Ok(Self {
            access_token,
            api_base: lookup("MAPBOX_API_BASE").unwrap_or_else(default_api_base),
            profile: lookup("MAPBOX_PROFILE").unwrap_or_else(default_profile),
        })
    }

    fn base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn places_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}",
            self.base(),
            urlencoding::encode(query.trim()),
            urlencoding::encode(&self.access_token)
        )
    }

    pub fn directions_url(&self, origin: LonLat, destination: LonLat) -> String {
        format!(
            "{}/directions/v5/mapbox/{}/{};{}?geometries=geojson&access_token={}",
            self.base(),
            urlencoding::encode(&self.profile),
            origin.to_path_pair(),
            destination.to_path_pair(),
            urlencoding::encode(&self.access_token)
        )
    }
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    #[serde(default)]
    place_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    center: Option<Vec<f64>>,
}

/// Decodes a geocoding FeatureCollection into candidates.
///
/// Entries without a label or a usable geometry are skipped.
pub fn decode_places(body: &str) -> Result<Vec<SearchCandidate>, GeocodeError> {
    let resp: PlacesResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;

    let mut out = Vec::with_capacity(resp.features.len());
    for (i, feature) in resp.features.into_iter().enumerate() {
        let Some(label) = feature.place_name.or(feature.text) else {
            debug!("place {i} skipped: no label");
            continue;
        };
        let geometry = feature
            .geometry
            .as_ref()
            .and_then(|g| Geometry::from_geojson_value(g).ok())
            .or_else(|| {
                feature
                    .center
                    .as_deref()
                    .and_then(LonLat::from_position)
                    .map(Geometry::Point)
            });
        let Some(geometry) = geometry else {
            debug!("place {i} skipped: no geometry");
            continue;
        };
        out.push(SearchCandidate { label, geometry });
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    geometry: Value,
}

/// Decodes the first route's LineString geometry of a directions response.
pub fn decode_route(body: &str) -> Result<Vec<LonLat>, GeocodeError> {
    let resp: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;
    if resp.code != "Ok" {
        let detail = resp.message.unwrap_or_else(|| resp.code.clone());
        return Err(GeocodeError::NoRoute(detail));
    }
    let route = resp
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NoRoute("empty route list".to_string()))?;
    match Geometry::from_geojson_value(&route.geometry) {
        Ok(Geometry::LineString(points)) if points.len() >= 2 => Ok(points),
        Ok(other) => Err(GeocodeError::Decode(format!(
            "expected a LineString route, got {}",
            other.type_name()
        ))),
        Err(err) => Err(GeocodeError::Decode(err.to_string())),
    }
}
