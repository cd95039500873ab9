use foundation::LonLat;
use geocoding::MapboxConfig;
use geocoding::mapbox::{DEFAULT_API_BASE, DEFAULT_PROFILE};
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_TILE_URL: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";
pub const DEFAULT_TILE_STYLE: &str = "mapbox/streets-v11";
pub const TILE_ATTRIBUTION: &str = "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors, <a href=\"https://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>, Imagery &copy; <a href=\"https://www.mapbox.com/\">Mapbox</a>";

/// Page-supplied settings for the browser client.
///
/// Only `access_token` is required; the page usually takes it from the
/// `?access_token=` query parameter.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub access_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_tile_style")]
    pub tile_style: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    /// `[lat, lng]`, Leaflet order.
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default)]
    pub elements: ElementIds,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub map: String,
    pub editor: String,
    pub diagnostics: String,
    pub candidates: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            map: "map".to_string(),
            editor: "editor".to_string(),
            diagnostics: "diagnostics".to_string(),
            candidates: "candidates".to_string(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_tile_style() -> String {
    DEFAULT_TILE_STYLE.to_string()
}

fn default_max_zoom() -> u8 {
    18
}

fn default_center() -> [f64; 2] {
    [51.505, -0.09]
}

fn default_zoom() -> u8 {
    13
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token.trim().is_empty() {
            return Err("accessToken is empty".to_string());
        }
        let [lat, lng] = self.center;
        if !LonLat::new(lng, lat).is_finite() {
            return Err("center must be two finite numbers".to_string());
        }
        Ok(())
    }

    pub fn mapbox(&self) -> MapboxConfig {
        MapboxConfig {
            access_token: self.access_token.clone(),
            api_base: self.api_base.clone(),
            profile: self.profile.clone(),
        }
    }

    /// Options object for `L.tileLayer`, as JSON text.
    pub fn tile_options_json(&self) -> String {
        json!({
            "attribution": TILE_ATTRIBUTION,
            "maxZoom": self.max_zoom,
            "id": self.tile_style,
            "accessToken": self.access_token,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ElementIds};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn parse(v: Value) -> ClientConfig {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn only_token_is_required() {
        let cfg = parse(json!({"accessToken": "pk.abc"}));
        assert_eq!(cfg.center, [51.505, -0.09]);
        assert_eq!(cfg.zoom, 13);
        assert_eq!(cfg.max_zoom, 18);
        assert_eq!(cfg.tile_style, "mapbox/streets-v11");
        assert_eq!(cfg.elements, ElementIds::default());
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.mapbox().profile, "driving");

        assert!(serde_json::from_value::<ClientConfig>(json!({})).is_err());
    }

    #[test]
    fn overrides_and_partial_element_ids() {
        let cfg = parse(json!({
            "accessToken": "pk.abc",
            "apiBase": "http://localhost:9000",
            "profile": "walking",
            "center": [48.85, 2.35],
            "elements": {"map": "main-map"}
        }));
        let mapbox = cfg.mapbox();
        assert_eq!(mapbox.api_base, "http://localhost:9000");
        assert_eq!(mapbox.profile, "walking");
        assert_eq!(cfg.elements.map, "main-map");
        assert_eq!(cfg.elements.editor, "editor");
    }

    #[test]
    fn rejects_blank_token() {
        assert!(parse(json!({"accessToken": "  "})).validate().is_err());
    }

    #[test]
    fn tile_options_carry_token_and_style() {
        let cfg = parse(json!({"accessToken": "pk.abc"}));
        let opts: Value = serde_json::from_str(&cfg.tile_options_json()).unwrap();
        assert_eq!(opts["accessToken"], json!("pk.abc"));
        assert_eq!(opts["id"], json!("mapbox/streets-v11"));
        assert_eq!(opts["maxZoom"], json!(18));
        assert!(opts["attribution"].as_str().unwrap().contains("OpenStreetMap"));
    }
}
