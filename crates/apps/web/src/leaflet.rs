use std::collections::BTreeMap;

use foundation::LonLat;
use layers::{ClickablePoint, MapSurface, OverlayId};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::config::ClientConfig;

#[wasm_bindgen(inline_js = r#"
export function scratchpad_create_map(elementId, lat, lng, zoom, tileUrl, tileOptionsJson) {
    const map = L.map(elementId).setView([lat, lng], zoom);
    L.tileLayer(tileUrl, JSON.parse(tileOptionsJson)).addTo(map);
    return map;
}

export function scratchpad_add_overlay(map, geojsonText, clickable, onClick) {
    const data = JSON.parse(geojsonText);
    const indexOf = new Map();
    if (data && data.type === 'FeatureCollection' && Array.isArray(data.features)) {
        data.features.forEach((f, i) => indexOf.set(f, i));
    } else if (data && data.type === 'Feature') {
        indexOf.set(data, 0);
    }
    const wanted = new Set(clickable);
    return L.geoJSON(data, {
        onEachFeature: (feature, layer) => {
            const index = indexOf.get(feature);
            if (index !== undefined && wanted.has(index)) {
                layer.on('click', () => onClick(index));
            }
        },
    }).addTo(map);
}

export function scratchpad_remove_layer(map, layer) {
    map.removeLayer(layer);
}

export function scratchpad_pan_to(map, lat, lng) {
    map.panTo(new L.LatLng(lat, lng));
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn scratchpad_create_map(
        element_id: &str,
        lat: f64,
        lng: f64,
        zoom: f64,
        tile_url: &str,
        tile_options_json: &str,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn scratchpad_add_overlay(
        map: &JsValue,
        geojson_text: &str,
        clickable: &[u32],
        on_click: &js_sys::Function,
    ) -> Result<JsValue, JsValue>;

    fn scratchpad_remove_layer(map: &JsValue, layer: &JsValue);

    fn scratchpad_pan_to(map: &JsValue, lat: f64, lng: f64);
}

/// A Leaflet map showing each rendered document as one `L.geoJSON` layer.
pub struct LeafletMap {
    map: JsValue,
    layers: BTreeMap<OverlayId, JsValue>,
    /// Called with the feature index of a clicked point.
    on_click: js_sys::Function,
}

impl LeafletMap {
    pub fn create(config: &ClientConfig, on_click: js_sys::Function) -> Result<Self, JsValue> {
        let [lat, lng] = config.center;
        let map = scratchpad_create_map(
            &config.elements.map,
            lat,
            lng,
            f64::from(config.zoom),
            &config.tile_url,
            &config.tile_options_json(),
        )?;
        Ok(Self {
            map,
            layers: BTreeMap::new(),
            on_click,
        })
    }
}

impl MapSurface for LeafletMap {
    fn add_overlay(&mut self, id: OverlayId, document: &Value, points: &[ClickablePoint]) {
        let clickable: Vec<u32> = points
            .iter()
            .filter_map(|p| u32::try_from(p.feature_index).ok())
            .collect();
        match scratchpad_add_overlay(&self.map, &document.to_string(), &clickable, &self.on_click)
        {
            Ok(layer) => {
                self.layers.insert(id, layer);
            }
            Err(err) => {
                web_sys::console::error_2(&JsValue::from_str(&format!("{id} not drawn")), &err);
            }
        }
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        if let Some(layer) = self.layers.remove(&id) {
            scratchpad_remove_layer(&self.map, &layer);
        }
    }

    fn pan_to(&mut self, center: LonLat) {
        let (lat, lng) = center.lat_lng();
        scratchpad_pan_to(&self.map, lat, lng);
    }
}
