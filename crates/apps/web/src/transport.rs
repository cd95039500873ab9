use foundation::LonLat;
use geocoding::mapbox::{decode_places, decode_route};
use geocoding::{Directions, GeocodeError, Geocoder, LocalBoxFuture, MapboxConfig, SearchCandidate};
use gloo_net::http::Request;

/// Mapbox geocoding and directions over the browser's `fetch`.
pub struct FetchMapbox {
    config: MapboxConfig,
}

impl FetchMapbox {
    pub fn new(config: MapboxConfig) -> Self {
        Self { config }
    }
}

async fn get_text(url: &str) -> Result<String, GeocodeError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| GeocodeError::Http(e.to_string()))?;
    if !resp.ok() {
        return Err(GeocodeError::Status(resp.status()));
    }
    resp.text()
        .await
        .map_err(|e| GeocodeError::Http(e.to_string()))
}

impl Geocoder for FetchMapbox {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<SearchCandidate>, GeocodeError>> {
        Box::pin(async move {
            let body = get_text(&self.config.places_url(query)).await?;
            decode_places(&body)
        })
    }
}

impl Directions for FetchMapbox {
    fn route(
        &self,
        origin: LonLat,
        destination: LonLat,
    ) -> LocalBoxFuture<'_, Result<Vec<LonLat>, GeocodeError>> {
        Box::pin(async move {
            let body = get_text(&self.config.directions_url(origin, destination)).await?;
            decode_route(&body)
        })
    }
}
