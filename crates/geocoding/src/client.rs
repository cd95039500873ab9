use foundation::LonLat;
use tracing::{debug, warn};

use crate::mapbox::{MapboxConfig, decode_places, decode_route};
use crate::{Directions, GeocodeError, Geocoder, LocalBoxFuture, SearchCandidate};

/// Mapbox geocoding + directions over `reqwest`.
///
/// No timeout is configured and nothing is retried.
#[derive(Debug, Clone)]
pub struct MapboxClient {
    http: reqwest::Client,
    config: MapboxConfig,
}

impl MapboxClient {
    pub fn new(config: MapboxConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: MapboxConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &MapboxConfig {
        &self.config
    }

    async fn get_text(&self, url: &str) -> Result<String, GeocodeError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url().to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        resp.text()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url().to_string()))
    }
}

impl Geocoder for MapboxClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<SearchCandidate>, GeocodeError>> {
        Box::pin(async move {
            debug!("geocoding query {query:?}");
            let body = self.get_text(&self.config.places_url(query)).await?;
            let candidates = decode_places(&body)?;
            debug!("geocoding query {query:?} -> {} candidates", candidates.len());
            Ok(candidates)
        })
    }
}

impl Directions for MapboxClient {
    fn route(
        &self,
        origin: LonLat,
        destination: LonLat,
    ) -> LocalBoxFuture<'_, Result<Vec<LonLat>, GeocodeError>> {
        Box::pin(async move {
            let url = self.config.directions_url(origin, destination);
            let body = self.get_text(&url).await?;
            decode_route(&body).inspect_err(|err| {
                warn!("directions {origin} -> {destination} failed: {err}");
            })
        })
    }
}
