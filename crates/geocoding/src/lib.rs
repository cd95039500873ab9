//! Geocoding and directions capabilities.
//!
//! The traits here are what the editing session consumes; `mapbox` holds the
//! Mapbox URL and payload handling shared by every transport, and `client`
//! is the native `reqwest` transport. The browser client brings its own
//! transport on top of the same `mapbox` helpers.

use std::future::Future;
use std::pin::Pin;

use formats::Geometry;
use foundation::LonLat;

#[cfg(not(target_arch = "wasm32"))]
pub mod client;
pub mod mapbox;

#[cfg(not(target_arch = "wasm32"))]
pub use client::MapboxClient;
pub use mapbox::{ConfigError, MapboxConfig};

/// Boxed future for the single-threaded UI host. Not `Send`: requests are
/// awaited on the thread that owns the session.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A geocoding result, not yet committed to the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub label: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    Http(String),
    Status(u16),
    Decode(String),
    NoRoute(String),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Http(msg) => write!(f, "request failed: {msg}"),
            GeocodeError::Status(code) => write!(f, "unexpected HTTP status {code}"),
            GeocodeError::Decode(msg) => write!(f, "invalid response payload: {msg}"),
            GeocodeError::NoRoute(msg) => write!(f, "no route: {msg}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// Free-text place search.
pub trait Geocoder {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<SearchCandidate>, GeocodeError>>;
}

/// Route between two positions, returned as LineString positions.
pub trait Directions {
    fn route(
        &self,
        origin: LonLat,
        destination: LonLat,
    ) -> LocalBoxFuture<'_, Result<Vec<LonLat>, GeocodeError>>;
}
