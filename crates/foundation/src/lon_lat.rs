use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees, longitude first (GeoJSON order).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Reads a GeoJSON position (`[lon, lat, ...]`); extra ordinates are ignored.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Self::new(*lon, *lat)),
            _ => None,
        }
    }

    /// `(lat, lng)` order, as map widgets expect it.
    pub fn lat_lng(self) -> (f64, f64) {
        (self.lat_deg, self.lon_deg)
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    /// `lon,lat` pair as used in routing URL paths.
    pub fn to_path_pair(self) -> String {
        format!("{},{}", self.lon_deg, self.lat_deg)
    }
}

impl std::fmt::Display for LonLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon_deg, self.lat_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::LonLat;

    #[test]
    fn reads_positions_with_optional_altitude() {
        assert_eq!(
            LonLat::from_position(&[-0.1, 51.5]),
            Some(LonLat::new(-0.1, 51.5))
        );
        assert_eq!(
            LonLat::from_position(&[2.0, 3.0, 100.0]),
            Some(LonLat::new(2.0, 3.0))
        );
        assert_eq!(LonLat::from_position(&[1.0]), None);
        assert_eq!(LonLat::from_position(&[f64::NAN, 1.0]), None);
    }

    #[test]
    fn lat_lng_swaps_order() {
        let p = LonLat::new(-0.09, 51.505);
        assert_eq!(p.lat_lng(), (51.505, -0.09));
        assert_eq!(p.to_path_pair(), "-0.09,51.505");
    }
}
