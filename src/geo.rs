//! Geographic value types shared by spots, search and geocoding.

use serde::{Deserialize, Serialize};

use crate::validation::conditions::{is_latitude, is_longitude};
use crate::validation::country;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        is_latitude(self.latitude) && is_longitude(self.longitude)
    }
}

/// Search box. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north_east: Coordinates,
    pub south_west: Coordinates,
}

impl Bounds {
    pub fn new(north_east: Coordinates, south_west: Coordinates) -> Self {
        Self { north_east, south_west }
    }

    pub fn is_valid(&self) -> bool {
        self.north_east.is_valid() && self.south_west.is_valid()
    }

    /// A box whose west edge lies east of its east edge wraps around 180°.
    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.longitude > self.north_east.longitude
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        let lat_ok = point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude;
        let lon_ok = if self.crosses_antimeridian() {
            point.longitude >= self.south_west.longitude || point.longitude <= self.north_east.longitude
        } else {
            point.longitude >= self.south_west.longitude && point.longitude <= self.north_east.longitude
        };
        lat_ok && lon_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub locality: String,
    pub country_code: String,
    pub coordinates: Coordinates,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        !self.locality.trim().is_empty()
            && country::is_valid(&self.country_code)
            && self.coordinates.is_valid()
    }
}
