use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Componentwise linear interpolation in degree space.
    ///
    /// `t = 0` yields `self`, `t = 1` yields `other` exactly.
    pub fn lerp(&self, other: &LatLng, t: f64) -> LatLng {
        LatLng::new(
            self.lat + t * (other.lat - self.lat),
            self.lng + t * (other.lng - self.lng),
        )
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point. Bounds whose west edge lies
    /// east of their east edge cross the antimeridian.
    pub fn contains(&self, point: &LatLng) -> bool {
        let within_lat = point.lat >= self.south_west.lat && point.lat <= self.north_east.lat;
        let within_lng = if self.crosses_antimeridian() {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        } else {
            point.lng >= self.south_west.lng && point.lng <= self.north_east.lng
        };
        within_lat && within_lng
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        let mut lng = self.north_east.lng - self.south_west.lng;
        if self.crosses_antimeridian() {
            lng += 360.0;
        }
        LatLng::new(self.north_east.lat - self.south_west.lat, lng)
    }

    /// Grows each side by `factor` times the span along that axis.
    ///
    /// A factor of zero returns an identical copy. Longitudes wrap across
    /// the antimeridian; a result spanning the whole globe covers -180..180.
    pub fn expanded(&self, factor: f64) -> LatLngBounds {
        let span = self.span();
        let d_lat = span.lat * factor;
        let d_lng = span.lng * factor;
        let (west, east) = if span.lng + 2.0 * d_lng >= 360.0 {
            (-180.0, 180.0)
        } else {
            (
                LatLng::wrap_lng(self.south_west.lng - d_lng),
                LatLng::wrap_lng(self.north_east.lng + d_lng),
            )
        };
        LatLngBounds::from_coords(
            self.south_west.lat - d_lat,
            west,
            self.north_east.lat + d_lat,
            east,
        )
    }
}
