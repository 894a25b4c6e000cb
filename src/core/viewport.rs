use crate::core::constants::{MAX_LATITUDE, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::traits::Projection;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EARTH_RADIUS: f64 = 6378137.0;

/// A Web Mercator camera snapshot: center, zoom, and screen dimensions.
///
/// Hosts without a projection of their own can hand one of these to the
/// clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 22.0),
            size,
        }
    }

    /// Returns a copy at another zoom level around the same center
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self::new(self.center, zoom, self.size)
    }

    /// Projects a LatLng to world pixel coordinates at the current zoom (EPSG:3857)
    pub fn project_world(&self, lat_lng: &LatLng) -> Point {
        let scale = TILE_SIZE * 2_f64.powf(self.zoom);
        let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;

        let pixel_x = (x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the current zoom
    pub fn unproject_world(&self, pixel: &Point) -> LatLng {
        let scale = TILE_SIZE * 2_f64.powf(self.zoom);

        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Width of the world in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2_f64.powf(self.zoom)
    }

    /// Converts a geographical coordinate to container pixel coordinates.
    ///
    /// The world repeats horizontally; the copy nearest the center is used.
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project_world(&self.center);
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        let mut offset = self.project_world(lat_lng).subtract(&origin);
        let world = self.world_size();
        offset.x -= world * (offset.x / world).round();
        offset.add(&half)
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project_world(&self.center);
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        self.unproject_world(&pixel.subtract(&half).add(&origin))
    }

    /// Geographic bounds of the visible container. Near the antimeridian the
    /// west edge comes out east of the east edge.
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);
        let (west, east) = if self.size.x >= self.world_size() {
            (-180.0, 180.0)
        } else {
            (LatLng::wrap_lng(nw.lng), LatLng::wrap_lng(se.lng))
        };
        LatLngBounds::from_coords(se.lat, west, nw.lat, east)
    }
}

impl Projection for Viewport {
    fn project(&self, position: &LatLng) -> Option<Point> {
        let pixel = self.lat_lng_to_pixel(position);
        (pixel.x.is_finite() && pixel.y.is_finite()).then_some(pixel)
    }

    fn visible_region(&self) -> LatLngBounds {
        self.bounds()
    }
}
