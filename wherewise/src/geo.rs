//! Geographic primitives and the Web Mercator projection used by the map.

use std::time::SystemTime;

/// Radius of the Earth in meters, as used by the spherical Mercator projection.
const EARTH_RADIUS: f64 = 6378137.0;

/// Maximum latitude that can be represented in Web Mercator, in degrees.
pub const MAX_LATITUDE: f64 = 85.05112877980659;

/// Geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude in degrees.
    pub fn latlon(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.longitude
    }
}

/// A single reading from a positioning source.
///
/// Only the coordinates are used by the UI. Accuracy and timestamp are
/// reported by some sources and carried along for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    point: GeoPoint,
    accuracy_m: Option<f64>,
    timestamp: Option<SystemTime>,
}

impl Position {
    /// Creates a position with no metadata.
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy_m: None,
            timestamp: None,
        }
    }

    /// Sets the estimated accuracy of the reading in meters.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Sets the time at which the reading was taken.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Coordinates of the reading.
    pub fn point(&self) -> GeoPoint {
        self.point
    }

    /// Estimated accuracy in meters, if the source reports one.
    pub fn accuracy_m(&self) -> Option<f64> {
        self.accuracy_m
    }

    /// Time of the reading, if the source reports one.
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }
}

/// Rectangular geographic region given by its center and the full span along
/// each axis in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRegion {
    center: GeoPoint,
    lat_span: f64,
    lon_span: f64,
}

impl GeoRegion {
    /// Creates a new region.
    pub fn new(center: GeoPoint, lat_span: f64, lon_span: f64) -> Self {
        Self {
            center,
            lat_span,
            lon_span,
        }
    }

    /// Center of the region.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Full latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_span
    }

    /// Full longitude span in degrees.
    pub fn lon_span(&self) -> f64 {
        self.lon_span
    }

    /// Southern edge of the region.
    pub fn lat_min(&self) -> f64 {
        self.center.lat() - self.lat_span / 2.0
    }

    /// Northern edge of the region.
    pub fn lat_max(&self) -> f64 {
        self.center.lat() + self.lat_span / 2.0
    }

    /// Western edge of the region.
    pub fn lon_min(&self) -> f64 {
        self.center.lon() - self.lon_span / 2.0
    }

    /// Eastern edge of the region.
    pub fn lon_max(&self) -> f64 {
        self.center.lon() + self.lon_span / 2.0
    }
}

/// Point in projected map coordinates (meters) or in screen coordinates
/// (pixels), depending on context.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2 {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of a rectangular area in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width of the area.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the area.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the width.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half of the height.
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Returns true if either dimension is zero or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
    }
}

/// Axis-aligned rectangle in projected map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Minimum X coordinate.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Minimum Y coordinate.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum X coordinate.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Maximum Y coordinate.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center of the rectangle.
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// Projects a geographic point into Web Mercator (EPSG:3857) meters.
///
/// Latitudes outside the projection bounds are clamped to [`MAX_LATITUDE`].
pub fn project(point: GeoPoint) -> Point2 {
    let lat = point
        .lat()
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians();
    let x = EARTH_RADIUS * point.lon().to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

    Point2::new(x, y)
}
