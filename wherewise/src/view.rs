//! Map camera state.

use crate::geo::{project, GeoPoint, GeoRegion, Point2, Rect, Size};

/// Position, scale and viewport of the map camera.
///
/// The view is immutable. Methods that move the camera return a new view, and
/// the widget swaps it in. Screen coordinates are in pixels with the origin at
/// the top left corner of the viewport and the Y axis pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    position: Point2,
    resolution: f64,
    size: Size,
}

impl MapView {
    /// Creates a view centered on the given projected point with an empty
    /// viewport.
    pub fn new(position: Point2, resolution: f64) -> Self {
        Self {
            position,
            resolution,
            size: Size::default(),
        }
    }

    /// Creates a view centered on the given geographic point.
    pub fn from_geo(center: GeoPoint, resolution: f64) -> Self {
        Self::new(project(center), resolution)
    }

    /// Creates a view that shows the whole of the given region in a viewport
    /// of the given size.
    ///
    /// The resolution is chosen so that the longer-relative span of the region
    /// exactly fills the viewport along its axis; the other axis shows more
    /// of the map around the region.
    pub fn fit_region(region: &GeoRegion, size: Size) -> Self {
        let south_west = project(GeoPoint::latlon(region.lat_min(), region.lon_min()));
        let north_east = project(GeoPoint::latlon(region.lat_max(), region.lon_max()));

        let resolution = if size.is_empty() {
            1.0
        } else {
            let x_resolution = (north_east.x - south_west.x) / size.width();
            let y_resolution = (north_east.y - south_west.y) / size.height();
            x_resolution.max(y_resolution)
        };

        Self {
            position: project(region.center()),
            resolution,
            size,
        }
    }

    /// Projected coordinates of the viewport center.
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Size of one pixel in projected map units.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Returns a copy of the view with the given viewport size.
    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }

    /// Projected bounding box of the visible area, if the viewport is not
    /// empty.
    pub fn bbox(&self) -> Option<Rect> {
        if self.size.is_empty() {
            return None;
        }

        Some(Rect::new(
            self.position.x - self.size.half_width() * self.resolution,
            self.position.y - self.size.half_height() * self.resolution,
            self.position.x + self.size.half_width() * self.resolution,
            self.position.y + self.size.half_height() * self.resolution,
        ))
    }

    /// Converts a screen point to projected map coordinates.
    pub fn screen_to_map(&self, px_position: Point2) -> Point2 {
        Point2::new(
            self.position.x + (px_position.x - self.size.half_width()) * self.resolution,
            self.position.y + (self.size.half_height() - px_position.y) * self.resolution,
        )
    }

    /// Converts a projected map point to screen coordinates.
    pub fn map_to_screen(&self, position: Point2) -> Point2 {
        Point2::new(
            (position.x - self.position.x) / self.resolution + self.size.half_width(),
            (self.position.y - position.y) / self.resolution + self.size.half_height(),
        )
    }

    /// Screen coordinates of a geographic point.
    pub fn geo_to_screen(&self, point: GeoPoint) -> Point2 {
        self.map_to_screen(project(point))
    }

    /// Moves the view so that the map point under the `from` screen position
    /// appears under the `to` screen position.
    pub fn translate_by_pixels(&self, from: Point2, to: Point2) -> Self {
        let position = Point2::new(
            self.position.x - (to.x - from.x) * self.resolution,
            self.position.y + (to.y - from.y) * self.resolution,
        );
        Self { position, ..*self }
    }

    /// Multiplies the resolution by `zoom`, keeping the map point under the
    /// `base_point` screen position fixed.
    pub fn zoom(&self, zoom: f64, base_point: Point2) -> Self {
        let base_point = self.screen_to_map(base_point);
        let resolution = self.resolution * zoom;
        let position = Point2::new(
            base_point.x + (self.position.x - base_point.x) * zoom,
            base_point.y + (self.position.y - base_point.y) * zoom,
        );
        Self {
            position,
            resolution,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn screen_to_map_size() {
        let view =
            MapView::new(Point2::default(), 1.0).with_size(Size::new(100.0, 100.0));

        let projected = view.screen_to_map(Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(projected.x, -50.0, epsilon = 0.0001);
        assert_abs_diff_eq!(projected.y, 50.0, epsilon = 0.0001);

        let projected = view.screen_to_map(Point2::new(50.0, 50.0));
        assert_abs_diff_eq!(projected.x, 0.0, epsilon = 0.0001);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 0.0001);
    }

    #[test]
    fn screen_to_map_resolution() {
        let view =
            MapView::new(Point2::default(), 2.0).with_size(Size::new(100.0, 100.0));

        let projected = view.screen_to_map(Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(projected.x, -100.0, epsilon = 0.0001);
        assert_abs_diff_eq!(projected.y, 100.0, epsilon = 0.0001);

        let projected = view.screen_to_map(Point2::new(100.0, 100.0));
        assert_abs_diff_eq!(projected.x, 100.0, epsilon = 0.0001);
        assert_abs_diff_eq!(projected.y, -100.0, epsilon = 0.0001);
    }

    #[test]
    fn map_to_screen_inverts_screen_to_map() {
        let view = MapView::new(Point2::new(-100.0, 300.0), 2.5)
            .with_size(Size::new(360.0, 200.0));

        let screen = Point2::new(17.0, 121.0);
        let round_trip = view.map_to_screen(view.screen_to_map(screen));
        assert_abs_diff_eq!(round_trip.x, screen.x, epsilon = 0.0001);
        assert_abs_diff_eq!(round_trip.y, screen.y, epsilon = 0.0001);
    }

    #[test]
    fn fit_region_resolution_and_center() {
        let region = GeoRegion::new(GeoPoint::latlon(40.0, -74.0), 0.0922, 0.0421);
        let view = MapView::fit_region(&region, Size::new(360.0, 200.0));

        // For this region the latitude span is the limiting one.
        assert_relative_eq!(view.resolution(), 66.99128105533775, max_relative = 1e-12);
        assert_relative_eq!(view.position().x, -8237642.318702244, max_relative = 1e-12);
        assert_relative_eq!(view.position().y, 4865942.279503176, max_relative = 1e-12);
    }

    #[test]
    fn fit_region_centers_marker_in_viewport() {
        let center = GeoPoint::latlon(40.0, -74.0);
        let region = GeoRegion::new(center, 0.0922, 0.0421);
        let view = MapView::fit_region(&region, Size::new(360.0, 200.0));

        let screen = view.geo_to_screen(center);
        assert_abs_diff_eq!(screen.x, 180.0, epsilon = 0.0001);
        assert_abs_diff_eq!(screen.y, 100.0, epsilon = 0.0001);
    }

    #[test]
    fn fit_region_with_empty_viewport() {
        let region = GeoRegion::new(GeoPoint::latlon(40.0, -74.0), 0.0922, 0.0421);
        let view = MapView::fit_region(&region, Size::default());
        assert!(view.bbox().is_none());
        assert_relative_eq!(view.resolution(), 1.0);
    }

    #[test]
    fn translate_by_pixels_moves_against_drag() {
        let view = MapView::new(Point2::new(100.0, 100.0), 2.0)
            .with_size(Size::new(100.0, 100.0));

        let moved = view.translate_by_pixels(Point2::new(10.0, 10.0), Point2::new(30.0, 20.0));
        assert_abs_diff_eq!(moved.position().x, 60.0, epsilon = 0.0001);
        assert_abs_diff_eq!(moved.position().y, 120.0, epsilon = 0.0001);
        assert_relative_eq!(moved.resolution(), view.resolution());
    }

    #[test]
    fn zoom_keeps_base_point_fixed() {
        let view =
            MapView::new(Point2::default(), 10.0).with_size(Size::new(100.0, 100.0));

        let base_screen = Point2::new(25.0, 25.0);
        let base_map = view.screen_to_map(base_screen);

        let zoomed = view.zoom(2.0, base_screen);
        assert_relative_eq!(zoomed.resolution(), 20.0);
        assert_abs_diff_eq!(zoomed.position().x, 250.0, epsilon = 0.0001);
        assert_abs_diff_eq!(zoomed.position().y, -250.0, epsilon = 0.0001);

        let base_after = zoomed.map_to_screen(base_map);
        assert_abs_diff_eq!(base_after.x, base_screen.x, epsilon = 0.0001);
        assert_abs_diff_eq!(base_after.y, base_screen.y, epsilon = 0.0001);
    }

    #[test]
    fn bbox_is_centered_on_position() {
        let view = MapView::new(Point2::new(10.0, -20.0), 2.0)
            .with_size(Size::new(100.0, 50.0));

        let bbox = view.bbox().expect("failed to get bbox");
        assert_relative_eq!(bbox.x_min(), -90.0);
        assert_relative_eq!(bbox.x_max(), 110.0);
        assert_relative_eq!(bbox.y_min(), -70.0);
        assert_relative_eq!(bbox.y_max(), 30.0);
        assert_relative_eq!(bbox.center().x, 10.0);
        assert_relative_eq!(bbox.center().y, -20.0);
    }
}
