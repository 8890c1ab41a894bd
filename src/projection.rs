//! Geographic to planar projection.
//!
//! The map widget owns the real projection; [`Projector`] is the seam it
//! plugs into. [`Viewport`] reproduces the widget's spherical Web Mercator
//! projection for headless rendering and for fit-to-bounds.

use crate::ir::GeoPoint;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;
/// Deepest zoom level a fit will pick.
pub const MAX_ZOOM: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Converts a geographic point into the planar frame of the current view.
/// Only valid until the next viewport change.
pub trait Projector {
    fn project(&self, point: GeoPoint) -> PlanarPoint;
}

impl<F> Projector for F
where
    F: Fn(GeoPoint) -> PlanarPoint,
{
    fn project(&self, point: GeoPoint) -> PlanarPoint {
        self(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lon,
            north: point.lat,
            east: point.lon,
        }
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lon);
        self.east = self.east.max(point.lon);
    }

    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }
}

/// Map view state: centre, zoom level and container size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center_lat: center.lat,
            center_lon: center.lon,
            zoom,
            width,
            height,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }

    fn scale(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    pub fn project(&self, point: GeoPoint) -> PlanarPoint {
        let scale = self.scale();
        let (px, py) = mercator(point);
        let (cx, cy) = mercator(self.center());
        PlanarPoint {
            x: (px - cx) * scale + self.width / 2.0,
            y: (py - cy) * scale + self.height / 2.0,
        }
    }

    pub fn unproject(&self, point: PlanarPoint) -> GeoPoint {
        let scale = self.scale();
        let (cx, cy) = mercator(self.center());
        inverse_mercator(
            (point.x - self.width / 2.0) / scale + cx,
            (point.y - self.height / 2.0) / scale + cy,
        )
    }

    /// Centres on `bounds` at the largest whole zoom level in
    /// `[min_zoom, max_zoom]` at which the bounds fit inside the container
    /// minus `padding` on every side.
    pub fn fit_bounds(&self, bounds: &GeoBounds, padding: f64, min_zoom: f64, max_zoom: f64) -> Viewport {
        let (west, north) = mercator(GeoPoint::new(bounds.north, bounds.west));
        let (east, south) = mercator(GeoPoint::new(bounds.south, bounds.east));
        let span_x = (east - west).abs();
        let span_y = (south - north).abs();
        let avail_w = (self.width - 2.0 * padding).max(1.0);
        let avail_h = (self.height - 2.0 * padding).max(1.0);

        let max_zoom = if max_zoom.is_finite() {
            max_zoom.clamp(0.0, MAX_ZOOM)
        } else {
            MAX_ZOOM
        };
        let min_zoom = if min_zoom.is_finite() {
            min_zoom.clamp(0.0, max_zoom)
        } else {
            0.0
        };
        let mut zoom = max_zoom.floor();
        while zoom > min_zoom {
            let scale = TILE_SIZE * 2f64.powf(zoom);
            if span_x * scale <= avail_w && span_y * scale <= avail_h {
                break;
            }
            zoom -= 1.0;
        }
        let zoom = zoom.max(min_zoom);

        let center = inverse_mercator((west + east) / 2.0, (north + south) / 2.0);
        Viewport::new(center, zoom, self.width, self.height)
    }
}

impl Projector for Viewport {
    fn project(&self, point: GeoPoint) -> PlanarPoint {
        Viewport::project(self, point)
    }
}

// Normalised Web Mercator, both axes in [0, 1].
fn mercator(point: GeoPoint) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lon + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator(x: f64, y: f64) -> GeoPoint {
    let lon = x * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y);
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lausanne() -> Viewport {
        Viewport::new(GeoPoint::new(46.52, 6.5695), 13.0, 1200.0, 800.0)
    }

    #[test]
    fn center_projects_to_container_middle() {
        let view = lausanne();
        let p = view.project(view.center());
        assert!((p.x - 600.0).abs() < 1e-6);
        assert!((p.y - 400.0).abs() < 1e-6);
    }

    #[test]
    fn north_is_up_east_is_right() {
        let view = lausanne();
        let c = view.project(view.center());
        let north = view.project(GeoPoint::new(46.53, 6.5695));
        let east = view.project(GeoPoint::new(46.52, 6.58));
        assert!(north.y < c.y);
        assert!(east.x > c.x);
    }

    #[test]
    fn unproject_inverts_project() {
        let view = lausanne();
        let geo = GeoPoint::new(46.2044, 6.1432);
        let back = view.unproject(view.project(geo));
        assert!((back.lat - geo.lat).abs() < 1e-9);
        assert!((back.lon - geo.lon).abs() < 1e-9);
    }

    #[test]
    fn zooming_in_doubles_distances() {
        let a = GeoPoint::new(46.52, 6.5656);
        let b = GeoPoint::new(46.2044, 6.1432);
        let near = lausanne();
        let mut far = near;
        far.zoom = 14.0;
        let d13 = near.project(a).distance(&near.project(b));
        let d14 = far.project(a).distance(&far.project(b));
        assert!((d14 / d13 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn fit_bounds_contains_both_points() {
        let a = GeoPoint::new(46.52, 6.5656);
        let b = GeoPoint::new(46.2044, 6.1432);
        let bounds = GeoBounds::from_points([a, b]).unwrap();
        let fitted = lausanne().fit_bounds(&bounds, 40.0, 1.0, 20.0);
        for p in [fitted.project(a), fitted.project(b)] {
            assert!(p.x >= 40.0 - 1e-6 && p.x <= 1160.0 + 1e-6);
            assert!(p.y >= 40.0 - 1e-6 && p.y <= 760.0 + 1e-6);
        }
        let mut tighter = fitted;
        tighter.zoom += 1.0;
        let pa = tighter.project(a);
        let pb = tighter.project(b);
        assert!((pa.x - pb.x).abs() > 1120.0 || (pa.y - pb.y).abs() > 720.0);
    }

    #[test]
    fn fit_single_point_uses_max_zoom() {
        let bounds = GeoBounds::from_point(GeoPoint::new(46.52, 6.5656));
        let fitted = lausanne().fit_bounds(&bounds, 40.0, 1.0, 18.0);
        assert_eq!(fitted.zoom, 18.0);
        assert!((fitted.center_lat - 46.52).abs() < 1e-9);
    }

    #[test]
    fn fit_caps_out_of_range_zoom_limits() {
        let bounds = GeoBounds::from_point(GeoPoint::new(46.52, 6.5656));
        let fitted = lausanne().fit_bounds(&bounds, 40.0, 1.0, 1e17);
        assert_eq!(fitted.zoom, MAX_ZOOM);
        let fitted = lausanne().fit_bounds(&bounds, 40.0, f64::NAN, f64::INFINITY);
        assert_eq!(fitted.zoom, MAX_ZOOM);

        let wide = GeoBounds::from_points([GeoPoint::new(-60.0, -170.0), GeoPoint::new(70.0, 170.0)]).unwrap();
        let fitted = lausanne().fit_bounds(&wide, 40.0, -1e17, 1e17);
        assert!(fitted.zoom >= 0.0 && fitted.zoom <= 2.0);
    }

    #[test]
    fn closures_are_projectors() {
        let shift = |p: GeoPoint| PlanarPoint::new(p.lon * 10.0, p.lat * 10.0);
        let out = shift.project(GeoPoint::new(1.0, 2.0));
        assert_eq!(out, PlanarPoint::new(20.0, 10.0));
    }
}
