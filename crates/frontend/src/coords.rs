//! Camera and screen-space conversions.
//!
//! The [`MapCamera`] is the explicitly owned map context: every component
//! that needs to translate between screen pixels and geography receives
//! it as a value instead of reaching for a global map handle. All
//! conversions are pure and usable in unit tests (no web_sys dependency);
//! the one DOM lookup lives in [`container_rect`].

use prospect_shared::geo::{self, GeoPoint, ProjectedPoint};

/// Tile edge length of the basemap tiles, in CSS pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

/// The map viewport: a center position and a slippy-map zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl MapCamera {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Web Mercator meters covered by one screen pixel at this zoom.
    pub fn meters_per_pixel(&self) -> f64 {
        geo::MERCATOR_EXTENT_M / (TILE_SIZE_PX * 2f64.powf(self.zoom))
    }

    /// Container-relative pixel position to a point on the Mercator plane.
    pub fn screen_to_projected(
        &self,
        px: f64,
        py: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) -> ProjectedPoint {
        let m = self.meters_per_pixel();
        let c = geo::project(self.center);
        // Screen y grows downward, Mercator y grows northward
        ProjectedPoint::new(
            c.x + (px - viewport_w / 2.0) * m,
            c.y - (py - viewport_h / 2.0) * m,
        )
    }

    /// Inverse of [`screen_to_projected`][Self::screen_to_projected].
    pub fn projected_to_screen(
        &self,
        p: ProjectedPoint,
        viewport_w: f64,
        viewport_h: f64,
    ) -> (f64, f64) {
        let m = self.meters_per_pixel();
        let c = geo::project(self.center);
        (
            viewport_w / 2.0 + (p.x - c.x) / m,
            viewport_h / 2.0 - (p.y - c.y) / m,
        )
    }

    pub fn screen_to_geo(&self, px: f64, py: f64, viewport_w: f64, viewport_h: f64) -> GeoPoint {
        geo::unproject(self.screen_to_projected(px, py, viewport_w, viewport_h))
    }

    pub fn geo_to_screen(&self, p: GeoPoint, viewport_w: f64, viewport_h: f64) -> (f64, f64) {
        self.projected_to_screen(geo::project(p), viewport_w, viewport_h)
    }

    /// Pan by a screen-pixel delta (drag direction, i.e. dragging right
    /// moves the map content right and the center west).
    pub fn panned_by(&self, dx_px: f64, dy_px: f64) -> MapCamera {
        let m = self.meters_per_pixel();
        let c = geo::project(self.center);
        let center = geo::unproject(ProjectedPoint::new(c.x - dx_px * m, c.y + dy_px * m));
        MapCamera {
            center,
            zoom: self.zoom,
        }
    }
}

/// A basemap tile address in the XYZ scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileId {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

/// A tile plus its position in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub tile: TileId,
    pub left: f64,
    pub top: f64,
}

/// Fractional tile coordinates of a point at the given zoom level.
pub fn tile_coords(p: GeoPoint, z: u8) -> (f64, f64) {
    let n = 2f64.powi(z as i32);
    let x = (p.lon + 180.0) / 360.0 * n;
    let lat = p.lat.to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n;
    (x, y)
}

/// Tiles covering a viewport centered on the camera, with their
/// container-relative pixel placement.
pub fn visible_tiles(camera: &MapCamera, viewport_w: f64, viewport_h: f64) -> Vec<TilePlacement> {
    let z = camera.zoom.round().clamp(0.0, 19.0) as u8;
    let n = 1i64 << z;
    let (cx, cy) = tile_coords(camera.center, z);

    let half_w_tiles = viewport_w / TILE_SIZE_PX / 2.0;
    let half_h_tiles = viewport_h / TILE_SIZE_PX / 2.0;

    let x_min = (cx - half_w_tiles).floor() as i64;
    let x_max = (cx + half_w_tiles).floor() as i64;
    let y_min = (cy - half_h_tiles).floor() as i64;
    let y_max = (cy + half_h_tiles).floor() as i64;

    let mut tiles = Vec::new();
    for ty in y_min..=y_max {
        if ty < 0 || ty >= n {
            continue;
        }
        for tx in x_min..=x_max {
            // Wrap longitude so panning across the antimeridian keeps tiles
            let wrapped = tx.rem_euclid(n);
            tiles.push(TilePlacement {
                tile: TileId {
                    x: wrapped,
                    y: ty,
                    z,
                },
                left: viewport_w / 2.0 + (tx as f64 - cx) * TILE_SIZE_PX,
                top: viewport_h / 2.0 + (ty as f64 - cy) * TILE_SIZE_PX,
            });
        }
    }
    tiles
}

/// Fill an XYZ URL template with a tile address.
pub fn tile_url(template: &str, tile: TileId) -> String {
    template
        .replace("{z}", &tile.z.to_string())
        .replace("{y}", &tile.y.to_string())
        .replace("{x}", &tile.x.to_string())
}

/// Get the bounding client rect of a container element by id.
pub fn container_rect(container_id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    Some(element.get_bounding_client_rect())
}
