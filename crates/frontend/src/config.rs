//! Runtime configuration.
//!
//! The analysis backend URL can be overridden per browser through a
//! localStorage key; everything else is a deployment-time constant.

use prospect_shared::geo::GeoPoint;
use prospect_shared::square::{self, SizeConstraint};

/// Documented local fallback for the analysis backend.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// localStorage key holding a backend URL override.
pub const BACKEND_URL_KEY: &str = "prospect.backend_url";

/// Public geocoder used by the place search.
pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Satellite basemap tile template (XYZ scheme).
pub const TILE_URL_TEMPLATE: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";

/// Active AOI size-constraint profile. A deployment decision, not a
/// runtime switch.
pub const ACTIVE_CONSTRAINT: SizeConstraint = square::REGIONAL;

/// Delay before hotspot markers become visible after a result settles,
/// sequencing with the insights loading affordance.
pub const INSIGHTS_SETTLE_MS: u32 = 2000;

/// Initial camera: Carlin Trend, Nevada.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lon: -116.3848,
    lat: 40.9845,
};
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Resolve the backend base URL: localStorage override, else the local
/// default. Trailing slashes are trimmed so path joining stays uniform.
pub fn backend_base_url() -> String {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(BACKEND_URL_KEY).ok().flatten());
    let url = stored.unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    url.trim_end_matches('/').to_string()
}
