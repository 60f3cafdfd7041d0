//! Backend and geocoder clients, plus the last-write-wins result store.
//!
//! All transport failures are converted to typed errors at this boundary;
//! nothing here panics on a bad network day.

use serde::Deserialize;
use tracing::{debug, info, warn};

use prospect_shared::geo::{BoundingBox, GeoPoint};
use prospect_shared::models::{AnalysisRequest, AnalysisResponse, AnalysisResult};

use crate::layers::SearchMarker;

/// Failure of an analysis run. Recovered locally: logged, display state
/// untouched, no automatic retry.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::Transport(msg) => write!(f, "analysis request failed: {msg}"),
            AnalysisError::Status(code) => write!(f, "analysis backend returned HTTP {code}"),
            AnalysisError::Decode(msg) => write!(f, "malformed analysis response: {msg}"),
        }
    }
}

/// Failure of a place search. Recovered locally with a user alert; the
/// map is never mutated on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeError {
    NotFound,
    Transport(String),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::NotFound => write!(f, "no results found for that place"),
            GeocodeError::Transport(msg) => write!(f, "place search failed: {msg}"),
        }
    }
}

/// Run a mineral analysis over the committed AOI bounding box.
pub async fn run_analysis(
    base_url: &str,
    bbox: BoundingBox,
) -> Result<AnalysisResponse, AnalysisError> {
    let request = AnalysisRequest::from(bbox);
    info!(
        lat_min = request.lat_min,
        lat_max = request.lat_max,
        lon_min = request.lon_min,
        lon_max = request.lon_max,
        "requesting analysis"
    );

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/analyze/"))
        .json(&request)
        .send()
        .await
        .map_err(|e| AnalysisError::Transport(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(AnalysisError::Status(resp.status().as_u16()));
    }

    resp.json::<AnalysisResponse>()
        .await
        .map_err(|e| AnalysisError::Decode(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

/// Probe the backend health endpoint. Failures are non-fatal.
pub async fn backend_reachable(base_url: &str) -> bool {
    let resp = reqwest::Client::new()
        .get(format!("{base_url}/analyze/status"))
        .send()
        .await;
    match resp {
        Ok(resp) => resp
            .json::<StatusResponse>()
            .await
            .map(|s| s.status == "ok")
            .unwrap_or(false),
        Err(e) => {
            warn!("backend status probe failed: {e}");
            false
        }
    }
}

/// One geocoder hit. Nominatim sends coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl GeocodeHit {
    /// Convert to a search marker, rejecting unparseable or out-of-range
    /// coordinates.
    pub fn into_marker(self) -> Option<SearchMarker> {
        let lat: f64 = self.lat.parse().ok()?;
        let lon: f64 = self.lon.parse().ok()?;
        let location = GeoPoint::new(lon, lat);
        location.is_valid().then_some(SearchMarker {
            location,
            label: self.display_name,
        })
    }
}

/// Resolve a free-text query against the public geocoder; the first hit
/// wins.
pub async fn geocode(endpoint: &str, query: &str) -> Result<SearchMarker, GeocodeError> {
    let hits: Vec<GeocodeHit> = reqwest::Client::new()
        .get(endpoint)
        .query(&[("format", "json"), ("limit", "1"), ("q", query)])
        .send()
        .await
        .map_err(|e| GeocodeError::Transport(e.to_string()))?
        .json()
        .await
        .map_err(|e| GeocodeError::Transport(e.to_string()))?;

    hits.into_iter()
        .next()
        .and_then(GeocodeHit::into_marker)
        .ok_or(GeocodeError::NotFound)
}

/// Token identifying one analysis run. Tokens are ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Holds the displayed analysis result under a last-write-wins policy.
///
/// Starting a new run while one is in flight is allowed; a response is
/// applied only if its token is the latest issued, so a slow stale
/// response can never overwrite a newer result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    next_token: u64,
    latest: u64,
    result: Option<AnalysisResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new run and get its token.
    pub fn begin(&mut self) -> RequestToken {
        self.next_token += 1;
        self.latest = self.next_token;
        RequestToken(self.latest)
    }

    /// Whether the token still identifies the newest run.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Apply a settled result. Returns false (and changes nothing) when
    /// the response is stale.
    pub fn apply(&mut self, token: RequestToken, result: AnalysisResult) -> bool {
        if !self.is_latest(token) {
            debug!(token = token.0, latest = self.latest, "stale analysis response dropped");
            return false;
        }
        self.result = Some(result);
        true
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn clear(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_shared::models::Hotspot;
    use prospect_shared::models::Mineral;

    fn bounds(lat_min: f64) -> BoundingBox {
        BoundingBox {
            lat_min,
            lat_max: lat_min + 0.1,
            lon_min: -116.4,
            lon_max: -116.3,
        }
    }

    fn result(lat_min: f64) -> AnalysisResult {
        AnalysisResult {
            copper_heatmap: None,
            gold_heatmap: None,
            bounds: bounds(lat_min),
            hotspots: vec![],
        }
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = ResultStore::new();
        let first = store.begin();
        let second = store.begin();

        // The newer request settles first
        assert!(store.apply(second, result(2.0)));
        // The older one arrives late and must not overwrite
        assert!(!store.apply(first, result(1.0)));

        assert_eq!(store.result().unwrap().bounds.lat_min, 2.0);
    }

    #[test]
    fn test_latest_response_applies() {
        let mut store = ResultStore::new();
        let token = store.begin();
        assert!(store.is_latest(token));
        assert!(store.apply(token, result(1.0)));
        assert!(store.result().is_some());
    }

    #[test]
    fn test_new_run_supersedes_token() {
        let mut store = ResultStore::new();
        let first = store.begin();
        assert!(store.is_latest(first));
        let _second = store.begin();
        assert!(!store.is_latest(first));
    }

    #[test]
    fn test_failed_run_leaves_result_untouched() {
        let mut store = ResultStore::new();
        let token = store.begin();
        store.apply(token, result(1.0));

        // A newer run that errors applies nothing; the old result stays
        let _doomed = store.begin();
        assert_eq!(store.result().unwrap().bounds.lat_min, 1.0);
    }

    #[test]
    fn test_clear() {
        let mut store = ResultStore::new();
        let token = store.begin();
        store.apply(token, result(1.0));
        store.clear();
        assert!(store.result().is_none());
    }

    #[test]
    fn test_geocode_hit_parses_string_coordinates() {
        let json = r#"{"lat": "40.8324211", "lon": "-115.7631232", "display_name": "Elko, Nevada, United States"}"#;
        let hit: GeocodeHit = serde_json::from_str(json).unwrap();
        let marker = hit.into_marker().unwrap();
        assert!((marker.location.lat - 40.8324211).abs() < 1e-9);
        assert!((marker.location.lon - -115.7631232).abs() < 1e-9);
        assert_eq!(marker.label, "Elko, Nevada, United States");
    }

    #[test]
    fn test_geocode_hit_rejects_garbage() {
        let hit = GeocodeHit {
            lat: "not-a-number".to_string(),
            lon: "0".to_string(),
            display_name: "x".to_string(),
        };
        assert!(hit.into_marker().is_none());

        let hit = GeocodeHit {
            lat: "95.0".to_string(),
            lon: "0".to_string(),
            display_name: "x".to_string(),
        };
        assert!(hit.into_marker().is_none());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AnalysisError::Status(500).to_string(),
            "analysis backend returned HTTP 500"
        );
        assert_eq!(
            GeocodeError::NotFound.to_string(),
            "no results found for that place"
        );
    }

    #[test]
    fn test_hotspot_fixture_roundtrip() {
        // Shape check against the backend hotspot list format
        let json = r#"[{"mineral": "gold", "confidence": 91.0, "lat": 40.98, "lon": -116.38, "depth_min": 100, "depth_max": 300}]"#;
        let hotspots: Vec<Hotspot> = serde_json::from_str(json).unwrap();
        assert_eq!(hotspots[0].mineral, Mineral::Gold);
        assert!(hotspots[0].is_high_confidence());
    }
}
