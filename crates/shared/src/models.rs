//! Wire models for the analysis backend contract.
//!
//! Field names mirror the backend JSON exactly; unknown response fields
//! are ignored so newer backends can add sections without breaking the
//! client.

use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, GeoPoint};

/// Confidence threshold (percent) above which a hotspot is styled as a
/// high-confidence detection.
pub const HIGH_CONFIDENCE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mineral {
    Copper,
    Gold,
}

impl std::fmt::Display for Mineral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mineral::Copper => write!(f, "Copper"),
            Mineral::Gold => write!(f, "Gold"),
        }
    }
}

/// A point-located mineral detection from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub mineral: Mineral,
    /// Confidence score in percent, 0 to 100.
    pub confidence: f64,
    pub lat: f64,
    pub lon: f64,
    /// Expected deposit depth range in meters.
    pub depth_min: f64,
    pub depth_max: f64,
}

impl Hotspot {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }
}

/// Request body for `POST /analyze/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl From<BoundingBox> for AnalysisRequest {
    fn from(bbox: BoundingBox) -> Self {
        AnalysisRequest {
            lat_min: bbox.lat_min,
            lat_max: bbox.lat_max,
            lon_min: bbox.lon_min,
            lon_max: bbox.lon_max,
        }
    }
}

/// Response body of `POST /analyze/`.
///
/// Heatmaps are base64 PNG strings; the backend sends an empty string
/// rather than omitting an absent image, and every field is defaulted so
/// partial responses still decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub copper_heatmap: String,
    #[serde(default)]
    pub gold_heatmap: String,
    #[serde(default)]
    pub heatmap_bounds: Option<BoundingBox>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

/// A settled analysis, ready for display.
///
/// Replaces any prior result wholesale. `bounds` is always present:
/// when the backend omits `heatmap_bounds` the request's own bounding
/// box is used, so overlay placement never depends on optional data.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub copper_heatmap: Option<String>,
    pub gold_heatmap: Option<String>,
    pub bounds: BoundingBox,
    pub hotspots: Vec<Hotspot>,
}

impl AnalysisResult {
    pub fn from_response(response: AnalysisResponse, request_bounds: BoundingBox) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        AnalysisResult {
            copper_heatmap: non_empty(response.copper_heatmap),
            gold_heatmap: non_empty(response.gold_heatmap),
            bounds: response.heatmap_bounds.unwrap_or(request_bounds),
            hotspots: response.hotspots,
        }
    }
}
