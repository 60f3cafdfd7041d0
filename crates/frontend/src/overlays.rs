//! Analysis overlay state: heatmap image layers and hotspot markers.
//!
//! Holds what is currently mounted on the map for the active analysis
//! result. Rendering itself happens in the map view component; this
//! module owns the mount/replace/unmount decisions and the
//! click-to-inspect selection.

use prospect_shared::geo::{distance_km, BoundingBox, GeoPoint};
use prospect_shared::models::{AnalysisResult, Hotspot, Mineral};

/// One mounted heatmap image layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub mineral: Mineral,
    /// Base64 PNG payload, never empty.
    pub image_base64: String,
    pub bounds: BoundingBox,
}

/// Display state for the current analysis result. Replaced wholesale
/// when a new result settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    copper: Option<HeatmapLayer>,
    gold: Option<HeatmapLayer>,
    hotspots: Vec<Hotspot>,
    pub heatmaps_visible: bool,
    pub hotspots_visible: bool,
    selected: Option<usize>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all overlay state with a settled result. Exactly one image
    /// layer exists per mineral; a mineral without an image stays
    /// unmounted. Hotspots start hidden until the settling delay elapses.
    pub fn apply_result(&mut self, result: &AnalysisResult) {
        let layer = |mineral, image: &Option<String>| {
            image.as_ref().map(|img| HeatmapLayer {
                mineral,
                image_base64: img.clone(),
                bounds: result.bounds,
            })
        };
        self.copper = layer(Mineral::Copper, &result.copper_heatmap);
        self.gold = layer(Mineral::Gold, &result.gold_heatmap);
        self.hotspots = result.hotspots.clone();
        self.heatmaps_visible = true;
        self.hotspots_visible = false;
        self.selected = None;
    }

    /// The mounted layer for a mineral, honoring visibility.
    pub fn layer(&self, mineral: Mineral) -> Option<&HeatmapLayer> {
        if !self.heatmaps_visible {
            return None;
        }
        match mineral {
            Mineral::Copper => self.copper.as_ref(),
            Mineral::Gold => self.gold.as_ref(),
        }
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        if self.hotspots_visible {
            &self.hotspots
        } else {
            &[]
        }
    }

    pub fn set_hotspots_visible(&mut self, visible: bool) {
        self.hotspots_visible = visible;
    }

    pub fn set_heatmaps_visible(&mut self, visible: bool) {
        self.heatmaps_visible = visible;
        if !visible {
            self.selected = None;
        }
    }

    /// Unmount everything.
    pub fn clear(&mut self) {
        *self = OverlayState::default();
    }

    /// Click-to-inspect: select the nearest visible hotspot within
    /// `tolerance_km` of the click, or close the readout when the click
    /// lands elsewhere. Only one readout is open at a time.
    pub fn select_at(&mut self, click: GeoPoint, tolerance_km: f64) -> Option<&Hotspot> {
        if !self.hotspots_visible {
            self.selected = None;
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, h) in self.hotspots.iter().enumerate() {
            let d = distance_km(h.location(), click);
            if d <= tolerance_km && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        self.selected = best.map(|(i, _)| i);
        self.selected_hotspot()
    }

    pub fn selected_hotspot(&self) -> Option<&Hotspot> {
        self.selected.and_then(|i| self.hotspots.get(i))
    }

    pub fn close_readout(&mut self) {
        self.selected = None;
    }
}

/// CSS class for a hotspot marker, keyed on mineral and the
/// high-confidence threshold.
pub fn hotspot_class(hotspot: &Hotspot) -> &'static str {
    match (hotspot.mineral, hotspot.is_high_confidence()) {
        (Mineral::Copper, true) => "hotspot hotspot-copper-high",
        (Mineral::Copper, false) => "hotspot hotspot-copper",
        (Mineral::Gold, true) => "hotspot hotspot-gold-high",
        (Mineral::Gold, false) => "hotspot hotspot-gold",
    }
}

/// Marker fill color for SVG rendering, same key as [`hotspot_class`].
pub fn hotspot_color(hotspot: &Hotspot) -> &'static str {
    match (hotspot.mineral, hotspot.is_high_confidence()) {
        (Mineral::Copper, true) => "#e04a1f",
        (Mineral::Copper, false) => "#e8926f",
        (Mineral::Gold, true) => "#e6b800",
        (Mineral::Gold, false) => "#f0d878",
    }
}
