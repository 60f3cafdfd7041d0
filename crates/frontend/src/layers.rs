//! The feature layer manager.
//!
//! One mutable collection holds the user-facing map features. Features
//! come in two disjoint kinds, the AOI polygon and the search marker, and
//! replacing one kind must never disturb the other: searching and AOI
//! drawing are independent user actions.

use prospect_shared::geo::{BoundingBox, GeoPoint};

/// A committed Area of Interest. Immutable once created; the bounding
/// box is derived from the committed polygon extent and is the single
/// source of truth handed to the analysis backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiFeature {
    pub polygon: [GeoPoint; 5],
    pub bounding_box: BoundingBox,
}

impl AoiFeature {
    pub fn from_ring(polygon: [GeoPoint; 5]) -> Self {
        let bounding_box = BoundingBox::from_ring(&polygon);
        AoiFeature {
            polygon,
            bounding_box,
        }
    }
}

/// The marker placed by a successful place search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMarker {
    pub location: GeoPoint,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapFeature {
    Polygon(AoiFeature),
    Point(SearchMarker),
}

/// The single mutable feature collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureLayers {
    features: Vec<MapFeature>,
}

impl FeatureLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all polygon features and insert the new one. Point
    /// features are untouched.
    pub fn replace_polygon(&mut self, feature: AoiFeature) {
        self.clear_polygons();
        self.features.push(MapFeature::Polygon(feature));
    }

    /// Remove all polygon features without touching point features.
    /// Used when a new draw gesture starts.
    pub fn clear_polygons(&mut self) {
        self.features
            .retain(|f| !matches!(f, MapFeature::Polygon(_)));
    }

    /// Remove all point features and insert the new one. Polygon
    /// features are untouched.
    pub fn replace_point(&mut self, marker: SearchMarker) {
        self.features.retain(|f| !matches!(f, MapFeature::Point(_)));
        self.features.push(MapFeature::Point(marker));
    }

    /// Full reset only.
    pub fn clear_all(&mut self) {
        self.features.clear();
    }

    /// The active AOI, if one is committed. At most one exists.
    pub fn polygon(&self) -> Option<&AoiFeature> {
        self.features.iter().find_map(|f| match f {
            MapFeature::Polygon(aoi) => Some(aoi),
            MapFeature::Point(_) => None,
        })
    }

    /// The active search marker, if any. At most one exists.
    pub fn point(&self) -> Option<&SearchMarker> {
        self.features.iter().find_map(|f| match f {
            MapFeature::Point(marker) => Some(marker),
            MapFeature::Polygon(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
