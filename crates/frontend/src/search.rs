//! Place-search input handling and the recent-searches list.
//!
//! A query that is a bare coordinate pair skips the geocoder entirely.
//! Successful searches are remembered in localStorage, newest first,
//! capped and deduplicated by display name. List maintenance is pure;
//! only the storage shim touches web_sys.

use serde::{Deserialize, Serialize};
use tracing::warn;

use prospect_shared::geo::GeoPoint;

use crate::layers::SearchMarker;

/// localStorage key for the persisted recent-searches list.
pub const RECENT_SEARCHES_KEY: &str = "prospect.recent_searches";

/// Maximum number of remembered searches.
pub const RECENT_SEARCHES_CAP: usize = 3;

/// Parse `"<lat>,<lon>"` coordinate-pair input. Returns `None` for
/// anything that is not two in-range floats, which then goes to the
/// geocoder as free text.
pub fn parse_coordinate_pair(input: &str) -> Option<GeoPoint> {
    let (lat_s, lon_s) = input.split_once(',')?;
    let lat: f64 = lat_s.trim().parse().ok()?;
    let lon: f64 = lon_s.trim().parse().ok()?;
    let point = GeoPoint::new(lon, lat);
    point.is_valid().then_some(point)
}

/// Marker label for direct coordinate input, 4 decimal places.
pub fn coordinate_label(point: GeoPoint) -> String {
    format!("{:.4}, {:.4}", point.lat, point.lon)
}

/// Build the search marker for a coordinate-pair query.
pub fn marker_for_coordinates(point: GeoPoint) -> SearchMarker {
    SearchMarker {
        label: coordinate_label(point),
        location: point,
    }
}

/// One remembered search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl RecentSearch {
    pub fn from_marker(marker: &SearchMarker) -> Self {
        RecentSearch {
            label: marker.label.clone(),
            lat: marker.location.lat,
            lon: marker.location.lon,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Insert a search at the front, dropping any older entry with the same
/// label and trimming to the cap.
pub fn push_recent(list: &mut Vec<RecentSearch>, entry: RecentSearch) {
    list.retain(|e| e.label != entry.label);
    list.insert(0, entry);
    list.truncate(RECENT_SEARCHES_CAP);
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Read the persisted list; absent or corrupt data yields an empty list.
pub fn load_recent() -> Vec<RecentSearch> {
    let Some(storage) = local_storage() else {
        return Vec::new();
    };
    let Ok(Some(raw)) = storage.get_item(RECENT_SEARCHES_KEY) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("discarding corrupt recent-searches entry: {e}");
        Vec::new()
    })
}

/// Persist the list. Storage failures (quota, private mode) are logged
/// and ignored; the in-memory list keeps working.
pub fn store_recent(list: &[RecentSearch]) {
    let Some(storage) = local_storage() else {
        return;
    };
    match serde_json::to_string(list) {
        Ok(json) => {
            if storage.set_item(RECENT_SEARCHES_KEY, &json).is_err() {
                warn!("failed to persist recent searches");
            }
        }
        Err(e) => warn!("failed to serialize recent searches: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> RecentSearch {
        RecentSearch {
            label: label.to_string(),
            lat: 40.9845,
            lon: -116.3848,
        }
    }

    #[test]
    fn test_parse_coordinate_pair() {
        let p = parse_coordinate_pair("40.9845,-116.3848").unwrap();
        assert!((p.lat - 40.9845).abs() < 1e-12);
        assert!((p.lon - -116.3848).abs() < 1e-12);
    }

    #[test]
    fn test_parse_coordinate_pair_with_spaces() {
        let p = parse_coordinate_pair(" 40.9845 , -116.3848 ").unwrap();
        assert!((p.lat - 40.9845).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(parse_coordinate_pair("Elko, Nevada").is_none());
        assert!(parse_coordinate_pair("Carlin Trend").is_none());
        assert!(parse_coordinate_pair("").is_none());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(parse_coordinate_pair("95.0,10.0").is_none());
        assert!(parse_coordinate_pair("10.0,181.0").is_none());
    }

    #[test]
    fn test_coordinate_label_four_decimals() {
        let p = parse_coordinate_pair("40.9845,-116.3848").unwrap();
        assert_eq!(coordinate_label(p), "40.9845, -116.3848");
        let p = parse_coordinate_pair("41,-116.5").unwrap();
        assert_eq!(coordinate_label(p), "41.0000, -116.5000");
    }

    #[test]
    fn test_marker_for_coordinates_is_exact() {
        let p = parse_coordinate_pair("40.9845,-116.3848").unwrap();
        let marker = marker_for_coordinates(p);
        assert_eq!(marker.location.lat, 40.9845);
        assert_eq!(marker.location.lon, -116.3848);
        assert_eq!(marker.label, "40.9845, -116.3848");
    }

    #[test]
    fn test_push_recent_most_recent_first() {
        let mut list = Vec::new();
        push_recent(&mut list, entry("Elko"));
        push_recent(&mut list, entry("Carlin"));
        assert_eq!(list[0].label, "Carlin");
        assert_eq!(list[1].label, "Elko");
    }

    #[test]
    fn test_push_recent_dedups_by_label() {
        let mut list = Vec::new();
        push_recent(&mut list, entry("Elko"));
        push_recent(&mut list, entry("Carlin"));
        push_recent(&mut list, entry("Elko"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].label, "Elko");
        assert_eq!(list[1].label, "Carlin");
    }

    #[test]
    fn test_push_recent_caps_at_three() {
        let mut list = Vec::new();
        for name in ["a", "b", "c", "d"] {
            push_recent(&mut list, entry(name));
        }
        assert_eq!(list.len(), RECENT_SEARCHES_CAP);
        assert_eq!(list[0].label, "d");
        assert_eq!(list[2].label, "b");
    }
}
