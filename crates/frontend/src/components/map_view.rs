use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;

use prospect_shared::geo::GeoPoint;
use prospect_shared::models::Mineral;

use crate::coords::{self, MapCamera};
use crate::draw::{DrawController, DrawEffect, DrawEvent};
use crate::layers::{AoiFeature, FeatureLayers, SearchMarker};
use crate::overlays::{hotspot_color, HeatmapLayer, OverlayState};
use crate::config;

const MAP_CONTAINER_ID: &str = "prospect-map-container";

/// Fallback viewport size before the container has been laid out.
const REFERENCE_WIDTH: f64 = 960.0;
const REFERENCE_HEIGHT: f64 = 640.0;

const ZOOM_MIN: f64 = 3.0;
const ZOOM_MAX: f64 = 19.0;

/// Movement below this is treated as a click, not a pan.
const PAN_THRESHOLD: f64 = 3.0;

/// Click distance (screen pixels) within which a hotspot is inspectable.
const HOTSPOT_HIT_PX: f64 = 14.0;

// --- AOI styling: white while valid, red while out of bounds ---

const AOI_VALID_STROKE: &str = "#ffffff";
const AOI_VALID_FILL: &str = "rgba(255,255,255,0.18)";
const AOI_INVALID_STROKE: &str = "#e04a4a";
const AOI_INVALID_FILL: &str = "rgba(224,74,74,0.15)";

const MARKER_COLOR: &str = "#4a8fd4";

/// Live viewport size, falling back to the reference size until the
/// container exists.
fn viewport_size() -> (f64, f64) {
    match coords::container_rect(MAP_CONTAINER_ID) {
        Some(rect) => (rect.width(), rect.height()),
        None => (REFERENCE_WIDTH, REFERENCE_HEIGHT),
    }
}

/// Client coordinates to container-relative pixels.
fn client_to_container(client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let rect = coords::container_rect(MAP_CONTAINER_ID)?;
    Some((client_x - rect.left(), client_y - rect.top()))
}

// ---------------------------------------------------------------------------
// SVG builders (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// Ring vertices as an SVG points attribute in screen space.
fn ring_svg_points(ring: &[GeoPoint], camera: &MapCamera, w: f64, h: f64) -> String {
    ring.iter()
        .map(|p| {
            let (x, y) = camera.geo_to_screen(*p, w, h);
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_square_overlay(
    svg: &mut String,
    ring: &[GeoPoint],
    valid: bool,
    camera: &MapCamera,
    w: f64,
    h: f64,
) {
    let points = ring_svg_points(ring, camera, w, h);
    let (stroke, fill) = if valid {
        (AOI_VALID_STROKE, AOI_VALID_FILL)
    } else {
        (AOI_INVALID_STROKE, AOI_INVALID_FILL)
    };
    svg.push_str(&format!(
        r#"<polygon points="{points}" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#
    ));
}

fn build_search_marker(svg: &mut String, marker: &SearchMarker, camera: &MapCamera, w: f64, h: f64) {
    let (x, y) = camera.geo_to_screen(marker.location, w, h);
    svg.push_str(&format!(
        r##"<g role="img"><title>{}</title>"##,
        marker.label
    ));
    svg.push_str(&format!(
        r##"<circle cx="{x:.1}" cy="{y:.1}" r="7" fill="{MARKER_COLOR}" stroke="white" stroke-width="2"/>"##
    ));
    svg.push_str(&format!(
        r##"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{MARKER_COLOR}" stroke-width="2"/>"##,
        y + 7.0,
        y + 16.0
    ));
    svg.push_str("</g>");
}

fn build_hotspot_markers(
    svg: &mut String,
    overlays: &OverlayState,
    camera: &MapCamera,
    w: f64,
    h: f64,
) {
    let selected = overlays.selected_hotspot();
    for hotspot in overlays.hotspots() {
        let (x, y) = camera.geo_to_screen(hotspot.location(), w, h);
        let color = hotspot_color(hotspot);
        let r = if hotspot.is_high_confidence() { 7.0 } else { 5.0 };
        svg.push_str(&format!(
            r##"<circle cx="{x:.1}" cy="{y:.1}" r="{r}" fill="{color}" fill-opacity="0.85" stroke="white" stroke-width="1.5"/>"##
        ));
        if selected == Some(hotspot) {
            svg.push_str(&format!(
                r##"<circle cx="{x:.1}" cy="{y:.1}" r="12" fill="none" stroke="white" stroke-width="2" stroke-dasharray="4 3"/>"##
            ));
        }
    }
}

/// Assemble the full overlay SVG for the current frame.
fn build_svg_content(
    layers: &FeatureLayers,
    draft_ring: Option<(&[GeoPoint; 5], bool)>,
    overlays: &OverlayState,
    camera: &MapCamera,
    w: f64,
    h: f64,
) -> String {
    let mut svg = String::with_capacity(2048);
    if let Some(aoi) = layers.polygon() {
        build_square_overlay(&mut svg, &aoi.polygon, true, camera, w, h);
    }
    if let Some((ring, valid)) = draft_ring {
        build_square_overlay(&mut svg, ring, valid, camera, w, h);
    }
    build_hotspot_markers(&mut svg, overlays, camera, w, h);
    if let Some(marker) = layers.point() {
        build_search_marker(&mut svg, marker, camera, w, h);
    }
    svg
}

/// Screen placement for a heatmap image layer.
fn heatmap_css(layer: &HeatmapLayer, camera: &MapCamera, w: f64, h: f64) -> String {
    let nw = GeoPoint::new(layer.bounds.lon_min, layer.bounds.lat_max);
    let se = GeoPoint::new(layer.bounds.lon_max, layer.bounds.lat_min);
    let (left, top) = camera.geo_to_screen(nw, w, h);
    let (right, bottom) = camera.geo_to_screen(se, w, h);
    format!(
        "position:absolute;left:{left:.1}px;top:{top:.1}px;width:{:.1}px;height:{:.1}px;opacity:0.55;pointer-events:none;",
        right - left,
        bottom - top
    )
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    camera: Signal<MapCamera>,
    layers: Signal<FeatureLayers>,
    overlays: Signal<OverlayState>,
    controller: Signal<DrawController>,
    on_commit: EventHandler<AoiFeature>,
    on_reject: EventHandler<String>,
) -> Element {
    // Pan state (mouse drag while not drawing)
    let mut is_panning = use_signal(|| false);
    let mut did_pan = use_signal(|| false);
    let mut pan_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut pan_start_camera =
        use_signal(|| MapCamera::new(config::DEFAULT_CENTER, config::DEFAULT_ZOOM));

    // Transient measurement readout, anchored at the cursor
    let mut readout = use_signal(|| None::<(f64, f64, String)>);

    // Dispatch a synthetic pointer event into the draw state machine and
    // perform the resulting side effects.
    let mut dispatch_draw = move |event: DrawEvent, cursor: (f64, f64)| {
        let effect = controller.write().handle(event);
        match effect {
            DrawEffect::DraftUpdated { label, .. } => {
                readout.set(Some((cursor.0, cursor.1, label)));
            }
            DrawEffect::Committed { feature, .. } => {
                readout.set(None);
                layers.write().replace_polygon(feature.clone());
                on_commit.call(feature);
            }
            DrawEffect::Rejected { message } => {
                readout.set(None);
                on_reject.call(message);
            }
            DrawEffect::Ignored | DrawEffect::Started | DrawEffect::Cancelled => {}
        }
    };

    let cur_camera = *camera.read();
    let (vw, vh) = viewport_size();
    let drawing = controller.read().is_drawing();

    let svg_content = {
        let layers_snap = layers.read();
        let overlays_snap = overlays.read();
        let controller_snap = controller.read();
        let draft_ring = controller_snap.draft().map(|d| (&d.polygon, d.is_valid));
        build_svg_content(
            &layers_snap,
            draft_ring,
            &overlays_snap,
            &cur_camera,
            vw,
            vh,
        )
    };
    let svg_html = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{vw}" height="{vh}" style="position:absolute;top:0;left:0;pointer-events:none;z-index:5;">{svg_content}</svg>"#
    );

    // Basemap tiles: (url, css) pairs
    let tiles: Vec<(String, String)> = coords::visible_tiles(&cur_camera, vw, vh)
        .into_iter()
        .map(|p| {
            (
                coords::tile_url(config::TILE_URL_TEMPLATE, p.tile),
                format!(
                    "position:absolute;left:{:.1}px;top:{:.1}px;width:{}px;height:{}px;",
                    p.left,
                    p.top,
                    coords::TILE_SIZE_PX,
                    coords::TILE_SIZE_PX
                ),
            )
        })
        .collect();

    // Heatmap image layers: (data url, css) pairs
    let heatmaps: Vec<(String, String)> = {
        let overlays_snap = overlays.read();
        [Mineral::Copper, Mineral::Gold]
            .into_iter()
            .filter_map(|m| overlays_snap.layer(m))
            .map(|layer| {
                (
                    format!("data:image/png;base64,{}", layer.image_base64),
                    heatmap_css(layer, &cur_camera, vw, vh),
                )
            })
            .collect()
    };

    let readout_view = readout.read().clone().map(|(rx, ry, label)| {
        let style = format!("left:{:.0}px;top:{:.0}px;", rx + 14.0, ry - 10.0);
        (style, label)
    });

    let selected = overlays.read().selected_hotspot().cloned();
    let selected_view = selected.map(|h| {
        let title = format!("{} hotspot", h.mineral);
        let confidence = format!("Confidence: {:.1}%", h.confidence);
        let depth = format!("Depth: {:.0}-{:.0} m", h.depth_min, h.depth_max);
        let area = layers
            .read()
            .polygon()
            .map(|aoi| format!("AOI area: {:.1} km\u{b2}", aoi.bounding_box.area_km2()));
        (title, confidence, depth, area)
    });

    let container_class = if drawing {
        "map-container drawing"
    } else if *is_panning.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                let Some((px, py)) = client_to_container(client.x, client.y) else {
                    return;
                };
                if controller.read().is_drawing() {
                    let (w, h) = viewport_size();
                    let projected = camera.read().screen_to_projected(px, py, w, h);
                    dispatch_draw(DrawEvent::PointerDown(projected), (px, py));
                } else {
                    is_panning.set(true);
                    did_pan.set(false);
                    pan_start.set((client.x, client.y));
                    let cam = *camera.read();
                    pan_start_camera.set(cam);
                }
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                if controller.read().is_drawing() {
                    let Some((px, py)) = client_to_container(client.x, client.y) else {
                        return;
                    };
                    let (w, h) = viewport_size();
                    let projected = camera.read().screen_to_projected(px, py, w, h);
                    dispatch_draw(DrawEvent::PointerMove(projected), (px, py));
                } else if *is_panning.read() {
                    let (sx, sy) = *pan_start.read();
                    let dx = client.x - sx;
                    let dy = client.y - sy;
                    if dx.abs() > PAN_THRESHOLD || dy.abs() > PAN_THRESHOLD {
                        did_pan.set(true);
                    }
                    if *did_pan.read() {
                        let start_cam = *pan_start_camera.read();
                        camera.set(start_cam.panned_by(dx, dy));
                    }
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                if controller.read().is_drawing() {
                    let Some((px, py)) = client_to_container(client.x, client.y) else {
                        return;
                    };
                    let (w, h) = viewport_size();
                    let projected = camera.read().screen_to_projected(px, py, w, h);
                    dispatch_draw(DrawEvent::PointerUp(projected), (px, py));
                    return;
                }

                let was_panning = *is_panning.read();
                let was_pan = *did_pan.read();
                is_panning.set(false);

                // A mouseup without pan movement is a click: inspect hotspots
                if was_panning && !was_pan {
                    if let Some((px, py)) = client_to_container(client.x, client.y) {
                        let (w, h) = viewport_size();
                        let cam = *camera.read();
                        let click = cam.screen_to_geo(px, py, w, h);
                        let tolerance_km = cam.meters_per_pixel() * HOTSPOT_HIT_PX / 1000.0;
                        overlays.write().select_at(click, tolerance_km);
                    }
                }
            },

            onmouseleave: move |_| {
                is_panning.set(false);
            },

            // Basemap tiles
            for (src, style) in tiles {
                img { class: "map-tile", src: "{src}", style: "{style}", draggable: "false" }
            }

            // Heatmap image layers
            for (src, style) in heatmaps {
                img { class: "heatmap-layer", src: "{src}", style: "{style}", draggable: "false" }
            }

            // Vector overlay (AOI, draft square, marker, hotspots)
            div {
                dangerous_inner_html: "{svg_html}",
                style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
            }

            // Transient measurement readout while drawing
            if let Some((style, label)) = readout_view {
                div { class: "measure-readout", style: "{style}", "{label}" }
            }

            // Hotspot detail readout, one at a time
            if let Some((title, confidence, depth, area)) = selected_view {
                div { class: "hotspot-readout",
                    h4 { "{title}" }
                    p { "{confidence}" }
                    p { "{depth}" }
                    if let Some(area) = area {
                        p { "{area}" }
                    }
                    button {
                        onclick: move |_| overlays.write().close_readout(),
                        "Close"
                    }
                }
            }

            // Zoom controls
            div { class: "zoom-controls",
                button {
                    onclick: move |_| {
                        let cam = *camera.read();
                        camera.set(MapCamera::new(cam.center, (cam.zoom + 1.0).clamp(ZOOM_MIN, ZOOM_MAX)));
                    },
                    "+"
                }
                button {
                    onclick: move |_| {
                        let cam = *camera.read();
                        camera.set(MapCamera::new(cam.center, (cam.zoom - 1.0).clamp(ZOOM_MIN, ZOOM_MAX)));
                    },
                    "-"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_shared::geo::BoundingBox;
    use prospect_shared::models::{AnalysisResult, Hotspot};

    fn camera() -> MapCamera {
        MapCamera::new(GeoPoint::new(-116.3848, 40.9845), 11.0)
    }

    fn square_ring() -> [GeoPoint; 5] {
        [
            GeoPoint::new(-116.39, 40.97),
            GeoPoint::new(-116.38, 40.97),
            GeoPoint::new(-116.38, 40.99),
            GeoPoint::new(-116.39, 40.99),
            GeoPoint::new(-116.39, 40.97),
        ]
    }

    #[test]
    fn test_ring_svg_points_count() {
        let points = ring_svg_points(&square_ring(), &camera(), 800.0, 600.0);
        assert_eq!(points.split(' ').count(), 5);
    }

    #[test]
    fn test_square_overlay_styles() {
        let mut valid = String::new();
        build_square_overlay(&mut valid, &square_ring(), true, &camera(), 800.0, 600.0);
        assert!(valid.contains(AOI_VALID_STROKE));
        assert!(valid.contains("polygon"));

        let mut invalid = String::new();
        build_square_overlay(&mut invalid, &square_ring(), false, &camera(), 800.0, 600.0);
        assert!(invalid.contains(AOI_INVALID_STROKE));
    }

    #[test]
    fn test_search_marker_svg() {
        let marker = SearchMarker {
            location: GeoPoint::new(-116.3848, 40.9845),
            label: "Carlin Trend".to_string(),
        };
        let mut svg = String::new();
        build_search_marker(&mut svg, &marker, &camera(), 800.0, 600.0);
        assert!(svg.contains("<title>Carlin Trend</title>"));
        // Marker sits at the viewport center for the centered camera
        assert!(svg.contains(r#"cx="400.0""#));
        assert!(svg.contains(r#"cy="300.0""#));
    }

    #[test]
    fn test_hotspot_markers_hidden_until_visible() {
        let mut state = OverlayState::new();
        state.apply_result(&AnalysisResult {
            copper_heatmap: None,
            gold_heatmap: None,
            bounds: BoundingBox {
                lat_min: 40.97,
                lat_max: 40.99,
                lon_min: -116.39,
                lon_max: -116.38,
            },
            hotspots: vec![Hotspot {
                mineral: Mineral::Copper,
                confidence: 90.0,
                lat: 40.9845,
                lon: -116.3848,
                depth_min: 250.0,
                depth_max: 750.0,
            }],
        });

        let mut svg = String::new();
        build_hotspot_markers(&mut svg, &state, &camera(), 800.0, 600.0);
        assert!(svg.is_empty());

        state.set_hotspots_visible(true);
        let mut svg = String::new();
        build_hotspot_markers(&mut svg, &state, &camera(), 800.0, 600.0);
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_svg_content_layers_do_not_require_each_other() {
        // A search marker renders even with no AOI and no overlays
        let mut layers = FeatureLayers::new();
        layers.replace_point(SearchMarker {
            location: GeoPoint::new(-116.3848, 40.9845),
            label: "Elko".to_string(),
        });
        let svg = build_svg_content(
            &layers,
            None,
            &OverlayState::new(),
            &camera(),
            800.0,
            600.0,
        );
        assert!(svg.contains("Elko"));
        assert!(!svg.contains("polygon"));
    }

    #[test]
    fn test_heatmap_css_spans_bounds() {
        let layer = HeatmapLayer {
            mineral: Mineral::Copper,
            image_base64: "aGVhdA==".to_string(),
            bounds: BoundingBox {
                lat_min: 40.97,
                lat_max: 40.99,
                lon_min: -116.39,
                lon_max: -116.38,
            },
        };
        let cam = MapCamera::new(GeoPoint::new(-116.385, 40.98), 11.0);
        let css = heatmap_css(&layer, &cam, 800.0, 600.0);
        assert!(css.contains("position:absolute"));
        // Bounds span a positive on-screen rectangle
        let width: f64 = css
            .split("width:")
            .nth(1)
            .and_then(|s| s.split("px").next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(width > 0.0);
    }
}
