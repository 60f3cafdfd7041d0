use dioxus::prelude::*;
use tracing::{error, info};

use prospect_shared::models::AnalysisResult;

use crate::api::{self, ResultStore};
use crate::components::analysis_panel::AnalysisPanel;
use crate::components::map_view::MapView;
use crate::components::search_panel::SearchPanel;
use crate::components::alert;
use crate::config;
use crate::coords::MapCamera;
use crate::draw::{DrawController, DrawEffect};
use crate::layers::{AoiFeature, FeatureLayers, SearchMarker};
use crate::overlays::OverlayState;

/// Where the user is in the exploration workflow. Advancing past
/// DefineAoi requires a committed, valid AOI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    DefineAoi,
    DataSelection,
    Results,
}

/// Zoom the camera jumps to when a search recenters the map.
const SEARCH_ZOOM: f64 = 11.0;

#[component]
pub fn Explorer() -> Element {
    let mut camera = use_signal(|| MapCamera::new(config::DEFAULT_CENTER, config::DEFAULT_ZOOM));
    let mut layers = use_signal(FeatureLayers::new);
    let mut overlays = use_signal(OverlayState::new);
    let mut controller = use_signal(|| DrawController::new(config::ACTIVE_CONSTRAINT));
    let mut stage = use_signal(|| WorkflowStage::DefineAoi);
    let mut store = use_signal(ResultStore::new);
    let mut analyzing = use_signal(|| false);
    let mut insights_loading = use_signal(|| false);
    let mut backend_ok = use_signal(|| None::<bool>);

    // One-shot backend reachability probe; failure is non-fatal
    use_future(move || async move {
        let base = config::backend_base_url();
        backend_ok.set(Some(api::backend_reachable(&base).await));
    });

    let on_toggle_draw = move |_| {
        let effect = controller.write().toggle();
        match effect {
            DrawEffect::Started => {
                // Retire the previous AOI polygon; search markers stay put
                layers.write().clear_polygons();
                stage.set(WorkflowStage::DefineAoi);
                info!("draw mode armed");
            }
            DrawEffect::Cancelled => info!("draw mode cancelled"),
            _ => {}
        }
    };

    let on_commit = move |_feature: AoiFeature| {
        // The map view has already installed the committed feature
        stage.set(WorkflowStage::DataSelection);
    };

    let on_reject = move |message: String| {
        alert(&message);
    };

    let on_search_found = move |marker: SearchMarker| {
        let location = marker.location;
        layers.write().replace_point(marker);
        let cam = *camera.read();
        camera.set(MapCamera::new(location, cam.zoom.max(SEARCH_ZOOM)));
    };

    let on_run = move |_| {
        let bbox = match layers.read().polygon() {
            Some(aoi) => aoi.bounding_box,
            None => return,
        };
        let token = store.write().begin();
        analyzing.set(true);

        wasm_bindgen_futures::spawn_local(async move {
            let base = config::backend_base_url();
            match api::run_analysis(&base, bbox).await {
                Ok(response) => {
                    let result = AnalysisResult::from_response(response, bbox);
                    // Last-write-wins: a stale response changes nothing
                    if store.write().apply(token, result.clone()) {
                        overlays.write().apply_result(&result);
                        stage.set(WorkflowStage::Results);

                        // Hotspots appear after the settling delay,
                        // sequenced with the insights affordance
                        insights_loading.set(true);
                        gloo_timers::future::TimeoutFuture::new(config::INSIGHTS_SETTLE_MS).await;
                        if store.read().is_latest(token) {
                            overlays.write().set_hotspots_visible(true);
                        }
                        insights_loading.set(false);
                    }
                }
                Err(e) => {
                    // Display state stays as it was; no automatic retry
                    error!("analysis failed: {e}");
                }
            }
            if store.read().is_latest(token) {
                analyzing.set(false);
            }
        });
    };

    let drawing = controller.read().is_drawing();
    let has_aoi = layers.read().polygon().is_some();
    let aoi_summary = layers.read().polygon().map(|aoi| {
        format!(
            "{:.1} km × {:.1} km",
            aoi.bounding_box.width_km(),
            aoi.bounding_box.height_km()
        )
    });

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Prospect" }
                span { class: "tagline", "Satellite mineral exploration" }
            }
            div { class: "sidebar",
                SearchPanel { on_found: on_search_found }
                AnalysisPanel {
                    stage: *stage.read(),
                    drawing: drawing,
                    has_aoi: has_aoi,
                    analyzing: *analyzing.read(),
                    insights_loading: *insights_loading.read(),
                    backend_ok: *backend_ok.read(),
                    aoi_summary: aoi_summary,
                    on_toggle_draw: on_toggle_draw,
                    on_run: on_run,
                }
            }
            MapView {
                camera: camera,
                layers: layers,
                overlays: overlays,
                controller: controller,
                on_commit: on_commit,
                on_reject: on_reject,
            }
        }
    }
}
