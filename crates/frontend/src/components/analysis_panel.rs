use dioxus::prelude::*;

use crate::pages::explorer::WorkflowStage;

#[component]
pub fn AnalysisPanel(
    stage: WorkflowStage,
    drawing: bool,
    has_aoi: bool,
    analyzing: bool,
    insights_loading: bool,
    backend_ok: Option<bool>,
    aoi_summary: Option<String>,
    on_toggle_draw: EventHandler<()>,
    on_run: EventHandler<()>,
) -> Element {
    let steps = [
        (WorkflowStage::DefineAoi, "1. Define area"),
        (WorkflowStage::DataSelection, "2. Data selection"),
        (WorkflowStage::Results, "3. Results"),
    ];

    let draw_label = if drawing { "Cancel drawing" } else { "Draw AOI" };

    rsx! {
        div { class: "panel analysis-panel",
            h3 { "Analysis" }
            ul { class: "workflow-steps",
                for (step, label) in steps {
                    li {
                        class: if step == stage { "active" } else { "" },
                        "{label}"
                    }
                }
            }
            button {
                class: if drawing { "danger" } else { "" },
                onclick: move |_| on_toggle_draw.call(()),
                "{draw_label}"
            }
            if let Some(summary) = &aoi_summary {
                p { class: "aoi-summary", "AOI: {summary}" }
            }
            button {
                disabled: !has_aoi || analyzing,
                onclick: move |_| on_run.call(()),
                if analyzing { "Analyzing..." } else { "Run analysis" }
            }
            if insights_loading {
                p { class: "insights-loading", "Preparing insights..." }
            }
            if backend_ok == Some(false) {
                p { class: "backend-note", "Analysis backend unreachable" }
            }
            div { class: "legend",
                h4 { "Legend" }
                div { class: "legend-row",
                    span { class: "swatch swatch-copper" }
                    span { "Copper hotspot" }
                }
                div { class: "legend-row",
                    span { class: "swatch swatch-gold" }
                    span { "Gold hotspot" }
                }
                div { class: "legend-row",
                    span { class: "swatch swatch-heat" }
                    span { "Mineral potential" }
                }
            }
        }
    }
}
