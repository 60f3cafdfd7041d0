use dioxus::prelude::*;
use tracing::warn;

use crate::api::{self, GeocodeError};
use crate::components::alert;
use crate::config;
use crate::layers::SearchMarker;
use crate::search::{self, RecentSearch};

/// Record a successful search in the persisted recent list.
fn remember(mut recent: Signal<Vec<RecentSearch>>, marker: &SearchMarker) {
    let mut list = recent.write();
    search::push_recent(&mut list, RecentSearch::from_marker(marker));
    search::store_recent(&list);
}

#[component]
pub fn SearchPanel(on_found: EventHandler<SearchMarker>) -> Element {
    let mut query = use_signal(String::new);
    // Read back on panel open
    let recent = use_signal(search::load_recent);
    let mut searching = use_signal(|| false);

    let run_search = move |_| {
        let input = query.read().trim().to_string();
        if input.is_empty() || *searching.read() {
            return;
        }

        // A coordinate pair bypasses the geocoder entirely
        if let Some(point) = search::parse_coordinate_pair(&input) {
            let marker = search::marker_for_coordinates(point);
            remember(recent, &marker);
            on_found.call(marker);
            return;
        }

        searching.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::geocode(config::GEOCODER_URL, &input).await {
                Ok(marker) => {
                    remember(recent, &marker);
                    on_found.call(marker);
                }
                Err(GeocodeError::NotFound) => {
                    alert(&format!("No results found for \"{input}\"."));
                }
                Err(GeocodeError::Transport(e)) => {
                    // Input is kept in the box so the user can retry
                    warn!("geocoding failed: {e}");
                    alert("Place search failed. Check your connection and try again.");
                }
            }
            searching.set(false);
        });
    };

    let recent_snap = recent.read().clone();
    let is_searching = *searching.read();

    rsx! {
        div { class: "panel search-panel",
            h3 { "Search" }
            input {
                r#type: "text",
                placeholder: "Place name or lat,lon...",
                value: "{query}",
                oninput: move |evt: Event<FormData>| {
                    query.set(evt.value().to_string());
                },
            }
            button {
                disabled: is_searching,
                onclick: run_search,
                if is_searching { "Searching..." } else { "Search" }
            }
            if !recent_snap.is_empty() {
                div { class: "recent-searches",
                    h4 { "Recent" }
                    for entry in recent_snap {
                        button {
                            class: "secondary",
                            onclick: {
                                let entry = entry.clone();
                                move |_| {
                                    let marker = SearchMarker {
                                        location: entry.location(),
                                        label: entry.label.clone(),
                                    };
                                    remember(recent, &marker);
                                    on_found.call(marker);
                                }
                            },
                            "{entry.label}"
                        }
                    }
                }
            }
        }
    }
}
