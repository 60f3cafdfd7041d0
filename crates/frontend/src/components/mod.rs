pub mod analysis_panel;
pub mod map_view;
pub mod search_panel;

/// Browser alert, tolerant of a missing window (tests, prerender).
pub(crate) fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}
