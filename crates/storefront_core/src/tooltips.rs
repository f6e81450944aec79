use shared::protocol::selectors;
use tracing::debug;

use crate::host::Host;

/// Hands every `[data-bs-toggle="tooltip"]` element to the page's tooltip
/// widget. Returns how many were initialized; zero when the widget script is
/// not loaded.
pub(crate) fn init_tooltips(host: &mut dyn Host) -> usize {
    let toggles = host.query_all(selectors::TOOLTIP_TOGGLE);
    let initialized = toggles
        .iter()
        .filter(|toggle| host.init_tooltip(**toggle))
        .count();
    debug!(toggles = toggles.len(), initialized, "tooltips initialized");
    initialized
}

#[cfg(test)]
#[path = "tests/tooltips_tests.rs"]
mod tests;
