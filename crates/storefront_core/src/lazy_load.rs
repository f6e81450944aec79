use std::collections::BTreeSet;

use shared::protocol::{attributes, classes, selectors};
use tracing::debug;

use crate::host::{ElementId, Host};

/// Deferred images swapped in once they scroll into view.
///
/// Without observer support nothing is deferred: images keep whatever `src`
/// the markup gave them.
#[derive(Debug, Default)]
pub struct LazyImages {
    observed: BTreeSet<ElementId>,
}

impl LazyImages {
    pub(crate) fn attach(host: &mut dyn Host) -> Option<Self> {
        if !host.supports_intersection_observer() {
            debug!("intersection observer unavailable; lazy loading disabled");
            return None;
        }

        let mut observed = BTreeSet::new();
        for image in host.query_all(selectors::LAZY_IMAGE) {
            host.observe(image);
            observed.insert(image);
        }
        debug!(images = observed.len(), "lazy images observed");
        Some(Self { observed })
    }

    pub fn pending(&self) -> usize {
        self.observed.len()
    }

    /// One-shot: later notifications for the same image are ignored.
    pub fn intersecting(&mut self, host: &mut dyn Host, image: ElementId) {
        if !self.observed.remove(&image) {
            return;
        }
        if let Some(source) = host.attribute(image, attributes::DATA_SRC) {
            host.set_attribute(image, attributes::SRC, &source);
        }
        host.remove_class(image, classes::LAZY);
        host.unobserve(image);
    }

    pub fn teardown(&mut self, host: &mut dyn Host) {
        for image in std::mem::take(&mut self.observed) {
            host.unobserve(image);
        }
    }
}

#[cfg(test)]
#[path = "tests/lazy_load_tests.rs"]
mod tests;
