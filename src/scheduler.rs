//! # Round-robin update scheduler
//!
//! Propagating a catalog of thousands of objects every frame is too expensive, so the catalog is
//! split into `N` shards and each [`UpdateScheduler::tick`] refreshes exactly one of them:
//!
//! ```text
//! tick k   → shard cursor
//! cursor   ← (cursor + 1) mod N
//! ```
//!
//! A frame therefore costs at most `⌈catalog size / N⌉` propagations and every object is
//! refreshed exactly once every `N` ticks.
//!
//! Marker lifecycle
//! -----------------
//! * **Updated** – attach a marker at the new render-frame position, *then* detach and dispose
//!   the previous one. The object is never left without a marker during the swap and never
//!   keeps two.
//! * **Failed** – detach and dispose the previous marker only. The object stays in its shard and
//!   is retried on its next pass.
use std::collections::HashSet;

use hifitime::Epoch;
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    propagator::Propagator,
    tracked_object::UpdateOutcome,
    visual::{StyleOverrides, VisualManager},
};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Shard processed by this tick.
    pub shard: usize,
    /// Objects successfully propagated, each now showing a fresh marker.
    pub updated: usize,
    /// Objects whose propagation failed, now without marker.
    pub failed: usize,
}

impl TickReport {
    pub fn processed(&self) -> usize {
        self.updated + self.failed
    }
}

/// Shard cursor plus the set of object names whose updates are dumped to the log.
#[derive(Debug, Clone, Default)]
pub struct UpdateScheduler {
    cursor: usize,
    logged_names: HashSet<String>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary shard. The value is reduced modulo the shard count by the next tick,
    /// so [`Self::cursor`] may report it unreduced until then.
    pub fn with_cursor(cursor: usize) -> Self {
        UpdateScheduler {
            cursor,
            ..Self::default()
        }
    }

    /// Log the full state of the named objects every time they are updated.
    pub fn with_logged_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.logged_names = names.into_iter().collect();
        self
    }

    /// Stored cursor. Always in `[0, N)` once a tick has run, `N` being the shard count.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Refresh one shard of `catalog` at `now`.
    ///
    /// Arguments
    /// ---------
    /// * `catalog`: the tracked objects
    /// * `visual`: scene graph receiving the marker operations
    /// * `styles`: marker appearance looked up by object name
    /// * `now`: instant to propagate to
    ///
    /// Return
    /// ------
    /// * `None` without advancing the cursor if the catalog is empty, otherwise the report of
    ///   the processed shard.
    pub fn tick<P: Propagator, V: VisualManager>(
        &mut self,
        catalog: &mut Catalog<P>,
        visual: &mut V,
        styles: &StyleOverrides,
        now: &Epoch,
    ) -> Option<TickReport> {
        if catalog.is_empty() {
            return None;
        }
        let shard = self.cursor % catalog.shard_count();
        self.cursor = (shard + 1) % catalog.shard_count();

        let mut report = TickReport {
            shard,
            updated: 0,
            failed: 0,
        };

        for object in catalog.shard_mut(shard) {
            let owner = object.catalog_id();
            match object.update(now) {
                UpdateOutcome::Updated { position, .. } => {
                    let style = styles.style_for(object.name());
                    let handle = visual.attach(owner, &position, &style);
                    if let Some(previous) = object.swap_marker(handle) {
                        visual.detach(owner, previous);
                        visual.dispose(previous);
                    }
                    if self.logged_names.contains(object.name()) {
                        info!("{object}");
                    }
                    report.updated += 1;
                }
                UpdateOutcome::Failed(err) => {
                    debug!(
                        catalog_id = owner,
                        name = object.name(),
                        failures = object.consecutive_failures(),
                        error = %err,
                        "propagation failed, marker removed"
                    );
                    if let Some(previous) = object.take_marker() {
                        visual.detach(owner, previous);
                        visual.dispose(previous);
                    }
                    report.failed += 1;
                }
            }
        }

        Some(report)
    }
}
