//! # Tracker
//!
//! [`Tracker`] is the entry point of the crate. It owns the catalog, the scheduler, the visual
//! manager and the HTTP environment, and exposes the public operations of a tracking session:
//!
//! * [`Tracker::ingest`] / [`Tracker::ingest_configured`] – fetch and merge element sets (async),
//! * [`Tracker::tick`] – refresh one shard (sync, never suspends),
//! * [`Tracker::shard_count`] / [`Tracker::catalog_size`].
//!
//! Ticking is a no-op until one ingestion batch has completed. Ingestion and ticking both take
//! `&mut self`, so they cannot overlap on the same tracker.
//!
//! Example
//! -----------------
//! ```rust,no_run
//! use hifitime::Epoch;
//! use satcat::{config::TrackerConfig, propagator::Sgp4Propagator, tracker::Tracker, visual::SceneRecorder};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker: Tracker<Sgp4Propagator, SceneRecorder> =
//!     Tracker::new(TrackerConfig::default(), SceneRecorder::new())?;
//! let now = Epoch::now()?;
//! tracker.ingest_configured(&now).await?;
//! tracker.tick(&now);
//! # Ok(())
//! # }
//! ```
use std::time::Duration;

use hifitime::Epoch;
use tracing::info;

use crate::{
    catalog::{
        ingest::{ingest_records, IngestReport},
        source::CatalogSource,
        Catalog,
    },
    config::TrackerConfig,
    env_state::TrackerEnv,
    orbit_record::RawRecord,
    propagator::Propagator,
    satcat_errors::SatcatError,
    scheduler::{TickReport, UpdateScheduler},
    visual::{StyleOverrides, VisualManager},
};

/// A tracking session: the sharded catalog of objects propagated with `P`, and the scene `V`
/// their markers live in.
///
/// Built from a validated [`TrackerConfig`]. Ticks are ignored until an ingestion completes, and
/// [`Tracker::reset`] brings the session back to that initial state.
pub struct Tracker<P, V> {
    config: TrackerConfig,
    env: TrackerEnv,
    catalog: Catalog<P>,
    scheduler: UpdateScheduler,
    styles: StyleOverrides,
    visual: V,
    ingest_complete: bool,
}

impl<P: Propagator, V: VisualManager> Tracker<P, V> {
    /// Build a tracker with an empty catalog.
    ///
    /// Errors
    /// ------
    /// * [`SatcatError::InvalidShardCount`] / [`SatcatError::InvalidConfig`] on invalid settings,
    /// * [`SatcatError::ReqwestError`] if the HTTP client cannot be created.
    pub fn new(config: TrackerConfig, visual: V) -> Result<Self, SatcatError> {
        config.validate()?;
        let env = TrackerEnv::new(Duration::from_secs(config.http_timeout_secs))?;
        Ok(Tracker {
            catalog: Catalog::new(config.shard_count)?,
            scheduler: UpdateScheduler::new().with_logged_names(config.logged_names()),
            styles: config.style_overrides(),
            env,
            config,
            visual,
            ingest_complete: false,
        })
    }

    /// Fetch `source` and merge its records.
    ///
    /// Arguments
    /// ---------
    /// * `source`: where to read the batch from
    /// * `reference`: instant of the trial propagation of every record
    ///
    /// Return
    /// ------
    /// * The batch report, or [`SatcatError::SourceFetch`] if the batch could not be obtained.
    ///   In that case the catalog is untouched and the completion flag keeps its value.
    pub async fn ingest(
        &mut self,
        source: &CatalogSource,
        reference: &Epoch,
    ) -> Result<IngestReport, SatcatError> {
        let records = source.fetch(&self.env).await?;
        info!(source = %source, records = records.len(), "fetched catalog source");
        Ok(self.ingest_records(records, reference))
    }

    /// Ingest every source of the configured op mode as a single batch.
    ///
    /// All sources are fetched before anything is merged: if one of them fails, the catalog is
    /// untouched, the completion flag keeps its value and the [`SatcatError::SourceFetch`] of
    /// that source is returned.
    pub async fn ingest_configured(&mut self, reference: &Epoch) -> Result<IngestReport, SatcatError> {
        let mut records = Vec::new();
        for source in self.config.sources()? {
            let batch = source.fetch(&self.env).await?;
            info!(source = %source, records = batch.len(), "fetched catalog source");
            records.extend(batch);
        }
        Ok(self.ingest_records(records, reference))
    }

    /// Merge an already fetched batch and mark ingestion as complete.
    pub fn ingest_records(
        &mut self,
        records: impl IntoIterator<Item = RawRecord>,
        reference: &Epoch,
    ) -> IngestReport {
        let report = ingest_records(&mut self.catalog, records, reference);
        self.ingest_complete = true;
        report
    }

    /// Refresh the next shard at `now`.
    ///
    /// Return
    /// ------
    /// * `None` if no ingestion has completed yet or the catalog is empty.
    pub fn tick(&mut self, now: &Epoch) -> Option<TickReport> {
        if !self.ingest_complete {
            return None;
        }
        self.scheduler
            .tick(&mut self.catalog, &mut self.visual, &self.styles, now)
    }

    /// Drop every object, release their markers and wait for a new ingestion.
    pub fn reset(&mut self) {
        for (owner, handle) in self.catalog.reset() {
            self.visual.detach(owner, handle);
            self.visual.dispose(handle);
        }
        self.scheduler.reset();
        self.ingest_complete = false;
    }

    pub fn shard_count(&self) -> usize {
        self.catalog.shard_count()
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_ingest_complete(&self) -> bool {
        self.ingest_complete
    }

    pub fn catalog(&self) -> &Catalog<P> {
        &self.catalog
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn visual(&self) -> &V {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut V {
        &mut self.visual
    }
}
