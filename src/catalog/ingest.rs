//! # Catalog ingestion
//!
//! Every raw record of a batch goes through the same three steps, in order:
//!
//! 1. **parse** into an [`OrbitElementRecord`] (skipped on [`SatcatError::ParseError`]),
//! 2. **trial propagation** at the batch reference time with a fresh propagator (skipped on any
//!    propagator error, reported as [`SatcatError::PropagationInit`]),
//! 3. **resolve** against the catalog by id and epoch (see [`Catalog::resolve`]).
//!
//! Skipped records never abort the batch; they are logged at `debug` level and counted in the
//! returned [`IngestReport`].
use std::fmt;

use hifitime::Epoch;
use tracing::{debug, info};

use crate::{
    catalog::{Catalog, ResolveOutcome},
    orbit_record::{OrbitElementRecord, RawRecord},
    propagator::Propagator,
    satcat_errors::SatcatError,
};

/// Per-batch ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Raw records seen.
    pub received: usize,
    /// Structurally invalid records.
    pub parse_failures: usize,
    /// Records whose elements could not be propagated at the reference time.
    pub trial_failures: usize,
    /// New catalog entries.
    pub inserted: usize,
    /// Stored entries superseded by a strictly newer epoch.
    pub replaced: usize,
    /// Records discarded because their epoch equals the stored one.
    pub ties: usize,
    /// Records discarded because their epoch is older than the stored one.
    pub stale: usize,
}

impl IngestReport {
    /// Records that ended up in the catalog, as a new entry or as a replacement.
    pub fn accepted(&self) -> usize {
        self.inserted + self.replaced
    }

    /// Records dropped for any reason.
    pub fn skipped(&self) -> usize {
        self.parse_failures + self.trial_failures + self.ties + self.stale
    }

    /// Add the counters of another batch.
    pub fn merge(&mut self, other: &IngestReport) {
        self.received += other.received;
        self.parse_failures += other.parse_failures;
        self.trial_failures += other.trial_failures;
        self.inserted += other.inserted;
        self.replaced += other.replaced;
        self.ties += other.ties;
        self.stale += other.stale;
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} received: {} inserted, {} replaced, {} tied, {} stale, {} malformed, {} unpropagatable",
            self.received,
            self.inserted,
            self.replaced,
            self.ties,
            self.stale,
            self.parse_failures,
            self.trial_failures
        )
    }
}

/// Parse a record and check that its elements propagate at `reference`.
fn validate<P: Propagator>(
    raw: RawRecord,
    reference: &Epoch,
) -> Result<(OrbitElementRecord, P), SatcatError> {
    let record = OrbitElementRecord::parse(raw)?;
    let propagator = P::from_record(&record)
        .and_then(|propagator| {
            propagator.propagate(reference)?;
            Ok(propagator)
        })
        .map_err(|err| match err {
            SatcatError::PropagationInit(_) => err,
            other => SatcatError::PropagationInit(format!("{record}: {other}")),
        })?;
    Ok((record, propagator))
}

/// Ingest a batch of raw records into `catalog`.
///
/// Arguments
/// ---------
/// * `catalog`: the catalog to populate
/// * `records`: raw records in source order
/// * `reference`: instant of the trial propagation, usually the current time
///
/// Return
/// ------
/// * The batch counters. Individual failures are never surfaced as errors.
pub fn ingest_records<P: Propagator>(
    catalog: &mut Catalog<P>,
    records: impl IntoIterator<Item = RawRecord>,
    reference: &Epoch,
) -> IngestReport {
    let mut report = IngestReport::default();

    for raw in records {
        report.received += 1;
        let (record, propagator) = match validate::<P>(raw, reference) {
            Ok(validated) => validated,
            Err(err @ SatcatError::ParseError(_)) => {
                debug!(error = %err, "skipping malformed record");
                report.parse_failures += 1;
                continue;
            }
            Err(err) => {
                debug!(error = %err, "skipping record failing trial propagation");
                report.trial_failures += 1;
                continue;
            }
        };

        let catalog_id = record.catalog_id;
        match catalog.resolve(record, propagator) {
            ResolveOutcome::Inserted(_) => report.inserted += 1,
            ResolveOutcome::Replaced(placement) => {
                debug!(catalog_id, shard = placement.shard, "replaced with a newer element set");
                report.replaced += 1;
            }
            ResolveOutcome::DiscardedTie(_) => {
                debug!(catalog_id, "same epoch as the stored element set, keeping the stored one");
                report.ties += 1;
            }
            ResolveOutcome::DiscardedStale(_) => report.stale += 1,
        }
    }

    info!(%report, catalog = %catalog, "ingested batch");
    report
}
