//! # Sharded catalog
//!
//! The [`Catalog`] stores every [`TrackedObject`] in one of `N` fixed shards and keeps a single
//! `catalog id → (shard, slot)` index next to the shard arenas, so duplicate lookups during
//! ingestion are O(1) instead of a scan over all shards.
//!
//! Modules
//! -----------------
//! * [`ingest`](crate::catalog::ingest) – parse → trial propagation → dedup pipeline and its [`ingest::IngestReport`].
//! * [`source`](crate::catalog::source) – [`source::CatalogSource`] descriptors, fetching of local/remote JSON and TLE payloads.
//!
//! Placement
//! -----------------
//! * A new id is placed in shard `cursor`, then `cursor = (cursor + 1) mod N`.
//! * Placement is sticky: a fresher record for a known id replaces the stored record in place and
//!   never moves the object.
//! * Objects are only removed by [`Catalog::reset`].
//!
//! Freshness
//! -----------------
//! An incoming record replaces the stored one only if its epoch is **strictly** later. Equal
//! epochs keep the existing entry, earlier epochs are discarded.
pub mod ingest;
pub mod source;

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;

use crate::{
    constants::CatalogId, orbit_record::OrbitElementRecord, propagator::Propagator,
    satcat_errors::SatcatError, tracked_object::TrackedObject, visual::MarkerHandle,
};

/// Location of an object inside the shard arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub shard: usize,
    pub slot: usize,
}

/// What [`Catalog::resolve`] did with an incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Unknown id, a new object was created.
    Inserted(Placement),
    /// Strictly newer epoch, the stored record was replaced.
    Replaced(Placement),
    /// Same epoch as the stored record, existing entry kept.
    DiscardedTie(Placement),
    /// Older epoch than the stored record, discarded.
    DiscardedStale(Placement),
}

impl ResolveOutcome {
    pub fn placement(&self) -> Placement {
        match self {
            ResolveOutcome::Inserted(p)
            | ResolveOutcome::Replaced(p)
            | ResolveOutcome::DiscardedTie(p)
            | ResolveOutcome::DiscardedStale(p) => *p,
        }
    }
}

/// Tracked objects partitioned into a fixed number of shards.
#[derive(Debug)]
pub struct Catalog<P> {
    shards: Vec<Vec<TrackedObject<P>>>,
    index: HashMap<CatalogId, Placement>,
    insert_cursor: usize,
}

impl<P: Propagator> Catalog<P> {
    /// Create an empty catalog with `shard_count` shards.
    ///
    /// Errors
    /// ------
    /// * [`SatcatError::InvalidShardCount`] if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Result<Self, SatcatError> {
        if shard_count == 0 {
            return Err(SatcatError::InvalidShardCount(shard_count));
        }
        Ok(Catalog {
            shards: (0..shard_count).map(|_| Vec::new()).collect(),
            index: HashMap::new(),
            insert_cursor: 0,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of distinct objects.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Shard the next new id will be placed in.
    pub fn insert_cursor(&self) -> usize {
        self.insert_cursor
    }

    pub fn placement(&self, id: CatalogId) -> Option<Placement> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: CatalogId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: CatalogId) -> Option<&TrackedObject<P>> {
        let Placement { shard, slot } = self.placement(id)?;
        self.shards[shard].get(slot)
    }

    pub fn get_mut(&mut self, id: CatalogId) -> Option<&mut TrackedObject<P>> {
        let Placement { shard, slot } = self.placement(id)?;
        self.shards[shard].get_mut(slot)
    }

    /// Objects of one shard, in insertion order. Empty for an out of range index.
    pub fn shard(&self, shard: usize) -> &[TrackedObject<P>] {
        self.shards.get(shard).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn shard_mut(&mut self, shard: usize) -> &mut [TrackedObject<P>] {
        self.shards
            .get_mut(shard)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    /// Population of every shard.
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(Vec::len).collect()
    }

    /// Every object, shard by shard.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject<P>> {
        self.shards.iter().flatten()
    }

    /// Drop every object and rewind the placement cursor.
    ///
    /// Markers still held by the objects are returned to the caller so they can be released on
    /// the visual side.
    pub fn reset(&mut self) -> Vec<(CatalogId, MarkerHandle)> {
        let markers = self
            .shards
            .iter_mut()
            .flatten()
            .filter_map(|object| object.take_marker().map(|h| (object.catalog_id(), h)))
            .collect();
        self.shards.iter_mut().for_each(Vec::clear);
        self.index.clear();
        self.insert_cursor = 0;
        markers
    }

    /// Merge a validated record and its propagator into the catalog.
    ///
    /// Arguments
    /// ---------
    /// * `record`: the incoming element set
    /// * `propagator`: propagator state built from `record`
    ///
    /// Return
    /// ------
    /// * A [`ResolveOutcome`] describing whether the record created, replaced or lost against
    ///   the stored entry of the same id.
    pub fn resolve(&mut self, record: OrbitElementRecord, propagator: P) -> ResolveOutcome {
        if let Some(placement) = self.placement(record.catalog_id) {
            let existing = &mut self.shards[placement.shard][placement.slot];
            return if record.epoch > *existing.epoch() {
                existing.replace_record(record, propagator);
                ResolveOutcome::Replaced(placement)
            } else if record.epoch == *existing.epoch() {
                ResolveOutcome::DiscardedTie(placement)
            } else {
                ResolveOutcome::DiscardedStale(placement)
            };
        }

        let shard = self.insert_cursor;
        let placement = Placement {
            shard,
            slot: self.shards[shard].len(),
        };
        self.index.insert(record.catalog_id, placement);
        self.shards[shard].push(TrackedObject::new(record, propagator));
        self.insert_cursor = (shard + 1) % self.shards.len();
        ResolveOutcome::Inserted(placement)
    }
}

impl<P> fmt::Display for Catalog<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects in {} shards [{}]",
            self.index.len(),
            self.shards.len(),
            self.shards.iter().map(Vec::len).join(", ")
        )
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use crate::orbit_record::RawRecord;
    use crate::propagator::StateVector;
    use hifitime::{Epoch, Unit};
    use nalgebra::Vector3;

    const ISS_L1: &str = "1 25544U 98067A   25313.96830531  .00008626  00000+0  16179-3 0  9997";
    const ISS_L2: &str = "2 25544  51.6342 304.7042 0004075  52.7615 307.3745 15.49490024537771";

    #[derive(Debug)]
    struct Still;

    impl Propagator for Still {
        fn from_record(_: &OrbitElementRecord) -> Result<Self, SatcatError> {
            Ok(Still)
        }

        fn propagate(&self, _: &Epoch) -> Result<StateVector, SatcatError> {
            Ok(StateVector::new(Vector3::new(7000.0, 0.0, 0.0), Vector3::zeros()))
        }
    }

    /// ISS record with a forced id and epoch offset (hours).
    fn record(id: CatalogId, hours: f64) -> OrbitElementRecord {
        let mut record = OrbitElementRecord::parse(RawRecord::Tle {
            name: Some(format!("OBJ {id}")),
            line1: ISS_L1.into(),
            line2: ISS_L2.into(),
        })
        .unwrap();
        record.catalog_id = id;
        record.epoch = record.epoch + Unit::Hour * hours;
        record
    }

    #[test]
    fn test_zero_shards_rejected() {
        assert_eq!(
            Catalog::<Still>::new(0).unwrap_err(),
            SatcatError::InvalidShardCount(0)
        );
    }

    #[test]
    fn test_round_robin_placement() {
        let mut catalog = Catalog::<Still>::new(3).unwrap();
        for id in 1..=7 {
            let outcome = catalog.resolve(record(id, 0.0), Still);
            assert!(matches!(outcome, ResolveOutcome::Inserted(_)));
        }
        assert_eq!(catalog.shard_sizes(), vec![3, 2, 2]);
        assert_eq!(catalog.placement(4), Some(Placement { shard: 0, slot: 1 }));
        assert_eq!(catalog.placement(6), Some(Placement { shard: 2, slot: 1 }));
        assert_eq!(catalog.insert_cursor(), 1);
        assert_eq!(catalog.to_string(), "7 objects in 3 shards [3, 2, 2]");
    }

    #[test]
    fn test_resolve_by_epoch() {
        let mut catalog = Catalog::<Still>::new(4).unwrap();
        let first = catalog.resolve(record(9, 0.0), Still).placement();
        catalog.resolve(record(10, 0.0), Still);

        assert_eq!(
            catalog.resolve(record(9, 1.0), Still),
            ResolveOutcome::Replaced(first)
        );
        let fresh = *catalog.get(9).unwrap().epoch();

        assert_eq!(
            catalog.resolve(record(9, 1.0), Still),
            ResolveOutcome::DiscardedTie(first)
        );
        assert_eq!(
            catalog.resolve(record(9, -5.0), Still),
            ResolveOutcome::DiscardedStale(first)
        );
        assert_eq!(*catalog.get(9).unwrap().epoch(), fresh);
        assert_eq!(catalog.len(), 2);
        // the replacement did not consume a placement slot
        assert_eq!(catalog.insert_cursor(), 2);
    }

    #[test]
    fn test_reset_returns_markers() {
        let mut catalog = Catalog::<Still>::new(2).unwrap();
        catalog.resolve(record(1, 0.0), Still);
        catalog.resolve(record(2, 0.0), Still);
        catalog
            .get_mut(2)
            .unwrap()
            .swap_marker(MarkerHandle(42));

        let markers = catalog.reset();
        assert_eq!(markers, vec![(2, MarkerHandle(42))]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.shard_sizes(), vec![0, 0]);
        assert_eq!(catalog.insert_cursor(), 0);
        assert!(catalog.get(1).is_none());
    }
}
