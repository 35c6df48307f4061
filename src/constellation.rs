//! The active satellite set.
//!
//! A set is built whole from one import and never mutated afterwards; a new
//! import builds a fresh set and the simulation swaps it in. Each set carries
//! a generation number so selections made against an older set can be told
//! apart from ones made against the current set.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use thiserror::Error;

use crate::orbit_path::{precompute_path, PathSampling};
use crate::propagator::{OrbitStateProvider, Propagator};
use crate::tle::ElementRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("No valid TLE data found")]
    NoElements,
}

pub struct SatelliteState {
    pub id: usize,
    pub name: String,
    propagator: Box<dyn Propagator>,
    path: Vec<Vector3<f64>>,
}

impl SatelliteState {
    pub fn propagator(&self) -> &dyn Propagator {
        self.propagator.as_ref()
    }

    /// Orbit polyline sampled at import time.
    pub fn path(&self) -> &[Vector3<f64>] {
        &self.path
    }
}

pub struct SatelliteSet {
    generation: u64,
    created_at: DateTime<Utc>,
    satellites: Vec<SatelliteState>,
}

impl SatelliteSet {
    pub fn empty(created_at: DateTime<Utc>) -> Self {
        Self { generation: 0, created_at, satellites: Vec::new() }
    }

    /// Builds a set from parsed records, sampling every orbit path from
    /// `start`. Ids are reassigned `0..n` in record order so they always
    /// index the set.
    pub fn build(
        generation: u64,
        records: Vec<ElementRecord>,
        start: DateTime<Utc>,
        provider: &OrbitStateProvider,
        sampling: PathSampling,
        make_propagator: &dyn Fn(&ElementRecord) -> Box<dyn Propagator>,
    ) -> Self {
        let satellites = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.id = index;
                let propagator = make_propagator(&record);
                let path = precompute_path(provider, propagator.as_ref(), start, sampling);
                if path.len() < sampling.samples {
                    log::debug!(
                        "satellite {} ({}): {}/{} path samples",
                        record.id, record.name, path.len(), sampling.samples
                    );
                }
                SatelliteState {
                    id: record.id,
                    name: record.name,
                    propagator,
                    path,
                }
            })
            .collect();
        Self { generation, created_at: start, satellites }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&SatelliteState> {
        self.satellites.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SatelliteState> {
        self.satellites.iter()
    }
}
