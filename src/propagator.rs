//! Orbit state provider.
//!
//! [`Propagator`] is the capability the rest of the crate depends on; the
//! SGP4 adapter is the only place that touches `sgp4` types. Failure to
//! produce a state is routine (decayed orbits, numerical breakdown) and is
//! handled per satellite, per tick.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use thiserror::Error;

use crate::math::{eci_to_geodetic, teme_to_render};
use crate::time::{greenwich_mean_sidereal_time, unix_minutes};
use crate::tle::ElementRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    #[error("element set rejected: {0}")]
    Elements(String),
    #[error("propagation failed: {0}")]
    Propagation(String),
}

/// Inertial (TEME) state, km and km/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateVector {
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

pub trait Propagator {
    fn compute(&self, instant: DateTime<Utc>) -> Result<StateVector, PropagationError>;
}

impl<F> Propagator for F
where
    F: Fn(DateTime<Utc>) -> Result<StateVector, PropagationError>,
{
    fn compute(&self, instant: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        self(instant)
    }
}

pub struct Sgp4Propagator {
    constants: sgp4::Constants,
    epoch_minutes: f64,
}

impl Sgp4Propagator {
    pub fn from_record(record: &ElementRecord) -> Result<Self, PropagationError> {
        let elements = sgp4::Elements::from_tle(
            Some(record.name.clone()),
            record.line1.as_bytes(),
            record.line2.as_bytes(),
        )
        .map_err(|e| PropagationError::Elements(e.to_string()))?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| PropagationError::Elements(e.to_string()))?;
        Ok(Self {
            constants,
            epoch_minutes: unix_minutes(elements.datetime.and_utc()),
        })
    }
}

impl Propagator for Sgp4Propagator {
    fn compute(&self, instant: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let minutes_since_epoch = unix_minutes(instant) - self.epoch_minutes;
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch))
            .map_err(|e| PropagationError::Propagation(e.to_string()))?;
        let position_km = Vector3::from(prediction.position);
        let velocity_km_s = Vector3::from(prediction.velocity);
        if !position_km.iter().chain(velocity_km_s.iter()).all(|c| c.is_finite()) {
            return Err(PropagationError::Propagation("non-finite state".to_string()));
        }
        Ok(StateVector { position_km, velocity_km_s })
    }
}

/// Stand-in for a record the propagation model refused; fails every query.
pub struct RejectedElements {
    pub reason: PropagationError,
}

impl Propagator for RejectedElements {
    fn compute(&self, _instant: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        Err(self.reason.clone())
    }
}

/// Builds the SGP4 adapter, falling back to [`RejectedElements`] so the
/// record still occupies its id.
pub fn sgp4_for_record(record: &ElementRecord) -> Box<dyn Propagator> {
    match Sgp4Propagator::from_record(record) {
        Ok(p) => Box::new(p),
        Err(reason) => {
            log::warn!("satellite {} ({}): {}", record.id, record.name, reason);
            Box::new(RejectedElements { reason })
        }
    }
}

/// Render-space state: units of the primary radius, units per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodeticState {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
    pub speed_km_s: f64,
}

/// Converts propagator output to render space and geodetic coordinates.
#[derive(Clone, Copy, Debug)]
pub struct OrbitStateProvider {
    km_per_unit: f64,
}

impl OrbitStateProvider {
    pub fn new(km_per_unit: f64) -> Self {
        Self { km_per_unit }
    }

    pub fn km_per_unit(&self) -> f64 {
        self.km_per_unit
    }

    pub fn compute(
        &self,
        propagator: &dyn Propagator,
        instant: DateTime<Utc>,
    ) -> Result<RenderState, PropagationError> {
        let state = propagator.compute(instant)?;
        Ok(RenderState {
            position: teme_to_render(&state.position_km, self.km_per_unit),
            velocity: teme_to_render(&state.velocity_km_s, self.km_per_unit),
        })
    }

    pub fn position(&self, propagator: &dyn Propagator, instant: DateTime<Utc>) -> Option<Vector3<f64>> {
        match self.compute(propagator, instant) {
            Ok(state) => Some(state.position),
            Err(e) => {
                log::trace!("no state at {instant}: {e}");
                None
            }
        }
    }

    /// `None` means "signal lost": no position or velocity at this instant.
    pub fn compute_geodetic(
        &self,
        propagator: &dyn Propagator,
        instant: DateTime<Utc>,
    ) -> Option<GeodeticState> {
        let state = propagator.compute(instant).ok()?;
        let gmst = greenwich_mean_sidereal_time(instant);
        let (lat, lon, height_km) = eci_to_geodetic(&state.position_km, gmst);
        Some(GeodeticState {
            latitude_deg: lat.to_degrees(),
            longitude_deg: lon.to_degrees(),
            height_km,
            speed_km_s: state.velocity_km_s.norm(),
        })
    }
}
