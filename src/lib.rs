//! Satellite constellation and optical-link simulation core.
//!
//! Parses two-line element sets, propagates them with SGP4 into render
//! space, and each tick produces satellite positions, altitude colors and a
//! bounded nearest-neighbor link topology for a renderer to draw.

pub mod altitude;
pub mod clock;
pub mod config;
pub mod constellation;
pub mod links;
pub mod math;
pub mod orbit_path;
pub mod propagator;
pub mod simulation;
pub mod time;
pub mod tle;

pub use clock::SimulationClock;
pub use config::{ConfigError, SimulationConfig};
pub use constellation::{ImportError, SatelliteSet, SatelliteState};
pub use propagator::{PropagationError, Propagator, StateVector};
pub use simulation::{Frame, SelectedView, SignalStatus, Simulation};
pub use tle::{parse_elements, ElementRecord};
