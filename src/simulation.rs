//! Per-frame driver.
//!
//! Owns the clock, the current satellite set and the scratch buffers reused
//! across ticks. A tick fixes the instant first, then computes every
//! position, and only then runs the link builder and the color scaler, so
//! both see one consistent snapshot.

use chrono::{DateTime, Utc};
use egui::Color32;
use nalgebra::Vector3;
use std::sync::Arc;

use crate::altitude::AltitudeColorScaler;
use crate::clock::SimulationClock;
use crate::config::{ConfigError, SimulationConfig};
use crate::constellation::{ImportError, SatelliteSet, SatelliteState};
use crate::links::{link_segments, LinkEdge, LinkSegment, LinkTopologyBuilder};
use crate::propagator::{sgp4_for_record, GeodeticState, OrbitStateProvider, Propagator};
use crate::time::greenwich_mean_sidereal_time;
use crate::tle::{parse_elements, ElementRecord, SAMPLE_TLE};

pub type PropagatorFactory = dyn Fn(&ElementRecord) -> Box<dyn Propagator>;

/// A satellite picked by the UI, tied to the set it was picked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Selection {
    generation: u64,
    id: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SignalStatus {
    Tracking(GeodeticState),
    SignalLost,
}

pub struct SelectedView<'a> {
    pub id: usize,
    pub name: &'a str,
    pub path: &'a [Vector3<f64>],
    /// `None` while the satellite has no state; hide the marker.
    pub position: Option<Vector3<f64>>,
    pub status: SignalStatus,
}

/// Everything the renderer needs for one frame.
pub struct Frame<'a> {
    pub instant: DateTime<Utc>,
    /// Primary-body rotation about render Y, radians.
    pub body_rotation: f64,
    pub positions: &'a [Option<Vector3<f64>>],
    pub colors: &'a [Option<Color32>],
    pub edges: &'a [LinkEdge],
    pub links: &'a [LinkSegment],
    pub selected: Option<SelectedView<'a>>,
}

impl Frame<'_> {
    pub fn visible_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }
}

/// Scratch buffers owned by one simulation instance.
struct TickContext {
    positions: Vec<Option<Vector3<f64>>>,
    colors: Vec<Option<Color32>>,
    edges: Vec<LinkEdge>,
    segments: Vec<LinkSegment>,
    links: LinkTopologyBuilder,
    scaler: AltitudeColorScaler,
    selected_status: SignalStatus,
}

impl TickContext {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            edges: Vec::new(),
            segments: Vec::new(),
            links: LinkTopologyBuilder::new(config.link_range, config.max_links_per_satellite),
            scaler: AltitudeColorScaler::new(config.reference_radius),
            selected_status: SignalStatus::SignalLost,
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    provider: OrbitStateProvider,
    clock: SimulationClock,
    satellites: Arc<SatelliteSet>,
    next_generation: u64,
    selection: Option<Selection>,
    make_propagator: Box<PropagatorFactory>,
    context: TickContext,
}

impl Simulation {
    /// SGP4-backed simulation starting now, loaded with the bundled sample.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let mut sim = Self::with_factory(config, Box::new(sgp4_for_record))?;
        if let Err(e) = sim.load_sample() {
            log::warn!("bundled sample: {e}");
        }
        Ok(sim)
    }

    /// Starts now with an empty set; propagators come from `make_propagator`.
    pub fn with_factory(config: SimulationConfig, make_propagator: Box<PropagatorFactory>) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = SimulationClock::now();
        Ok(Self {
            provider: OrbitStateProvider::new(config.km_per_unit),
            satellites: Arc::new(SatelliteSet::empty(clock.instant())),
            context: TickContext::new(&config),
            config,
            clock,
            next_generation: 1,
            selection: None,
            make_propagator,
        })
    }

    /// Starts from `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: SimulationClock) -> Self {
        self.clock = clock;
        self.recompute();
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    pub fn change_speed(&mut self, factor: f64) {
        self.clock.change_speed(factor);
    }

    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    pub fn show_links(&self) -> bool {
        self.config.show_links
    }

    pub fn set_show_links(&mut self, show: bool) {
        self.config.show_links = show;
    }

    /// Snapshot of the current set; stays valid across later imports.
    pub fn satellites(&self) -> Arc<SatelliteSet> {
        Arc::clone(&self.satellites)
    }

    /// Parses `text` and replaces the satellite set. When nothing parses,
    /// the current set and selection are left as they were.
    pub fn import_text(&mut self, text: &str) -> Result<usize, ImportError> {
        let records = parse_elements(text);
        if records.is_empty() {
            log::warn!("import rejected: {}", ImportError::NoElements);
            return Err(ImportError::NoElements);
        }
        Ok(self.import_records(records))
    }

    pub fn load_sample(&mut self) -> Result<usize, ImportError> {
        self.import_text(SAMPLE_TLE)
    }

    /// Builds a new set at the current instant and swaps it in. Always
    /// clears the selection, since ids restart at 0 in every batch. The
    /// frame is refilled for the new set before this returns.
    pub fn import_records(&mut self, records: Vec<ElementRecord>) -> usize {
        let set = SatelliteSet::build(
            self.next_generation,
            records,
            self.clock.instant(),
            &self.provider,
            self.config.path_sampling(),
            self.make_propagator.as_ref(),
        );
        self.next_generation += 1;
        let count = set.len();
        self.satellites = Arc::new(set);
        self.selection = None;
        self.recompute();
        log::info!("Imported {count} satellites");
        count
    }

    /// Selects `id` in the current set. Unknown ids clear the selection.
    pub fn select(&mut self, id: usize) -> bool {
        self.selection = self.satellites.get(id).map(|_| Selection {
            generation: self.satellites.generation(),
            id,
        });
        self.refresh_selected_status();
        self.selection.is_some()
    }

    fn refresh_selected_status(&mut self) {
        let instant = self.clock.instant();
        let status = self.selected().map(|sat| match self.provider.compute_geodetic(sat.propagator(), instant) {
            Some(geodetic) => SignalStatus::Tracking(geodetic),
            None => SignalStatus::SignalLost,
        });
        match status {
            Some(status) => self.context.selected_status = status,
            None => {
                self.selection = None;
                self.context.selected_status = SignalStatus::SignalLost;
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The selected satellite, if it still belongs to the current set.
    pub fn selected(&self) -> Option<&SatelliteState> {
        let selection = self.selection?;
        if selection.generation != self.satellites.generation() {
            return None;
        }
        self.satellites.get(selection.id)
    }

    /// Advances the clock by `dt` wall seconds and recomputes the frame.
    pub fn tick(&mut self, dt: f64) -> Frame<'_> {
        self.clock.tick(dt);
        self.recompute();
        self.frame()
    }

    /// Refills every tick buffer from the current set at the current
    /// instant without moving the clock.
    fn recompute(&mut self) {
        let instant = self.clock.instant();
        let set = Arc::clone(&self.satellites);
        let ctx = &mut self.context;

        ctx.positions.clear();
        ctx.positions.extend(set.iter().map(|sat| self.provider.position(sat.propagator(), instant)));

        ctx.scaler.apply(&ctx.positions, &mut ctx.colors);

        if self.config.show_links {
            ctx.links.build(&ctx.positions, &mut ctx.edges);
        } else {
            ctx.edges.clear();
        }
        ctx.segments.clear();
        ctx.segments.extend(link_segments(&ctx.edges, &ctx.positions));

        self.refresh_selected_status();

        log::debug!(
            "tick {instant}: {}/{} visible, {} links",
            self.context.positions.iter().filter(|p| p.is_some()).count(),
            set.len(),
            self.context.edges.len(),
        );
    }

    /// The most recently computed frame.
    pub fn frame(&self) -> Frame<'_> {
        let ctx = &self.context;
        let selected = self.selected().map(|sat| SelectedView {
            id: sat.id,
            name: &sat.name,
            path: sat.path(),
            position: ctx.positions.get(sat.id).copied().flatten(),
            status: ctx.selected_status,
        });
        Frame {
            instant: self.clock.instant(),
            body_rotation: greenwich_mean_sidereal_time(self.clock.instant()),
            positions: &ctx.positions,
            colors: &ctx.colors,
            edges: &ctx.edges,
            links: &ctx.segments,
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::{PropagationError, StateVector};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    /// Satellite `id` sits at `(id + 1) * 1000` km along TEME X; id 2 has
    /// decayed.
    fn line_factory() -> Box<PropagatorFactory> {
        Box::new(|record: &ElementRecord| -> Box<dyn Propagator> {
            let id = record.id;
            Box::new(move |_: DateTime<Utc>| {
                if id == 2 {
                    return Err(PropagationError::Propagation("decayed".to_string()));
                }
                Ok(StateVector {
                    position_km: Vector3::new((id as f64 + 1.0) * 1000.0, 0.0, 0.0),
                    velocity_km_s: Vector3::new(0.0, 7.0, 0.0),
                })
            })
        })
    }

    fn sim() -> Simulation {
        let config = SimulationConfig {
            km_per_unit: 1000.0,
            link_range: 1.5,
            ..SimulationConfig::default()
        };
        Simulation::with_factory(config, line_factory())
            .unwrap()
            .with_clock(SimulationClock::new(t0()))
    }

    fn two_line_blocks(n: usize) -> String {
        let l1 = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
        let l2 = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";
        (0..n).map(|_| format!("{l1}\n{l2}\n")).collect()
    }

    #[test]
    fn tick_hides_failed_satellites_everywhere() {
        let mut sim = sim();
        assert_eq!(sim.import_text(&two_line_blocks(4)), Ok(4));
        let frame = sim.tick(0.0);
        assert_eq!(frame.positions.len(), 4);
        assert!(frame.positions[2].is_none());
        assert_eq!(frame.visible_count(), 3);
        assert!(frame.colors[2].is_none());
        assert!(frame.edges.iter().all(|e| e.source != 2 && e.target != 2));
        // 0 and 1 link both ways; 3 is 2.0 from 1
        assert_eq!(frame.edges.len(), 2);
        assert_eq!(frame.links.len(), 2);
    }

    #[test]
    fn links_toggle_skips_topology() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(2)).unwrap();
        sim.set_show_links(false);
        assert!(sim.tick(0.0).links.is_empty());
        sim.set_show_links(true);
        assert_eq!(sim.tick(0.0).links.len(), 2);
    }

    #[test]
    fn empty_import_keeps_previous_set_and_selection() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(3)).unwrap();
        assert!(sim.select(1));
        let before = sim.satellites();
        assert_eq!(sim.import_text("nothing to see here"), Err(ImportError::NoElements));
        assert!(Arc::ptr_eq(&before, &sim.satellites()));
        assert_eq!(sim.selected().map(|s| s.id), Some(1));
    }

    #[test]
    fn import_clears_selection_even_when_id_survives() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(3)).unwrap();
        assert!(sim.select(1));
        assert!(sim.tick(0.0).selected.is_some());

        sim.import_text(&two_line_blocks(3)).unwrap();
        assert!(sim.selected().is_none());
        assert!(sim.tick(0.0).selected.is_none());
    }

    #[test]
    fn unknown_id_clears_selection() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(2)).unwrap();
        assert!(sim.select(0));
        assert!(!sim.select(7));
        assert!(sim.selected().is_none());
    }

    #[test]
    fn selected_view_carries_path_position_and_status() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(3)).unwrap();
        sim.select(0);
        let frame = sim.tick(1.0);
        let view = frame.selected.unwrap();
        assert_eq!(view.name, "SAT-1");
        assert_eq!(view.path.len(), 100);
        assert_eq!(view.position, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(matches!(view.status, SignalStatus::Tracking(g) if (g.speed_km_s - 7.0).abs() < 1e-12));

        sim.select(2);
        let view = sim.tick(1.0).selected.unwrap();
        assert!(view.path.is_empty());
        assert_eq!(view.position, None);
        assert_eq!(view.status, SignalStatus::SignalLost);
    }

    #[test]
    fn old_snapshot_survives_import() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(2)).unwrap();
        let old = sim.satellites();
        sim.import_text(&two_line_blocks(5)).unwrap();
        assert_eq!(old.len(), 2);
        assert_eq!(sim.satellites().len(), 5);
        assert!(sim.satellites().generation() > old.generation());
    }

    #[test]
    fn clock_controls_drive_frame_instant() {
        let mut sim = sim();
        sim.change_speed(10.0);
        assert_eq!(sim.tick(0.5).instant, t0() + Duration::seconds(5));
        sim.toggle_pause();
        assert_eq!(sim.tick(0.5).instant, t0() + Duration::seconds(5));
        sim.reset_clock();
        assert_eq!(sim.clock().speed(), 1.0);
        assert!(!sim.clock().is_paused());
    }

    #[test]
    fn fresh_simulation_starts_with_sample() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.satellites().len(), 46);
        assert_eq!(sim.satellites().get(0).unwrap().name, "ISS (ZARYA)");
        assert!(sim.selected().is_none());
    }

    #[test]
    fn frame_after_import_reflects_new_set() {
        let mut sim = sim();
        sim.import_text(&two_line_blocks(3)).unwrap();
        assert_eq!(sim.tick(0.0).positions.len(), 3);

        let one = "ONLY\n1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992\n\
                   2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008\n";
        sim.import_text(one).unwrap();
        assert!(sim.select(0));
        let frame = sim.frame();
        assert_eq!(frame.instant, t0());
        assert_eq!(frame.positions, &[Some(Vector3::new(1.0, 0.0, 0.0))]);
        assert_eq!(frame.colors.len(), 1);
        assert!(frame.edges.is_empty() && frame.links.is_empty());
        let view = frame.selected.unwrap();
        assert_eq!(view.name, "ONLY");
        assert_eq!(view.position, frame.positions[0]);
        assert!(matches!(view.status, SignalStatus::Tracking(_)));
    }

    #[test]
    fn filtered_records_are_renumbered_on_import() {
        let mut sim = sim();
        let records: Vec<ElementRecord> = parse_elements(&two_line_blocks(3)).into_iter().skip(1).collect();
        assert_eq!(sim.import_records(records), 2);
        let set = sim.satellites();
        let ids: Vec<usize> = set.iter().map(|s| s.id).collect();
        assert_eq!(ids, [0, 1]);
        assert_eq!(set.get(1).unwrap().name, "SAT-3");

        assert!(sim.select(1));
        let frame = sim.frame();
        let view = frame.selected.unwrap();
        assert_eq!(view.id, 1);
        assert_eq!(view.position, Some(Vector3::new(2.0, 0.0, 0.0)));
        assert!(!sim.select(2));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig { link_range: 0.0, ..SimulationConfig::default() };
        assert!(Simulation::new(config).is_err());
    }
}
