//! Altitude-based satellite coloring.
//!
//! Altitudes are normalized against the 2nd..98th percentile window of the
//! current tick, so a handful of highly elliptical orbits cannot flatten the
//! gradient for the rest of the shell. Low is red, high is green.

use egui::Color32;
use nalgebra::Vector3;

use crate::math::hsl_to_rgb;

/// Minimum window width, in render units.
pub const WINDOW_EPSILON: f64 = 1e-6;
/// Hue (fraction of a turn) assigned to the top of the window.
pub const HIGH_ALTITUDE_HUE: f64 = 0.35;
const LOW_PERCENTILE: f64 = 0.02;
const HIGH_PERCENTILE: f64 = 0.98;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AltitudeWindow {
    pub min: f64,
    pub max: f64,
}

impl AltitudeWindow {
    /// Picks the window from altitudes already sorted ascending.
    fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let n = sorted.len();
        if n == 0 {
            return None;
        }
        let min = sorted[((n as f64 * LOW_PERCENTILE).floor() as usize).min(n - 1)];
        let mut max = sorted[((n as f64 * HIGH_PERCENTILE).floor() as usize).min(n - 1)];
        if max - min < WINDOW_EPSILON {
            max = min + WINDOW_EPSILON;
        }
        Some(Self { min, max })
    }

    pub fn normalize(&self, altitude: f64) -> f64 {
        ((altitude - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

pub fn altitude_color(normalized: f64) -> Color32 {
    let [r, g, b] = hsl_to_rgb(normalized * HIGH_ALTITUDE_HUE, 1.0, 0.5);
    Color32::from_rgb(r, g, b)
}

pub struct AltitudeColorScaler {
    reference_radius: f64,
    sorted: Vec<f64>,
}

impl AltitudeColorScaler {
    pub fn new(reference_radius: f64) -> Self {
        Self { reference_radius, sorted: Vec::new() }
    }

    pub fn altitude(&self, position: &Vector3<f64>) -> f64 {
        position.norm() - self.reference_radius
    }

    /// Normalization window for this tick, `None` if nothing is visible.
    pub fn window(&mut self, positions: &[Option<Vector3<f64>>]) -> Option<AltitudeWindow> {
        let mut sorted = std::mem::take(&mut self.sorted);
        sorted.clear();
        sorted.extend(positions.iter().flatten().map(|p| self.altitude(p)));
        sorted.sort_by(f64::total_cmp);
        let window = AltitudeWindow::from_sorted(&sorted);
        self.sorted = sorted;
        window
    }

    /// Replaces `colors` with one entry per position. Absent positions map
    /// to `None`, meaning the renderer keeps whatever it had.
    pub fn apply(&mut self, positions: &[Option<Vector3<f64>>], colors: &mut Vec<Option<Color32>>) {
        colors.clear();
        let window = self.window(positions);
        colors.extend(positions.iter().map(|p| {
            let (p, window) = (p.as_ref()?, window.as_ref()?);
            Some(altitude_color(window.normalize(self.altitude(p))))
        }));
    }
}
