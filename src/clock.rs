//! Simulation clock.
//!
//! Two states, running and paused. Only three controls mutate it: pause
//! toggle, multiplicative speed change and reset-to-now.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationClock {
    instant: DateTime<Utc>,
    speed: f64,
    paused: bool,
}

impl SimulationClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant, speed: 1.0, paused: false }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances by `dt` wall seconds times the speed multiplier. Paused
    /// clocks ignore ticks.
    pub fn tick(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        let sim_seconds = dt * self.speed;
        if !sim_seconds.is_finite() {
            log::warn!("ignoring non-finite clock step ({dt} s at {}x)", self.speed);
            return;
        }
        let advanced = step_duration(sim_seconds)
            .and_then(|step| self.instant.checked_add_signed(step));
        match advanced {
            Some(instant) => self.instant = instant,
            None => log::warn!("clock step of {sim_seconds} s leaves the representable range"),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Multiplies the speed by `factor`. Magnitudes below 1 snap to +-1 with
    /// the sign kept; a zero result becomes +1.
    pub fn change_speed(&mut self, factor: f64) {
        if !factor.is_finite() {
            log::warn!("ignoring non-finite speed factor {factor}");
            return;
        }
        let mut speed = self.speed * factor;
        if speed.abs() < 1.0 {
            speed = if speed < 0.0 { -1.0 } else { 1.0 };
        }
        self.speed = speed;
    }

    pub fn reset(&mut self) {
        self.reset_to(Utc::now());
    }

    pub fn reset_to(&mut self, now: DateTime<Utc>) {
        self.instant = now;
        self.speed = 1.0;
        self.paused = false;
    }
}

/// Whole seconds plus a rounded nanosecond remainder; `None` past the
/// range `Duration` can hold.
fn step_duration(seconds: f64) -> Option<Duration> {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round() as i64;
    Duration::try_seconds(whole as i64)?.checked_add(&Duration::nanoseconds(nanos))
}
