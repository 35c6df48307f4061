//! Static orbit polylines, sampled once per import.

use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;

use crate::propagator::{OrbitStateProvider, Propagator};

/// Sampling plan for an orbit path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSampling {
    pub samples: usize,
    pub step_seconds: f64,
}

impl Default for PathSampling {
    fn default() -> Self {
        Self { samples: 100, step_seconds: 60.0 }
    }
}

/// Samples `sampling.samples` instants starting at `start`. Failed samples
/// are dropped, never padded, so the path may come back shorter.
pub fn precompute_path(
    provider: &OrbitStateProvider,
    propagator: &dyn Propagator,
    start: DateTime<Utc>,
    sampling: PathSampling,
) -> Vec<Vector3<f64>> {
    let step_ms = (sampling.step_seconds * 1000.0).round() as i64;
    (0..sampling.samples)
        .filter_map(|i| {
            let offset = Duration::try_milliseconds(step_ms.saturating_mul(i as i64))?;
            let instant = start.checked_add_signed(offset)?;
            provider.position(propagator, instant)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::{PropagationError, StateVector};
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    /// Moves 1 km per second along TEME X from 7000 km, failing on odd minutes.
    fn flaky(t: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let secs = (t - start()).num_seconds();
        if (secs / 60) % 2 == 1 {
            return Err(PropagationError::Propagation("numerical breakdown".to_string()));
        }
        Ok(StateVector {
            position_km: Vector3::new(7000.0 + secs as f64, 0.0, 0.0),
            velocity_km_s: Vector3::new(1.0, 0.0, 0.0),
        })
    }

    #[test]
    fn full_path_has_target_length() {
        let provider = OrbitStateProvider::new(1000.0);
        let steady = |t: DateTime<Utc>| flaky(start() + Duration::seconds(((t - start()).num_seconds() / 120) * 120));
        let path = precompute_path(&provider, &steady, start(), PathSampling::default());
        assert_eq!(path.len(), 100);
        assert_relative_eq!(path[0], Vector3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn failed_samples_are_omitted_not_padded() {
        let provider = OrbitStateProvider::new(1000.0);
        let path = precompute_path(&provider, &flaky, start(), PathSampling::default());
        assert_eq!(path.len(), 50);
        assert_relative_eq!(path[1], Vector3::new(7.12, 0.0, 0.0));
    }

    #[test]
    fn custom_sampling() {
        let provider = OrbitStateProvider::new(1000.0);
        let sampling = PathSampling { samples: 3, step_seconds: 120.0 };
        let path = precompute_path(&provider, &flaky, start(), sampling);
        assert_eq!(path.len(), 3);
        assert_relative_eq!(path[2], Vector3::new(7.24, 0.0, 0.0));
    }
}
