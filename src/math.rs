//! Frame conversions and small numeric helpers.
//!
//! The propagator works in TEME, a Z-up inertial frame. The renderer is
//! Y-up, so every position leaving this crate goes through
//! [`teme_to_render`].

use nalgebra::Vector3;
use std::f64::consts::PI;

/// WGS-72 semi-major axis in km, matching the SGP4 gravity model.
pub const WGS72_A_KM: f64 = 6378.135;
/// WGS-72 semi-minor axis in km.
pub const WGS72_B_KM: f64 = 6356.750520;

const GEODETIC_ITERATIONS: usize = 20;

/// Maps TEME (X, Y, Z) to render (X, Z, -Y) and scales km to render units.
pub fn teme_to_render(v: &Vector3<f64>, km_per_unit: f64) -> Vector3<f64> {
    Vector3::new(v.x, v.z, -v.y) / km_per_unit
}

/// Geodetic latitude (rad), longitude (rad, in `[-PI, PI]`) and height (km)
/// of an inertial position, given the sidereal angle of the instant.
pub fn eci_to_geodetic(position_km: &Vector3<f64>, gmst: f64) -> (f64, f64, f64) {
    let (x, y, z) = (position_km.x, position_km.y, position_km.z);
    let f = (WGS72_A_KM - WGS72_B_KM) / WGS72_A_KM;
    let e2 = 2.0 * f - f * f;
    let r = (x * x + y * y).sqrt();

    let lon = wrap_pi(y.atan2(x) - gmst);

    let mut lat = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let s = lat.sin();
        c = 1.0 / (1.0 - e2 * s * s).sqrt();
        lat = (z + WGS72_A_KM * c * e2 * s).atan2(r);
    }
    let height = r / lat.cos() - WGS72_A_KM * c;

    (lat, lon, height)
}

pub fn wrap_pi(mut angle: f64) -> f64 {
    while angle < -PI { angle += 2.0 * PI; }
    while angle > PI { angle -= 2.0 * PI; }
    angle
}

/// HSL with all channels in `[0, 1]` to 8-bit RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s <= 0.0 {
        let v = to_u8(l);
        return [v, v, v];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h.rem_euclid(1.0);
    [
        to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_channel(p, q, h)),
        to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
