//! SGP4 propagation using satkit

use chrono::{Datelike, Timelike};
use glam::Vec3;
use satkit::sgp4::{sgp4, SGP4Error};
use thiserror::Error;

/// Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Per-call propagation failure. Recoverable: callers skip the sample or
/// tick and keep the previous position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("SGP4 propagation failed for the requested epoch")]
pub struct PropagationFailed;

/// Propagate a TLE to an absolute time.
///
/// Returns the position in Earth radii in the render frame: TEME is Z-up
/// along the polar axis, rendering is Y-up, so TEME X -> X, TEME Z -> Y,
/// TEME Y -> -Z (negated to stay right-handed).
pub fn propagate(tle: &satkit::TLE, time: &satkit::Instant) -> Result<Vec3, PropagationFailed> {
    // sgp4 mutates cached terms inside the TLE
    let mut tle = tle.clone();
    let (positions, _velocities, errs) = sgp4(&mut tle, &[*time]);
    if errs.first() != Some(&SGP4Error::SGP4Success) {
        return Err(PropagationFailed);
    }
    let pos = positions.column(0);
    let pos_km = Vec3::new(
        pos[0] as f32 / 1000.0,
        pos[2] as f32 / 1000.0,
        -pos[1] as f32 / 1000.0,
    );
    let pos_er = pos_km / EARTH_RADIUS_KM as f32;
    if pos_er.is_finite() {
        Ok(pos_er)
    } else {
        Err(PropagationFailed)
    }
}

/// Current wall-clock UTC as a satkit Instant.
pub fn now_instant() -> satkit::Instant {
    let now = chrono::Utc::now();
    satkit::Instant::from_datetime(
        now.year(),
        now.month() as i32,
        now.day() as i32,
        now.hour() as i32,
        now.minute() as i32,
        now.second() as f64,
    )
}

/// Format an instant for display
pub fn format_time(time: &satkit::Instant) -> String {
    let (year, month, day, hour, min, sec) = time.as_datetime();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, month, day, hour, min, sec as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn test_propagate_at_epoch() {
        let tle = satkit::TLE::load_2line(ISS_LINE1, ISS_LINE2).unwrap();
        let epoch = tle.epoch;
        let pos = propagate(&tle, &epoch).unwrap();

        // ISS orbits ~350-430 km up, so the radius lands a few percent
        // above one Earth radius.
        let r_km = pos.length() as f64 * EARTH_RADIUS_KM;
        assert!(r_km > 6500.0 && r_km < 7200.0, "radius {} km", r_km);
    }

    #[test]
    fn test_propagate_is_deterministic() {
        let tle = satkit::TLE::load_2line(ISS_LINE1, ISS_LINE2).unwrap();
        let epoch = tle.epoch;
        let a = propagate(&tle, &epoch).unwrap();
        let b = propagate(&tle, &epoch).unwrap();
        assert_eq!(a, b);
    }
}
