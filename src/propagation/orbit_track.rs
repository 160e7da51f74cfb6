//! Orbit track generation

use glam::Vec3;

use super::PropagationFailed;

/// Sampling interval between orbit-track points, in minutes.
pub const DEFAULT_INTERVAL_MINUTES: f64 = 1.0;

/// Duration of one full revolution derived from mean motion.
///
/// Mean motion arrives as revolutions per day (satkit's convention; the
/// classic radians-per-minute element converts with 1440 / 2pi to the same
/// quantity), so one period spans `1440 / revs_per_day` minutes.
pub fn orbit_duration_minutes(revs_per_day: f64) -> f64 {
    if revs_per_day > 0.0 {
        1440.0 / revs_per_day
    } else {
        0.0
    }
}

/// Sample an object's future track into a connected polyline.
///
/// The sampler is the propagator contract: absolute time in, position out,
/// or a per-sample failure. Failed samples contribute nothing; successful
/// points are kept in time order. Fewer than 2 surviving points yields an
/// empty track, which callers must not render.
pub fn build_orbit_path<F>(
    mut sample: F,
    start: satkit::Instant,
    interval_minutes: f64,
    total_minutes: f64,
) -> Vec<Vec3>
where
    F: FnMut(&satkit::Instant) -> Result<Vec3, PropagationFailed>,
{
    if interval_minutes <= 0.0 || total_minutes <= 0.0 {
        return Vec::new();
    }

    let steps = (total_minutes / interval_minutes).ceil() as u32;
    let mut points = Vec::with_capacity(steps as usize + 1);

    for k in 0..=steps {
        let t = start + satkit::Duration::from_seconds(k as f64 * interval_minutes * 60.0);
        if let Ok(pos) = sample(&t) {
            points.push(pos);
        }
    }

    if points.len() < 2 {
        points.clear();
    }

    points
}
