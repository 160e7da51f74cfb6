//! Nearest-neighbor search over orbital-plane similarity

use thiserror::Error;

use super::OrbitalPlane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProximityError {
    /// The candidate set (excluding the target) was empty. Callers must
    /// handle this explicitly rather than fall back to an arbitrary object.
    #[error("no proximity candidates besides the target")]
    NoCandidates,
}

/// Angular separation between two orbital planes, in radians.
///
/// Symmetric, and zero for identical planes. The cosine is clamped before
/// acos so coplanar pairs cannot produce NaN from rounding.
pub fn relative_inclination(a: &OrbitalPlane, b: &OrbitalPlane) -> f64 {
    let cos_angle = a.inclination.cos() * b.inclination.cos()
        + a.inclination.sin() * b.inclination.sin() * (a.raan - b.raan).cos();
    cos_angle.clamp(-1.0, 1.0).acos()
}

/// Find the candidate whose orbital plane lies closest to the target's.
///
/// Linear scan in candidate order; the minimum updates on `<=`, so ties go
/// to the later-scanned candidate. That tie-break is arbitrary but kept for
/// reproducibility.
pub fn nearest_by_plane<'a, I>(
    target_id: u32,
    target: &OrbitalPlane,
    candidates: I,
) -> Result<u32, ProximityError>
where
    I: IntoIterator<Item = (u32, &'a OrbitalPlane)>,
{
    let mut best: Option<(f64, u32)> = None;

    for (id, plane) in candidates {
        if id == target_id {
            continue;
        }
        let rel_inc = relative_inclination(target, plane);
        match best {
            Some((min, _)) if rel_inc > min => {}
            _ => best = Some((rel_inc, id)),
        }
    }

    best.map(|(_, id)| id).ok_or(ProximityError::NoCandidates)
}
