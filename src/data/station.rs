//! Tracked station data structures

use glam::Vec3;

use crate::renderer::ProxyHandle;

/// Orientation of an orbital plane, captured once at ingestion.
///
/// Inclination and right ascension of the ascending node are stored in
/// radians; together they fix the plane regardless of where the object sits
/// along its orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalPlane {
    /// Inclination in radians
    pub inclination: f64,
    /// Right ascension of the ascending node in radians
    pub raan: f64,
}

impl OrbitalPlane {
    pub fn from_degrees(inclination_deg: f64, raan_deg: f64) -> Self {
        Self {
            inclination: inclination_deg.to_radians(),
            raan: raan_deg.to_radians(),
        }
    }

    /// Read the plane out of a TLE (satkit stores both angles in degrees).
    pub fn from_tle(tle: &satkit::TLE) -> Self {
        Self::from_degrees(tle.inclination, tle.raan)
    }
}

/// Highlight state of a station, drives the proxy material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Selected,
    Highlighted,
}

/// Per-batch display options supplied by the ingestion caller.
#[derive(Debug, Clone, Copy)]
pub struct StationOptions {
    /// Orbit path duration in minutes; 0 derives one full period from the
    /// element set's mean motion.
    pub orbit_minutes: f64,
    /// Sprite size in the original catalog units (50 = default)
    pub satellite_size: f32,
}

impl Default for StationOptions {
    fn default() -> Self {
        Self {
            orbit_minutes: 0.0,
            satellite_size: 50.0,
        }
    }
}

/// A parsed-but-not-yet-placed station, produced by the ingestion worker.
#[derive(Clone)]
pub struct StationSeed {
    pub name: String,
    pub norad_id: u32,
    pub tle: satkit::TLE,
}

/// Polyline geometry for a station's precomputed orbit track.
///
/// Owned exclusively by the station; present only while the station is
/// selected. Fewer than 2 points means nothing to draw.
#[derive(Debug, Clone, Default)]
pub struct OrbitPath {
    pub points: Vec<Vec3>,
}

impl OrbitPath {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn is_renderable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// A tracked object: satellite or debris with live position and display
/// state.
#[derive(Clone)]
pub struct Station {
    /// NORAD catalog number, unique across the store
    pub id: u32,
    /// Display name from the TLE name line
    pub name: String,
    /// Element set, immutable after ingestion
    pub tle: satkit::TLE,
    /// Plane orientation derived from the element set
    pub plane: OrbitalPlane,
    /// Mean motion in revolutions per day, for orbit-path duration
    pub revs_per_day: f64,
    /// Current position in Earth radii, render frame (Y-up)
    pub position: Vec3,
    /// False until the first successful propagation; un-positioned stations
    /// are skipped by rendering and picking and retried each tick
    pub positioned: bool,
    /// Handle to this station's visual proxy in the scene
    pub proxy: ProxyHandle,
    /// Owned orbit-path geometry, present iff selected
    pub orbit_path: Option<OrbitPath>,
    /// Display flag, independent of selection (isolation mode)
    pub visible: bool,
    pub highlight: Highlight,
    /// Base sprite color from the batch color hint
    pub color: [f32; 3],
    /// Orbit duration override from the batch options (0 = derive)
    pub orbit_minutes: f64,
}

impl Station {
    pub fn is_selected(&self) -> bool {
        self.orbit_path.is_some()
    }
}
