//! Orbital propagation
//!
//! SGP4 via satkit, treated as a pure function of (element set, absolute
//! time): the `propagator` submodule converts TLEs to render-frame
//! positions, `orbit_track` samples a full future revolution into polyline
//! geometry for a selected station.

mod orbit_track;
mod propagator;

pub use orbit_track::*;
pub use propagator::*;
