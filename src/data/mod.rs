//! Station data model, store, ingestion, and plane-similarity search

mod loader;
mod proximity;
mod search;
mod station;
mod store;

pub use loader::*;
pub use proximity::*;
pub use search::*;
pub use station::*;
pub use store::*;

#[cfg(test)]
pub mod test_fixtures {
    //! Checksum-valid element sets shared across test modules.
    //!
    //! The ISS set is the classic Vallado verification TLE; the debris sets
    //! reuse its epoch so propagation at `tle.epoch` always succeeds.

    use super::StationSeed;

    pub const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    pub const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    // Same epoch and shape, distinct catalog ids and planes
    pub const DEBRIS_A_LINE1: &str =
        "1 33442U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2923";
    pub const DEBRIS_A_LINE2: &str =
        "2 33442  86.3945 100.0000 0006703 130.5360 325.0288 15.72125391563534";
    pub const DEBRIS_B_LINE1: &str =
        "1 33443U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2924";
    pub const DEBRIS_B_LINE2: &str =
        "2 33443  86.3945 100.5000 0006703 130.5360 325.0288 15.72125391563530";
    pub const DEBRIS_C_LINE1: &str =
        "1 22675U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2929";
    pub const DEBRIS_C_LINE2: &str =
        "2 22675  74.0355  30.0000 0006703 130.5360 325.0288 15.72125391563531";

    pub fn seed(name: &str, line1: &str, line2: &str) -> StationSeed {
        let tle = satkit::TLE::load_2line(line1, line2).expect("fixture TLE parses");
        StationSeed {
            name: name.to_string(),
            norad_id: tle.sat_num as u32,
            tle,
        }
    }

    pub fn iss_seed() -> StationSeed {
        seed("ISS (ZARYA)", ISS_LINE1, ISS_LINE2)
    }

    pub fn debris_seeds() -> Vec<StationSeed> {
        vec![
            seed("DEBRIS A", DEBRIS_A_LINE1, DEBRIS_A_LINE2),
            seed("DEBRIS B", DEBRIS_B_LINE1, DEBRIS_B_LINE2),
            seed("DEBRIS C", DEBRIS_C_LINE1, DEBRIS_C_LINE2),
        ]
    }
}
