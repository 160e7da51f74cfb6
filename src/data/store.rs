//! Tracked object store with bidirectional id/proxy indexing

use std::collections::HashMap;

use glam::Vec3;

use crate::propagation::propagate;
use crate::renderer::{Material, ProxyHandle, Scene};

use super::{Highlight, OrbitalPlane, Station, StationOptions, StationSeed};

/// Ordered collection of tracked stations.
///
/// Scan order is insertion order, which keeps proximity search
/// deterministic. Lookups run through two indexes: id -> slot and
/// proxy handle -> id; both stay consistent across removal.
#[derive(Default)]
pub struct StationStore {
    stations: Vec<Station>,
    id_to_slot: HashMap<u32, usize>,
    proxy_to_id: HashMap<ProxyHandle, u32>,
}

impl StationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parsed batch: build each station's proxy and place it at
    /// its propagated position for `now`. A seed that fails initial
    /// propagation is still added, flagged un-positioned, and retried on
    /// the next tick. Duplicate catalog ids are dropped.
    pub fn add_all(
        &mut self,
        scene: &mut Scene,
        seeds: Vec<StationSeed>,
        color: [f32; 3],
        options: StationOptions,
        now: &satkit::Instant,
    ) -> Vec<u32> {
        let mut added = Vec::with_capacity(seeds.len());

        for seed in seeds {
            if self.id_to_slot.contains_key(&seed.norad_id) {
                log::debug!("skipping duplicate catalog id {}", seed.norad_id);
                continue;
            }

            let proxy = scene.create_sprite(Material::Base(color), options.satellite_size);
            let (position, positioned) = match propagate(&seed.tle, now) {
                Ok(pos) => (pos, true),
                Err(_) => (Vec3::ZERO, false),
            };
            if let Some(p) = scene.proxy_mut(proxy) {
                p.set_position(position);
                p.visible = positioned;
            }

            let station = Station {
                id: seed.norad_id,
                name: seed.name,
                plane: OrbitalPlane::from_tle(&seed.tle),
                revs_per_day: seed.tle.mean_motion,
                tle: seed.tle,
                position,
                positioned,
                proxy,
                orbit_path: None,
                visible: true,
                highlight: Highlight::Normal,
                color,
                orbit_minutes: options.orbit_minutes,
            };

            self.id_to_slot.insert(station.id, self.stations.len());
            self.proxy_to_id.insert(proxy, station.id);
            added.push(station.id);
            self.stations.push(station);
        }

        added
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Station> {
        self.id_to_slot.get(&id).map(|&slot| &self.stations[slot])
    }

    pub fn find_by_id_mut(&mut self, id: u32) -> Option<&mut Station> {
        self.id_to_slot
            .get(&id)
            .map(|&slot| &mut self.stations[slot])
    }

    /// Reverse lookup from a visual-proxy handle to its owning station.
    pub fn find_by_proxy(&self, proxy: ProxyHandle) -> Option<u32> {
        self.proxy_to_id.get(&proxy).copied()
    }

    /// Bulk-set the display flag from a predicate (isolation mode).
    pub fn set_visibility<F>(&mut self, scene: &mut Scene, predicate: F)
    where
        F: Fn(&Station) -> bool,
    {
        for station in &mut self.stations {
            station.visible = predicate(station);
            if let Some(p) = scene.proxy_mut(station.proxy) {
                p.visible = station.visible && station.positioned;
            }
        }
    }

    /// Remove a station, disposing its proxy and any orbit geometry.
    pub fn remove(&mut self, scene: &mut Scene, id: u32) {
        let Some(slot) = self.id_to_slot.remove(&id) else {
            return;
        };
        let station = self.stations.remove(slot);
        self.proxy_to_id.remove(&station.proxy);
        scene.dispose_proxy(station.proxy);

        // Slots after the removed one shift down by one
        for (i, station) in self.stations.iter().enumerate().skip(slot) {
            self.id_to_slot.insert(station.id, i);
        }
    }

    /// Drop every station and index entry. The scene disposes the proxies
    /// itself during engine teardown.
    pub fn clear(&mut self) {
        self.stations.clear();
        self.id_to_slot.clear();
        self.proxy_to_id.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Station> {
        self.stations.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_fixtures::{debris_seeds, iss_seed};

    fn epoch_of(seeds: &[StationSeed]) -> satkit::Instant {
        seeds[0].tle.epoch
    }

    #[test]
    fn test_batch_add_and_find_by_id() {
        let mut scene = Scene::new([0.0; 3]);
        let mut store = StationStore::new();

        let mut seeds = vec![iss_seed()];
        seeds.extend(debris_seeds());
        assert_eq!(seeds.len(), 4);
        let now = epoch_of(&seeds);

        let added = store.add_all(
            &mut scene,
            seeds,
            [1.0, 0.5, 0.5],
            StationOptions::default(),
            &now,
        );
        assert_eq!(added.len(), 4);
        assert_eq!(store.len(), 4);

        for id in added {
            let station = store.find_by_id(id).expect("station present");
            assert_eq!(station.id, id);
            // Placed at epoch, so every station has a real position
            assert!(station.positioned);
            assert!(station.position.length() > 1.0);
        }
        assert!(store.find_by_id(99999).is_none());
    }

    #[test]
    fn test_proxy_reverse_lookup() {
        let mut scene = Scene::new([0.0; 3]);
        let mut store = StationStore::new();
        let seeds = vec![iss_seed()];
        let now = epoch_of(&seeds);
        store.add_all(&mut scene, seeds, [1.0; 3], StationOptions::default(), &now);

        let station = store.find_by_id(25544).unwrap();
        assert_eq!(store.find_by_proxy(station.proxy), Some(25544));

        // A handle the store never saw maps to nothing
        assert_eq!(store.find_by_proxy(scene.earth_handle()), None);
    }

    #[test]
    fn test_no_shared_proxies_and_duplicates_dropped() {
        let mut scene = Scene::new([0.0; 3]);
        let mut store = StationStore::new();
        let seeds = vec![iss_seed(), iss_seed()];
        let now = epoch_of(&seeds);
        let added = store.add_all(&mut scene, seeds, [1.0; 3], StationOptions::default(), &now);

        assert_eq!(added, vec![25544]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_clears_both_indexes() {
        let mut scene = Scene::new([0.0; 3]);
        let mut store = StationStore::new();
        let mut seeds = vec![iss_seed()];
        seeds.extend(debris_seeds());
        let now = epoch_of(&seeds);
        store.add_all(&mut scene, seeds, [1.0; 3], StationOptions::default(), &now);

        let proxy = store.find_by_id(25544).unwrap().proxy;
        store.remove(&mut scene, 25544);

        assert!(store.find_by_id(25544).is_none());
        assert_eq!(store.find_by_proxy(proxy), None);
        assert!(scene.proxy(proxy).is_none());
        assert_eq!(store.len(), 3);

        // Remaining lookups still line up after the slot shift
        for station_id in [33442, 33443, 22675] {
            assert_eq!(store.find_by_id(station_id).unwrap().id, station_id);
        }

        store.remove(&mut scene, 25544);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_set_visibility_predicate() {
        let mut scene = Scene::new([0.0; 3]);
        let mut store = StationStore::new();
        let mut seeds = vec![iss_seed()];
        seeds.extend(debris_seeds());
        let now = epoch_of(&seeds);
        store.add_all(&mut scene, seeds, [1.0; 3], StationOptions::default(), &now);

        store.set_visibility(&mut scene, |s| s.id == 25544 || s.id == 33442);

        let visible: Vec<u32> = store.iter().filter(|s| s.visible).map(|s| s.id).collect();
        assert_eq!(visible, vec![25544, 33442]);
        let hidden = store.find_by_id(22675).unwrap();
        assert!(!scene.proxy(hidden.proxy).unwrap().visible);
    }
}
