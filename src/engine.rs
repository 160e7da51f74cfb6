//! The orbital visualization engine
//!
//! Owns the tracked-object store, the scene graph, the shared clock, and
//! the ingestion channel. The hosting shell drives it with discrete calls
//! (`advance`, `handle_pointer_down`, `handle_resize`); all mutation
//! happens on the shell's frame loop, so no two of these ever interleave.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec3;

use crate::data::{
    nearest_by_plane, spawn_fetch, Highlight, IngestResult, OrbitPath, ProximityError, Station,
    StationOptions, StationSeed, StationStore,
};
use crate::propagation::{
    build_orbit_path, format_time, now_instant, orbit_duration_minutes, propagate,
    DEFAULT_INTERVAL_MINUTES,
};
use crate::renderer::{
    pick_proxy, Camera, Material, OrbitLine, Scene, SceneRenderData, SpriteInstance,
    SPRITE_SCALE_FACTOR,
};

/// Orbit track tint (light gray, matching the classic tracker display)
pub const ORBIT_COLOR: [f32; 3] = [0.6, 0.6, 0.6];

/// Invoked synchronously from the pointer-down handler with the picked
/// station, or None when the click hit nothing selectable.
pub type SelectionCallback = Box<dyn FnMut(Option<u32>)>;

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub background: [f32; 3],
    /// Fallback sprite color when a batch carries no hint
    pub default_color: [f32; 3],
    /// Time-advance cadence in seconds
    pub tick_seconds: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            background: [0.20, 0.20, 0.25],
            default_color: [1.0, 0.0, 0.0],
            tick_seconds: 1.0,
        }
    }
}

/// Summary of one drained ingestion batch, for the shell.
pub struct IngestSummary {
    pub url: String,
    pub outcome: Result<Vec<u32>, String>,
}

pub struct Engine {
    options: EngineOptions,
    store: StationStore,
    scene: Scene,
    pub camera: Camera,
    viewport: (f32, f32),
    clock: satkit::Instant,
    tick_accumulator: f64,
    frame: SceneRenderData,
    on_station_clicked: Option<SelectionCallback>,
    ingest_tx: Sender<IngestResult>,
    ingest_rx: Option<Receiver<IngestResult>>,
    disposed: bool,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let (ingest_tx, ingest_rx) = mpsc::channel();
        let mut engine = Self {
            options,
            store: StationStore::new(),
            scene: Scene::new(options.background),
            camera: Camera::default(),
            viewport: (1280.0, 720.0),
            clock: now_instant(),
            tick_accumulator: 0.0,
            frame: SceneRenderData::default(),
            on_station_clicked: None,
            ingest_tx,
            ingest_rx: Some(ingest_rx),
            disposed: false,
        };
        engine.render();
        engine
    }

    pub fn set_on_station_clicked(&mut self, callback: SelectionCallback) {
        self.on_station_clicked = Some(callback);
    }

    // __ API _________________________________________________________________

    /// Kick off a background fetch of one TLE group. The parsed batch lands
    /// through `poll_ingest` as a whole; nothing is visible before that.
    pub fn add_stations(&self, url: &str, color: Option<[f32; 3]>, options: StationOptions) {
        if self.disposed {
            return;
        }
        let color = color.unwrap_or(self.options.default_color);
        spawn_fetch(url.to_string(), color, options, self.ingest_tx.clone());
    }

    /// Drain completed ingestion batches into the store.
    pub fn poll_ingest(&mut self) -> Vec<IngestSummary> {
        let Some(rx) = &self.ingest_rx else {
            return Vec::new();
        };

        let mut results = Vec::new();
        while let Ok(result) = rx.try_recv() {
            results.push(result);
        }
        if results.is_empty() {
            return Vec::new();
        }

        let mut summaries = Vec::with_capacity(results.len());
        for result in results {
            let outcome = match result.outcome {
                Ok(seeds) => Ok(self.add_station_batch(seeds, result.color, result.options)),
                Err(msg) => Err(msg),
            };
            summaries.push(IngestSummary {
                url: result.url,
                outcome,
            });
        }
        summaries
    }

    /// The single hand-off call: insert a complete batch, build proxies,
    /// place everything at the current clock.
    pub fn add_station_batch(
        &mut self,
        seeds: Vec<StationSeed>,
        color: [f32; 3],
        options: StationOptions,
    ) -> Vec<u32> {
        if self.disposed {
            return Vec::new();
        }
        let now = self.clock;
        let added = self
            .store
            .add_all(&mut self.scene, seeds, color, options, &now);
        log::info!("added {} stations to the scene", added.len());
        self.render();
        added
    }

    /// Advance the time loop by one frame. Returns true when a tick fired.
    pub fn advance(&mut self, frame_seconds: f64) -> bool {
        if self.disposed {
            return false;
        }
        self.tick_accumulator += frame_seconds.max(0.0);
        if self.tick_accumulator < self.options.tick_seconds {
            return false;
        }
        self.tick_accumulator = 0.0;

        let now = now_instant();
        self.update_all_positions(&now);
        true
    }

    /// Recompute every station's position for an explicit time. A station
    /// that fails to propagate keeps its previous position and is retried
    /// on the next call.
    pub fn update_all_positions(&mut self, time: &satkit::Instant) {
        if self.disposed {
            return;
        }
        self.clock = *time;

        for station in self.store.iter_mut() {
            match propagate(&station.tle, time) {
                Ok(position) => {
                    station.position = position;
                    station.positioned = true;
                    if let Some(proxy) = self.scene.proxy_mut(station.proxy) {
                        proxy.set_position(position);
                        proxy.visible = station.visible;
                    }
                }
                Err(_) => {}
            }
        }

        self.render();
    }

    /// Resolve a pointer-down at viewport pixel (x, y).
    ///
    /// A hit runs proximity search against the picked station, isolates the
    /// pair, and notifies the selection collaborator; a miss still notifies
    /// with None, exactly once.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> Option<u32> {
        if self.disposed {
            return None;
        }

        let (width, height) = self.viewport;
        let picked = pick_proxy(x, y, width, height, &self.camera, &self.scene)
            .and_then(|handle| self.store.find_by_proxy(handle));

        if let Some(id) = picked {
            self.isolate_with_nearest(id);
        }

        // The collaborator is notified either way; None is a no-op for it
        let mut callback = self.on_station_clicked.take();
        if let Some(cb) = callback.as_mut() {
            cb(picked);
        }
        if self.on_station_clicked.is_none() {
            self.on_station_clicked = callback;
        }

        picked
    }

    fn isolate_with_nearest(&mut self, picked: u32) {
        let Some(station) = self.store.find_by_id(picked) else {
            return;
        };
        let target_plane = station.plane;

        let nearest = match nearest_by_plane(
            picked,
            &target_plane,
            self.store.iter().map(|s| (s.id, &s.plane)),
        ) {
            Ok(id) => Some(id),
            Err(ProximityError::NoCandidates) => {
                log::debug!("station {} has no proximity candidates", picked);
                None
            }
        };

        self.store.set_visibility(&mut self.scene, |s| {
            s.id == picked || Some(s.id) == nearest
        });
        self.render();
    }

    /// Find the station whose orbital plane lies closest to the target's.
    pub fn nearest_station(&self, target: u32) -> Result<u32, ProximityError> {
        let station = self
            .store
            .find_by_id(target)
            .ok_or(ProximityError::NoCandidates)?;
        nearest_by_plane(
            target,
            &station.plane,
            self.store.iter().map(|s| (s.id, &s.plane)),
        )
    }

    /// Build and attach the orbit track for a station; marks it selected.
    /// No-op when a track is already attached.
    pub fn add_orbit(&mut self, id: u32) {
        if self.disposed {
            return;
        }
        let Some(station) = self.store.find_by_id(id) else {
            return;
        };
        if station.orbit_path.is_some() {
            return;
        }

        let tle = station.tle.clone();
        let total_minutes = if station.orbit_minutes > 0.0 {
            station.orbit_minutes
        } else {
            orbit_duration_minutes(station.revs_per_day)
        };
        let start = self.clock;
        let points = build_orbit_path(
            |t| propagate(&tle, t),
            start,
            DEFAULT_INTERVAL_MINUTES,
            total_minutes,
        );

        let Some(station) = self.store.find_by_id_mut(id) else {
            return;
        };
        station.orbit_path = Some(OrbitPath::new(points));
        station.highlight = Highlight::Selected;
        if let Some(proxy) = self.scene.proxy_mut(station.proxy) {
            proxy.set_material(Material::Selected);
        }
        self.render();
    }

    /// Dispose a station's orbit track and restore its base material.
    /// No-op when nothing is attached.
    pub fn remove_orbit(&mut self, id: u32) {
        if self.disposed {
            return;
        }
        let Some(station) = self.store.find_by_id_mut(id) else {
            return;
        };
        if station.orbit_path.take().is_none() {
            return;
        }
        station.highlight = Highlight::Normal;
        let base = Material::Base(station.color);
        if let Some(proxy) = self.scene.proxy_mut(station.proxy) {
            proxy.set_material(base);
        }
        self.render();
    }

    pub fn highlight_station(&mut self, id: u32) {
        if self.disposed {
            return;
        }
        let Some(station) = self.store.find_by_id_mut(id) else {
            return;
        };
        station.highlight = Highlight::Highlighted;
        if let Some(proxy) = self.scene.proxy_mut(station.proxy) {
            proxy.set_material(Material::Highlighted);
        }
        self.render();
    }

    pub fn clear_station_highlight(&mut self, id: u32) {
        if self.disposed {
            return;
        }
        let Some(station) = self.store.find_by_id_mut(id) else {
            return;
        };
        station.highlight = Highlight::Normal;
        let base = Material::Base(station.color);
        if let Some(proxy) = self.scene.proxy_mut(station.proxy) {
            proxy.set_material(base);
        }
        self.render();
    }

    /// Restore every station's display flag (leave isolation mode).
    pub fn show_all(&mut self) {
        if self.disposed {
            return;
        }
        self.store.set_visibility(&mut self.scene, |_| true);
        self.render();
    }

    pub fn handle_resize(&mut self, width: f32, height: f32) {
        if self.disposed {
            return;
        }
        if width > 0.0 && height > 0.0 {
            self.viewport = (width, height);
            self.render();
        }
    }

    /// Rebuild the frame snapshot from the store and scene.
    pub fn render(&mut self) {
        if self.disposed {
            return;
        }

        let mut sprites = Vec::with_capacity(self.store.len());
        let mut orbit_lines = Vec::new();

        for station in self.store.iter() {
            if !station.visible || !station.positioned {
                continue;
            }
            let Some(proxy) = self.scene.proxy(station.proxy) else {
                continue;
            };
            sprites.push(SpriteInstance {
                position: proxy.position(),
                color: proxy.material().color(),
                size: proxy.radius * SPRITE_SCALE_FACTOR,
            });

            if let Some(path) = &station.orbit_path {
                if path.is_renderable() {
                    orbit_lines.push(OrbitLine {
                        points: path.points.clone(),
                        color: ORBIT_COLOR,
                    });
                }
            }
        }

        self.frame = SceneRenderData {
            background: self.scene.background,
            earth_radius: crate::renderer::EARTH_RADIUS_RENDER,
            sprites,
            orbit_lines,
        };
    }

    /// Latest frame snapshot for the shell to paint.
    pub fn render_data(&self) -> &SceneRenderData {
        &self.frame
    }

    /// Release every graphics resource and stop all engine activity.
    /// Idempotent; nothing scheduled before disposal runs after it.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.ingest_rx = None;
        self.on_station_clicked = None;
        self.store.clear();
        self.scene.clear();
        self.frame = SceneRenderData::default();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // __ Accessors ___________________________________________________________

    pub fn station(&self, id: u32) -> Option<&Station> {
        self.store.find_by_id(id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.store.iter()
    }

    pub fn station_count(&self) -> usize {
        self.store.len()
    }

    pub fn clock(&self) -> &satkit::Instant {
        &self.clock
    }

    pub fn format_clock(&self) -> String {
        format_time(&self.clock)
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// World-space position of a station, if it has one yet.
    pub fn station_position(&self, id: u32) -> Option<Vec3> {
        self.store
            .find_by_id(id)
            .filter(|s| s.positioned)
            .map(|s| s.position)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_fixtures::{debris_seeds, iss_seed};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine_with_fixture_batch() -> (Engine, satkit::Instant) {
        let mut engine = Engine::new(EngineOptions::default());
        let mut seeds = vec![iss_seed()];
        seeds.extend(debris_seeds());
        let epoch = seeds[0].tle.epoch;
        engine.add_station_batch(seeds, [1.0, 0.53, 0.53], StationOptions::default());
        engine.update_all_positions(&epoch);
        (engine, epoch)
    }

    #[test]
    fn test_zero_elapsed_time_leaves_positions_unchanged() {
        let (mut engine, epoch) = engine_with_fixture_batch();
        let before: Vec<_> = engine.stations().map(|s| (s.id, s.position)).collect();

        engine.update_all_positions(&epoch);

        let after: Vec<_> = engine.stations().map(|s| (s.id, s.position)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_remove_orbit_restores_material() {
        let (mut engine, _) = engine_with_fixture_batch();
        let base = Material::Base([1.0, 0.53, 0.53]);

        engine.add_orbit(25544);
        let station = engine.station(25544).unwrap();
        assert!(station.orbit_path.is_some());
        assert_eq!(station.highlight, Highlight::Selected);

        engine.remove_orbit(25544);
        let station = engine.station(25544).unwrap();
        assert!(station.orbit_path.is_none());
        assert_eq!(station.highlight, Highlight::Normal);
        let proxy = engine.scene.proxy(station.proxy).unwrap();
        assert_eq!(proxy.material(), base);

        // Redundant removal stays a no-op
        engine.remove_orbit(25544);
        assert!(engine.station(25544).unwrap().orbit_path.is_none());
    }

    #[test]
    fn test_add_orbit_is_idempotent() {
        let (mut engine, _) = engine_with_fixture_batch();

        engine.add_orbit(25544);
        let first = engine.station(25544).unwrap().orbit_path.clone().unwrap();
        assert!(first.is_renderable());

        engine.add_orbit(25544);
        let second = engine.station(25544).unwrap().orbit_path.clone().unwrap();
        assert_eq!(first.points, second.points);
    }

    #[test]
    fn test_orbit_track_spans_one_period() {
        let (mut engine, _) = engine_with_fixture_batch();
        engine.add_orbit(25544);
        let path = engine.station(25544).unwrap().orbit_path.clone().unwrap();
        // ~91.6 minute period sampled at 1/min, endpoints inclusive
        assert_eq!(path.points.len(), 93);
    }

    #[test]
    fn test_empty_pick_notifies_none_exactly_once() {
        let mut engine = Engine::new(EngineOptions::default());
        engine.handle_resize(800.0, 600.0);

        let calls: Rc<RefCell<Vec<Option<u32>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        engine.set_on_station_clicked(Box::new(move |picked| {
            sink.borrow_mut().push(picked);
        }));

        // Viewport center: the ray hits the central body, which maps to no
        // station
        let picked = engine.handle_pointer_down(400.0, 300.0);
        assert_eq!(picked, None);
        assert_eq!(calls.borrow().as_slice(), &[None]);
    }

    #[test]
    fn test_pick_isolates_picked_and_nearest() {
        let (mut engine, _) = engine_with_fixture_batch();
        engine.handle_resize(800.0, 600.0);

        let calls: Rc<RefCell<Vec<Option<u32>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        engine.set_on_station_clicked(Box::new(move |picked| {
            sink.borrow_mut().push(picked);
        }));

        // Aim the camera straight down the ISS radial so the viewport
        // center ray meets the sprite before the planet
        let pos = engine.station_position(25544).unwrap();
        engine.camera.azimuth = pos.x.atan2(pos.z);
        engine.camera.elevation = (pos.y / pos.length()).asin();

        let picked = engine.handle_pointer_down(400.0, 300.0);
        assert_eq!(picked, Some(25544));

        let expected_nearest = engine.nearest_station(25544).unwrap();
        let visible: Vec<u32> = engine
            .stations()
            .filter(|s| s.visible)
            .map(|s| s.id)
            .collect();
        assert_eq!(visible.len(), 2);
        assert!(visible.contains(&25544));
        assert!(visible.contains(&expected_nearest));
        assert_eq!(calls.borrow().as_slice(), &[Some(25544)]);
    }

    #[test]
    fn test_dispose_is_idempotent_and_stops_work() {
        let (mut engine, epoch) = engine_with_fixture_batch();

        let calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        engine.set_on_station_clicked(Box::new(move |_| {
            *sink.borrow_mut() += 1;
        }));

        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(engine.render_data().sprites.is_empty());

        engine.handle_pointer_down(400.0, 300.0);
        assert_eq!(*calls.borrow(), 0);

        assert!(!engine.advance(10.0));
        engine.update_all_positions(&epoch);
        assert!(engine.render_data().sprites.is_empty());
    }

    #[test]
    fn test_advance_ticks_at_cadence() {
        let mut engine = Engine::new(EngineOptions::default());
        assert!(!engine.advance(0.4));
        assert!(!engine.advance(0.4));
        assert!(engine.advance(0.4));
        // Accumulator resets after a tick
        assert!(!engine.advance(0.4));
    }

    #[test]
    fn test_render_data_tracks_selection_and_visibility() {
        let (mut engine, _) = engine_with_fixture_batch();
        assert_eq!(engine.render_data().sprites.len(), 4);
        assert!(engine.render_data().orbit_lines.is_empty());

        engine.add_orbit(25544);
        assert_eq!(engine.render_data().orbit_lines.len(), 1);

        engine.store.set_visibility(&mut engine.scene, |s| s.id == 22675);
        engine.render();
        assert_eq!(engine.render_data().sprites.len(), 1);
        assert!(engine.render_data().orbit_lines.is_empty());

        engine.show_all();
        assert_eq!(engine.render_data().sprites.len(), 4);
    }
}
