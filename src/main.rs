//! DebrisTrack - Satellite & Debris Proximity Visualizer
//!
//! Renders tracked objects from public TLE sets in real time, resolves
//! viewport clicks into station selection, and isolates a clicked object
//! together with the debris whose orbital plane sits closest to its own.

mod data;
mod engine;
mod propagation;
mod renderer;
mod ui;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use glam::{Vec3, Vec4};

use data::StationOptions;
use engine::{Engine, EngineOptions};
use ui::{show_selected_panel, SearchPanel, SelectedAction};

/// Debris groups loaded when no --group is given: the Iridium 33 / Cosmos
/// 2251 collision clouds plus the Fengyun 1C and Cosmos 1408 ASAT clouds.
const DEFAULT_GROUPS: [(&str, [f32; 3]); 4] = [
    (
        "https://celestrak.org/NORAD/elements/gp.php?GROUP=iridium-33-debris&FORMAT=tle",
        [1.0, 0.53, 0.53],
    ),
    (
        "https://celestrak.org/NORAD/elements/gp.php?GROUP=cosmos-2251-debris&FORMAT=tle",
        [1.0, 1.0, 0.53],
    ),
    (
        "https://celestrak.org/NORAD/elements/gp.php?GROUP=fengyun-1c-debris&FORMAT=tle",
        [0.53, 1.0, 0.53],
    ),
    (
        "https://celestrak.org/NORAD/elements/gp.php?GROUP=cosmos-1408-debris&FORMAT=tle",
        [0.53, 0.53, 1.0],
    ),
];

#[derive(Parser, Clone)]
#[command(name = "debristrack", about = "Satellite & debris proximity visualizer")]
struct Args {
    /// TLE group URL to load at startup (repeatable; defaults to four
    /// well-known debris clouds)
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Highlight stations whose name contains this text once loaded
    #[arg(long)]
    highlight: Option<String>,

    /// Position update cadence in seconds
    #[arg(long, default_value_t = 1.0)]
    tick_seconds: f64,

    /// Sprite size in catalog units
    #[arg(long, default_value_t = 50.0)]
    satellite_size: f32,

    /// Orbit track duration in minutes (0 derives one period)
    #[arg(long, default_value_t = 0.0)]
    orbit_minutes: f64,
}

struct DebrisTrackApp {
    engine: Engine,
    search_panel: SearchPanel,
    selected: Vec<u32>,
    /// Clicks reported by the engine's selection callback, drained each
    /// frame
    clicks: Rc<RefCell<VecDeque<Option<u32>>>>,
    highlight_query: Option<String>,
    highlight_count: usize,
    last_frame_time: std::time::Instant,
}

impl DebrisTrackApp {
    fn new(args: Args) -> Self {
        let mut engine = Engine::new(EngineOptions {
            tick_seconds: args.tick_seconds,
            ..EngineOptions::default()
        });

        let clicks: Rc<RefCell<VecDeque<Option<u32>>>> = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&clicks);
        engine.set_on_station_clicked(Box::new(move |picked| {
            sink.borrow_mut().push_back(picked);
        }));

        let station_options = StationOptions {
            orbit_minutes: args.orbit_minutes,
            satellite_size: args.satellite_size,
        };
        if args.groups.is_empty() {
            for (url, color) in DEFAULT_GROUPS {
                engine.add_stations(url, Some(color), station_options);
            }
        } else {
            for url in &args.groups {
                engine.add_stations(url, None, station_options);
            }
        }

        Self {
            engine,
            search_panel: SearchPanel::default(),
            selected: Vec::new(),
            clicks,
            highlight_query: args.highlight.map(|q| q.to_lowercase()),
            highlight_count: 0,
            last_frame_time: std::time::Instant::now(),
        }
    }

    fn toggle_selection(&mut self, id: u32) {
        if let Some(pos) = self.selected.iter().position(|&s| s == id) {
            self.selected.remove(pos);
            self.engine.remove_orbit(id);
        } else {
            self.selected.push(id);
            self.engine.add_orbit(id);
        }
    }

    fn process_ingest(&mut self) {
        let summaries = self.engine.poll_ingest();
        if summaries.is_empty() {
            return;
        }

        let mut new_ids = Vec::new();
        for summary in summaries {
            match summary.outcome {
                Ok(ids) => new_ids.extend(ids),
                Err(msg) => log::warn!("could not load {}: {}", summary.url, msg),
            }
        }
        if new_ids.is_empty() {
            return;
        }

        self.search_panel.rebuild_index(&self.engine);

        if let Some(query) = self.highlight_query.clone() {
            let matches: Vec<u32> = new_ids
                .iter()
                .copied()
                .filter(|&id| {
                    self.engine
                        .station(id)
                        .map(|s| s.name.to_lowercase().contains(&query))
                        .unwrap_or(false)
                })
                .collect();
            self.highlight_count += matches.len();
            for id in matches {
                self.engine.highlight_station(id);
            }
        }
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;

        if (rect.width(), rect.height()) != self.engine.viewport() {
            self.engine.handle_resize(rect.width(), rect.height());
        }

        // Camera input: drag to orbit, scroll to zoom
        if response.dragged() {
            let delta = response.drag_delta();
            self.engine.camera.orbit(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.engine.camera.zoom(scroll * 0.1);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                self.engine.handle_pointer_down(local.x, local.y);
            }
        }

        self.paint_scene(&painter, rect);
    }

    fn paint_scene(&self, painter: &egui::Painter, rect: egui::Rect) {
        let frame = self.engine.render_data();
        painter.rect_filled(rect, 0.0, color32(frame.background));

        let aspect = rect.width() / rect.height();
        let vp_matrix = self.engine.camera.view_projection_matrix(aspect);
        let center = rect.center();
        let half = egui::vec2(rect.width() * 0.5, rect.height() * 0.5);

        let project = |world: Vec3| -> Option<egui::Pos2> {
            let clip = vp_matrix * Vec4::new(world.x, world.y, world.z, 1.0);
            if clip.w <= 0.0 {
                return None;
            }
            let ndc = Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
            if !(0.0..1.0).contains(&ndc.z) {
                return None;
            }
            Some(egui::pos2(
                center.x + ndc.x * half.x,
                center.y - ndc.y * half.y,
            ))
        };

        // Central body: project its center and a surface point to get the
        // on-screen radius
        if let Some(earth_center) = project(Vec3::ZERO) {
            let eye = self.engine.camera.position();
            let right = eye.cross(Vec3::Y).normalize_or_zero();
            let radius_px = project(right * frame.earth_radius)
                .map(|edge| (edge - earth_center).length())
                .unwrap_or(0.0);
            if radius_px > 0.0 {
                painter.circle_filled(earth_center, radius_px, egui::Color32::from_rgb(25, 60, 120));
                painter.circle_stroke(
                    earth_center,
                    radius_px,
                    egui::Stroke::new(2.0, egui::Color32::from_rgb(50, 100, 180)),
                );
            }
        }

        for line in &frame.orbit_lines {
            let screen_points: Vec<egui::Pos2> =
                line.points.iter().filter_map(|&p| project(p)).collect();
            for window in screen_points.windows(2) {
                painter.line_segment(
                    [window[0], window[1]],
                    egui::Stroke::new(1.5, color32(line.color)),
                );
            }
        }

        for sprite in &frame.sprites {
            if let Some(pos) = project(sprite.position) {
                // Screen-space sprites: size does not attenuate with range
                let radius = (sprite.size / 12.0).max(1.5);
                painter.circle_filled(pos, radius, color32(sprite.color));
            }
        }

        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            format!(
                "Camera: dist={:.2} az={:.1} el={:.1}\n\
                 Drag to orbit | Scroll to zoom | Click to select",
                self.engine.camera.distance,
                self.engine.camera.azimuth.to_degrees(),
                self.engine.camera.elevation.to_degrees(),
            ),
            egui::FontId::monospace(12.0),
            egui::Color32::from_rgb(150, 150, 150),
        );
    }
}

impl eframe::App for DebrisTrackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = std::time::Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;

        self.engine.advance(frame_time);
        self.process_ingest();

        // Selection toggles reported by the pick handler
        let pending: Vec<Option<u32>> = self.clicks.borrow_mut().drain(..).collect();
        for picked in pending.into_iter().flatten() {
            self.toggle_selection(picked);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("DebrisTrack");
                ui.separator();
                ui.label(format!("Objects: {}", self.engine.station_count()));
                ui.separator();
                ui.label(format!("Time: {}", self.engine.format_clock()));
                if let Some(query) = &self.highlight_query {
                    ui.separator();
                    ui.label(format!(
                        "Highlighting \"{}\": {} objects",
                        query, self.highlight_count
                    ));
                }
            });
        });

        egui::SidePanel::left("left_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                if let Some(id) = self.search_panel.show(ui, &self.engine) {
                    self.toggle_selection(id);
                }
                ui.separator();
                match show_selected_panel(ui, &self.engine, &self.selected) {
                    SelectedAction::Remove(id) => self.toggle_selection(id),
                    SelectedAction::RemoveAll => {
                        for id in std::mem::take(&mut self.selected) {
                            self.engine.remove_orbit(id);
                        }
                        self.engine.show_all();
                    }
                    SelectedAction::None => {}
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_viewport(ui);
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(50));
    }
}

fn color32(rgb: [f32; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(
        (rgb[0] * 255.0) as u8,
        (rgb[1] * 255.0) as u8,
        (rgb[2] * 255.0) as u8,
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 900.0])
            .with_title("DebrisTrack - Satellite & Debris Proximity Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "DebrisTrack",
        options,
        Box::new(move |_cc| Ok(Box::new(DebrisTrackApp::new(args)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
