//! Side panel UI: station search and the selected-stations list

use egui::{ScrollArea, Ui};

use crate::data::SearchIndex;
use crate::engine::Engine;

const RESULT_LIMIT: usize = 50;

/// Search box over station names and catalog numbers.
#[derive(Default)]
pub struct SearchPanel {
    pub query: String,
    pub results: Vec<u32>,
    index: SearchIndex,
}

impl SearchPanel {
    /// Re-index after an ingestion batch lands.
    pub fn rebuild_index(&mut self, engine: &Engine) {
        self.index
            .rebuild(engine.stations().map(|s| (s.id, s.name.as_str())));
        self.results = self.index.search(&self.query, RESULT_LIMIT);
    }

    /// Returns the station the user clicked in the result list, if any.
    pub fn show(&mut self, ui: &mut Ui, engine: &Engine) -> Option<u32> {
        ui.heading("Search");
        let response = ui.text_edit_singleline(&mut self.query);
        if response.changed() {
            self.results = self.index.search(&self.query, RESULT_LIMIT);
        }

        let mut clicked = None;
        ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(240.0)
            .show(ui, |ui| {
                for &id in &self.results {
                    let Some(station) = engine.station(id) else {
                        continue;
                    };
                    let selected = station.is_selected();
                    let label = format!("{} ({})", station.name, station.id);
                    if ui.selectable_label(selected, label).clicked() {
                        clicked = Some(id);
                    }
                }
            });
        clicked
    }
}

/// What the user asked for in the selected-stations list.
pub enum SelectedAction {
    None,
    Remove(u32),
    RemoveAll,
}

/// List of currently selected stations with per-item and bulk removal.
pub fn show_selected_panel(ui: &mut Ui, engine: &Engine, selected: &[u32]) -> SelectedAction {
    let mut action = SelectedAction::None;

    ui.heading("Selected");
    if selected.is_empty() {
        ui.weak("Click a station in the viewport or the search list.");
        return action;
    }

    ScrollArea::vertical()
        .id_salt("selected_list")
        .max_height(200.0)
        .show(ui, |ui| {
            for &id in selected {
                ui.horizontal(|ui| {
                    if ui.small_button("✕").clicked() {
                        action = SelectedAction::Remove(id);
                    }
                    match engine.station(id) {
                        Some(station) => ui.label(format!("{} ({})", station.name, id)),
                        None => ui.label(format!("({})", id)),
                    };
                });
            }
        });

    if ui.button("Remove all").clicked() {
        action = SelectedAction::RemoveAll;
    }
    action
}
