//! 家具库面板

use crate::egui_surface::to_color32;
use crate::state::UiState;
use roomplan_core::catalog::{self, FurnitureCatalogEntry};
use roomplan_core::color::Color;
use roomplan_core::entity::FurnitureId;
use roomplan_file::RoomStore;

/// 当前类型标签下的条目；`None` 表示全部
pub fn entries_for_tab<'a>(
    catalog: &'a [FurnitureCatalogEntry],
    tab: Option<&str>,
) -> Vec<&'a FurnitureCatalogEntry> {
    catalog
        .iter()
        .filter(|e| tab.is_none_or(|t| e.furniture_type == t))
        .collect()
}

/// 把目录条目放入活动设计
pub fn place_entry(store: &mut RoomStore, entry: &FurnitureCatalogEntry) -> Option<FurnitureId> {
    store.add_furniture(entry.to_new_item()).ok()
}

/// 渲染家具库
pub fn show_furniture_panel(
    ui: &mut egui::Ui,
    catalog: &[FurnitureCatalogEntry],
    store: &mut RoomStore,
    ui_state: &mut UiState,
) {
    ui.heading("Furniture");
    ui.separator();

    ui.horizontal_wrapped(|ui| {
        if ui
            .selectable_label(ui_state.library_tab.is_none(), "All")
            .clicked()
        {
            ui_state.library_tab = None;
        }
        for furniture_type in catalog::furniture_types(catalog) {
            let selected = ui_state.library_tab.as_deref() == Some(furniture_type);
            if ui.selectable_label(selected, furniture_type).clicked() {
                ui_state.library_tab = Some(furniture_type.to_string());
            }
        }
    });
    ui.separator();

    let has_design = store.active_design().is_some();
    if !has_design {
        ui.label("Create or select a design to place furniture");
    }

    let mut placed = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for entry in entries_for_tab(catalog, ui_state.library_tab.as_deref()) {
            ui.horizontal(|ui| {
                let color = Color::parse_or(&entry.default_color, Color::NEUTRAL);
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, to_color32(color));

                ui.label(&entry.name);
                if ui
                    .add_enabled(has_design, egui::Button::new("Add"))
                    .clicked()
                {
                    placed = Some(entry);
                }
            });
        }
    });

    if let Some(entry) = placed {
        if place_entry(store, entry).is_some() {
            ui_state.set_status(format!("Added {}", entry.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::catalog::builtin_catalog;
    use roomplan_core::design::NewRoomDesign;

    #[test]
    fn test_tabs_filter_by_type() {
        let catalog = builtin_catalog();
        assert_eq!(entries_for_tab(&catalog, None).len(), catalog.len());

        let tables = entries_for_tab(&catalog, Some("table"));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "table-1");
    }

    #[test]
    fn test_place_entry_requires_active_design() {
        let catalog = builtin_catalog();
        let mut store = RoomStore::new();
        assert!(place_entry(&mut store, &catalog[0]).is_none());

        store.create_design(NewRoomDesign::named("Lounge"));
        let id = place_entry(&mut store, &catalog[0]).unwrap();
        let item = store.selected_item().unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.furniture_type, "sofa-1");
        assert_eq!(item.model.as_deref(), Some(catalog[0].model.as_str()));
    }
}
