//! 设计列表面板

use crate::state::{DesignForm, UiState};
use roomplan_core::design::RoomShape;
use roomplan_core::entity::DesignId;
use roomplan_file::RoomStore;
use tracing::debug;

/// 校验表单并创建设计；成功后设为活动设计并清空表单
pub fn submit_design_form(form: &mut DesignForm, store: &mut RoomStore) -> Option<DesignId> {
    if let Err(e) = form.input.validate() {
        form.error = Some(e.to_string());
        return None;
    }
    let id = store.create_design(form.input.clone());
    debug!("Created design {} from form", id);
    form.reset();
    Some(id)
}

/// 渲染设计列表面板
pub fn show_designs_panel(ctx: &egui::Context, store: &mut RoomStore, ui_state: &mut UiState) {
    egui::SidePanel::left("designs_panel")
        .resizable(true)
        .default_width(220.0)
        .show_animated(ctx, ui_state.show_designs, |ui| {
            ui.heading("Designs");
            ui.separator();

            let active = store.active_design_id();
            let mut activate = None;
            let mut delete = None;

            egui::ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui| {
                    if store.designs().is_empty() {
                        ui.label("No designs yet");
                    }
                    for design in store.designs() {
                        ui.horizontal(|ui| {
                            let text = format!(
                                "{} ({:.1} × {:.1} m)",
                                design.name, design.length, design.width
                            );
                            if ui.selectable_label(active == Some(design.id), text).clicked() {
                                activate = Some(design.id);
                            }
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                delete = Some(design.id);
                            }
                        });
                    }
                });

            if let Some(id) = activate {
                let _ = store.set_active_design(Some(id));
            }
            if let Some(id) = delete {
                if let Ok(removed) = store.delete_design(id) {
                    ui_state.set_status(format!("Deleted {}", removed.name));
                }
            }

            ui.separator();
            ui.label(egui::RichText::new("New design").strong());

            let form = &mut ui_state.design_form;
            egui::Grid::new("design_form")
                .num_columns(2)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut form.input.name);
                    ui.end_row();

                    for (label, value) in [
                        ("Length:", &mut form.input.length),
                        ("Width:", &mut form.input.width),
                        ("Height:", &mut form.input.height),
                    ] {
                        ui.label(label);
                        ui.add(egui::DragValue::new(value).speed(0.1).suffix(" m"));
                        ui.end_row();
                    }

                    ui.label("Shape:");
                    egui::ComboBox::from_id_salt("design_shape")
                        .selected_text(form.input.shape.label())
                        .show_ui(ui, |ui| {
                            // 自定义形状通过2D视图手绘
                            for shape in [RoomShape::Rectangular, RoomShape::LShaped] {
                                ui.selectable_value(&mut form.input.shape, shape, shape.label());
                            }
                        });
                    ui.end_row();

                    for (label, value) in [
                        ("Walls:", &mut form.input.wall_color),
                        ("Floor:", &mut form.input.floor_color),
                        ("Ceiling:", &mut form.input.ceiling_color),
                    ] {
                        ui.label(label);
                        ui.add(egui::TextEdit::singleline(value).desired_width(80.0));
                        ui.end_row();
                    }
                });

            if let Some(error) = &form.error {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), error);
            }

            if ui.button("Create").clicked() {
                if let Some(id) = submit_design_form(&mut ui_state.design_form, store) {
                    ui_state.set_status(format!("Created design {}", id));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::design::NewRoomDesign;

    #[test]
    fn test_submit_valid_form() {
        let mut store = RoomStore::new();
        let mut form = DesignForm {
            input: NewRoomDesign::named("Kitchen"),
            error: None,
        };

        let id = submit_design_form(&mut form, &mut store).unwrap();
        assert_eq!(store.active_design_id(), Some(id));
        assert_eq!(store.active_design().unwrap().name, "Kitchen");
        assert!(form.input.name.is_empty());
        assert!(form.error.is_none());
    }

    #[test]
    fn test_submit_invalid_form_keeps_input() {
        let mut store = RoomStore::new();
        let mut form = DesignForm::default();
        form.input.length = -1.0;

        assert!(submit_design_form(&mut form, &mut store).is_none());
        assert!(form.error.is_some());
        assert!(store.designs().is_empty());
        assert_eq!(form.input.length, -1.0);
    }
}
