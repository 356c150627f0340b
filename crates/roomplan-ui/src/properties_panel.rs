//! 属性面板

use crate::state::UiState;
use roomplan_core::color::Color;
use roomplan_core::design::{FurnitureItem, FurniturePatch};
use roomplan_core::editing::{self, Axis, ROTATION_LIMIT, SCALE_MAX, SCALE_MIN};
use roomplan_file::RoomStore;

/// 颜色字符串 ↔ egui 颜色选择器
fn color_to_rgb(text: &str) -> [u8; 3] {
    let color = Color::parse_or(text, Color::NEUTRAL);
    [color.r, color.g, color.b]
}

fn rgb_to_hex(rgb: [u8; 3]) -> String {
    Color::new(rgb[0], rgb[1], rgb[2]).to_hex_string()
}

/// 属性面板对选中家具的编辑结果
fn edit_item(ui: &mut egui::Ui, item: &FurnitureItem) -> Option<FurniturePatch> {
    let mut patch = None;

    egui::Grid::new("furniture_props")
        .num_columns(2)
        .spacing([10.0, 4.0])
        .show(ui, |ui| {
            ui.label("Type:");
            ui.label(&item.furniture_type);
            ui.end_row();

            ui.label("Color:");
            let mut rgb = color_to_rgb(&item.color);
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                patch = Some(FurniturePatch::color(rgb_to_hex(rgb)));
            }
            ui.end_row();

            for axis in Axis::ALL {
                ui.label(format!("Position {}:", axis.label()));
                let mut value = item.position[axis.index()];
                if ui
                    .add(egui::DragValue::new(&mut value).speed(0.05).suffix(" m"))
                    .changed()
                {
                    patch = Some(editing::position_patch(item, axis, value));
                }
                ui.end_row();
            }

            for axis in Axis::ALL {
                ui.label(format!("Rotation {}:", axis.label()));
                let mut value = item.rotation[axis.index()];
                if ui
                    .add(egui::Slider::new(&mut value, -ROTATION_LIMIT..=ROTATION_LIMIT))
                    .changed()
                {
                    patch = Some(editing::rotation_patch(item, axis, value));
                }
                ui.end_row();
            }

            for axis in Axis::ALL {
                ui.label(format!("Scale {}:", axis.label()));
                let mut value = item.scale[axis.index()];
                if ui
                    .add(
                        egui::DragValue::new(&mut value)
                            .speed(0.05)
                            .range(SCALE_MIN..=SCALE_MAX),
                    )
                    .changed()
                {
                    patch = Some(editing::scale_patch(item, axis, value));
                }
                ui.end_row();
            }
        });

    patch
}

/// 渲染属性面板
pub fn show_properties_panel(ctx: &egui::Context, store: &mut RoomStore, ui_state: &mut UiState) {
    egui::SidePanel::right("properties_panel")
        .resizable(true)
        .default_width(240.0)
        .show_animated(ctx, ui_state.show_properties, |ui| {
            ui.heading("Properties");
            ui.separator();

            let Some(design) = store.active_design() else {
                ui.label("No active design");
                return;
            };

            ui.label(egui::RichText::new(&design.name).strong());
            ui.label(format!(
                "{} · {:.2} × {:.2} × {:.2} m",
                design.shape.label(),
                design.length,
                design.width,
                design.height
            ));

            // 表面颜色
            let mut surfaces = [
                color_to_rgb(&design.wall_color),
                color_to_rgb(&design.floor_color),
                color_to_rgb(&design.ceiling_color),
            ];
            let mut surfaces_changed = false;
            egui::Grid::new("surface_props")
                .num_columns(2)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    let labels = ["Walls:", "Floor:", "Ceiling:"];
                    for (label, rgb) in labels.into_iter().zip(surfaces.iter_mut()) {
                        ui.label(label);
                        surfaces_changed |= ui.color_edit_button_srgb(rgb).changed();
                        ui.end_row();
                    }
                });
            if surfaces_changed {
                let mut updated = design.clone();
                updated.wall_color = rgb_to_hex(surfaces[0]);
                updated.floor_color = rgb_to_hex(surfaces[1]);
                updated.ceiling_color = rgb_to_hex(surfaces[2]);
                let _ = store.update_design(updated);
            }

            ui.separator();

            let Some(item) = store.selected_item().cloned() else {
                ui.label("No furniture selected");
                return;
            };
            ui.label(egui::RichText::new(item.display_name()).strong());

            if let Some(patch) = edit_item(ui, &item) {
                let _ = store.update_furniture(item.id, patch);
            }

            ui.separator();
            if ui.button("Remove").clicked() && store.remove_furniture(item.id).is_ok() {
                ui_state.set_status(format!("Removed {}", item.display_name()));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        assert_eq!(color_to_rgb("#A67C52"), [0xA6, 0x7C, 0x52]);
        assert_eq!(color_to_rgb("bogus"), [0x8E, 0x91, 0x96]);
        assert_eq!(rgb_to_hex([0x9B, 0x87, 0xF5]), "#9B87F5");
    }
}
