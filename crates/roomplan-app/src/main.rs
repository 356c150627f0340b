//! RoomPlan 主应用程序入口
//! 使用 eframe 作为应用框架，左侧为设计与家具库，中央为2D/3D视图，右侧为属性面板

mod view3d;

use anyhow::{Context as _, Result};
use eframe::egui;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use roomplan_core::catalog::{self, FurnitureCatalogEntry, LocalModel};
use roomplan_core::design::ViewMode;
use roomplan_core::entity::DesignId;
use roomplan_core::math::Point2;
use roomplan_file::export::{self, ExportFormat};
use roomplan_file::{RoomStore, Settings, SnapshotStorage};
use roomplan_renderer::picking::pick_furniture;
use roomplan_renderer::{FileGeometrySource, ModelRegistry, OrbitCamera, RoomScene};
use roomplan_ui::canvas::{MAX_SCALE, MIN_SCALE};
use roomplan_ui::egui_surface::EguiSurface;
use roomplan_ui::painter::paint_frame;
use roomplan_ui::state::PlanMode;
use roomplan_ui::{designs_panel, furniture_panel, properties_panel, RoomCanvas, UiState};

const CANVAS_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(245, 245, 248);
const VIEWER_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(30, 30, 46);

/// RoomPlan 应用程序
struct RoomPlanApp {
    store: RoomStore,
    storage: Option<SnapshotStorage>,
    saved_revision: u64,

    ui_state: UiState,

    // 3D视图状态
    registry: ModelRegistry,
    camera: OrbitCamera,
    framed_design: Option<DesignId>,
    scene: Option<RoomScene>,
    scene_revision: Option<u64>,

    // 后台加载任务所在的运行时，需与应用同生命周期
    _runtime: tokio::runtime::Runtime,
}

impl RoomPlanApp {
    fn new(settings: &Settings, runtime: tokio::runtime::Runtime) -> Self {
        let namespace = settings.storage.namespace.clone();
        let storage = match SnapshotStorage::open(&settings.database_path(), namespace) {
            Ok(storage) => Some(storage),
            Err(e) => {
                error!("Failed to open design storage: {}", e);
                None
            }
        };

        let store = match storage.as_ref().map(SnapshotStorage::load) {
            Some(Ok(Some(store))) => store,
            Some(Ok(None)) | None => RoomStore::new(),
            Some(Err(e)) => {
                error!("Failed to load saved designs: {}", e);
                RoomStore::new()
            }
        };

        let canvas = RoomCanvas::new(settings.canvas.width as f64, settings.canvas.height as f64)
            .with_scale(settings.canvas.default_scale);
        let source = Arc::new(FileGeometrySource::new(settings.viewer.assets_dir.clone()));

        Self {
            saved_revision: store.revision(),
            store,
            storage,
            ui_state: UiState::new(canvas, settings.canvas.hit_test),
            registry: ModelRegistry::new(source, runtime.handle().clone()),
            camera: OrbitCamera::new(settings.canvas.width, settings.canvas.height)
                .with_damping(settings.viewer.damping),
            framed_design: None,
            scene: None,
            scene_revision: None,
            _runtime: runtime,
        }
    }

    /// 内置目录与用户导入的本地模型
    fn catalog(&self) -> Vec<FurnitureCatalogEntry> {
        let local = self.store.local_models().iter().map(LocalModel::to_entry).collect();
        catalog::merge_catalogs([catalog::builtin_catalog(), local])
    }

    /// 存储有变化时整体保存；拖拽进行中时推迟到松开
    fn persist(&mut self) {
        if self.store.revision() == self.saved_revision || self.ui_state.editor.is_dragging() {
            return;
        }
        let Some(storage) = &self.storage else {
            return;
        };
        match storage.save(&self.store) {
            Ok(()) => self.saved_revision = self.store.revision(),
            Err(e) => {
                error!("Failed to save designs: {}", e);
                self.ui_state.set_status(format!("Save failed: {}", e));
                // 避免每帧重试
                self.saved_revision = self.store.revision();
            }
        }
    }

    fn show_export_dialog(&mut self, format: ExportFormat) {
        let Some(design) = self.store.active_design() else {
            self.ui_state.set_status("No active design to export");
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.extension().to_uppercase(), &[format.extension()])
            .set_file_name(format!("{}.{}", design.name, format.extension()))
            .set_title("Export design")
            .save_file()
        else {
            return;
        };

        match export::export_design(design, format, &path) {
            Ok(()) => {
                info!("Exported {} to {}", design.name, path.display());
                self.ui_state.set_status(format!("Exported: {}", path.display()));
            }
            Err(e) => {
                error!("Failed to export design: {}", e);
                self.ui_state.set_status(format!("Export failed: {}", e));
            }
        }
    }

    fn show_import_dialog(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("3D Models", &["obj", "glb", "gltf"])
            .set_title("Import models")
            .pick_files()
        else {
            return;
        };

        let mut models = self.store.local_models().to_vec();
        for path in paths {
            let id = format!("local-{}", path.display());
            if models.iter().any(|m| m.id == id) {
                continue;
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Model".to_string());
            models.push(LocalModel {
                id,
                name,
                path: path.to_string_lossy().into_owned(),
            });
        }
        let count = models.len();
        self.store.import_local_models(models);
        self.ui_state.set_status(format!("{} local models", count));
    }

    fn show_menu(&mut self, ctx: &egui::Context) {
        #[allow(deprecated)]
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Import models…").clicked() {
                        ui.close_menu();
                        self.show_import_dialog();
                    }
                    ui.separator();
                    if ui.button("Export OBJ…").clicked() {
                        ui.close_menu();
                        self.show_export_dialog(ExportFormat::Obj);
                    }
                    if ui.button("Export JSON…").clicked() {
                        ui.close_menu();
                        self.show_export_dialog(ExportFormat::Json);
                    }
                });
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.ui_state.show_designs, "Designs");
                    ui.checkbox(&mut self.ui_state.show_properties, "Properties");
                });

                ui.separator();
                let mut mode = self.store.view_mode();
                ui.selectable_value(&mut mode, ViewMode::Plan2D, "2D");
                ui.selectable_value(&mut mode, ViewMode::Scene3D, "3D");
                self.store.set_view_mode(mode);
            });
        });
    }

    fn show_plan_toolbar(&mut self, ui: &mut egui::Ui) {
        let editor = &mut self.ui_state.editor;
        ui.horizontal(|ui| {
            ui.label(format!("Mode: {}", editor.mode().name()));
            match editor.mode() {
                PlanMode::Move => {
                    if ui.button("✏ Draw room").clicked() {
                        editor.start_drawing();
                    }
                }
                PlanMode::Draw => {
                    if ui
                        .add_enabled(editor.can_save_shape(), egui::Button::new("Save shape"))
                        .clicked()
                    {
                        if let Err(e) = editor.save_shape(&mut self.store, &self.ui_state.canvas) {
                            warn!("Cannot save shape: {}", e);
                            self.ui_state.status_message = e.to_string();
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        editor.cancel_drawing();
                    }
                }
            }

            ui.separator();
            let mut scale = self.ui_state.canvas.scale();
            if ui
                .add(egui::Slider::new(&mut scale, MIN_SCALE..=MAX_SCALE).text("px/m"))
                .changed()
            {
                self.ui_state.canvas.set_scale(scale);
            }
        });
    }

    fn show_plan_view(&mut self, ui: &mut egui::Ui) {
        self.show_plan_toolbar(ui);

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        self.ui_state
            .canvas
            .set_size(rect.width() as f64, rect.height() as f64);
        let canvas = self.ui_state.canvas;
        let to_local = |pos: egui::Pos2| {
            Point2::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
        };

        let editor = &mut self.ui_state.editor;
        let (pressed, released, latest) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });

        if pressed {
            if let Some(pos) = response.interact_pointer_pos().or(latest) {
                if rect.contains(pos) {
                    editor.pointer_down(&mut self.store, &canvas, to_local(pos));
                }
            }
        }
        if let Some(pos) = response.hover_pos() {
            editor.pointer_move(&mut self.store, &canvas, to_local(pos));
        }
        if released {
            editor.pointer_up();
        }
        if !response.hovered() && !response.dragged() {
            editor.pointer_leave();
        }

        match self.store.active_design() {
            Some(design) => {
                let mut surface = EguiSurface::new(&painter, rect.min, CANVAS_BACKGROUND);
                paint_frame(
                    &mut surface,
                    &canvas,
                    design,
                    editor,
                    self.store.selected_furniture(),
                );
            }
            None => {
                painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Create a design to start planning",
                    egui::FontId::proportional(16.0),
                    egui::Color32::DARK_GRAY,
                );
            }
        }
    }

    fn show_scene_view(&mut self, ui: &mut egui::Ui, catalog: &[FurnitureCatalogEntry]) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, VIEWER_BACKGROUND);
        self.camera.set_viewport(rect.width(), rect.height());

        let Some(design) = self.store.active_design() else {
            self.scene = None;
            return;
        };

        if self.framed_design != Some(design.id) {
            self.camera.frame_design(design);
            self.framed_design = Some(design.id);
        }

        // 模型加载完成或存储变化时重建场景
        let loaded = self.registry.pump();
        let stale = self.scene_revision != Some(self.store.revision());
        if loaded > 0 || stale || self.scene.is_none() {
            self.scene = Some(RoomScene::build(
                design,
                self.store.selected_furniture(),
                catalog,
                &mut self.registry,
            ));
            self.scene_revision = Some(self.store.revision());
        }

        // 相机输入
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.camera.orbit(-delta.x as f64 * 0.01, delta.y as f64 * 0.01);
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.pan(delta.x as f64, delta.y as f64);
        }
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if response.hovered() && scroll.abs() > 0.0 {
            self.camera.zoom(scroll as f64 * 0.002);
        }
        let moving = self.camera.update();

        let Some(scene) = &self.scene else {
            return;
        };

        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = Point2::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                if let Some((origin, direction)) = self.camera.screen_ray(local) {
                    let hit = pick_furniture(&scene.furniture, &origin, &direction);
                    view3d::select_picked(&mut self.store, hit);
                }
            }
        }

        let mut projector = view3d::SceneProjector::new(&self.camera, rect.min);
        projector.add_scene(scene);
        painter.add(egui::Shape::mesh(projector.into_mesh()));
        view3d::paint_badges(&painter, scene, &self.camera, rect.min);

        if moving || self.registry.has_pending() {
            ui.ctx().request_repaint();
        }
    }
}

impl eframe::App for RoomPlanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let title = match self.store.active_design() {
            Some(design) => format!("RoomPlan - {}", design.name),
            None => "RoomPlan".to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

        self.show_menu(ctx);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.ui_state.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(design) = self.store.active_design() {
                        ui.label(format!("Furniture: {}", design.furniture.len()));
                        ui.separator();
                    }
                    ui.label(format!("Designs: {}", self.store.designs().len()));
                });
            });
        });

        designs_panel::show_designs_panel(ctx, &mut self.store, &mut self.ui_state);

        let catalog = self.catalog();
        egui::SidePanel::left("furniture_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                furniture_panel::show_furniture_panel(
                    ui,
                    &catalog,
                    &mut self.store,
                    &mut self.ui_state,
                );
            });

        properties_panel::show_properties_panel(ctx, &mut self.store, &mut self.ui_state);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| match self.store.view_mode() {
                ViewMode::Plan2D => self.show_plan_view(ui),
                ViewMode::Scene3D => self.show_scene_view(ui, &catalog),
            });

        self.persist();
    }

    fn on_exit(&mut self) {
        self.ui_state.editor.pointer_leave();
        self.persist();
    }
}

/// 读取设置文件；读取失败时使用默认值
fn load_settings() -> (Settings, Option<String>) {
    let Some(path) = Settings::default_path() else {
        return (Settings::default(), None);
    };
    match Settings::load_from_file(&path).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => (settings, None),
        Err(e) => (
            Settings::default(),
            Some(format!("Ignoring settings at {}: {}", path.display(), e)),
        ),
    }
}

fn main() -> Result<()> {
    let (settings, settings_warning) = load_settings();

    // 初始化日志
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(settings.log_level()?)
            .finish(),
    )?;
    if let Some(warning) = settings_warning {
        warn!("{}", warning);
    }

    info!("Starting RoomPlan...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start model loader runtime")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("RoomPlan"),
        ..Default::default()
    };

    eframe::run_native(
        "RoomPlan",
        native_options,
        Box::new(move |_cc| Ok(Box::new(RoomPlanApp::new(&settings, runtime)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
