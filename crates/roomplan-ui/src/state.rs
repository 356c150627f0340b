//! UI状态管理
//!
//! [`PlanEditor`] 是2D视图的交互引擎：移动模式下拖拽家具，绘制模式下采集手绘轮廓。
//! 手势状态只存在于这里，指针抬起或离开画布时复位。

use crate::canvas::RoomCanvas;
use crate::error::DrawError;
use roomplan_core::design::{FurniturePatch, NewRoomDesign, RoomShape};
use roomplan_core::entity::FurnitureId;
use roomplan_core::footprint::normalize_outline;
use roomplan_core::hit::HitTestMode;
use roomplan_core::math::{Point2, Vector2};
use roomplan_file::RoomStore;
use tracing::debug;

/// 2D视图的交互模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    /// 选择并拖动家具
    #[default]
    Move,
    /// 手绘房间轮廓
    Draw,
}

impl PlanMode {
    pub fn name(&self) -> &'static str {
        match self {
            PlanMode::Move => "Move",
            PlanMode::Draw => "Draw",
        }
    }
}

/// 拖拽中的家具及按下时指针相对其中心的偏移（像素）
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    id: FurnitureId,
    grab: Vector2,
}

/// 2D交互引擎
#[derive(Debug, Clone, Default)]
pub struct PlanEditor {
    mode: PlanMode,
    drag: Option<DragState>,
    draft: Vec<Point2>,
    drawing: bool,
    pub hit_test: HitTestMode,
}

impl PlanEditor {
    pub fn new(hit_test: HitTestMode) -> Self {
        Self {
            hit_test,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    /// 已采集的手绘点（像素）
    pub fn draft(&self) -> &[Point2] {
        &self.draft
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.is_empty()
    }

    pub fn can_save_shape(&self) -> bool {
        self.draft.len() >= 3
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged(&self) -> Option<FurnitureId> {
        self.drag.map(|d| d.id)
    }

    /// 进入绘制模式，清空之前的草图
    pub fn start_drawing(&mut self) {
        self.mode = PlanMode::Draw;
        self.draft.clear();
        self.drawing = false;
        self.drag = None;
        debug!("Started freehand drawing");
    }

    /// 放弃草图并回到移动模式，不修改存储
    pub fn cancel_drawing(&mut self) {
        self.mode = PlanMode::Move;
        self.draft.clear();
        self.drawing = false;
        debug!("Cancelled freehand drawing");
    }

    pub fn pointer_down(&mut self, store: &mut RoomStore, canvas: &RoomCanvas, pixel: Point2) {
        match self.mode {
            PlanMode::Draw => {
                self.draft.push(pixel);
                self.drawing = true;
            }
            PlanMode::Move => {
                let Some(design) = store.active_design() else {
                    return;
                };
                let hit = canvas.hit_test(design, pixel, self.hit_test).and_then(|id| {
                    let item = design.furniture(id)?;
                    Some(DragState {
                        id,
                        grab: pixel - canvas.item_center(design, item),
                    })
                });
                store.set_selected_furniture(hit.map(|d| d.id));
                if let Some(drag) = hit {
                    debug!("Started dragging furniture {}", drag.id);
                }
                self.drag = hit;
            }
        }
    }

    pub fn pointer_move(&mut self, store: &mut RoomStore, canvas: &RoomCanvas, pixel: Point2) {
        if self.mode == PlanMode::Draw {
            if self.drawing {
                if let Some(last) = self.draft.last_mut() {
                    *last = pixel;
                }
            }
            return;
        }

        let Some(drag) = self.drag else {
            return;
        };
        let Some(design) = store.active_design() else {
            self.drag = None;
            return;
        };
        let Some(item) = design.furniture(drag.id) else {
            self.drag = None;
            return;
        };

        let (x, z) = canvas.pixel_to_room(design, pixel - drag.grab);
        let position = [x, item.position[1], z];
        if store
            .update_furniture(drag.id, FurniturePatch::position(position))
            .is_err()
        {
            self.drag = None;
        }
    }

    /// 结束拖拽或手绘手势
    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!("Finished dragging furniture {}", drag.id);
        }
        self.drawing = false;
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// 把草图保存为活动设计的自定义轮廓
    ///
    /// 包围盒尺寸按当前缩放换算为房间的长和宽，点归一化到 [0, 1]。
    pub fn save_shape(
        &mut self,
        store: &mut RoomStore,
        canvas: &RoomCanvas,
    ) -> Result<(), DrawError> {
        if self.draft.len() < 3 {
            return Err(DrawError::TooFewPoints(self.draft.len()));
        }
        let mut design = store
            .active_design()
            .cloned()
            .ok_or(DrawError::NoActiveDesign)?;
        let outline = normalize_outline(&self.draft)?;

        design.length = outline.extent.x / canvas.scale();
        design.width = outline.extent.y / canvas.scale();
        design.shape = RoomShape::Custom;
        design.custom_points = Some(outline.points);
        store
            .update_design(design)
            .map_err(|_| DrawError::NoActiveDesign)?;

        debug!("Saved custom shape with {} points", self.draft.len());
        self.mode = PlanMode::Move;
        self.draft.clear();
        self.drawing = false;
        Ok(())
    }
}

/// 新建设计表单
#[derive(Debug, Clone, Default)]
pub struct DesignForm {
    pub input: NewRoomDesign,
    pub error: Option<String>,
}

impl DesignForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// UI全局状态
#[derive(Debug, Clone)]
pub struct UiState {
    pub canvas: RoomCanvas,
    pub editor: PlanEditor,
    pub design_form: DesignForm,
    pub show_designs: bool,
    pub show_properties: bool,
    /// 家具库当前选中的类型标签
    pub library_tab: Option<String>,
    /// 状态栏消息
    pub status_message: String,
}

impl UiState {
    pub fn new(canvas: RoomCanvas, hit_test: HitTestMode) -> Self {
        Self {
            canvas,
            editor: PlanEditor::new(hit_test),
            design_form: DesignForm::default(),
            show_designs: true,
            show_properties: true,
            library_tab: None,
            status_message: String::new(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(RoomCanvas::default(), HitTestMode::default())
    }
}
