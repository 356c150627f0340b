//! 2D帧绘制
//!
//! 绘制逻辑只依赖 [`Surface`] 抽象，egui 适配见 `egui_surface`，测试中使用记录型实现。

use crate::canvas::RoomCanvas;
use crate::state::{PlanEditor, PlanMode};
use roomplan_core::color::Color;
use roomplan_core::design::{FurnitureItem, RoomDesign};
use roomplan_core::entity::FurnitureId;
use roomplan_core::math::{Point2, Vector2};
use roomplan_core::transform::Transform2D;

/// 墙线宽度（像素）
pub const WALL_STROKE_WIDTH: f32 = 4.0;
/// 手绘顶点半径（像素）
pub const DRAFT_DOT_RADIUS: f64 = 5.0;
/// 选中光晕的模糊半径
pub const SELECTION_BLUR: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// 外发光
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub blur: f32,
}

/// 路径样式
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
    pub glow: Option<Glow>,
}

/// 2D绘制目标
pub trait Surface {
    fn clear(&mut self);

    /// 折线或多边形；`closed` 为 false 时只描边不闭合
    fn path(&mut self, points: &[Point2], closed: bool, style: PathStyle);

    fn dot(&mut self, center: Point2, radius: f64, color: Color);
}

/// 家具在平面图上的四个角（像素），按中心平移并绕中心旋转 rotationY
pub fn furniture_corners(
    canvas: &RoomCanvas,
    design: &RoomDesign,
    item: &FurnitureItem,
) -> [Point2; 4] {
    let half = canvas.item_size(item) / 2.0;
    let placement = Transform2D::placement(canvas.item_center(design, item), item.rotation_y());
    [
        Vector2::new(-half.x, -half.y),
        Vector2::new(half.x, -half.y),
        Vector2::new(half.x, half.y),
        Vector2::new(-half.x, half.y),
    ]
    .map(|corner| placement.transform_point(&Point2::from(corner)))
}

fn furniture_style(item: &FurnitureItem, selected: bool) -> PathStyle {
    let fill = Color::parse_or(&item.color, Color::NEUTRAL);
    if selected {
        PathStyle {
            fill: Some(fill),
            stroke: Some(Stroke::new(2.0, Color::SELECTION_STROKE)),
            glow: Some(Glow {
                color: Color::SELECTION_GLOW,
                blur: SELECTION_BLUR,
            }),
        }
    } else {
        PathStyle {
            fill: Some(fill),
            stroke: Some(Stroke::new(1.0, Color::BLACK)),
            glow: None,
        }
    }
}

/// 绘制一帧：清屏、房间轮廓（或手绘草图）、按顺序绘制家具
pub fn paint_frame(
    surface: &mut dyn Surface,
    canvas: &RoomCanvas,
    design: &RoomDesign,
    editor: &PlanEditor,
    selected: Option<FurnitureId>,
) {
    surface.clear();

    let room_style = PathStyle {
        fill: Some(Color::parse_or(&design.floor_color, Color::WOOD)),
        stroke: Some(Stroke::new(
            WALL_STROKE_WIDTH,
            Color::parse_or(&design.wall_color, Color::WALL),
        )),
        glow: None,
    };

    let draft = editor.draft();
    if editor.mode() == PlanMode::Draw && !draft.is_empty() {
        surface.path(draft, draft.len() > 2, room_style);
        for point in draft {
            surface.dot(*point, DRAFT_DOT_RADIUS, Color::SELECTION_GLOW);
        }
    } else {
        surface.path(&canvas.footprint_pixels(design), true, room_style);
    }

    for item in &design.furniture {
        let corners = furniture_corners(canvas, design, item);
        surface.path(&corners, true, furniture_style(item, selected == Some(item.id)));
    }
}
