//! 2D平面投影
//!
//! 房间以固定比例（像素/米）居中绘制在画布上。
//! 房间局部坐标 `(x, z)` 与像素坐标互相转换：
//! `px = offset.x + (x + L/2)·S`，`py = offset.y + (z + W/2)·S`。

use roomplan_core::design::{FurnitureItem, RoomDesign};
use roomplan_core::entity::FurnitureId;
use roomplan_core::footprint::Footprint;
use roomplan_core::hit::{self, HitTestMode};
use roomplan_core::math::{Point2, Vector2};

/// 缩放范围（像素/米）
pub const MIN_SCALE: f64 = 10.0;
pub const MAX_SCALE: f64 = 50.0;
pub const DEFAULT_SCALE: f64 = 20.0;

/// 家具在平面图上的占位尺寸（米），乘以缩放分量
pub const FURNITURE_FOOTPRINT: f64 = 0.8;

/// 平面画布坐标模型
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomCanvas {
    scale: f64,
    /// 画布尺寸（像素）
    pub size: Vector2,
}

impl RoomCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scale: DEFAULT_SCALE,
            size: Vector2::new(width, height),
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 设置缩放，限制在 [10, 50]
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Vector2::new(width, height);
    }

    /// 房间包围盒左上角的像素位置
    pub fn offset(&self, design: &RoomDesign) -> Vector2 {
        Vector2::new(
            (self.size.x - design.length * self.scale) / 2.0,
            (self.size.y - design.width * self.scale) / 2.0,
        )
    }

    /// 房间局部 (x, z) → 像素
    pub fn room_to_pixel(&self, design: &RoomDesign, x: f64, z: f64) -> Point2 {
        let offset = self.offset(design);
        Point2::new(
            offset.x + (x + design.length / 2.0) * self.scale,
            offset.y + (z + design.width / 2.0) * self.scale,
        )
    }

    /// 像素 → 房间局部 (x, z)
    pub fn pixel_to_room(&self, design: &RoomDesign, pixel: Point2) -> (f64, f64) {
        let offset = self.offset(design);
        (
            (pixel.x - offset.x) / self.scale - design.length / 2.0,
            (pixel.y - offset.y) / self.scale - design.width / 2.0,
        )
    }

    /// 家具中心的像素位置
    pub fn item_center(&self, design: &RoomDesign, item: &FurnitureItem) -> Point2 {
        self.room_to_pixel(design, item.position[0], item.position[2])
    }

    /// 家具在平面图上的像素尺寸（X 与 Z 缩放）
    pub fn item_size(&self, item: &FurnitureItem) -> Vector2 {
        Vector2::new(
            FURNITURE_FOOTPRINT * self.scale * item.scale[0],
            FURNITURE_FOOTPRINT * self.scale * item.scale[2],
        )
    }

    /// 房间轮廓的像素坐标
    pub fn footprint_pixels(&self, design: &RoomDesign) -> Vec<Point2> {
        Footprint::for_design(design)
            .points()
            .iter()
            .map(|p| self.room_to_pixel(design, p.x, p.y))
            .collect()
    }

    /// 命中测试：按绘制顺序的逆序查找第一件命中的家具
    pub fn hit_test(
        &self,
        design: &RoomDesign,
        pixel: Point2,
        mode: HitTestMode,
    ) -> Option<FurnitureId> {
        design
            .furniture
            .iter()
            .rev()
            .find(|item| {
                let delta = pixel - self.item_center(design, item);
                hit::hit(mode, delta, item.rotation_y(), self.item_size(item) / 2.0)
            })
            .map(|item| item.id)
    }
}

impl Default for RoomCanvas {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::chrono::Utc;
    use roomplan_core::design::{NewFurnitureItem, NewRoomDesign};
    use roomplan_core::entity::DesignId;
    use roomplan_core::math::approx_eq;

    fn design() -> RoomDesign {
        NewRoomDesign::named("Plan").into_design(DesignId::new(), Utc::now())
    }

    #[test]
    fn test_offset_centers_room() {
        let canvas = RoomCanvas::default();
        let offset = canvas.offset(&design());
        // 5m × 20 = 100px, 4m × 20 = 80px
        assert!(approx_eq(offset.x, 550.0));
        assert!(approx_eq(offset.y, 360.0));
    }

    #[test]
    fn test_room_center_maps_to_canvas_center() {
        let canvas = RoomCanvas::default();
        let p = canvas.room_to_pixel(&design(), 0.0, 0.0);
        assert!(approx_eq(p.x, 600.0));
        assert!(approx_eq(p.y, 400.0));
    }

    #[test]
    fn test_projection_roundtrip() {
        let design = design();
        for scale in [10.0, 20.0, 37.5, 50.0] {
            let canvas = RoomCanvas::new(900.0, 700.0).with_scale(scale);
            for (x, z) in [(0.0, 0.0), (-2.5, 2.0), (1.234, -0.987)] {
                let p = canvas.room_to_pixel(&design, x, z);
                let (bx, bz) = canvas.pixel_to_room(&design, p);
                assert!((bx - x).abs() < 1e-9);
                assert!((bz - z).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut canvas = RoomCanvas::default();
        canvas.set_scale(5.0);
        assert_eq!(canvas.scale(), MIN_SCALE);
        canvas.set_scale(80.0);
        assert_eq!(canvas.scale(), MAX_SCALE);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut design = design();
        let bottom = NewFurnitureItem::new("sofa", "#8E9196").into_item(FurnitureId::new());
        let top = NewFurnitureItem::new("chair", "#8E9196").into_item(FurnitureId::new());
        design.furniture.push(bottom.clone());
        design.furniture.push(top.clone());

        let canvas = RoomCanvas::default();
        let center = canvas.item_center(&design, &top);
        assert_eq!(canvas.hit_test(&design, center, HitTestMode::Circular), Some(top.id));

        let far = center + Vector2::new(100.0, 0.0);
        assert_eq!(canvas.hit_test(&design, far, HitTestMode::Circular), None);
    }

    #[test]
    fn test_footprint_pixels() {
        let canvas = RoomCanvas::default();
        let pixels = canvas.footprint_pixels(&design());
        assert_eq!(pixels.len(), 4);
        assert!(approx_eq(pixels[0].x, 550.0));
        assert!(approx_eq(pixels[0].y, 360.0));
        assert!(approx_eq(pixels[2].x, 650.0));
        assert!(approx_eq(pixels[2].y, 440.0));
    }
}
