//! 2D命中测试
//!
//! 指针相对家具中心的偏移先按 -rotationY 旋转回家具局部坐标，再与家具尺寸比较。

use crate::math::Vector2;
use crate::transform::Transform2D;
use parry2d::na;
use parry2d::query::PointQuery;
use parry2d::shape::Cuboid;
use serde::{Deserialize, Serialize};

/// 命中测试方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitTestMode {
    /// 以较长半边为半径的圆
    #[default]
    Circular,
    /// 精确的旋转矩形
    Exact,
}

/// 把屏幕偏移旋转回家具局部坐标
pub fn to_local(delta: Vector2, rotation: f64) -> Vector2 {
    Transform2D::rotation(-rotation).transform_vector(&delta)
}

/// 局部坐标下的偏移是否落在半尺寸为 `half_extents` 的家具内
pub fn contains(mode: HitTestMode, local: Vector2, half_extents: Vector2) -> bool {
    match mode {
        HitTestMode::Circular => local.norm() < half_extents.x.max(half_extents.y),
        HitTestMode::Exact => {
            let cuboid = Cuboid::new(na::Vector2::new(
                half_extents.x.abs() as f32,
                half_extents.y.abs() as f32,
            ));
            cuboid.contains_local_point(&na::Point2::new(local.x as f32, local.y as f32))
        }
    }
}

/// 组合：屏幕偏移 + 旋转 → 是否命中
pub fn hit(mode: HitTestMode, delta: Vector2, rotation: f64, half_extents: Vector2) -> bool {
    contains(mode, to_local(delta, rotation), half_extents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_circular_uses_longer_half_extent() {
        let half = Vector2::new(8.0, 2.0);
        // 在矩形外但在圆内
        assert!(hit(HitTestMode::Circular, Vector2::new(0.0, 6.0), 0.0, half));
        assert!(!hit(HitTestMode::Circular, Vector2::new(0.0, 8.5), 0.0, half));
    }

    #[test]
    fn test_exact_respects_rectangle() {
        let half = Vector2::new(8.0, 2.0);
        assert!(!hit(HitTestMode::Exact, Vector2::new(0.0, 6.0), 0.0, half));
        assert!(hit(HitTestMode::Exact, Vector2::new(7.0, 1.0), 0.0, half));
    }

    #[test]
    fn test_exact_follows_rotation() {
        let half = Vector2::new(8.0, 2.0);
        // 旋转90°后长边沿屏幕Y轴
        assert!(hit(HitTestMode::Exact, Vector2::new(0.0, 6.0), FRAC_PI_2, half));
        assert!(!hit(HitTestMode::Exact, Vector2::new(6.0, 0.0), FRAC_PI_2, half));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(serde_json::to_string(&HitTestMode::Exact).unwrap(), "\"exact\"");
    }
}
