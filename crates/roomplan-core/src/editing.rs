//! 属性面板的按轴编辑
//!
//! 把单个分量的输入转换为 [`FurniturePatch`]，并在这里施加输入范围限制。

use crate::design::{FurnitureItem, FurniturePatch};
use crate::math::Triple;
use std::f64::consts::PI;

/// 缩放下限
pub const SCALE_MIN: f64 = 0.1;
/// 缩放上限
pub const SCALE_MAX: f64 = 10.0;
/// 旋转输入范围为 [-ROTATION_LIMIT, ROTATION_LIMIT]
pub const ROTATION_LIMIT: f64 = PI;

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// 替换三元组中的一个分量
pub fn with_axis(values: Triple, axis: Axis, value: f64) -> Triple {
    let mut out = values;
    out[axis.index()] = value;
    out
}

pub fn clamp_scale(value: f64) -> f64 {
    value.clamp(SCALE_MIN, SCALE_MAX)
}

pub fn clamp_rotation(value: f64) -> f64 {
    value.clamp(-ROTATION_LIMIT, ROTATION_LIMIT)
}

pub fn position_patch(item: &FurnitureItem, axis: Axis, value: f64) -> FurniturePatch {
    FurniturePatch::position(with_axis(item.position, axis, value))
}

pub fn rotation_patch(item: &FurnitureItem, axis: Axis, value: f64) -> FurniturePatch {
    FurniturePatch::rotation(with_axis(item.rotation, axis, clamp_rotation(value)))
}

pub fn scale_patch(item: &FurnitureItem, axis: Axis, value: f64) -> FurniturePatch {
    FurniturePatch::scale(with_axis(item.scale, axis, clamp_scale(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::NewFurnitureItem;
    use crate::entity::FurnitureId;

    fn item() -> FurnitureItem {
        NewFurnitureItem::new("table", "#A67C52")
            .with_position([1.0, 0.0, 2.0])
            .into_item(FurnitureId::new())
    }

    #[test]
    fn test_position_patch_keeps_other_axes() {
        let patch = position_patch(&item(), Axis::Z, -1.5);
        assert_eq!(patch.position, Some([1.0, 0.0, -1.5]));
        assert!(patch.rotation.is_none());
    }

    #[test]
    fn test_scale_is_clamped() {
        assert_eq!(scale_patch(&item(), Axis::X, 0.0).scale, Some([0.1, 1.0, 1.0]));
        assert_eq!(scale_patch(&item(), Axis::Y, 25.0).scale, Some([1.0, 10.0, 1.0]));
        assert_eq!(scale_patch(&item(), Axis::Z, 2.5).scale, Some([1.0, 1.0, 2.5]));
    }

    #[test]
    fn test_rotation_is_clamped() {
        let patch = rotation_patch(&item(), Axis::Y, 4.0);
        assert_eq!(patch.rotation, Some([0.0, PI, 0.0]));
    }
}
