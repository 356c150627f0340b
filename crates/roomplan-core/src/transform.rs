//! 2D变换操作
//!
//! 2D画布上的家具摆放使用"平移 + 绕Y轴旋转"的组合，
//! 命中测试使用其逆变换把指针位置带回家具局部坐标。

use crate::math::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 2D仿射变换
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建旋转变换（绕原点）
    ///
    /// 画布的Y轴向下，因此正角度在屏幕上表现为顺时针，与 canvas `rotate()` 一致。
    pub fn rotation(angle: f64) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            matrix: Matrix3::new(
                cos, -sin, 0.0,
                sin, cos, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建缩放变换（绕原点）
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                sx, 0.0, 0.0,
                0.0, sy, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 家具摆放变换：先旋转，再平移到像素中心
    pub fn placement(center: Point2, angle: f64) -> Self {
        Self::translation(center.x, center.y).then(&Self::rotation(angle))
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// 变换一个向量（不受平移影响）
    pub fn transform_vector(&self, vector: &Vector2) -> Vector2 {
        let v = self.matrix * nalgebra::Vector3::new(vector.x, vector.y, 0.0);
        Vector2::new(v.x, v.y)
    }

    /// 获取逆变换
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m })
    }

    /// 获取变换矩阵
    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_translation() {
        let t = Transform2D::translation(10.0, 20.0);
        let p = Point2::new(5.0, 5.0);
        let result = t.transform_point(&p);

        assert!(approx_eq(result.x, 15.0));
        assert!(approx_eq(result.y, 25.0));
    }

    #[test]
    fn test_rotation() {
        let t = Transform2D::rotation(std::f64::consts::PI / 2.0);
        let p = Point2::new(1.0, 0.0);
        let result = t.transform_point(&p);

        assert!(approx_eq(result.x, 0.0));
        assert!(approx_eq(result.y, 1.0));
    }

    #[test]
    fn test_placement_maps_local_origin_to_center() {
        let t = Transform2D::placement(Point2::new(300.0, 200.0), 0.7);
        let origin = t.transform_point(&Point2::origin());

        assert!(approx_eq(origin.x, 300.0));
        assert!(approx_eq(origin.y, 200.0));

        let unit_x = t.transform_point(&Point2::new(1.0, 0.0));
        assert!(approx_eq(unit_x.x - 300.0, 0.7_f64.cos()));
        assert!(approx_eq(unit_x.y - 200.0, 0.7_f64.sin()));
    }

    #[test]
    fn test_placement_inverse_recovers_local_offset() {
        let t = Transform2D::placement(Point2::new(120.0, 80.0), 1.2);
        let local = Point2::new(6.0, -3.0);

        let screen = t.transform_point(&local);
        let restored = t.inverse().unwrap().transform_point(&screen);

        assert!((restored.x - local.x).abs() < 1e-9);
        assert!((restored.y - local.y).abs() < 1e-9);
    }

    #[test]
    fn test_vector_ignores_translation() {
        let t = Transform2D::translation(50.0, 50.0).then(&Transform2D::scale(2.0, 3.0));
        let v = t.transform_vector(&Vector2::new(1.0, 1.0));

        assert!(approx_eq(v.x, 2.0));
        assert!(approx_eq(v.y, 3.0));
    }
}
