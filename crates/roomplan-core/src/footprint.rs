//! 房间平面轮廓
//!
//! 2D视图和3D视图共用同一个轮廓多边形，坐标为房间局部的 (x, z)，单位米，
//! 原点在房间包围盒中心。

use crate::design::{RoomDesign, RoomShape, ShapePoint};
use crate::error::{CoreError, CoreResult};
use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};

/// L形主体沿长度方向所占比例
pub const L_MAIN_LENGTH_RATIO: f64 = 0.7;

/// L形延伸部分沿宽度方向所占比例
pub const L_EXTENSION_WIDTH_RATIO: f64 = 0.5;

/// 房间轮廓多边形
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    points: Vec<Point2>,
}

impl Footprint {
    /// 直接由像素或米制顶点构造，不做校验
    pub fn from_points(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// 矩形轮廓
    pub fn rectangle(length: f64, width: f64) -> Self {
        let hl = length / 2.0;
        let hw = width / 2.0;
        Self {
            points: vec![
                Point2::new(-hl, -hw),
                Point2::new(hl, -hw),
                Point2::new(hl, hw),
                Point2::new(-hl, hw),
            ],
        }
    }

    /// L形轮廓
    ///
    /// 主体占据 `[-L/2, -L/2 + 0.7L] × [-W/2, W/2]`，
    /// 延伸部分占据 `[-L/2, L/2] × [W/2 - 0.5W, W/2]`，整体不超出包围盒。
    pub fn l_shape(length: f64, width: f64) -> Self {
        let hl = length / 2.0;
        let hw = width / 2.0;
        let main_x = -hl + length * L_MAIN_LENGTH_RATIO;
        let ext_z = hw - width * L_EXTENSION_WIDTH_RATIO;
        Self {
            points: vec![
                Point2::new(-hl, -hw),
                Point2::new(main_x, -hw),
                Point2::new(main_x, ext_z),
                Point2::new(hl, ext_z),
                Point2::new(hl, hw),
                Point2::new(-hl, hw),
            ],
        }
    }

    /// 由归一化点生成自定义轮廓，点数不足3时返回 None
    pub fn custom(length: f64, width: f64, points: &[ShapePoint]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        Some(Self {
            points: points
                .iter()
                .map(|p| Point2::new(p.x * length - length / 2.0, p.y * width - width / 2.0))
                .collect(),
        })
    }

    /// 设计对应的轮廓；自定义形状缺少有效点时退回矩形
    pub fn for_design(design: &RoomDesign) -> Self {
        match design.shape {
            RoomShape::Rectangular => Self::rectangle(design.length, design.width),
            RoomShape::LShaped => Self::l_shape(design.length, design.width),
            RoomShape::Custom => design
                .custom_points
                .as_deref()
                .and_then(|pts| Self::custom(design.length, design.width, pts))
                .unwrap_or_else(|| Self::rectangle(design.length, design.width)),
        }
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 依次返回每条边（含闭合边）
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// 有向面积（鞋带公式），逆时针为正
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.points.iter().copied())
    }

    /// 耳切法三角剖分，返回逆时针（数学方向）的顶点索引三元组
    ///
    /// 自相交等无法剖分的轮廓退化为扇形剖分。
    pub fn triangulate(&self) -> Vec<[usize; 3]> {
        let n = self.points.len();
        if n < 3 {
            return Vec::new();
        }

        let mut ring: Vec<usize> = (0..n).collect();
        if self.signed_area() < 0.0 {
            ring.reverse();
        }

        let mut triangles = Vec::with_capacity(n - 2);
        while ring.len() > 3 {
            let m = ring.len();
            let ear = (0..m).find(|&i| {
                let prev = ring[(i + m - 1) % m];
                let cur = ring[i];
                let next = ring[(i + 1) % m];
                self.is_ear(&ring, prev, cur, next)
            });

            match ear {
                Some(i) => {
                    let prev = ring[(i + m - 1) % m];
                    let next = ring[(i + 1) % m];
                    triangles.push([prev, ring[i], next]);
                    ring.remove(i);
                }
                None => {
                    for i in 1..ring.len() - 1 {
                        triangles.push([ring[0], ring[i], ring[i + 1]]);
                    }
                    return triangles;
                }
            }
        }
        triangles.push([ring[0], ring[1], ring[2]]);
        triangles
    }

    fn is_ear(&self, ring: &[usize], prev: usize, cur: usize, next: usize) -> bool {
        let a = self.points[prev];
        let b = self.points[cur];
        let c = self.points[next];
        if cross(&a, &b, &c) <= EPSILON {
            return false;
        }
        !ring.iter().any(|&j| {
            j != prev && j != cur && j != next && point_in_triangle(&self.points[j], &a, &b, &c)
        })
    }
}

fn cross(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// 归一化后的手绘轮廓
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutline {
    /// 包围盒尺寸（与输入点同单位）
    pub extent: Vector2,
    pub points: Vec<ShapePoint>,
}

/// 把手绘点集归一化到其包围盒的 [0, 1] 区间
pub fn normalize_outline(points: &[Point2]) -> CoreResult<NormalizedOutline> {
    if points.len() < 3 {
        return Err(CoreError::TooFewPoints(points.len()));
    }
    let bbox = BoundingBox2::from_points(points.iter().copied());
    let (w, h) = (bbox.width(), bbox.height());
    if w <= EPSILON || h <= EPSILON {
        return Err(CoreError::DegenerateShape);
    }
    Ok(NormalizedOutline {
        extent: Vector2::new(w, h),
        points: points
            .iter()
            .map(|p| ShapePoint::new((p.x - bbox.min.x) / w, (p.y - bbox.min.y) / h))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn triangulated_area(fp: &Footprint) -> f64 {
        fp.triangulate()
            .iter()
            .map(|t| {
                let p = fp.points();
                cross(&p[t[0]], &p[t[1]], &p[t[2]]) / 2.0
            })
            .sum()
    }

    #[test]
    fn test_rectangle() {
        let fp = Footprint::rectangle(5.0, 4.0);
        assert_eq!(fp.len(), 4);
        assert!(approx_eq(fp.area(), 20.0));
        assert_eq!(fp.triangulate().len(), 2);
    }

    #[test]
    fn test_l_shape_stays_inside_bounds() {
        let fp = Footprint::l_shape(10.0, 8.0);
        let bbox = fp.bounding_box();

        assert!(approx_eq(bbox.min.x, -5.0));
        assert!(approx_eq(bbox.max.x, 5.0));
        assert!(approx_eq(bbox.min.y, -4.0));
        assert!(approx_eq(bbox.max.y, 4.0));
        // 7×8 主体 + 3×4 延伸
        assert!(approx_eq(fp.area(), 68.0));
    }

    #[test]
    fn test_l_shape_triangulation_covers_area() {
        let fp = Footprint::l_shape(10.0, 8.0);
        let tris = fp.triangulate();
        assert_eq!(tris.len(), 4);
        assert!((triangulated_area(&fp) - fp.area()).abs() < 1e-9);
    }

    #[test]
    fn test_clockwise_input_is_triangulated() {
        let pts = [
            ShapePoint::new(0.0, 0.0),
            ShapePoint::new(0.0, 1.0),
            ShapePoint::new(1.0, 1.0),
            ShapePoint::new(1.0, 0.0),
        ];
        let fp = Footprint::custom(4.0, 2.0, &pts).unwrap();
        assert!(fp.signed_area() < 0.0);
        assert!((triangulated_area(&fp) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_maps_unit_square_to_room_bounds() {
        let pts = [
            ShapePoint::new(0.0, 0.0),
            ShapePoint::new(1.0, 0.0),
            ShapePoint::new(0.5, 1.0),
        ];
        let fp = Footprint::custom(6.0, 4.0, &pts).unwrap();
        assert_eq!(fp.points()[0], Point2::new(-3.0, -2.0));
        assert_eq!(fp.points()[1], Point2::new(3.0, -2.0));
        assert_eq!(fp.points()[2], Point2::new(0.0, 2.0));

        assert!(Footprint::custom(6.0, 4.0, &pts[..2]).is_none());
    }

    #[test]
    fn test_normalize_outline() {
        let outline = normalize_outline(&[
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 100.0),
            Point2::new(200.0, 160.0),
        ])
        .unwrap();

        assert!(approx_eq(outline.extent.x, 100.0));
        assert!(approx_eq(outline.extent.y, 60.0));
        assert_eq!(outline.points[0], ShapePoint::new(0.0, 0.0));
        assert_eq!(outline.points[2], ShapePoint::new(1.0, 1.0));
    }

    #[test]
    fn test_normalize_outline_rejects_degenerate() {
        assert_eq!(
            normalize_outline(&[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]),
            Err(CoreError::TooFewPoints(2))
        );
        assert_eq!(
            normalize_outline(&[
                Point2::new(0.0, 5.0),
                Point2::new(10.0, 5.0),
                Point2::new(20.0, 5.0),
            ]),
            Err(CoreError::DegenerateShape)
        );
    }
}
