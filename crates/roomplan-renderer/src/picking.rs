//! 3D拾取
//!
//! 射线变换到每件家具的模型空间，再与模型空间包围盒求交。
//! 仿射变换保持射线参数不变，因此各家具的命中距离可以直接比较。

use crate::scene::FurnitureInstance;
use parry3d::na;
use parry3d::query::{Ray, RayCast};
use parry3d::shape::Cuboid;
use roomplan_core::entity::FurnitureId;
use roomplan_core::math::{Point3, Vector3};

/// 射线拾取范围
const MAX_TOI: f32 = 1.0e4;

/// 射线与单件家具的命中参数
pub fn ray_hit(instance: &FurnitureInstance, origin: &Point3, direction: &Vector3) -> Option<f64> {
    let inverse = instance.transform().try_inverse()?;
    let local_origin = inverse.transform_point(origin);
    let local_dir = inverse.transform_vector(direction);

    let bounds = &instance.local_bounds;
    let half = bounds.size() / 2.0;
    let center = bounds.min + half;

    let cuboid = Cuboid::new(na::Vector3::new(
        half.x.max(1e-4) as f32,
        half.y.max(1e-4) as f32,
        half.z.max(1e-4) as f32,
    ));
    let iso = na::Isometry3::translation(center.x as f32, center.y as f32, center.z as f32);
    let ray = Ray::new(
        na::Point3::new(local_origin.x as f32, local_origin.y as f32, local_origin.z as f32),
        na::Vector3::new(local_dir.x as f32, local_dir.y as f32, local_dir.z as f32),
    );

    cuboid.cast_ray(&iso, &ray, MAX_TOI, true).map(f64::from)
}

/// 返回最近的命中家具
pub fn pick_furniture(
    instances: &[FurnitureInstance],
    origin: &Point3,
    direction: &Vector3,
) -> Option<FurnitureId> {
    instances
        .iter()
        .filter_map(|instance| ray_hit(instance, origin, direction).map(|t| (instance.id, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
