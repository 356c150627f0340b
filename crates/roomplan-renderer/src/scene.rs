//! 3D场景生成
//!
//! 房间外壳由平面轮廓生成三个独立表面（墙、地面、天花板），
//! 家具实例分别记录用户缩放和自动归一化缩放，只在计算渲染变换时相乘。

use crate::model::{LoadState, ModelRegistry};
use crate::vertex::MeshVertex;
use roomplan_core::catalog::{self, FurnitureCatalogEntry};
use roomplan_core::color::Color;
use roomplan_core::design::{FurnitureItem, RoomDesign};
use roomplan_core::entity::FurnitureId;
use roomplan_core::footprint::Footprint;
use roomplan_core::math::{triple_to_vector, BoundingBox3, Matrix4, Point3, Triple, Vector3};

/// 墙面透明度
pub const WALL_OPACITY: f32 = 0.8;
/// 地面与天花板相对房间上下边界的偏移
pub const SURFACE_INSET: f64 = 0.01;
/// 选中家具的自发光强度
pub const SELECTION_EMISSIVE_INTENSITY: f32 = 0.2;

/// 表面材质
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub color: Color,
    pub opacity: f32,
}

impl SurfaceMaterial {
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// 三角网格
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 每个三角形的三个顶点位置
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize].position,
                self.vertices[t[1] as usize].position,
                self.vertices[t[2] as usize].position,
            ]
        })
    }

    fn push_vertex(&mut self, p: [f64; 3], normal: [f32; 3], color: [f32; 4]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(MeshVertex::new(
            [p[0] as f32, p[1] as f32, p[2] as f32],
            normal,
            color,
        ));
        index
    }
}

/// 带材质的表面
#[derive(Debug, Clone)]
pub struct Surface {
    pub mesh: Mesh,
    pub material: SurfaceMaterial,
}

/// 房间外壳
#[derive(Debug, Clone)]
pub struct RoomShell {
    pub walls: Surface,
    pub floor: Surface,
    pub ceiling: Surface,
}

impl RoomShell {
    /// 从设计生成外壳，墙面朝向房间内部
    pub fn build(design: &RoomDesign) -> Self {
        let footprint = Footprint::for_design(design);
        let wall = SurfaceMaterial {
            color: Color::parse_or(&design.wall_color, Color::WALL).with_opacity(WALL_OPACITY),
            opacity: WALL_OPACITY,
        };
        let floor = SurfaceMaterial {
            color: Color::parse_or(&design.floor_color, Color::WOOD),
            opacity: 1.0,
        };
        let ceiling = SurfaceMaterial {
            color: Color::parse_or(&design.ceiling_color, Color::WHITE),
            opacity: 1.0,
        };

        Self {
            walls: Surface {
                mesh: wall_mesh(&footprint, design.height, wall.color),
                material: wall,
            },
            floor: Surface {
                mesh: cap_mesh(&footprint, SURFACE_INSET, true, floor.color),
                material: floor,
            },
            ceiling: Surface {
                mesh: cap_mesh(&footprint, design.height - SURFACE_INSET, false, ceiling.color),
                material: ceiling,
            },
        }
    }

    pub fn surfaces(&self) -> [&Surface; 3] {
        [&self.floor, &self.walls, &self.ceiling]
    }
}

fn wall_mesh(footprint: &Footprint, height: f64, color: Color) -> Mesh {
    let mut mesh = Mesh::default();
    let rgba = color.to_f32_array();
    // 逆时针轮廓的内侧在每条边的左侧
    let flip = footprint.signed_area() < 0.0;

    for (a, b) in footprint.edges() {
        let (a, b) = if flip { (b, a) } else { (a, b) };
        let d = b - a;
        let Some(dir) = d.try_normalize(f64::EPSILON) else {
            continue;
        };
        let normal = [-dir.y as f32, 0.0, dir.x as f32];

        let i0 = mesh.push_vertex([a.x, 0.0, a.y], normal, rgba);
        let i1 = mesh.push_vertex([b.x, 0.0, b.y], normal, rgba);
        let i2 = mesh.push_vertex([b.x, height, b.y], normal, rgba);
        let i3 = mesh.push_vertex([a.x, height, a.y], normal, rgba);
        mesh.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
    }
    mesh
}

fn cap_mesh(footprint: &Footprint, y: f64, facing_up: bool, color: Color) -> Mesh {
    let mut mesh = Mesh::default();
    let rgba = color.to_f32_array();
    let normal = if facing_up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };

    for p in footprint.points() {
        mesh.push_vertex([p.x, y, p.y], normal, rgba);
    }
    for [a, b, c] in footprint.triangulate() {
        // 轮廓三角形在 (x, z) 平面内逆时针，对应的3D法线朝下
        if facing_up {
            mesh.indices.extend_from_slice(&[a as u32, c as u32, b as u32]);
        } else {
            mesh.indices.extend_from_slice(&[a as u32, b as u32, c as u32]);
        }
    }
    mesh
}

/// 占位盒上的状态标记
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceBadge {
    Loading,
    Failed(String),
}

impl InstanceBadge {
    pub fn label(&self) -> String {
        match self {
            InstanceBadge::Loading => "Loading…".to_string(),
            InstanceBadge::Failed(reason) => format!("Error: {reason}"),
        }
    }
}

/// 场景中的一件家具
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureInstance {
    pub id: FurnitureId,
    pub position: Vector3,
    pub rotation: Triple,
    /// 用户缩放
    pub user_scale: Vector3,
    /// 自动归一化缩放，占位盒为 1
    pub auto_scale: f64,
    pub color: Color,
    pub selected: bool,
    /// 模型空间包围盒；占位盒为单位立方体
    pub local_bounds: BoundingBox3,
    pub badge: Option<InstanceBadge>,
}

fn unit_cube() -> BoundingBox3 {
    BoundingBox3::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
}

impl FurnitureInstance {
    /// 根据家具和模型加载状态生成实例；没有状态时按加载中处理
    pub fn new(item: &FurnitureItem, state: Option<&LoadState>, selected: bool) -> Self {
        let (auto_scale, local_bounds, badge) = match state {
            Some(LoadState::Loaded(model)) => (model.auto_scale, model.bounds, None),
            Some(LoadState::Failed(reason)) => {
                (1.0, unit_cube(), Some(InstanceBadge::Failed(reason.clone())))
            }
            Some(LoadState::Pending) | None => (1.0, unit_cube(), Some(InstanceBadge::Loading)),
        };

        Self {
            id: item.id,
            position: triple_to_vector(&item.position),
            rotation: item.rotation,
            user_scale: triple_to_vector(&item.scale),
            auto_scale,
            color: Color::parse_or(&item.color, Color::NEUTRAL),
            selected,
            local_bounds,
            badge,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.badge.is_some()
    }

    /// 最终缩放 = 用户缩放 × 自动缩放
    pub fn effective_scale(&self) -> Vector3 {
        self.user_scale * self.auto_scale
    }

    /// 欧拉角按 X、Y、Z 顺序组合
    pub fn rotation_matrix(&self) -> Matrix4 {
        let [rx, ry, rz] = self.rotation;
        Matrix4::from_axis_angle(&Vector3::x_axis(), rx)
            * Matrix4::from_axis_angle(&Vector3::y_axis(), ry)
            * Matrix4::from_axis_angle(&Vector3::z_axis(), rz)
    }

    /// 渲染变换：平移 × 旋转 × 缩放
    pub fn transform(&self) -> Matrix4 {
        Matrix4::new_translation(&self.position)
            * self.rotation_matrix()
            * Matrix4::new_nonuniform_scaling(&self.effective_scale())
    }

    /// 选中时的自发光
    pub fn emissive(&self) -> Option<(Color, f32)> {
        self.selected
            .then_some((Color::SELECTION_GLOW, SELECTION_EMISSIVE_INTENSITY))
    }

    /// 世界坐标下包围盒的8个角点
    pub fn world_corners(&self) -> [Point3; 8] {
        let m = self.transform();
        let (lo, hi) = (self.local_bounds.min, self.local_bounds.max);
        let corner = |x: f64, y: f64, z: f64| m.transform_point(&Point3::new(x, y, z));
        [
            corner(lo.x, lo.y, lo.z),
            corner(hi.x, lo.y, lo.z),
            corner(hi.x, lo.y, hi.z),
            corner(lo.x, lo.y, hi.z),
            corner(lo.x, hi.y, lo.z),
            corner(hi.x, hi.y, lo.z),
            corner(hi.x, hi.y, hi.z),
            corner(lo.x, hi.y, hi.z),
        ]
    }
}

/// 家具使用的模型引用：自身的模型，否则为其目录条目的模型
pub fn model_reference<'a>(
    item: &'a FurnitureItem,
    catalog: &'a [FurnitureCatalogEntry],
) -> Option<&'a str> {
    item.model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| catalog::model_for(catalog, &item.furniture_type))
}

/// 完整的3D场景
#[derive(Debug, Clone)]
pub struct RoomScene {
    pub shell: RoomShell,
    pub furniture: Vec<FurnitureInstance>,
}

impl RoomScene {
    /// 生成场景，同时为缺少状态的模型发起加载
    pub fn build(
        design: &RoomDesign,
        selected: Option<FurnitureId>,
        catalog: &[FurnitureCatalogEntry],
        registry: &mut ModelRegistry,
    ) -> Self {
        let furniture = design
            .furniture
            .iter()
            .map(|item| {
                let state = model_reference(item, catalog).map(|r| registry.request(r).clone());
                let state = state.unwrap_or_else(|| {
                    LoadState::Failed("no model reference".to_string())
                });
                FurnitureInstance::new(item, Some(&state), selected == Some(item.id))
            })
            .collect();

        Self {
            shell: RoomShell::build(design),
            furniture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadedModel, ModelFormat};
    use roomplan_core::chrono::Utc;
    use roomplan_core::design::{NewFurnitureItem, NewRoomDesign, RoomShape};
    use roomplan_core::entity::DesignId;

    fn design(shape: RoomShape) -> RoomDesign {
        let mut input = NewRoomDesign::named("Test");
        input.shape = shape;
        input.into_design(DesignId::new(), Utc::now())
    }

    fn item() -> FurnitureItem {
        NewFurnitureItem::new("chair-1", "#8E9196")
            .with_position([1.0, 0.0, -1.0])
            .into_item(FurnitureId::new())
    }

    fn loaded(scale: f64) -> LoadState {
        LoadState::Loaded(LoadedModel {
            format: ModelFormat::Obj,
            bounds: BoundingBox3::new(Point3::origin(), Point3::new(2.0, 1.0, 1.0)),
            auto_scale: scale,
        })
    }

    #[test]
    fn test_rectangular_shell() {
        let shell = RoomShell::build(&design(RoomShape::Rectangular));
        assert_eq!(shell.walls.mesh.triangle_count(), 8);
        assert_eq!(shell.floor.mesh.triangle_count(), 2);
        assert_eq!(shell.ceiling.mesh.triangle_count(), 2);
        assert!(shell.walls.material.is_transparent());
        assert!(!shell.floor.material.is_transparent());
        assert_eq!(shell.floor.material.color, Color::WOOD);
    }

    #[test]
    fn test_l_shaped_shell() {
        let shell = RoomShell::build(&design(RoomShape::LShaped));
        assert_eq!(shell.walls.mesh.triangle_count(), 12);
        assert_eq!(shell.floor.mesh.triangle_count(), 4);
    }

    #[test]
    fn test_surface_heights() {
        let shell = RoomShell::build(&design(RoomShape::Rectangular));
        assert!(shell.floor.mesh.vertices.iter().all(|v| (v.position[1] - 0.01).abs() < 1e-6));
        assert!(shell.ceiling.mesh.vertices.iter().all(|v| (v.position[1] - 2.49).abs() < 1e-6));
    }

    #[test]
    fn test_windings_face_the_interior() {
        let shell = RoomShell::build(&design(RoomShape::LShaped));
        let normal = |t: [[f32; 3]; 3]| {
            let a = Vector3::new(t[0][0] as f64, t[0][1] as f64, t[0][2] as f64);
            let b = Vector3::new(t[1][0] as f64, t[1][1] as f64, t[1][2] as f64);
            let c = Vector3::new(t[2][0] as f64, t[2][1] as f64, t[2][2] as f64);
            (b - a).cross(&(c - a))
        };

        assert!(shell.floor.mesh.triangles().all(|t| normal(t).y > 0.0));
        assert!(shell.ceiling.mesh.triangles().all(|t| normal(t).y < 0.0));
        // 从每面墙中点沿法线稍微移动后仍在轮廓内
        let fp = Footprint::l_shape(5.0, 4.0);
        for t in shell.walls.mesh.triangles().step_by(2) {
            let n = normal(t);
            let inward = Vector3::new(n.x, 0.0, n.z).normalize();
            let mid_x = (t[0][0] + t[1][0]) as f64 / 2.0;
            let mid_z = (t[0][2] + t[1][2]) as f64 / 2.0;
            assert!(inside(&fp, mid_x + inward.x * 0.05, mid_z + inward.z * 0.05));
        }
    }

    fn inside(fp: &Footprint, x: f64, z: f64) -> bool {
        let mut crossings = false;
        for (a, b) in fp.edges() {
            if (a.y > z) != (b.y > z) && x < (b.x - a.x) * (z - a.y) / (b.y - a.y) + a.x {
                crossings = !crossings;
            }
        }
        crossings
    }

    #[test]
    fn test_placeholder_uses_user_scale_only() {
        let mut chair = item();
        chair.scale = [2.0, 1.0, 1.0];
        let pending = FurnitureInstance::new(&chair, Some(&LoadState::Pending), false);

        assert!(pending.is_placeholder());
        assert_eq!(pending.badge, Some(InstanceBadge::Loading));
        assert_eq!(pending.effective_scale(), Vector3::new(2.0, 1.0, 1.0));

        let failed = FurnitureInstance::new(&chair, Some(&LoadState::Failed("io".into())), false);
        assert_eq!(failed.badge.as_ref().map(InstanceBadge::label).as_deref(), Some("Error: io"));
    }

    #[test]
    fn test_loaded_scale_multiplies() {
        let mut chair = item();
        chair.scale = [2.0, 2.0, 2.0];
        let instance = FurnitureInstance::new(&chair, Some(&loaded(0.5)), true);

        assert!(!instance.is_placeholder());
        assert_eq!(instance.user_scale, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(instance.effective_scale(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(instance.emissive(), Some((Color::SELECTION_GLOW, 0.2)));
    }

    #[test]
    fn test_transform_applies_translation_and_rotation() {
        let mut chair = item();
        chair.rotation = [0.0, std::f64::consts::FRAC_PI_2, 0.0];
        let instance = FurnitureInstance::new(&chair, Some(&LoadState::Pending), false);

        let p = instance.transform().transform_point(&Point3::new(0.5, 0.0, 0.0));
        // 绕Y轴90°：+X → -Z
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.z - (-1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_model_reference_falls_back_to_catalog() {
        let catalog = catalog::builtin_catalog();
        let mut chair = item();
        assert_eq!(
            model_reference(&chair, &catalog),
            Some("/furniture/models/the chair modeling.obj")
        );

        chair.model = Some("/mine.glb".into());
        assert_eq!(model_reference(&chair, &catalog), Some("/mine.glb"));

        chair.model = None;
        chair.furniture_type = "chair".into();
        assert_eq!(model_reference(&chair, &catalog), None);
    }

    #[test]
    fn test_catalog_item_without_model_uses_entry_model() {
        let catalog = catalog::builtin_catalog();
        let mut placed = catalog::lookup(&catalog, "chair-1").unwrap().to_new_item();
        placed.model = None;
        let chair = placed.into_item(FurnitureId::new());

        assert_eq!(chair.furniture_type, "chair-1");
        assert_eq!(
            model_reference(&chair, &catalog),
            Some("/furniture/models/the chair modeling.obj")
        );
    }
}
