//! 3D视图
//!
//! 把 [`RoomScene`] 经轨道相机投影到 egui 画布。三角形按到相机的距离从远到近绘制，
//! 背向相机的面被剔除，因此从房间外侧看进去时近处的墙不会遮挡视线。

use roomplan_core::color::Color;
use roomplan_core::entity::FurnitureId;
use roomplan_core::math::{Point3, Vector3};
use roomplan_file::RoomStore;
use roomplan_renderer::scene::Surface;
use roomplan_renderer::{OrbitCamera, RoomScene};

/// 盒子的六个面（`world_corners` 的角点序号）
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// 环境光比例
const AMBIENT: f64 = 0.55;

#[derive(Debug, Clone, Copy)]
struct ProjectedTriangle {
    points: [egui::Pos2; 3],
    distance: f64,
    color: egui::Color32,
}

fn light_direction() -> Vector3 {
    Vector3::new(0.4, 1.0, 0.3).normalize()
}

/// 按法线与光照方向的夹角计算明暗
fn shade(color: Color, normal: &Vector3) -> egui::Color32 {
    let intensity = AMBIENT + (1.0 - AMBIENT) * normal.dot(&light_direction()).abs();
    let scale = |c: u8| (c as f64 * intensity).round().clamp(0.0, 255.0) as u8;
    egui::Color32::from_rgba_unmultiplied(scale(color.r), scale(color.g), scale(color.b), color.a)
}

/// 叠加自发光
fn with_emissive(color: Color, emissive: Option<(Color, f32)>) -> Color {
    let Some((glow, intensity)) = emissive else {
        return color;
    };
    let add = |base: u8, light: u8| (base as f32 + light as f32 * intensity).min(255.0) as u8;
    Color::with_alpha(
        add(color.r, glow.r),
        add(color.g, glow.g),
        add(color.b, glow.b),
        color.a,
    )
}

/// 场景投影器
pub struct SceneProjector<'a> {
    camera: &'a OrbitCamera,
    origin: egui::Pos2,
    eye: Point3,
    triangles: Vec<ProjectedTriangle>,
}

impl<'a> SceneProjector<'a> {
    pub fn new(camera: &'a OrbitCamera, origin: egui::Pos2) -> Self {
        Self {
            camera,
            origin,
            eye: camera.position(),
            triangles: Vec::new(),
        }
    }

    fn faces_camera(&self, point: &Point3, normal: &Vector3) -> bool {
        normal.dot(&(self.eye - point)) > 0.0
    }

    fn push(&mut self, corners: [Point3; 3], color: egui::Color32) {
        let mut points = [egui::Pos2::ZERO; 3];
        for (slot, corner) in points.iter_mut().zip(&corners) {
            let Some((screen, _)) = self.camera.world_to_screen(corner) else {
                return;
            };
            *slot = self.origin + egui::vec2(screen.x as f32, screen.y as f32);
        }
        let centroid =
            Point3::from((corners[0].coords + corners[1].coords + corners[2].coords) / 3.0);
        self.triangles.push(ProjectedTriangle {
            points,
            distance: (centroid - self.eye).norm(),
            color,
        });
    }

    fn add_surface(&mut self, surface: &Surface) {
        let vertices = &surface.mesh.vertices;
        for tri in surface.mesh.indices.chunks_exact(3) {
            let corners = [0, 1, 2].map(|k| {
                let p = vertices[tri[k] as usize].position;
                Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
            });
            let n = vertices[tri[0] as usize].normal;
            let normal = Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64);
            if !self.faces_camera(&corners[0], &normal) {
                continue;
            }
            self.push(corners, shade(surface.material.color, &normal));
        }
    }

    /// 收集整个场景的三角形
    pub fn add_scene(&mut self, scene: &RoomScene) {
        for surface in scene.shell.surfaces() {
            self.add_surface(surface);
        }

        for instance in &scene.furniture {
            let corners = instance.world_corners();
            let center = Point3::from(
                corners.iter().fold(Vector3::zeros(), |acc, c| acc + c.coords) / 8.0,
            );
            let color = with_emissive(instance.color, instance.emissive());

            for face in BOX_FACES {
                let [a, b, c, d] = face.map(|i| corners[i]);
                let Some(mut normal) = (b - a).cross(&(d - a)).try_normalize(f64::EPSILON) else {
                    continue;
                };
                let face_center = Point3::from((a.coords + b.coords + c.coords + d.coords) / 4.0);
                if normal.dot(&(face_center - center)) < 0.0 {
                    normal = -normal;
                }
                if !self.faces_camera(&face_center, &normal) {
                    continue;
                }
                let shaded = shade(color, &normal);
                self.push([a, b, c], shaded);
                self.push([a, c, d], shaded);
            }
        }
    }

    /// 从远到近生成 egui 网格
    pub fn into_mesh(mut self) -> egui::Mesh {
        self.triangles
            .sort_by(|a, b| b.distance.total_cmp(&a.distance));

        let mut mesh = egui::Mesh::default();
        for triangle in &self.triangles {
            let base = mesh.vertices.len() as u32;
            for point in triangle.points {
                mesh.colored_vertex(point, triangle.color);
            }
            mesh.add_triangle(base, base + 1, base + 2);
        }
        mesh
    }
}

/// 3D点击的选中结果：命中家具时选中它，未命中时保持原有选中
pub fn select_picked(store: &mut RoomStore, hit: Option<FurnitureId>) {
    if let Some(id) = hit {
        store.set_selected_furniture(Some(id));
    }
}

/// 绘制占位盒上方的状态标记
pub fn paint_badges(
    painter: &egui::Painter,
    scene: &RoomScene,
    camera: &OrbitCamera,
    origin: egui::Pos2,
) {
    for instance in &scene.furniture {
        let Some(badge) = &instance.badge else {
            continue;
        };
        let top = instance
            .world_corners()
            .iter()
            .map(|c| c.y)
            .fold(f64::MIN, f64::max);
        let anchor = Point3::new(instance.position.x, top + 0.1, instance.position.z);
        let Some((screen, _)) = camera.world_to_screen(&anchor) else {
            continue;
        };
        painter.text(
            origin + egui::vec2(screen.x as f32, screen.y as f32),
            egui::Align2::CENTER_BOTTOM,
            badge.label(),
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }
}
