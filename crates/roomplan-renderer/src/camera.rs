//! 轨道相机
//!
//! 相机围绕目标点旋转，输入累积为速度，每次 `update` 按阻尼系数逐步释放。

use roomplan_core::design::RoomDesign;
use roomplan_core::math::{Matrix4, Point2, Point3, Vector3};

const MIN_PITCH: f64 = -1.55;
const MAX_PITCH: f64 = 1.55;
const MIN_DISTANCE: f64 = 0.5;
const MAX_DISTANCE: f64 = 200.0;
/// 速度低于该值时视为静止
const REST_THRESHOLD: f64 = 1e-6;

/// 累积的输入速度
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Velocity {
    yaw: f64,
    pitch: f64,
    zoom: f64,
    pan: Vector3,
}

impl Velocity {
    fn is_resting(&self) -> bool {
        self.yaw.abs() < REST_THRESHOLD
            && self.pitch.abs() < REST_THRESHOLD
            && self.zoom.abs() < REST_THRESHOLD
            && self.pan.norm() < REST_THRESHOLD
    }
}

/// 轨道相机
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// 注视点（世界坐标）
    pub target: Point3,

    /// 到注视点的距离
    pub distance: f64,

    /// 绕Y轴角度（弧度），0 时相机位于 +Z 方向
    pub yaw: f64,

    /// 俯仰角（弧度），正值表示相机在注视点上方
    pub pitch: f64,

    /// 垂直视场角
    pub fov_y: f64,

    pub near: f64,
    pub far: f64,

    /// 视口宽度（像素）
    pub viewport_width: f32,

    /// 视口高度（像素）
    pub viewport_height: f32,

    /// 每次更新释放的速度比例
    pub damping: f64,

    velocity: Velocity,
}

impl OrbitCamera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            target: Point3::origin(),
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 50f64.to_radians(),
            near: 0.1,
            far: 1000.0,
            viewport_width,
            viewport_height,
            damping: 0.1,
            velocity: Velocity::default(),
        };
        camera.set_position(Point3::new(5.0, 5.0, 5.0));
        camera
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    pub fn aspect(&self) -> f64 {
        self.viewport_width as f64 / self.viewport_height.max(1.0) as f64
    }

    /// 相机位置
    pub fn position(&self) -> Point3 {
        let horizontal = self.distance * self.pitch.cos();
        self.target
            + Vector3::new(
                horizontal * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                horizontal * self.yaw.cos(),
            )
    }

    /// 把相机放到指定位置，保持注视点不变
    pub fn set_position(&mut self, position: Point3) {
        let offset = position - self.target;
        let distance = offset.norm();
        if distance <= f64::EPSILON {
            return;
        }
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / distance).asin().clamp(MIN_PITCH, MAX_PITCH);
    }

    /// 针对设计取景：位置 (m, 0.8m, m)，注视房间中心 (0, h/2, 0)
    pub fn frame_design(&mut self, design: &RoomDesign) {
        let m = design.max_extent();
        self.target = Point3::new(0.0, design.height / 2.0, 0.0);
        self.set_position(Point3::new(m, 0.8 * m, m));
        self.velocity = Velocity::default();
    }

    /// 旋转输入（弧度）
    pub fn orbit(&mut self, delta_yaw: f64, delta_pitch: f64) {
        self.velocity.yaw += delta_yaw;
        self.velocity.pitch += delta_pitch;
    }

    /// 平移输入（屏幕方向，单位与距离成正比）
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        let scale = self.distance * 0.002;
        self.velocity.pan += (-right * dx + up * dy) * scale;
    }

    /// 缩放输入，正值拉近
    pub fn zoom(&mut self, delta: f64) {
        self.velocity.zoom += delta;
    }

    /// 释放一部分累积速度；返回是否仍在运动
    pub fn update(&mut self) -> bool {
        let d = self.damping;
        let v = self.velocity;

        self.yaw += v.yaw * d;
        self.pitch = (self.pitch + v.pitch * d).clamp(MIN_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1.0 - v.zoom * d)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.target += v.pan * d;

        let keep = 1.0 - d;
        self.velocity = Velocity {
            yaw: v.yaw * keep,
            pitch: v.pitch * keep,
            zoom: v.zoom * keep,
            pan: v.pan * keep,
        };
        if self.velocity.is_resting() {
            self.velocity = Velocity::default();
            return false;
        }
        true
    }

    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at_rh(&self.position(), &self.target, &Vector3::y())
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        Matrix4::new_perspective(self.aspect(), self.fov_y, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// 世界坐标投影到屏幕像素；位于相机后方时返回 None
    ///
    /// 返回值的第二项为NDC深度。
    pub fn world_to_screen(&self, world: &Point3) -> Option<(Point2, f64)> {
        let clip = self.view_projection() * world.to_homogeneous();
        if clip.w <= f64::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let x = (ndc.x + 1.0) / 2.0 * self.viewport_width as f64;
        let y = (1.0 - ndc.y) / 2.0 * self.viewport_height as f64;
        Some((Point2::new(x, y), ndc.z))
    }

    /// 屏幕像素 → 世界射线（起点，单位方向）
    pub fn screen_ray(&self, screen: Point2) -> Option<(Point3, Vector3)> {
        let inverse = self.view_projection().try_inverse()?;
        let ndc_x = 2.0 * screen.x / self.viewport_width as f64 - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.viewport_height as f64;

        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
        let direction = (far - near).try_normalize(f64::EPSILON)?;
        Some((near, direction))
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}
