//! RoomPlan 3D投影
//!
//! 把房间设计投影为3D场景。
//!
//! # 特点
//!
//! - **共享轮廓**：墙、地面、天花板由与2D视图相同的平面轮廓生成
//! - **异步加载**：模型包围盒在后台任务中读取，加载期间显示占位盒
//! - **射线拾取**：与2D视图共享同一个选中状态

pub mod camera;
pub mod error;
pub mod model;
pub mod picking;
pub mod scene;
pub mod vertex;

pub use camera::OrbitCamera;
pub use error::LoadError;
pub use model::{FileGeometrySource, GeometrySource, LoadState, ModelRegistry};
pub use scene::{FurnitureInstance, RoomScene, RoomShell};
