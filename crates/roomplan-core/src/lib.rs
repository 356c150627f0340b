//! RoomPlan 核心模型
//!
//! 提供房间设计的数据模型、平面轮廓、坐标变换与家具目录。
//!
//! # 架构设计
//!
//! - `RoomDesign`: 房间尺寸、形状、表面颜色与有序家具列表
//! - `Footprint`: 2D与3D视图共用的平面轮廓
//! - `FurnitureCatalogEntry`: 可放置的家具目录条目
//!
//! # 示例
//!
//! ```rust
//! use roomplan_core::prelude::*;
//!
//! let design = NewRoomDesign::named("Living").into_design(DesignId::new(), chrono::Utc::now());
//! let footprint = Footprint::for_design(&design);
//!
//! println!("Floor area: {}", footprint.area());
//! ```

pub mod catalog;
pub mod color;
pub mod design;
pub mod editing;
pub mod entity;
pub mod error;
pub mod footprint;
pub mod hit;
pub mod math;
pub mod transform;

pub use chrono;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::catalog::{FurnitureCatalogEntry, LocalModel, ProductRecord};
    pub use crate::color::Color;
    pub use crate::design::{
        FurnitureItem, FurniturePatch, NewFurnitureItem, NewRoomDesign, RoomDesign, RoomShape,
        ShapePoint, ViewMode,
    };
    pub use crate::editing::Axis;
    pub use crate::entity::{DesignId, FurnitureId};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::footprint::Footprint;
    pub use crate::hit::HitTestMode;
    pub use crate::math::{Point2, Point3, Triple, Vector2, Vector3};
    pub use crate::transform::Transform2D;
}
