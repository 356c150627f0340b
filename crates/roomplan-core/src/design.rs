//! 房间设计数据模型
//!
//! 一个 [`RoomDesign`] 包含房间尺寸、平面形状、三种表面颜色和有序的家具列表。
//! 家具顺序即2D视图中的绘制顺序（后绘制的在上层）。

use crate::color::defaults;
use crate::entity::{DesignId, FurnitureId};
use crate::error::{CoreError, CoreResult};
use crate::math::{Triple, UNIT_SCALE, ZERO};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 房间平面形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomShape {
    /// 矩形
    #[default]
    #[serde(rename = "rectangular")]
    Rectangular,
    /// L形
    #[serde(rename = "L-shaped")]
    LShaped,
    /// 自由绘制的多边形
    #[serde(rename = "custom")]
    Custom,
}

impl RoomShape {
    pub fn label(&self) -> &'static str {
        match self {
            RoomShape::Rectangular => "Rectangular",
            RoomShape::LShaped => "L-Shaped",
            RoomShape::Custom => "Custom",
        }
    }

    pub fn all() -> [RoomShape; 3] {
        [RoomShape::Rectangular, RoomShape::LShaped, RoomShape::Custom]
    }
}

/// 自定义形状的归一化轮廓点，两个分量都在 [0, 1] 内
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapePoint {
    pub x: f64,
    pub y: f64,
}

impl ShapePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 视图模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "2d")]
    Plan2D,
    #[default]
    #[serde(rename = "3d")]
    Scene3D,
}

/// 房间中的一件家具
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureItem {
    pub id: FurnitureId,

    /// 目录类型标签（不强制校验）
    #[serde(rename = "type")]
    pub furniture_type: String,

    /// 房间局部坐标（米），原点在房间中心
    pub position: Triple,

    /// 欧拉角（弧度）
    pub rotation: Triple,

    /// 按轴缩放
    pub scale: Triple,

    pub color: String,

    /// 几何模型引用，缺省时使用目录中该类型的默认模型
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl FurnitureItem {
    /// 显示名称：优先使用目录名称，否则使用类型标签
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.furniture_type)
    }

    /// Y轴旋转（2D视图只使用这一分量）
    pub fn rotation_y(&self) -> f64 {
        self.rotation[1]
    }
}

/// 新增家具的输入（除ID外的全部字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFurnitureItem {
    #[serde(rename = "type")]
    pub furniture_type: String,
    pub position: Triple,
    pub rotation: Triple,
    pub scale: Triple,
    pub color: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl NewFurnitureItem {
    /// 使用原点、无旋转、单位缩放创建
    pub fn new(furniture_type: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            furniture_type: furniture_type.into(),
            position: ZERO,
            rotation: ZERO,
            scale: UNIT_SCALE,
            color: color.into(),
            model: None,
            name: None,
            thumbnail: None,
        }
    }

    pub fn with_position(mut self, position: Triple) -> Self {
        self.position = position;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 分配ID，生成家具实例
    pub fn into_item(self, id: FurnitureId) -> FurnitureItem {
        FurnitureItem {
            id,
            furniture_type: self.furniture_type,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            color: self.color,
            model: self.model,
            name: self.name,
            thumbnail: self.thumbnail,
        }
    }
}

/// 家具的部分更新，只合并存在的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FurniturePatch {
    pub position: Option<Triple>,
    pub rotation: Option<Triple>,
    pub scale: Option<Triple>,
    pub color: Option<String>,
    pub model: Option<String>,
}

impl FurniturePatch {
    pub fn position(position: Triple) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: Triple) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn scale(scale: Triple) -> Self {
        Self {
            scale: Some(scale),
            ..Default::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
            && self.color.is_none()
            && self.model.is_none()
    }

    /// 合并到家具实例上
    pub fn apply_to(&self, item: &mut FurnitureItem) {
        if let Some(position) = self.position {
            item.position = position;
        }
        if let Some(rotation) = self.rotation {
            item.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            item.scale = scale;
        }
        if let Some(color) = &self.color {
            item.color = color.clone();
        }
        if let Some(model) = &self.model {
            item.model = Some(model.clone());
        }
    }
}

/// 房间设计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDesign {
    pub id: DesignId,
    pub name: String,

    /// 沿世界X轴的长度（米）
    pub length: f64,
    /// 沿世界Z轴的宽度（米）
    pub width: f64,
    pub height: f64,

    pub shape: RoomShape,

    /// 仅在 `shape == Custom` 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_points: Option<Vec<ShapePoint>>,

    pub wall_color: String,
    pub floor_color: String,
    pub ceiling_color: String,

    pub furniture: Vec<FurnitureItem>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomDesign {
    pub fn furniture(&self, id: FurnitureId) -> Option<&FurnitureItem> {
        self.furniture.iter().find(|f| f.id == id)
    }

    pub fn furniture_mut(&mut self, id: FurnitureId) -> Option<&mut FurnitureItem> {
        self.furniture.iter_mut().find(|f| f.id == id)
    }

    pub fn contains_furniture(&self, id: FurnitureId) -> bool {
        self.furniture(id).is_some()
    }

    /// 刷新修改时间，保证不会倒退
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }

    /// 较大的平面边长
    pub fn max_extent(&self) -> f64 {
        self.length.max(self.width)
    }
}

/// 新建设计的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomDesign {
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub shape: RoomShape,
    #[serde(default)]
    pub custom_points: Option<Vec<ShapePoint>>,
    pub wall_color: String,
    pub floor_color: String,
    pub ceiling_color: String,
}

impl Default for NewRoomDesign {
    fn default() -> Self {
        Self {
            name: String::new(),
            length: 5.0,
            width: 4.0,
            height: 2.5,
            shape: RoomShape::Rectangular,
            custom_points: None,
            wall_color: defaults::WALL.to_string(),
            floor_color: defaults::FLOOR.to_string(),
            ceiling_color: defaults::CEILING.to_string(),
        }
    }
}

impl NewRoomDesign {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 表单侧校验；存储层本身不调用
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyName);
        }
        for (name, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidDimension { name, value });
            }
        }
        for color in [&self.wall_color, &self.floor_color, &self.ceiling_color] {
            if crate::color::Color::parse(color).is_none() {
                return Err(CoreError::InvalidColor(color.clone()));
            }
        }
        Ok(())
    }

    pub fn into_design(self, id: DesignId, now: DateTime<Utc>) -> RoomDesign {
        let custom_points = match self.shape {
            RoomShape::Custom => self.custom_points,
            _ => None,
        };
        RoomDesign {
            id,
            name: self.name,
            length: self.length,
            width: self.width,
            height: self.height,
            shape: self.shape,
            custom_points,
            wall_color: self.wall_color,
            floor_color: self.floor_color,
            ceiling_color: self.ceiling_color,
            furniture: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
