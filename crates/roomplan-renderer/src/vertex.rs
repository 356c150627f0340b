//! 顶点数据定义

/// 房间与家具网格顶点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    /// 位置 (x, y, z)
    pub position: [f32; 3],
    /// 法线
    pub normal: [f32; 3],
    /// 颜色 (r, g, b, a)
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}
