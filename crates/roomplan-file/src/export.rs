//! 导出模块
//!
//! 把房间设计导出为 OBJ 文本（房间盒子 + 每件家具一个包围盒）或 JSON。
//! 家具的旋转只写入注释，不作用于顶点。

use crate::error::FileError;
use roomplan_core::design::RoomDesign;
use std::fmt::Write as _;
use std::path::Path;

/// 每个盒子的顶点数
const BOX_VERTICES: usize = 8;

/// 盒子的六个面（从1开始的局部顶点序号）
const BOX_FACES: [[usize; 4]; 6] = [
    [1, 2, 3, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 4, 8, 7],
    [4, 1, 5, 8],
    [5, 6, 7, 8],
];

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Obj,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Json => "json",
        }
    }
}

/// 颜色字符串转换为材质名（`#A67C52` → `color_A67C52`）
pub fn material_name(color: &str) -> String {
    color.replacen('#', "color_", 1)
}

/// 数字输出使用最短表示，并把 -0 规范为 0
fn num(value: f64) -> String {
    format!("{}", value + 0.0)
}

/// 导出为 OBJ 文本
pub fn design_to_obj(design: &RoomDesign) -> String {
    let (l, w, h) = (design.length, design.width, design.height);
    let mut obj = String::new();

    // 写入 String 不会失败
    let _ = writeln!(obj, "# Room Design OBJ Export");
    let _ = writeln!(obj, "# Name: {}", design.name);
    let _ = writeln!(obj, "# Dimensions: {} x {} x {}", num(l), num(w), num(h));
    obj.push('\n');

    obj.push_str("# Room Vertices\n");
    for y in [0.0, h] {
        let corners = [
            (-l / 2.0, -w / 2.0),
            (l / 2.0, -w / 2.0),
            (l / 2.0, w / 2.0),
            (-l / 2.0, w / 2.0),
        ];
        for (x, z) in corners {
            let _ = writeln!(obj, "v {} {} {}", num(x), num(y), num(z));
        }
    }

    obj.push_str("\n# Room Faces\n");
    obj.push_str("g Floor\n");
    let _ = writeln!(obj, "usemtl {}", material_name(&design.floor_color));
    obj.push_str("f 1 2 3 4\n");

    obj.push_str("\ng Walls\n");
    let _ = writeln!(obj, "usemtl {}", material_name(&design.wall_color));
    for face in ["f 1 2 6 5", "f 2 3 7 6", "f 3 4 8 7", "f 4 1 5 8"] {
        obj.push_str(face);
        obj.push('\n');
    }

    obj.push_str("\ng Ceiling\n");
    obj.push_str("f 5 6 7 8\n");

    obj.push_str("\n# Furniture Items\n");
    for (index, item) in design.furniture.iter().enumerate() {
        let base = BOX_VERTICES + index * BOX_VERTICES;
        let [px, py, pz] = item.position;
        let [rx, ry, rz] = item.rotation;
        let [sx, sy, sz] = item.scale;

        let _ = writeln!(obj, "\n# Furniture Item: {}", item.furniture_type);
        let _ = writeln!(obj, "# Position: {} {} {}", num(px), num(py), num(pz));
        let _ = writeln!(obj, "# Rotation: {} {} {}", num(rx), num(ry), num(rz));
        let _ = writeln!(obj, "# Scale: {} {} {}", num(sx), num(sy), num(sz));

        for y in [py - sy / 2.0, py + sy / 2.0] {
            for (x, z) in [
                (px - sx / 2.0, pz - sz / 2.0),
                (px + sx / 2.0, pz - sz / 2.0),
                (px + sx / 2.0, pz + sz / 2.0),
                (px - sx / 2.0, pz + sz / 2.0),
            ] {
                let _ = writeln!(obj, "v {} {} {}", num(x), num(y), num(z));
            }
        }

        let _ = writeln!(obj, "\ng Furniture_{index}");
        let _ = writeln!(obj, "usemtl {}", material_name(&item.color));
        for [a, b, c, d] in BOX_FACES {
            let _ = writeln!(obj, "f {} {} {} {}", base + a, base + b, base + c, base + d);
        }
    }

    obj
}

/// 导出为格式化的 JSON
pub fn design_to_json(design: &RoomDesign) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(design)?)
}

/// 导出 OBJ 到文件
pub fn export_obj_to_file(design: &RoomDesign, path: &Path) -> Result<(), FileError> {
    std::fs::write(path, design_to_obj(design))?;
    Ok(())
}

/// 通用导出函数
pub fn export_design(
    design: &RoomDesign,
    format: ExportFormat,
    path: &Path,
) -> Result<(), FileError> {
    match format {
        ExportFormat::Obj => export_obj_to_file(design, path),
        ExportFormat::Json => {
            std::fs::write(path, design_to_json(design)?)?;
            Ok(())
        }
    }
}
