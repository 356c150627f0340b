//! 颜色
//!
//! 设计数据中的颜色以 `#RRGGBB` 字符串保存，绘制时解析为 [`Color`]。

use serde::{Deserialize, Serialize};

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制值创建（如 0xA67C52）
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    /// 解析 `#RRGGBB`、`RRGGBB` 或 `#RGB` 格式的颜色字符串
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let bytes = hex::decode(expanded).ok()?;
        Some(Self::new(bytes[0], bytes[1], bytes[2]))
    }

    /// 解析失败时使用给定的后备颜色
    pub fn parse_or(text: &str, fallback: Color) -> Self {
        Self::parse(text).unwrap_or(fallback)
    }

    /// 输出 `#RRGGBB` 形式（大写）
    pub fn to_hex_string(&self) -> String {
        format!("#{}", hex::encode_upper([self.r, self.g, self.b]))
    }

    /// 转换为 [0.0, 1.0] 范围的浮点数组
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// 替换透明度（0.0 - 1.0）
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// 木质家具
    pub const WOOD: Color = Color::from_hex(0xA67C52);
    /// 中性布艺家具
    pub const NEUTRAL: Color = Color::from_hex(0x8E9196);
    /// 默认墙面
    pub const WALL: Color = Color::from_hex(0xF1F0FB);
    /// 选中高亮的光晕
    pub const SELECTION_GLOW: Color = Color::from_hex(0x9B87F5);
    /// 选中高亮的描边
    pub const SELECTION_STROKE: Color = Color::from_hex(0x7E69AB);
}

impl Default for Color {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// 默认颜色的字符串形式
pub mod defaults {
    pub const WALL: &str = "#F1F0FB";
    pub const FLOOR: &str = "#A67C52";
    pub const CEILING: &str = "#FFFFFF";
    pub const WOOD: &str = "#A67C52";
    pub const NEUTRAL: &str = "#8E9196";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_string() {
        assert_eq!(Color::parse("#A67C52"), Some(Color::WOOD));
        assert_eq!(Color::parse("a67c52"), Some(Color::WOOD));
        assert_eq!(Color::parse("#9b87f5"), Some(Color::SELECTION_GLOW));
        assert_eq!(Color::parse("#FFF"), Some(Color::WHITE));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Color::parse("#FFFF"), None);
        assert_eq!(Color::parse("#GGGGGG"), None);
        assert_eq!(Color::parse(""), None);
        assert_eq!(Color::parse_or("nope", Color::WALL), Color::WALL);
    }

    #[test]
    fn test_hex_string_output() {
        assert_eq!(Color::WALL.to_hex_string(), "#F1F0FB");
        assert_eq!(Color::parse(defaults::NEUTRAL), Some(Color::NEUTRAL));
    }

    #[test]
    fn test_with_opacity() {
        let c = Color::WALL.with_opacity(0.8);
        assert_eq!(c.a, 204);
        assert_eq!(c.r, Color::WALL.r);
    }
}
