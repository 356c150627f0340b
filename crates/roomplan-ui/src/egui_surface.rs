//! egui绘制适配
//!
//! 画布像素坐标相对于分配区域的左上角；凹多边形的填充先做三角剖分。

use crate::painter::{PathStyle, Surface};
use roomplan_core::color::Color;
use roomplan_core::footprint::Footprint;
use roomplan_core::math::Point2;

/// 光晕近似为若干层逐渐变淡的描边
const GLOW_LAYERS: usize = 4;

pub fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    background: egui::Color32,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2, background: egui::Color32) -> Self {
        Self {
            painter,
            origin,
            background,
        }
    }

    fn pos(&self, point: &Point2) -> egui::Pos2 {
        self.origin + egui::vec2(point.x as f32, point.y as f32)
    }

    fn fill(&self, points: &[Point2], color: egui::Color32) {
        let footprint = Footprint::from_points(points.to_vec());
        let mut mesh = egui::Mesh::default();
        for point in points {
            mesh.colored_vertex(self.pos(point), color);
        }
        for [a, b, c] in footprint.triangulate() {
            mesh.add_triangle(a as u32, b as u32, c as u32);
        }
        self.painter.add(egui::Shape::mesh(mesh));
    }

    fn outline(&self, points: &[egui::Pos2], closed: bool, stroke: egui::Stroke) {
        let shape = if closed {
            egui::Shape::closed_line(points.to_vec(), stroke)
        } else {
            egui::Shape::line(points.to_vec(), stroke)
        };
        self.painter.add(shape);
    }
}

impl Surface for EguiSurface<'_> {
    fn clear(&mut self) {
        self.painter
            .rect_filled(self.painter.clip_rect(), 0.0, self.background);
    }

    fn path(&mut self, points: &[Point2], closed: bool, style: PathStyle) {
        if points.is_empty() {
            return;
        }
        let screen: Vec<egui::Pos2> = points.iter().map(|p| self.pos(p)).collect();

        if let Some(glow) = style.glow {
            let step = glow.blur / GLOW_LAYERS as f32;
            for layer in (1..=GLOW_LAYERS).rev() {
                let alpha = (glow.color.a as f32 / (layer as f32 + 1.0)) as u8;
                let color = egui::Color32::from_rgba_unmultiplied(
                    glow.color.r,
                    glow.color.g,
                    glow.color.b,
                    alpha,
                );
                self.outline(&screen, closed, egui::Stroke::new(step * layer as f32, color));
            }
        }

        if let Some(fill) = style.fill {
            if points.len() >= 3 {
                self.fill(points, to_color32(fill));
            }
        }

        if let Some(stroke) = style.stroke {
            self.outline(
                &screen,
                closed,
                egui::Stroke::new(stroke.width, to_color32(stroke.color)),
            );
        }
    }

    fn dot(&mut self, center: Point2, radius: f64, color: Color) {
        self.painter
            .circle_filled(self.pos(&center), radius as f32, to_color32(color));
    }
}
