//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists into one [`Mesh`] so the frame is a
//! single draw call. Solid shapes sample the atlas white texel.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::sprites::SpriteRect;

/// Per-frame vertex accumulator
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    white_uv: [f32; 2],
}

impl Mesh {
    pub fn new(white_uv: Vec2) -> Self {
        Self {
            vertices: Vec::new(),
            white_uv: white_uv.to_array(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn solid(&mut self, p: Vec2, color: [f32; 4]) {
        self.vertices.push(Vertex::new(p.x, p.y, self.white_uv, color));
    }

    /// Offset every vertex pushed since `from`
    pub fn translate_from(&mut self, from: usize, offset: Vec2) {
        if offset == Vec2::ZERO {
            return;
        }
        for v in &mut self.vertices[from..] {
            v.position[0] += offset.x;
            v.position[1] += offset.y;
        }
    }

    /// Thick line segment as a quad
    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        let dir = (b - a).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        // Perpendicular for width
        let perp = dir.perp() * (width / 2.0);

        let a1 = a + perp;
        let a2 = a - perp;
        let b1 = b + perp;
        let b2 = b - perp;

        self.solid(a1, color);
        self.solid(a2, color);
        self.solid(b1, color);

        self.solid(b1, color);
        self.solid(a2, color);
        self.solid(b2, color);
    }

    /// Filled circle
    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
        for i in 0..segments {
            let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
            let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

            // Triangle from center to edge
            self.solid(center, color);
            self.solid(center + Vec2::from_angle(theta1) * radius, color);
            self.solid(center + Vec2::from_angle(theta2) * radius, color);
        }
    }

    /// Ring (hollow circle)
    pub fn ring(&mut self, center: Vec2, inner_radius: f32, outer_radius: f32, color: [f32; 4], segments: u32) {
        for i in 0..segments {
            let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
            let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

            let inner1 = center + d1 * inner_radius;
            let outer1 = center + d1 * outer_radius;
            let inner2 = center + d2 * inner_radius;
            let outer2 = center + d2 * outer_radius;

            // Two triangles per segment
            self.solid(inner1, color);
            self.solid(outer1, color);
            self.solid(inner2, color);

            self.solid(inner2, color);
            self.solid(outer1, color);
            self.solid(outer2, color);
        }
    }

    /// Soft halo: full `color` inside `radius`, fading to transparent over `blur`
    pub fn glow(&mut self, center: Vec2, radius: f32, blur: f32, color: [f32; 4], segments: u32) {
        let clear = [color[0], color[1], color[2], 0.0];
        self.circle(center, radius, color, segments);
        self.vertices.reserve((segments * 6) as usize);
        for i in 0..segments {
            let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
            let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

            let inner1 = center + d1 * radius;
            let inner2 = center + d2 * radius;
            let outer1 = center + d1 * (radius + blur);
            let outer2 = center + d2 * (radius + blur);

            self.solid(inner1, color);
            self.solid(outer1, clear);
            self.solid(inner2, color);

            self.solid(inner2, color);
            self.solid(outer1, clear);
            self.solid(outer2, clear);
        }
    }

    /// Atlas sprite centered at `center`, rotated by `rotation` radians
    pub fn sprite(&mut self, rect: &SpriteRect, center: Vec2, rotation: f32, scale: f32, alpha: f32) {
        let half = rect.size * (scale / 2.0);
        let rot = Vec2::from_angle(rotation);
        let corner = |sx: f32, sy: f32| center + rot.rotate(Vec2::new(sx * half.x, sy * half.y));

        let tl = corner(-1.0, -1.0);
        let tr = corner(1.0, -1.0);
        let bl = corner(-1.0, 1.0);
        let br = corner(1.0, 1.0);

        let (u0, v0) = (rect.uv_min.x, rect.uv_min.y);
        let (u1, v1) = (rect.uv_max.x, rect.uv_max.y);
        let tint = [1.0, 1.0, 1.0, alpha];

        self.vertices.extend_from_slice(&[
            Vertex::new(tl.x, tl.y, [u0, v0], tint),
            Vertex::new(bl.x, bl.y, [u0, v1], tint),
            Vertex::new(tr.x, tr.y, [u1, v0], tint),
            Vertex::new(tr.x, tr.y, [u1, v0], tint),
            Vertex::new(bl.x, bl.y, [u0, v1], tint),
            Vertex::new(br.x, br.y, [u1, v1], tint),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Mesh {
        Mesh::new(Vec2::new(0.9, 0.9))
    }

    #[test]
    fn test_line_is_one_quad_with_width() {
        let mut m = mesh();
        m.line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 4.0, [1.0; 4]);
        assert_eq!(m.len(), 6);
        let ys: Vec<f32> = m.vertices.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 2.0).abs() < 1e-5));
        assert!(m.vertices.iter().all(|v| v.uv == [0.9, 0.9]));
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let mut m = mesh();
        m.line(Vec2::ONE, Vec2::ONE, 3.0, [1.0; 4]);
        assert!(m.is_empty());
    }

    #[test]
    fn test_glow_fades_to_transparent() {
        let mut m = mesh();
        m.glow(Vec2::ZERO, 10.0, 5.0, [1.0, 0.5, 0.0, 0.8], 8);
        assert_eq!(m.len(), 8 * 3 + 8 * 6);
        for v in &m.vertices {
            let r = Vec2::from(v.position).length();
            if r > 14.9 {
                assert_eq!(v.color[3], 0.0);
            }
        }
    }

    #[test]
    fn test_sprite_rotation_and_scale() {
        let rect = SpriteRect {
            uv_min: Vec2::ZERO,
            uv_max: Vec2::new(0.5, 0.5),
            size: Vec2::new(20.0, 20.0),
        };
        let mut m = mesh();
        m.sprite(&rect, Vec2::new(100.0, 100.0), PI / 2.0, 0.5, 0.3);
        assert_eq!(m.len(), 6);
        // Top-left corner rotated a quarter turn lands at (+5, -5)
        let tl = Vec2::from(m.vertices[0].position);
        assert!((tl - Vec2::new(105.0, 95.0)).length() < 1e-4);
        assert!(m.vertices.iter().all(|v| v.color[3] == 0.3));
    }

    #[test]
    fn test_translate_from_only_moves_tail() {
        let mut m = mesh();
        m.circle(Vec2::ZERO, 1.0, [1.0; 4], 4);
        let mark = m.len();
        m.circle(Vec2::ZERO, 1.0, [1.0; 4], 4);
        m.translate_from(mark, Vec2::new(3.0, 0.0));
        assert_eq!(m.vertices[0].position, [0.0, 0.0]);
        assert_eq!(m.vertices[mark].position, [3.0, 0.0]);
    }
}
