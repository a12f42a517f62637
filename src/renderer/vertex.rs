//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Textured, tinted 2D vertex. Untextured shapes sample the atlas white texel.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv,
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// RGBA from 0-255 channels plus alpha
pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

/// Colors for scene elements
pub mod colors {
    use super::rgba;

    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
    pub const FOOD_LINK: [f32; 4] = rgba(255, 160, 60, 0.55);
    pub const POINTER_LINK: [f32; 4] = rgba(160, 230, 160, 0.5);
    pub const DANGER_LINK: [f32; 4] = rgba(255, 60, 60, 0.5);
    pub const FOOD_GLOW: [f32; 4] = rgba(255, 165, 0, 1.0);
    pub const HAZARD_GLOW: [f32; 4] = rgba(255, 40, 40, 1.0);
    pub const BLAST_FLASH: [f32; 4] = rgba(255, 80, 30, 0.4);
    pub const BLAST_RING: [f32; 4] = rgba(255, 50, 20, 0.8);
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
