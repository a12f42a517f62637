//! Glyph sprite cache and texture atlas
//!
//! Every glyph is rasterized exactly once per session into a fixed-size
//! square image, then shelf-packed into one RGBA atlas. Drawing a sprite is a
//! single textured quad; no per-frame text shaping.

use std::collections::HashMap;

use glam::Vec2;

use crate::consts::*;
use crate::error::SetupError;

/// Straight-alpha RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SpriteImage {
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Renders a glyph centered in a `sprite_dimension(px)` square
pub trait GlyphRasterizer {
    fn rasterize(&mut self, glyph: &str, px: u32) -> Result<SpriteImage, SetupError>;
}

/// Side of the square canvas for a glyph of `px` pixels: 30% padding
/// each side so glow and rotation never clip
pub fn sprite_dimension(px: u32) -> u32 {
    px + 2 * (px as f32 * 0.3).ceil() as u32
}

/// Cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Food,
    Avatar,
    Hazard,
    /// Index into `DEBRIS_GLYPH_SIZES`
    Debris(usize),
}

impl SpriteId {
    pub fn all() -> impl Iterator<Item = SpriteId> {
        [SpriteId::Food, SpriteId::Avatar, SpriteId::Hazard]
            .into_iter()
            .chain((0..DEBRIS_GLYPH_SIZES.len()).map(SpriteId::Debris))
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            SpriteId::Food | SpriteId::Debris(_) => FOOD_GLYPH,
            SpriteId::Avatar => AVATAR_GLYPH,
            SpriteId::Hazard => HAZARD_GLYPH,
        }
    }

    pub fn glyph_size(&self) -> u32 {
        match *self {
            SpriteId::Food => FOOD_GLYPH_SIZE,
            SpriteId::Avatar => AVATAR_GLYPH_SIZE,
            SpriteId::Hazard => HAZARD_GLYPH_SIZE,
            SpriteId::Debris(tier) => DEBRIS_GLYPH_SIZES[tier.min(DEBRIS_GLYPH_SIZES.len() - 1)],
        }
    }
}

/// Location of one sprite in the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRect {
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    /// On-screen size in pixels
    pub size: Vec2,
}

pub const ATLAS_WIDTH: u32 = 256;
/// Gap between packed sprites
const PADDING: u32 = 1;
/// Opaque white block used for untextured shapes
const WHITE_BLOCK: u32 = 4;

/// Packed RGBA atlas ready for upload
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    rects: HashMap<SpriteId, SpriteRect>,
    white_uv: Vec2,
}

impl SpriteAtlas {
    pub fn rect(&self, id: SpriteId) -> Option<&SpriteRect> {
        self.rects.get(&id)
    }

    /// UV of a fully opaque white texel (center of the reserved block)
    pub fn white_uv(&self) -> Vec2 {
        self.white_uv
    }
}

/// Shelf packer: fill rows left to right, open a new row when full
struct ShelfPacker {
    width: u32,
    x: u32,
    y: u32,
    shelf_height: u32,
}

impl ShelfPacker {
    fn new(width: u32) -> Self {
        Self {
            width,
            x: 0,
            y: 0,
            shelf_height: 0,
        }
    }

    fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        if self.x + w > self.width && self.x > 0 {
            self.y += self.shelf_height + PADDING;
            self.x = 0;
            self.shelf_height = 0;
        }
        let origin = (self.x, self.y);
        self.x += w + PADDING;
        self.shelf_height = self.shelf_height.max(h);
        origin
    }

    fn height(&self) -> u32 {
        self.y + self.shelf_height
    }
}

/// All sprites for a session, keyed by [`SpriteId`]
#[derive(Debug, Clone)]
pub struct SpriteCache {
    atlas: SpriteAtlas,
}

impl SpriteCache {
    /// Rasterize every sprite once and pack them.
    ///
    /// Fails if any glyph comes back blank or mis-sized, so the frame loop
    /// never starts with missing sprites.
    pub fn build(rasterizer: &mut dyn GlyphRasterizer) -> Result<Self, SetupError> {
        let mut images = Vec::new();
        for id in SpriteId::all() {
            let px = id.glyph_size();
            let dim = sprite_dimension(px);
            let image = rasterizer.rasterize(id.glyph(), px)?;

            let expected = (dim * dim * 4) as usize;
            if image.width != dim || image.height != dim || image.pixels.len() != expected {
                return Err(SetupError::SpriteSize {
                    glyph: id.glyph().to_string(),
                    expected,
                    actual: image.pixels.len(),
                });
            }
            if image.is_blank() {
                return Err(SetupError::BlankSprite {
                    glyph: id.glyph().to_string(),
                    size: px,
                });
            }
            images.push((id, image));
        }

        // Tallest first keeps shelves tight
        images.sort_by(|a, b| b.1.height.cmp(&a.1.height));

        let mut packer = ShelfPacker::new(ATLAS_WIDTH);
        let mut placed = Vec::with_capacity(images.len());
        for (id, image) in images {
            let origin = packer.place(image.width, image.height);
            placed.push((id, image, origin));
        }
        let white_origin = packer.place(WHITE_BLOCK, WHITE_BLOCK);
        let height = packer.height().max(1);

        let width = ATLAS_WIDTH;
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let atlas_size = Vec2::new(width as f32, height as f32);
        let mut rects = HashMap::new();

        for (id, image, (ox, oy)) in placed {
            blit(&mut pixels, width, &image, ox, oy);
            let min = Vec2::new(ox as f32, oy as f32);
            let size = Vec2::new(image.width as f32, image.height as f32);
            rects.insert(
                id,
                SpriteRect {
                    uv_min: min / atlas_size,
                    uv_max: (min + size) / atlas_size,
                    size,
                },
            );
        }

        let (wx, wy) = white_origin;
        for y in wy..wy + WHITE_BLOCK {
            for x in wx..wx + WHITE_BLOCK {
                let i = ((y * width + x) * 4) as usize;
                pixels[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let half = WHITE_BLOCK as f32 / 2.0;
        let white_uv = Vec2::new(wx as f32 + half, wy as f32 + half) / atlas_size;

        log::info!("sprite atlas built: {}x{}, {} sprites", width, height, rects.len());

        Ok(Self {
            atlas: SpriteAtlas {
                width,
                height,
                pixels,
                rects,
                white_uv,
            },
        })
    }

    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteRect> {
        self.atlas.rect(id)
    }
}

fn blit(dst: &mut [u8], dst_width: u32, image: &SpriteImage, ox: u32, oy: u32) {
    let row_bytes = (image.width * 4) as usize;
    for row in 0..image.height {
        let src = (row * image.width * 4) as usize;
        let dst_start = (((oy + row) * dst_width + ox) * 4) as usize;
        dst[dst_start..dst_start + row_bytes].copy_from_slice(&image.pixels[src..src + row_bytes]);
    }
}

/// Cache filled with opaque squares, for tests elsewhere in the crate
#[cfg(test)]
pub(crate) fn solid_cache() -> SpriteCache {
    SpriteCache::build(&mut tests::FakeRasterizer::new()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fills a centered opaque square sized like the glyph
    pub(super) struct FakeRasterizer {
        calls: Vec<(String, u32)>,
        blank: Option<&'static str>,
    }

    impl FakeRasterizer {
        pub(super) fn new() -> Self {
            Self {
                calls: Vec::new(),
                blank: None,
            }
        }
    }

    impl GlyphRasterizer for FakeRasterizer {
        fn rasterize(&mut self, glyph: &str, px: u32) -> Result<SpriteImage, SetupError> {
            self.calls.push((glyph.to_string(), px));
            let dim = sprite_dimension(px);
            let mut pixels = vec![0u8; (dim * dim * 4) as usize];
            if self.blank != Some(glyph) {
                let pad = (dim - px) / 2;
                for y in pad..pad + px {
                    for x in pad..pad + px {
                        let i = ((y * dim + x) * 4) as usize;
                        pixels[i..i + 4].copy_from_slice(&[200, 100, 0, 255]);
                    }
                }
            }
            Ok(SpriteImage {
                width: dim,
                height: dim,
                pixels,
            })
        }
    }

    #[test]
    fn test_sprite_dimension() {
        assert_eq!(sprite_dimension(44), 72);
        assert_eq!(sprite_dimension(56), 90);
        assert_eq!(sprite_dimension(8), 14);
    }

    #[test]
    fn test_each_sprite_rasterized_once() {
        let mut r = FakeRasterizer::new();
        let cache = SpriteCache::build(&mut r).unwrap();
        assert_eq!(r.calls.len(), 3 + DEBRIS_GLYPH_SIZES.len());
        for id in SpriteId::all() {
            let rect = cache.get(id).unwrap();
            let dim = sprite_dimension(id.glyph_size()) as f32;
            assert_eq!(rect.size, Vec2::splat(dim));
        }
    }

    #[test]
    fn test_rects_fit_and_do_not_overlap() {
        let cache = SpriteCache::build(&mut FakeRasterizer::new()).unwrap();
        let atlas = cache.atlas();
        let rects: Vec<_> = SpriteId::all().map(|id| *cache.get(id).unwrap()).collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.uv_min.cmpge(Vec2::ZERO).all() && a.uv_max.cmple(Vec2::ONE).all());
            for b in &rects[i + 1..] {
                let disjoint = a.uv_max.x <= b.uv_min.x
                    || b.uv_max.x <= a.uv_min.x
                    || a.uv_max.y <= b.uv_min.y
                    || b.uv_max.y <= a.uv_min.y;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
        assert_eq!(atlas.pixels.len(), (atlas.width * atlas.height * 4) as usize);
    }

    #[test]
    fn test_white_texel_is_opaque() {
        let cache = SpriteCache::build(&mut FakeRasterizer::new()).unwrap();
        let atlas = cache.atlas();
        let uv = atlas.white_uv();
        let x = (uv.x * atlas.width as f32) as u32;
        let y = (uv.y * atlas.height as f32) as u32;
        let i = ((y * atlas.width + x) * 4) as usize;
        assert_eq!(&atlas.pixels[i..i + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_blank_glyph_fails_setup() {
        let mut r = FakeRasterizer::new();
        r.blank = Some(HAZARD_GLYPH);
        let err = SpriteCache::build(&mut r).unwrap_err();
        assert!(matches!(err, SetupError::BlankSprite { size: HAZARD_GLYPH_SIZE, .. }));
    }

    #[test]
    fn test_wrong_size_fails_setup() {
        struct Tiny;
        impl GlyphRasterizer for Tiny {
            fn rasterize(&mut self, _glyph: &str, _px: u32) -> Result<SpriteImage, SetupError> {
                Ok(SpriteImage {
                    width: 2,
                    height: 2,
                    pixels: vec![255; 16],
                })
            }
        }
        assert!(matches!(
            SpriteCache::build(&mut Tiny),
            Err(SetupError::SpriteSize { actual: 16, .. })
        ));
    }
}
