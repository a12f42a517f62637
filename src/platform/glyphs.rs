//! Glyph rasterization with an offscreen 2D canvas

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::SetupError;
use crate::sprites::{GlyphRasterizer, SpriteImage, sprite_dimension};

fn backend_error(what: &str, err: JsValue) -> SetupError {
    SetupError::BackendUnavailable(format!("{}: {:?}", what, err))
}

/// Draws emoji glyphs with the browser's text renderer
pub struct CanvasRasterizer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRasterizer {
    pub fn new(document: &Document) -> Result<Self, SetupError> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| backend_error("create canvas", e))?
            .dyn_into()
            .map_err(|e| backend_error("not a canvas", e.into()))?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| backend_error("get 2d context", e))?
            .ok_or_else(|| SetupError::BackendUnavailable("2d canvas context unsupported".into()))?
            .dyn_into()
            .map_err(|e| backend_error("not a 2d context", e.into()))?;
        Ok(Self { canvas, ctx })
    }
}

impl GlyphRasterizer for CanvasRasterizer {
    fn rasterize(&mut self, glyph: &str, px: u32) -> Result<SpriteImage, SetupError> {
        let dim = sprite_dimension(px);
        // Resizing also resets the context state
        self.canvas.set_width(dim);
        self.canvas.set_height(dim);

        let center = dim as f64 / 2.0;
        self.ctx.clear_rect(0.0, 0.0, dim as f64, dim as f64);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_font(&format!("{}px serif", px));
        self.ctx
            .fill_text(glyph, center, center)
            .map_err(|e| backend_error("fill_text", e))?;

        let data = self
            .ctx
            .get_image_data(0.0, 0.0, dim as f64, dim as f64)
            .map_err(|e| backend_error("get_image_data", e))?;

        Ok(SpriteImage {
            width: dim,
            height: dim,
            pixels: data.data().0,
        })
    }
}
