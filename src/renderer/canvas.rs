//! Canvas 2D backend (WASM only)

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasPattern, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::background::TILE_SIZE;
use super::{Background, PathSeg, Rgba, Sprite, Surface};

/// CSS color string for an RGBA value
fn css(color: Rgba) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        color[3].clamp(0.0, 1.0)
    )
}

fn log_js_err(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("Canvas {} failed: {:?}", what, err);
    }
}

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    player: Option<HtmlImageElement>,
    enemy: Option<HtmlImageElement>,
    /// Grass tile pattern, cached per background seed
    pattern: Option<(u64, CanvasPattern)>,
}

impl CanvasSurface {
    /// Wrap the 2D context of `canvas`
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            player: None,
            enemy: None,
            pattern: None,
        })
    }

    /// Start loading a sprite; drawing falls back to shapes until it completes
    pub fn load_sprite(&mut self, sprite: Sprite, src: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        image.set_src(src);
        log::info!("Loading {:?} sprite from {}", sprite, src);
        match sprite {
            Sprite::Player => self.player = Some(image),
            Sprite::Enemy => self.enemy = Some(image),
        }
        Ok(())
    }

    fn image(&self, sprite: Sprite) -> Option<&HtmlImageElement> {
        match sprite {
            Sprite::Player => self.player.as_ref(),
            Sprite::Enemy => self.enemy.as_ref(),
        }
    }

    /// Render the grass tile into an offscreen canvas and turn it into a repeating pattern
    fn build_pattern(&self, background: &Background) -> Result<CanvasPattern, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let tile: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        tile.set_width(TILE_SIZE as u32);
        tile.set_height(TILE_SIZE as u32);

        let mut offscreen = CanvasSurface::new(&tile)?;
        background.draw_tile(&mut offscreen, Vec2::ZERO);

        self.ctx
            .create_pattern_with_html_canvas_element(&tile, "repeat")?
            .ok_or_else(|| JsValue::from_str("pattern unavailable"))
    }

    fn circle_path(&self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        log_js_err(
            "arc",
            self.ctx
                .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU),
        );
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        log_js_err("translate", self.ctx.translate(offset.x as f64, offset.y as f64));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        log_js_err("scale", self.ctx.scale(sx as f64, sy as f64));
    }

    fn rotate(&mut self, angle: f32) {
        log_js_err("rotate", self.ctx.rotate(angle as f64));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.circle_path(center, radius);
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.circle_path(center, radius);
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        let (x, y) = (center.x as f64, center.y as f64);
        let gradient = match self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, radius.max(0.0) as f64)
        {
            Ok(gradient) => gradient,
            Err(err) => {
                log::warn!("Radial gradient failed: {:?}", err);
                return;
            }
        };
        log_js_err("color stop", gradient.add_color_stop(0.0, &css(inner)));
        log_js_err("color stop", gradient.add_color_stop(1.0, &css(outer)));

        self.circle_path(center, radius);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_path(&mut self, path: &[PathSeg], color: Rgba) {
        self.ctx.begin_path();
        for seg in path {
            match *seg {
                PathSeg::MoveTo(p) => self.ctx.move_to(p.x as f64, p.y as f64),
                PathSeg::LineTo(p) => self.ctx.line_to(p.x as f64, p.y as f64),
                PathSeg::CubicTo(c1, c2, end) => self.ctx.bezier_curve_to(
                    c1.x as f64,
                    c1.y as f64,
                    c2.x as f64,
                    c2.y as f64,
                    end.x as f64,
                    end.y as f64,
                ),
            }
        }
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.fill();
    }

    fn sprite_ready(&self, sprite: Sprite) -> bool {
        self.image(sprite)
            .is_some_and(|image| image.complete() && image.natural_height() != 0)
    }

    fn draw_sprite(&mut self, sprite: Sprite, size: Vec2) {
        let Some(image) = self.image(sprite) else {
            return;
        };
        log_js_err(
            "drawImage",
            self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                (-size.x / 2.0) as f64,
                (-size.y / 2.0) as f64,
                size.x as f64,
                size.y as f64,
            ),
        );
    }

    fn fill_background(&mut self, background: &Background, width: f32, height: f32) {
        let cached = matches!(&self.pattern, Some((seed, _)) if *seed == background.seed);
        if !cached {
            match self.build_pattern(background) {
                Ok(pattern) => self.pattern = Some((background.seed, pattern)),
                Err(err) => {
                    log::warn!("Background pattern failed, using flat fill: {:?}", err);
                    self.fill_rect(Vec2::ZERO, Vec2::new(width, height), background.base_color());
                    return;
                }
            }
        }
        if let Some((_, pattern)) = &self.pattern {
            self.ctx.set_fill_style_canvas_pattern(pattern);
            self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        }
    }
}
