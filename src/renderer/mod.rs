//! 2D rendering module
//!
//! The draw pass talks to an abstract [`Surface`]. The browser build backs it with a canvas
//! 2D context; tests and the native demo use [`RecordingSurface`].

pub mod background;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod draw;
pub mod recording;

use glam::Vec2;

pub use background::Background;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use draw::draw_frame;
pub use recording::{DrawCmd, RecordingSurface};

/// Linear RGBA, each channel in [0, 1]
pub type Rgba = [f32; 4];

/// Sprite sheets the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Player,
    Enemy,
}

/// One segment of a filled outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSeg {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Cubic bezier: two control points, then the end point
    CubicTo(Vec2, Vec2, Vec2),
}

/// Immediate-mode 2D drawing target
///
/// Transforms and alpha follow canvas semantics: they stack between `save` and `restore`.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, sx: f32, sy: f32);
    fn rotate(&mut self, angle: f32);
    /// Global alpha for subsequent draws, restored by `restore`
    fn set_alpha(&mut self, alpha: f32);

    fn clear(&mut self, width: f32, height: f32);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
    /// Radial glow, `inner` at the center fading to `outer` at `radius`
    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn fill_path(&mut self, path: &[PathSeg], color: Rgba);

    /// Whether `sprite` has finished loading
    fn sprite_ready(&self, sprite: Sprite) -> bool;
    /// Draw `sprite` centered on the origin with the given size
    fn draw_sprite(&mut self, sprite: Sprite, size: Vec2);

    /// Cover a `width` x `height` area with the grass tile
    ///
    /// Backends that can cache the tile as a pattern should override this.
    fn fill_background(&mut self, background: &Background, width: f32, height: f32) {
        for origin in Background::tile_origins(width, height) {
            background.draw_tile(self, origin);
        }
    }
}

/// Hex color helper for the palette constants
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

