//! Headless surface that records every call
//!
//! Used by tests and the native demo. Tracks the alpha stack so recorded fills carry the
//! opacity they would be composited with.

use std::collections::HashSet;

use glam::Vec2;

use super::{PathSeg, Rgba, Sprite, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Save,
    Restore,
    Translate(Vec2),
    Scale(f32, f32),
    Rotate(f32),
    Clear { width: f32, height: f32 },
    Rect { pos: Vec2, size: Vec2, color: Rgba, alpha: f32 },
    Circle { center: Vec2, radius: f32, color: Rgba, alpha: f32 },
    Ring { center: Vec2, radius: f32, width: f32, color: Rgba, alpha: f32 },
    Radial { center: Vec2, radius: f32, inner: Rgba, outer: Rgba, alpha: f32 },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba, alpha: f32 },
    Path { segments: usize, color: Rgba, alpha: f32 },
    Sprite { sprite: Sprite, size: Vec2, alpha: f32 },
    Background { seed: u64, width: f32, height: f32 },
}

#[derive(Debug)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCmd>,
    ready: HashSet<Sprite>,
    alpha: f32,
    alpha_stack: Vec<f32>,
}

impl RecordingSurface {
    /// Surface with no sprites loaded
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            ready: HashSet::new(),
            alpha: 1.0,
            alpha_stack: Vec::new(),
        }
    }

    /// Surface with every sprite loaded
    pub fn with_sprites() -> Self {
        let mut surface = Self::new();
        surface.ready.insert(Sprite::Player);
        surface.ready.insert(Sprite::Enemy);
        surface
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Count commands matching a predicate
    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|cmd| pred(cmd)).count()
    }

    /// True if every `Save` has a matching `Restore`
    pub fn balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for cmd in &self.commands {
            match cmd {
                DrawCmd::Save => depth += 1,
                DrawCmd::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.alpha_stack.push(self.alpha);
        self.commands.push(DrawCmd::Save);
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.alpha_stack.pop() {
            self.alpha = alpha;
        }
        self.commands.push(DrawCmd::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCmd::Translate(offset));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.commands.push(DrawCmd::Scale(sx, sy));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCmd::Rotate(angle));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn clear(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCmd::Clear { width, height });
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba) {
        self.commands.push(DrawCmd::Rect {
            pos,
            size,
            color,
            alpha: self.alpha,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
            alpha: self.alpha,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::Ring {
            center,
            radius,
            width,
            color,
            alpha: self.alpha,
        });
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        self.commands.push(DrawCmd::Radial {
            center,
            radius,
            inner,
            outer,
            alpha: self.alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
            alpha: self.alpha,
        });
    }

    fn fill_path(&mut self, path: &[PathSeg], color: Rgba) {
        self.commands.push(DrawCmd::Path {
            segments: path.len(),
            color,
            alpha: self.alpha,
        });
    }

    fn sprite_ready(&self, sprite: Sprite) -> bool {
        self.ready.contains(&sprite)
    }

    fn draw_sprite(&mut self, sprite: Sprite, size: Vec2) {
        self.commands.push(DrawCmd::Sprite {
            sprite,
            size,
            alpha: self.alpha,
        });
    }

    // One command instead of a few thousand primitives
    fn fill_background(&mut self, background: &super::Background, width: f32, height: f32) {
        self.commands.push(DrawCmd::Background {
            seed: background.seed,
            width,
            height,
        });
    }
}
