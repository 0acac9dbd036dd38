//! Grass background
//!
//! A 200x200 tile of speckles, blades and flowers generated once from a seed and repeated
//! across the canvas.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Rgba, Surface, rgb};

pub const TILE_SIZE: f32 = 200.0;

const BASE: Rgba = rgb(0x2d, 0x5a, 0x27);
const LIGHT_PATCH: Rgba = [65.0 / 255.0, 120.0 / 255.0, 50.0 / 255.0, 0.4];
const DARK_PATCH: Rgba = [30.0 / 255.0, 60.0 / 255.0, 25.0 / 255.0, 0.4];
const BLADE: Rgba = [65.0 / 255.0, 120.0 / 255.0, 50.0 / 255.0, 0.3];
const WHITE_FLOWER: Rgba = [1.0, 1.0, 1.0, 0.3];
const YELLOW_FLOWER: Rgba = [1.0, 1.0, 0.0, 0.3];

const SPECKLES: usize = 1000;
const BLADES: usize = 200;
const FLOWERS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blade {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone)]
pub struct Background {
    pub seed: u64,
    pub dots: Vec<Dot>,
    pub blades: Vec<Blade>,
}

impl Background {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let point = |rng: &mut Pcg32| {
            Vec2::new(rng.random::<f32>() * TILE_SIZE, rng.random::<f32>() * TILE_SIZE)
        };

        let mut dots = Vec::with_capacity(SPECKLES + FLOWERS);
        for _ in 0..SPECKLES {
            let pos = point(&mut rng);
            let radius = rng.random::<f32>() * 4.0 + 1.0;
            let color = if rng.random::<f32>() < 0.5 {
                LIGHT_PATCH
            } else {
                DARK_PATCH
            };
            dots.push(Dot { pos, radius, color });
        }

        let blades = (0..BLADES)
            .map(|_| {
                let from = point(&mut rng);
                let length = rng.random::<f32>() * 6.0 + 3.0;
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                Blade {
                    from,
                    to: from + crate::heading(angle) * length,
                }
            })
            .collect();

        for _ in 0..FLOWERS {
            let pos = point(&mut rng);
            let radius = rng.random::<f32>() * 2.0 + 1.0;
            let color = if rng.random::<f32>() < 0.5 {
                WHITE_FLOWER
            } else {
                YELLOW_FLOWER
            };
            dots.push(Dot { pos, radius, color });
        }

        Self { seed, dots, blades }
    }

    pub fn base_color(&self) -> Rgba {
        BASE
    }

    /// Draw one tile with its top-left corner at `origin`
    pub fn draw_tile<S: Surface + ?Sized>(&self, surface: &mut S, origin: Vec2) {
        surface.fill_rect(origin, Vec2::splat(TILE_SIZE), BASE);
        for dot in &self.dots {
            surface.fill_circle(origin + dot.pos, dot.radius, dot.color);
        }
        for blade in &self.blades {
            surface.stroke_line(origin + blade.from, origin + blade.to, 1.0, BLADE);
        }
    }

    /// Top-left corners of the tiles covering a `width` x `height` area
    pub fn tile_origins(width: f32, height: f32) -> impl Iterator<Item = Vec2> {
        let cols = (width / TILE_SIZE).ceil().max(0.0) as u32;
        let rows = (height / TILE_SIZE).ceil().max(0.0) as u32;
        (0..rows).flat_map(move |row| {
            (0..cols).map(move |col| Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_texture() {
        let a = Background::new(7);
        let b = Background::new(7);
        assert_eq!(a.dots, b.dots);
        assert_eq!(a.blades, b.blades);
        assert_ne!(a.dots, Background::new(8).dots);
    }

    #[test]
    fn texture_stays_inside_tile() {
        let bg = Background::new(3);
        assert_eq!(bg.dots.len(), SPECKLES + FLOWERS);
        assert_eq!(bg.blades.len(), BLADES);
        assert!(
            bg.dots
                .iter()
                .all(|d| (0.0..TILE_SIZE).contains(&d.pos.x) && (0.0..TILE_SIZE).contains(&d.pos.y))
        );
    }

    #[test]
    fn tiles_cover_the_canvas() {
        let origins: Vec<_> = Background::tile_origins(800.0, 600.0).collect();
        assert_eq!(origins.len(), 12);
        let origins: Vec<_> = Background::tile_origins(810.0, 100.0).collect();
        assert_eq!(origins.len(), 5);
        assert_eq!(origins[4], Vec2::new(800.0, 0.0));
    }
}
