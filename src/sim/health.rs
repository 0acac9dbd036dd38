//! Health pickups dropped by dying enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::state::Bounds;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthItem {
    pub pos: Vec2,
    pub size: f32,
    /// Visual scale, bounces between 0.8 and 1.2
    pub pulse_scale: f32,
    pub pulse_step: f32,
}

impl HealthItem {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size,
            pulse_scale: 1.0,
            pulse_step: 0.02,
        }
    }

    pub fn update(&mut self) {
        self.pulse_scale += self.pulse_step;
        if self.pulse_scale > 1.2 || self.pulse_scale < 0.8 {
            self.pulse_step = -self.pulse_step;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthItemManager {
    pub items: Vec<HealthItem>,
    pub max_items: usize,
    pub drop_chance: f32,
    item_size: f32,
    padding: f32,
}

impl HealthItemManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            items: Vec::new(),
            max_items: tuning.max_health_items,
            drop_chance: tuning.health_drop_chance,
            item_size: tuning.health_item_size,
            padding: tuning.health_item_padding,
        }
    }

    /// Place an item near `pos`, pulled inside the canvas. Refused when the field is full.
    pub fn spawn(&mut self, pos: Vec2, bounds: &Bounds) -> bool {
        if self.items.len() >= self.max_items {
            return false;
        }
        let pos = bounds.clamp_inside(pos, self.padding);
        log::debug!("Health item dropped at {:?}", pos);
        self.items.push(HealthItem::new(pos, self.item_size));
        true
    }

    pub fn update(&mut self) {
        for item in &mut self.items {
            item.update();
        }
    }

    /// Remove every item touching the player. Returns how many were collected.
    pub fn collect(&mut self, player_pos: Vec2, player_radius: f32) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| !circles_overlap(player_pos, player_radius, item.pos, item.size / 2.0));
        before - self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_bounces() {
        let mut item = HealthItem::new(Vec2::ZERO, 20.0);
        let mut max: f32 = 0.0;
        let mut min: f32 = 2.0;
        for _ in 0..100 {
            item.update();
            max = max.max(item.pulse_scale);
            min = min.min(item.pulse_scale);
        }
        assert!(max < 1.25 && max > 1.19);
        assert!(min > 0.75 && min < 0.81);
    }

    #[test]
    fn spawn_clamps_and_caps() {
        let mut items = HealthItemManager::new(&Tuning::default());
        let bounds = Bounds::new(800.0, 600.0);
        assert!(items.spawn(Vec2::new(-20.0, 900.0), &bounds));
        assert_eq!(items.items[0].pos, Vec2::new(30.0, 570.0));
        assert!(items.spawn(Vec2::new(100.0, 100.0), &bounds));
        assert!(!items.spawn(Vec2::new(200.0, 100.0), &bounds));
    }

    #[test]
    fn collect_by_proximity() {
        let mut items = HealthItemManager::new(&Tuning::default());
        let bounds = Bounds::new(800.0, 600.0);
        items.spawn(Vec2::new(100.0, 100.0), &bounds);
        items.spawn(Vec2::new(500.0, 100.0), &bounds);

        assert_eq!(items.collect(Vec2::new(130.0, 100.0), 24.0), 1);
        assert_eq!(items.items.len(), 1);
        assert_eq!(items.items[0].pos, Vec2::new(500.0, 100.0));
        assert_eq!(items.collect(Vec2::new(300.0, 300.0), 24.0), 0);
    }
}
