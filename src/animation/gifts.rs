use crossterm::style::Color;
use std::collections::VecDeque;
use rand::RngExt;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use std::f32::consts::TAU;

use crate::render::Canvas;
use crate::scene::ground::{GroundSurface, REFERENCE_FRAME};

pub const GIFT_CAPACITY: usize = 80;
/// Fall speed in pixels per reference frame.
pub const FALL_SPEED: f32 = 1.6;
/// Gifts touch down slightly above the surface line.
pub const LAND_OFFSET: f32 = 4.0;
pub const MIN_BURIAL: f32 = 2.0;
pub const MAX_BURIAL: f32 = 8.0;

const WRAPPING: [Color; 4] = [
    Color::Rgb { r: 214, g: 40, b: 57 },
    Color::Rgb { r: 38, g: 140, b: 80 },
    Color::Rgb { r: 60, g: 100, b: 210 },
    Color::Rgb { r: 230, g: 180, b: 40 },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Gift {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub rotation: f32,
    pub spin: f32,
    pub landed: bool,
    pub burial: f32,
    pub color: Color,
}

/// Dropped gifts, oldest first. Landing never removes a gift; only the
/// capacity bound does.
#[derive(Debug, Default)]
pub struct GiftPile {
    gifts: VecDeque<Gift>,
}

impl GiftPile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.gifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gift> {
        self.gifts.iter()
    }

    pub fn spawn(&mut self, x: f32, y: f32, rng: &mut SmallRng) {
        self.gifts.push_back(Gift {
            x,
            y,
            vy: FALL_SPEED,
            rotation: rng.random_range(0.0..TAU),
            spin: rng.random_range(-0.08..0.08),
            landed: false,
            burial: 0.0,
            color: WRAPPING.choose(rng).copied().unwrap_or(Color::Red),
        });
        while self.gifts.len() > GIFT_CAPACITY {
            self.gifts.pop_front();
        }
    }

    pub fn update(&mut self, dt: f32, ground: &GroundSurface, rng: &mut SmallRng) {
        let frames = dt / REFERENCE_FRAME;
        for gift in &mut self.gifts {
            let surface = ground.ground_y_at(gift.x);
            if gift.landed {
                gift.y = surface + gift.burial;
                continue;
            }

            gift.y += gift.vy * frames;
            gift.rotation += gift.spin * frames;
            if gift.y >= surface - LAND_OFFSET {
                gift.landed = true;
                gift.rotation = 0.0;
                gift.burial = rng.random_range(MIN_BURIAL..MAX_BURIAL);
                gift.y = surface + gift.burial;
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        for gift in &self.gifts {
            let ch = if gift.landed {
                '▣'
            } else {
                ['▣', '◆', '■', '◆'][((gift.rotation.rem_euclid(TAU) / TAU) * 4.0) as usize % 4]
            };
            // the glyph sits one cell above the point where it rests
            canvas.plot(gift.x, gift.y - 12.0, ch, gift.color);
        }
    }
}
