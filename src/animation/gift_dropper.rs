use crossterm::style::Color;

use rand::RngExt;
use rand::rngs::SmallRng;

use crate::animation::gifts::GiftPile;
use crate::render::{Canvas, Viewport, to_cell};
use crate::scene::ground::REFERENCE_FRAME;

/// Horizontal speed in pixels per reference frame.
pub const SPEED: f32 = 2.2;
/// How far past either edge the sleigh travels before it turns around.
pub const MARGIN: f32 = 160.0;
pub const MIN_GIFT_GAP_MS: f64 = 5.0 * 60_000.0;
pub const MAX_GIFT_GAP_MS: f64 = 10.0 * 60_000.0;
pub const MIN_WAIT_FRAMES: u32 = 100;
pub const MAX_WAIT_FRAMES: u32 = 300;

const SLEIGH_RIGHT: [&str; 3] = [
    r"  ___        ,\  ,\ ",
    r" \___\~~~~~~(oo)(oo)",
    r"  \__/       /\  /\ ",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropperState {
    Traveling,
    Waiting { countdown: u32 },
}

#[derive(Debug, Clone)]
pub struct GiftDropper {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub state: DropperState,
    pub next_gift_time: f64,
}

impl GiftDropper {
    /// Starts just off-screen; the first gift is due as soon as the sleigh
    /// is visible.
    pub fn new(viewport: Viewport, now_ms: f64, rng: &mut SmallRng) -> Self {
        let mut dropper = Self {
            x: 0.0,
            y: 0.0,
            direction: 1.0,
            state: DropperState::Traveling,
            next_gift_time: now_ms,
        };
        dropper.enter(viewport, rng);
        dropper
    }

    fn enter(&mut self, viewport: Viewport, rng: &mut SmallRng) {
        self.direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.x = if self.direction > 0.0 {
            -MARGIN
        } else {
            viewport.width + MARGIN
        };
        self.y = viewport.height * rng.random_range(0.08_f32..=0.25);
        self.state = DropperState::Traveling;
    }

    pub fn is_on_screen(&self, viewport: Viewport) -> bool {
        (0.0..=viewport.width).contains(&self.x)
    }

    pub fn update(
        &mut self,
        now_ms: f64,
        dt: f32,
        viewport: Viewport,
        rng: &mut SmallRng,
        gifts: &mut GiftPile,
    ) {
        match self.state {
            DropperState::Waiting { countdown } => {
                let countdown = countdown.saturating_sub(1);
                if countdown == 0 {
                    self.enter(viewport, rng);
                } else {
                    self.state = DropperState::Waiting { countdown };
                }
            }
            DropperState::Traveling => {
                self.x += SPEED * self.direction * (dt / REFERENCE_FRAME);

                if self.is_on_screen(viewport) && now_ms >= self.next_gift_time {
                    gifts.spawn(self.x, self.y, rng);
                    self.next_gift_time =
                        now_ms + rng.random_range(MIN_GIFT_GAP_MS..=MAX_GIFT_GAP_MS);
                    tracing::debug!(x = self.x, gifts = gifts.len(), "gift dropped");
                }

                let gone = if self.direction > 0.0 {
                    self.x > viewport.width + MARGIN
                } else {
                    self.x < -MARGIN
                };
                if gone {
                    let countdown = rng.random_range(MIN_WAIT_FRAMES..=MAX_WAIT_FRAMES);
                    self.state = DropperState::Waiting { countdown };
                }
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        if self.state != DropperState::Traveling {
            return;
        }
        let width = SLEIGH_RIGHT[0].chars().count() as i32;
        // (x, y) sits on the middle row of the art
        let (col, row) = to_cell(self.x, self.y);
        let (left, top) = (col - width / 2, row - 1);

        for (i, line) in SLEIGH_RIGHT.iter().enumerate() {
            let chars: Vec<char> = if self.direction > 0.0 {
                line.chars().collect()
            } else {
                line.chars().rev().map(mirror).collect()
            };
            for (j, ch) in chars.into_iter().enumerate() {
                if ch == ' ' {
                    continue;
                }
                let color = match ch {
                    '~' => Color::Rgb { r: 200, g: 170, b: 90 },
                    '(' | ')' | 'o' | ',' => Color::Rgb { r: 150, g: 100, b: 60 },
                    _ => Color::Rgb { r: 200, g: 30, b: 40 },
                };
                canvas.put(left + j as i32, top + i as i32, ch, color);
            }
        }
    }
}

fn mirror(ch: char) -> char {
    match ch {
        '/' => '\\',
        '\\' => '/',
        '(' => ')',
        ')' => '(',
        other => other,
    }
}
