use crossterm::style::Color;
use rand::RngExt;
use rand::rngs::SmallRng;

use crate::render::{Canvas, Viewport, to_cell};
use crate::scene::ground::{GroundSurface, MAX_SNOW_MASS};

/// Length of one pass across the screen.
pub const PASS_DURATION_MS: f64 = 9_000.0;
/// Snow mass removed per second while a pass is running.
pub const CLEAR_RATE: f32 = 1.2 * MAX_SNOW_MASS / 9.0;
pub const MIN_PLOW_GAP_MS: f64 = 10.0 * 60_000.0;
pub const MAX_PLOW_GAP_MS: f64 = 15.0 * 60_000.0;
const MARGIN: f32 = 120.0;

const PLOW_RIGHT: [&str; 3] = [
    r"    ____    ",
    r" __|[]_|__ |",
    r"(o)----(o)_|",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlowState {
    Idle,
    Active {
        start_ms: f64,
        direction: f32,
        from_x: f32,
        to_x: f32,
    },
}

#[derive(Debug, Clone)]
pub struct SnowPlow {
    pub state: PlowState,
    pub x: f32,
    pub next_plow_time: f64,
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn next_gap(rng: &mut SmallRng) -> f64 {
    rng.random_range(MIN_PLOW_GAP_MS..=MAX_PLOW_GAP_MS)
}

impl SnowPlow {
    pub fn new(now_ms: f64, rng: &mut SmallRng) -> Self {
        Self {
            state: PlowState::Idle,
            x: -MARGIN,
            next_plow_time: now_ms + next_gap(rng),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PlowState::Active { .. })
    }

    /// Fraction of the current pass completed, `0` when idle.
    pub fn progress(&self, now_ms: f64) -> f32 {
        match self.state {
            PlowState::Idle => 0.0,
            PlowState::Active { start_ms, .. } => {
                ((now_ms - start_ms) / PASS_DURATION_MS).clamp(0.0, 1.0) as f32
            }
        }
    }

    pub fn update(
        &mut self,
        now_ms: f64,
        dt: f32,
        viewport: Viewport,
        rng: &mut SmallRng,
        ground: &mut GroundSurface,
    ) {
        if self.state == PlowState::Idle {
            if now_ms < self.next_plow_time {
                return;
            }
            let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let (from_x, to_x) = if direction > 0.0 {
                (-MARGIN, viewport.width + MARGIN)
            } else {
                (viewport.width + MARGIN, -MARGIN)
            };
            self.state = PlowState::Active {
                start_ms: now_ms,
                direction,
                from_x,
                to_x,
            };
            self.x = from_x;
            self.next_plow_time = now_ms + next_gap(rng);
            tracing::info!(
                snow_mass = ground.snow_mass(),
                direction,
                "snow plow pass started"
            );
        }

        let PlowState::Active { from_x, to_x, .. } = self.state else {
            return;
        };
        let progress = self.progress(now_ms);
        self.x = from_x + (to_x - from_x) * ease_in_out_cubic(progress);
        if progress >= 1.0 {
            self.state = PlowState::Idle;
        } else {
            ground.clear_snow(CLEAR_RATE, dt);
        }
    }

    pub fn render(&self, canvas: &mut Canvas, ground: &GroundSurface) {
        let PlowState::Active { direction, .. } = self.state else {
            return;
        };
        let width = PLOW_RIGHT[0].chars().count() as i32;
        let (col, bottom) = to_cell(self.x, ground.ground_y_at(self.x) - 1.0);
        let top = bottom - PLOW_RIGHT.len() as i32 + 1;

        for (i, line) in PLOW_RIGHT.iter().enumerate() {
            let chars: Vec<char> = if direction > 0.0 {
                line.chars().collect()
            } else {
                line.chars()
                    .rev()
                    .map(|ch| match ch {
                        '/' => '\\',
                        '\\' => '/',
                        '[' => ']',
                        ']' => '[',
                        other => other,
                    })
                    .collect()
            };
            for (j, ch) in chars.into_iter().enumerate() {
                let color = match ch {
                    ' ' => continue,
                    'o' | '(' | ')' => Color::DarkGrey,
                    '[' | ']' => Color::Cyan,
                    _ => Color::Rgb { r: 250, g: 170, b: 20 },
                };
                canvas.put(col - width / 2 + j as i32, top + i as i32, ch, color);
            }
        }
    }
}
