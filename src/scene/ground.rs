use crossterm::style::Color;

use crate::noise::{fbm_1d, hash1};
use crate::render::{Canvas, Viewport, cell_center, lerp_color, rgb};

pub const MAX_SNOW_MASS: f32 = 100.0;
/// Horizontal spacing of height samples, in pixels.
pub const STEP: f32 = 24.0;
pub const BASE_AMPLITUDE: f32 = 3.0;
pub const SNOW_AMPLITUDE: f32 = 9.0;
pub const PLOW_AMPLITUDE_SCALE: f32 = 0.35;
pub const RELAX: f32 = 0.035;
pub const PLOW_RELAX: f32 = 0.06;
pub const BASE_GROUND_HEIGHT: f32 = 40.0;
pub const SNOW_DEPTH: f32 = 72.0;
/// Snow mass added per flake landing in one reference frame.
pub const SNOW_PER_HIT: f32 = 0.35;
/// One frame at 60 Hz; per-frame rates are expressed against this.
pub const REFERENCE_FRAME: f32 = 1.0 / 60.0;

const FREQ: f32 = 1.0 / 180.0;
const PHASE_RATE: f32 = 0.6;

/// Snow-covered ground: accumulated snow mass plus a gently undulating
/// height field sampled every [`STEP`] pixels.
#[derive(Debug, Clone)]
pub struct GroundSurface {
    viewport: Viewport,
    seed: u32,
    samples: Vec<f32>,
    snow_mass: f32,
    phase: f32,
    plow_active: bool,
}

pub fn sample_count(width: f32) -> usize {
    ((width / STEP).ceil() as usize + 2).max(8)
}

pub fn height_from_snow_mass(snow_mass: f32) -> f32 {
    BASE_GROUND_HEIGHT + (snow_mass / MAX_SNOW_MASS) * SNOW_DEPTH
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

impl GroundSurface {
    pub fn new(viewport: Viewport, seed: u32) -> Self {
        Self {
            viewport,
            seed,
            samples: vec![0.0; sample_count(viewport.width)],
            snow_mass: 0.0,
            phase: 0.0,
            plow_active: false,
        }
    }

    /// Rebuilds the height field for a new viewport; snow mass carries over.
    pub fn resize(&mut self, viewport: Viewport, seed: u32) {
        let snow_mass = self.snow_mass;
        *self = Self::new(viewport, seed);
        self.snow_mass = snow_mass;
    }

    pub fn snow_mass(&self) -> f32 {
        self.snow_mass
    }

    pub fn set_snow_mass(&mut self, snow_mass: f32) {
        self.snow_mass = snow_mass.clamp(0.0, MAX_SNOW_MASS);
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn plow_active(&self) -> bool {
        self.plow_active
    }

    pub fn amplitude(&self) -> f32 {
        let amplitude = BASE_AMPLITUDE + SNOW_AMPLITUDE * (self.snow_mass / MAX_SNOW_MASS);
        if self.plow_active {
            amplitude * PLOW_AMPLITUDE_SCALE
        } else {
            amplitude
        }
    }

    /// Relaxes every sample toward the noise target for this frame.
    pub fn update(&mut self, dt: f32, wind_x: f32, plow_active: bool) {
        self.plow_active = plow_active;
        self.phase += wind_x * PHASE_RATE * dt;

        let amplitude = self.amplitude();
        let coefficient = if plow_active { PLOW_RELAX } else { RELAX };
        let alpha = (coefficient * dt / REFERENCE_FRAME).clamp(0.0, 1.0);

        for (i, sample) in self.samples.iter_mut().enumerate() {
            let x = i as f32 * STEP;
            let target = fbm_1d(x * FREQ + self.phase, self.seed) * amplitude;
            *sample += (target - *sample) * alpha;
            *sample = sample.clamp(-amplitude, amplitude);
        }
    }

    /// Adds snow for `hits` flakes that reached the ground this frame.
    pub fn accumulate(&mut self, hits: usize, dt: f32) {
        let added = hits as f32 * SNOW_PER_HIT * (dt / REFERENCE_FRAME);
        self.set_snow_mass(self.snow_mass + added);
    }

    /// Removes snow at `rate` mass units per second.
    pub fn clear_snow(&mut self, rate: f32, dt: f32) {
        self.set_snow_mass(self.snow_mass - rate * dt);
    }

    pub fn height_offset_at(&self, x: f32) -> f32 {
        let last = self.samples.len() - 1;
        let t = (x / STEP).max(0.0);
        let i = (t.floor() as usize).min(last - 1);
        let f = (t - i as f32).clamp(0.0, 1.0);
        let a = self.samples[i];
        let b = self.samples[i + 1];
        a + (b - a) * smoothstep(f)
    }

    pub fn ground_y_at(&self, x: f32) -> f32 {
        self.viewport.height - height_from_snow_mass(self.snow_mass) - self.height_offset_at(x)
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let snow = rgb(236, 242, 250);
        let shadow = rgb(176, 192, 214);
        let (cols, rows) = canvas.size();
        for col in 0..cols {
            let (x, _) = cell_center(col, 0);
            let surface = self.ground_y_at(x);
            for row in 0..rows {
                let (_, y) = cell_center(col, row);
                if y < surface {
                    continue;
                }
                let depth = ((y - surface) / SNOW_DEPTH).clamp(0.0, 1.0);
                let bg = lerp_color(snow, shadow, depth);
                let sparkle = hash1(col as i32 * 131 + row as i32, self.seed);
                let (ch, fg) = if y - surface < 16.0 {
                    ('▀', rgb(255, 255, 255))
                } else if sparkle > 0.9 {
                    ('·', rgb(255, 255, 255))
                } else {
                    (' ', Color::White)
                };
                canvas.fill(col as i32, row as i32, ch, fg, bg);
            }
        }
    }
}
