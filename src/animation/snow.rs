use rand::RngExt;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use std::f32::consts::TAU;

use crate::render::{Canvas, Viewport, rgb, scale_color};
use crate::scene::ground::{GroundSurface, REFERENCE_FRAME};
use crate::weather::Wind;

pub const FLAKE_COUNT: usize = 100;
const SIDE_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlakeKind {
    Star,
    Crystal,
    Round,
}

#[derive(Debug, Clone)]
pub struct Snowflake {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub swing: f32,
    pub swing_speed: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub kind: FlakeKind,
    pub opacity: f32,
}

impl Snowflake {
    fn spawn(rng: &mut SmallRng, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            size: rng.random_range(2.0..8.0),
            speed: rng.random_range(0.5..2.5),
            swing: rng.random_range(0.0..TAU),
            swing_speed: rng.random_range(0.01..0.03),
            rotation: rng.random_range(0.0..TAU),
            rotation_speed: rng.random_range(-0.025..0.025),
            kind: [FlakeKind::Star, FlakeKind::Crystal, FlakeKind::Round]
                .choose(rng)
                .copied()
                .unwrap_or(FlakeKind::Round),
            opacity: rng.random_range(0.6..1.0),
        }
    }

    fn glyph(&self) -> char {
        // six-fold symmetry: three distinct orientations are enough
        let turn = (self.rotation.rem_euclid(TAU / 2.0) / (TAU / 6.0)) as usize;
        match self.kind {
            FlakeKind::Star => ['*', '✻', '✼'][turn.min(2)],
            FlakeKind::Crystal => ['❄', '❅', '❆'][turn.min(2)],
            FlakeKind::Round if self.size > 5.0 => '•',
            FlakeKind::Round => '·',
        }
    }
}

pub struct SnowSystem {
    flakes: Vec<Snowflake>,
    viewport: Viewport,
}

impl SnowSystem {
    pub fn new(viewport: Viewport, rng: &mut SmallRng) -> Self {
        let flakes = (0..FLAKE_COUNT)
            .map(|_| {
                let x = rng.random::<f32>() * viewport.width;
                let y = rng.random::<f32>() * viewport.height * 0.8;
                Snowflake::spawn(rng, x, y)
            })
            .collect();
        Self { flakes, viewport }
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn flakes_mut(&mut self) -> &mut [Snowflake] {
        &mut self.flakes
    }

    /// Moves every flake and recycles those that reached the ground.
    ///
    /// Landing is tested against the local ground height when a ground is
    /// present, otherwise against the bottom of the viewport. Returns how
    /// many flakes landed on the ground this frame.
    pub fn update(
        &mut self,
        dt: f32,
        wind: Wind,
        wind_speed_kmh: f32,
        ground: Option<&GroundSurface>,
        rng: &mut SmallRng,
    ) -> usize {
        let frames = dt / REFERENCE_FRAME;
        let (width, height) = (self.viewport.width, self.viewport.height);
        let mut hits = 0;

        for flake in &mut self.flakes {
            flake.y += flake.speed * frames;
            flake.swing += flake.swing_speed * frames;
            flake.x += (flake.swing.sin() * 0.5 + wind.x * wind_speed_kmh * 0.08) * frames;
            flake.rotation += flake.rotation_speed * frames;

            if flake.x < -SIDE_MARGIN {
                flake.x += width + SIDE_MARGIN * 2.0;
            } else if flake.x > width + SIDE_MARGIN {
                flake.x -= width + SIDE_MARGIN * 2.0;
            }

            let landing_y = match ground {
                Some(ground) => ground.ground_y_at(flake.x),
                None => height + flake.size,
            };
            if flake.y >= landing_y {
                if ground.is_some() {
                    hits += 1;
                }
                let x = rng.random::<f32>() * width;
                let y = -rng.random_range(4.0..40.0);
                *flake = Snowflake::spawn(rng, x, y);
            }
        }

        hits
    }

    pub fn render(&self, canvas: &mut Canvas) {
        for flake in &self.flakes {
            canvas.plot(
                flake.x,
                flake.y,
                flake.glyph(),
                scale_color(rgb(255, 255, 255), flake.opacity),
            );
        }
    }
}
