use rand::RngExt;
use rand::rngs::SmallRng;

use crate::render::{Canvas, Viewport, rgb, scale_color};
use crate::scene::ground::REFERENCE_FRAME;
use crate::weather::Wind;

#[derive(Debug, Clone)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub length: f32,
    pub thickness: f32,
    pub opacity: f32,
}

impl Raindrop {
    /// Angle of the streak measured from the +x axis; straight down is π/2.
    pub fn streak_angle(&self, wind_x: f32) -> f32 {
        self.speed.atan2(wind_x * 3.0)
    }
}

pub struct RainSystem {
    drops: Vec<Raindrop>,
    viewport: Viewport,
}

impl RainSystem {
    pub fn new(viewport: Viewport, count: usize, rng: &mut SmallRng) -> Self {
        let drops = (0..count)
            .map(|_| Raindrop {
                x: rng.random::<f32>() * viewport.width * 1.5,
                y: rng.random::<f32>() * viewport.height,
                speed: rng.random_range(12.0..22.0),
                length: rng.random_range(15.0..35.0),
                thickness: rng.random_range(1.0..2.5),
                opacity: rng.random_range(0.3..0.7),
            })
            .collect();
        Self { drops, viewport }
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    pub fn update(&mut self, dt: f32, wind: Wind, rng: &mut SmallRng) {
        let frames = dt / REFERENCE_FRAME;
        let (width, height) = (self.viewport.width, self.viewport.height);
        for drop in &mut self.drops {
            drop.y += drop.speed * frames;
            drop.x += wind.x * 2.0 * frames;

            if drop.y > height {
                drop.y = -drop.length - rng.random::<f32>() * 50.0;
                drop.x = rng.random::<f32>() * width * 1.5 - width * 0.25;
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas, wind: Wind) {
        for drop in &self.drops {
            let angle = drop.streak_angle(wind.x);
            let (dx, dy) = (angle.cos(), angle.sin());
            let ch = if dx > 0.25 {
                '\\'
            } else if dx < -0.25 {
                '/'
            } else if drop.thickness > 1.8 {
                '┃'
            } else {
                '│'
            };
            let color = scale_color(rgb(200, 220, 250), 0.6 + drop.opacity * 0.6);
            let steps = (drop.length / 16.0).ceil().max(1.0) as usize;
            for i in 0..steps {
                let d = i as f32 * 16.0;
                canvas.plot(drop.x + dx * d, drop.y + dy * d, ch, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;

    fn drop(speed: f32) -> Raindrop {
        Raindrop {
            x: 0.0,
            y: 0.0,
            speed,
            length: 20.0,
            thickness: 1.0,
            opacity: 0.5,
        }
    }

    #[test]
    fn test_streak_angle_follows_wind() {
        assert!((drop(15.0).streak_angle(0.0) - FRAC_PI_2).abs() < 1e-6);
        assert!(drop(15.0).streak_angle(0.4) < FRAC_PI_2);
        assert!(drop(15.0).streak_angle(-0.4) > FRAC_PI_2);
        assert!((drop(15.0).streak_angle(0.4) - 15.0_f32.atan2(1.2)).abs() < 1e-6);
    }

    #[test]
    fn test_drops_recycle_above_screen() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(13);
        let mut rain = RainSystem::new(vp, 120, &mut rng);
        assert_eq!(rain.drops().len(), 120);
        for _ in 0..1_000 {
            rain.update(REFERENCE_FRAME, Wind { x: 0.1, y: 0.0 }, &mut rng);
            assert_eq!(rain.drops().len(), 120);
            for d in rain.drops() {
                assert!(d.y <= 600.0);
            }
        }
    }

    #[test]
    fn test_fall_scales_with_delta() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(2);
        let mut rain = RainSystem::new(vp, 1, &mut rng);
        rain.drops[0].y = 0.0;
        rain.drops[0].x = 100.0;
        let speed = rain.drops[0].speed;
        rain.update(REFERENCE_FRAME * 2.0, Wind { x: 0.5, y: 0.0 }, &mut rng);
        assert!((rain.drops[0].y - speed * 2.0).abs() < 1e-3);
        assert!((rain.drops[0].x - 102.0).abs() < 1e-3);
    }
}
