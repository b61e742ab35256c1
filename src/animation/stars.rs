use crossterm::style::Color;
use rand::RngExt;
use rand::rngs::SmallRng;
use std::f32::consts::{FRAC_PI_4, TAU};

use crate::render::{Canvas, Viewport, rgb, scale_color};
use crate::scene::ground::REFERENCE_FRAME;

const STAR_COUNT: usize = 70;
const SHOOTING_SLOTS: usize = 2;
const SHOOTING_CHANCE: f32 = 0.005;

#[derive(Debug, Clone)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub brightness: f32,
    pub twinkle_speed: f32,
    pub twinkle_offset: f32,
    pub color: Color,
}

/// A slot in the shooting-star pool; `life <= 0` means idle.
#[derive(Debug, Clone, Default)]
pub struct ShootingStar {
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub speed: f32,
    pub angle: f32,
    pub life: f32,
    pub decay: f32,
}

impl ShootingStar {
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }
}

pub struct StarSystem {
    stars: Vec<Star>,
    shooting: Vec<ShootingStar>,
    viewport: Viewport,
}

impl StarSystem {
    pub fn new(viewport: Viewport, rng: &mut SmallRng) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.random::<f32>() * viewport.width,
                y: rng.random::<f32>() * viewport.height * 0.7,
                size: rng.random_range(0.5..2.5),
                brightness: rng.random_range(0.3..1.0),
                twinkle_speed: rng.random_range(0.5..2.5),
                twinkle_offset: rng.random_range(0.0..TAU),
                color: if rng.random_bool(0.3) {
                    if rng.random_bool(0.5) {
                        rgb(255, 228, 196)
                    } else {
                        rgb(173, 216, 230)
                    }
                } else {
                    rgb(255, 255, 255)
                },
            })
            .collect();

        Self {
            stars,
            shooting: vec![ShootingStar::default(); SHOOTING_SLOTS],
            viewport,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting
    }

    pub fn update(&mut self, dt: f32, rng: &mut SmallRng) {
        let frames = dt / REFERENCE_FRAME;

        if rng.random_bool((SHOOTING_CHANCE * frames).clamp(0.0, 1.0) as f64) {
            if let Some(slot) = self.shooting.iter_mut().find(|s| !s.is_active()) {
                *slot = ShootingStar {
                    x: rng.random::<f32>() * self.viewport.width * 0.8,
                    y: rng.random::<f32>() * self.viewport.height * 0.3,
                    length: rng.random_range(50.0..150.0),
                    speed: rng.random_range(8.0..20.0),
                    angle: FRAC_PI_4 + rng.random_range(-0.25_f32..0.25),
                    life: 1.0,
                    decay: rng.random_range(0.015..0.025),
                };
            }
        }

        for star in self.shooting.iter_mut().filter(|s| s.is_active()) {
            star.x += star.angle.cos() * star.speed * frames;
            star.y += star.angle.sin() * star.speed * frames;
            star.life -= star.decay * frames;
        }
    }

    pub fn render(&self, canvas: &mut Canvas, elapsed: f32) {
        for star in &self.stars {
            let twinkle = (elapsed * star.twinkle_speed + star.twinkle_offset).sin();
            let alpha = star.brightness * (0.5 + twinkle * 0.5);
            let ch = if star.size > 1.5 && alpha > 0.6 {
                '✦'
            } else if alpha > 0.45 {
                '*'
            } else if alpha > 0.15 {
                '·'
            } else {
                continue;
            };
            canvas.plot(star.x, star.y, ch, scale_color(star.color, 0.4 + alpha * 0.6));
        }

        for star in self.shooting.iter().filter(|s| s.is_active()) {
            let trail = star.length * star.life;
            let steps = (trail / 8.0).max(1.0) as usize;
            for i in (1..=steps).rev() {
                let d = i as f32 * 8.0;
                let fade = 1.0 - d / trail.max(1.0);
                canvas.plot(
                    star.x - star.angle.cos() * d,
                    star.y - star.angle.sin() * d,
                    '·',
                    scale_color(rgb(255, 255, 200), (fade * star.life).max(0.2)),
                );
            }
            canvas.plot(star.x, star.y, '●', scale_color(rgb(255, 255, 255), star.life.max(0.3)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_star_pool_fixed_and_in_upper_sky() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(4);
        let stars = StarSystem::new(vp, &mut rng);
        assert_eq!(stars.stars().len(), STAR_COUNT);
        assert!(stars.stars().iter().all(|s| s.y <= 600.0 * 0.7 && s.x <= 800.0));
    }

    #[test]
    fn test_shooting_stars_bounded_and_recycled() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(8);
        let mut stars = StarSystem::new(vp, &mut rng);
        let mut ever_active = false;
        for _ in 0..20_000 {
            stars.update(REFERENCE_FRAME, &mut rng);
            assert_eq!(stars.shooting_stars().len(), SHOOTING_SLOTS);
            ever_active |= stars.shooting_stars().iter().any(|s| s.is_active());
        }
        assert!(ever_active);
    }

    #[test]
    fn test_shooting_star_fades_out() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut stars = StarSystem::new(vp, &mut rng);
        stars.shooting[0] = ShootingStar {
            x: 10.0,
            y: 10.0,
            length: 100.0,
            speed: 10.0,
            angle: FRAC_PI_4,
            life: 1.0,
            decay: 0.02,
        };
        let start_x = stars.shooting[0].x;
        let mut rng = SmallRng::seed_from_u64(0xFFFF_FFFF);
        for _ in 0..40 {
            stars.update(REFERENCE_FRAME, &mut rng);
        }
        assert!(stars.shooting[0].x > start_x);
        assert!((stars.shooting[0].life - 0.2).abs() < 1e-3);
    }
}
