use rand::RngExt;
use rand::rngs::SmallRng;

use crate::render::{Canvas, Viewport, cell_center, lerp_color, rgb, to_cell};
use crate::scene::ground::REFERENCE_FRAME;
use crate::weather::Wind;

const TOP_MARGIN: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Puff {
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
}

/// Shape descriptor generated once at spawn; stable for the cloud's life.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudShape {
    pub kind: u8,
    pub puffs: Vec<Puff>,
}

impl CloudShape {
    fn generate(rng: &mut SmallRng) -> Self {
        let kind = rng.random_range(0..=3) as u8;
        let count = rng.random_range(5..=9);
        let mut puffs: Vec<Puff> = (0..count)
            .map(|_| Puff {
                dx: rng.random_range(-60.0..60.0),
                dy: rng.random_range(-20.0..20.0),
                radius: rng.random_range(20.0..55.0),
            })
            .collect();

        let extra: &[(f32, f32, f32)] = match kind {
            0 => &[(0.0, -15.0, 35.0)],
            1 => &[(-35.0, 0.0, 25.0), (0.0, 0.0, 27.0), (35.0, 0.0, 25.0)],
            2 => &[(-25.0, -20.0, 28.0), (25.0, -18.0, 30.0)],
            _ => &[(0.0, 0.0, 40.0), (-40.0, 5.0, 30.0), (40.0, 5.0, 32.0)],
        };
        puffs.extend(extra.iter().map(|&(dx, dy, radius)| Puff { dx, dy, radius }));

        Self { kind, puffs }
    }
}

#[derive(Debug, Clone)]
pub struct Cloud {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub base_speed: f32,
    pub opacity: f32,
    pub shape: CloudShape,
}

pub struct CloudSystem {
    clouds: Vec<Cloud>,
    viewport: Viewport,
    overcast: bool,
}

impl CloudSystem {
    pub fn new(viewport: Viewport, count: usize, overcast: bool, rng: &mut SmallRng) -> Self {
        let clouds = (0..count)
            .map(|_| Cloud {
                x: rng.random::<f32>() * (viewport.width + 400.0) - 200.0,
                y: TOP_MARGIN + rng.random::<f32>() * viewport.height * 0.4,
                scale: rng.random_range(0.6..1.6),
                base_speed: rng.random_range(0.01..0.03),
                opacity: if overcast {
                    rng.random_range(0.88..1.0)
                } else {
                    rng.random_range(0.5..0.8)
                },
                shape: CloudShape::generate(rng),
            })
            .collect();

        Self {
            clouds,
            viewport,
            overcast,
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn update(&mut self, dt: f32, wind: Wind, rng: &mut SmallRng) {
        let frames = dt / REFERENCE_FRAME;
        let width = self.viewport.width;
        let y_max = (self.viewport.height * 0.45).max(TOP_MARGIN);

        for cloud in &mut self.clouds {
            cloud.x += (cloud.base_speed + wind.x) * frames;
            cloud.y += wind.y * 0.5 * frames;

            if cloud.x > width + 250.0 {
                cloud.x = -250.0;
                cloud.y = TOP_MARGIN + rng.random::<f32>() * self.viewport.height * 0.4;
            }
            if cloud.x < -300.0 {
                cloud.x = width + 200.0;
            }
            cloud.y = cloud.y.clamp(TOP_MARGIN, y_max);
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let (base, shadow) = if self.overcast {
            (rgb(200, 200, 200), rgb(160, 165, 170))
        } else {
            (rgb(255, 255, 255), rgb(220, 225, 230))
        };

        for cloud in &self.clouds {
            let reach = 120.0 * cloud.scale;
            let (c0, r0) = to_cell(cloud.x - reach, cloud.y - reach * 0.6);
            let (c1, r1) = to_cell(cloud.x + reach, cloud.y + reach * 0.6);
            for row in r0.max(0)..=r1 {
                for col in c0.max(0)..=c1 {
                    let (px, py) = cell_center(col as u16, row as u16);
                    let lx = (px - cloud.x) / cloud.scale;
                    let ly = (py - cloud.y) / cloud.scale;

                    let covered = cloud.shape.puffs.iter().any(|p| {
                        let dx = lx - p.dx;
                        let dy = ly - p.dy;
                        dx * dx + dy * dy <= p.radius * p.radius
                    });
                    let underside = {
                        let ex = lx / 80.0;
                        let ey = (ly - 18.0) / 20.0;
                        ex * ex + ey * ey <= 1.0
                    };

                    let Some(cell) = canvas.cell(col as u16, row as u16).copied() else {
                        continue;
                    };
                    if covered {
                        let bg = lerp_color(cell.bg, base, cloud.opacity);
                        canvas.fill(col, row, ' ', cell.fg, bg);
                    } else if underside {
                        let bg = lerp_color(cell.bg, shadow, cloud.opacity * 0.4);
                        canvas.set_bg(col, row, bg);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn system(count: usize) -> (CloudSystem, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(77);
        let system = CloudSystem::new(Viewport::new(800.0, 600.0), count, false, &mut rng);
        (system, rng)
    }

    #[test]
    fn test_shape_stable_across_frames() {
        let (mut clouds, mut rng) = system(6);
        let shapes: Vec<CloudShape> = clouds.clouds().iter().map(|c| c.shape.clone()).collect();
        for _ in 0..5_000 {
            clouds.update(REFERENCE_FRAME, Wind { x: 0.4, y: 0.0 }, &mut rng);
        }
        let after: Vec<CloudShape> = clouds.clouds().iter().map(|c| c.shape.clone()).collect();
        assert_eq!(shapes, after);
    }

    #[test]
    fn test_drift_is_base_speed_plus_wind() {
        let (mut clouds, mut rng) = system(1);
        clouds.clouds[0].x = 100.0;
        let speed = clouds.clouds[0].base_speed;
        clouds.update(REFERENCE_FRAME, Wind { x: 0.2, y: 0.0 }, &mut rng);
        assert!((clouds.clouds[0].x - (100.0 + speed + 0.2)).abs() < 1e-4);
    }

    #[test]
    fn test_wraps_at_both_edges() {
        let (mut clouds, mut rng) = system(2);
        clouds.clouds[0].x = 800.0 + 250.0;
        clouds.clouds[1].x = -300.0;
        clouds.update(REFERENCE_FRAME, Wind { x: 0.0, y: 0.0 }, &mut rng);
        assert_eq!(clouds.clouds[0].x, -250.0);
        clouds.update(REFERENCE_FRAME, Wind { x: -1.0, y: 0.0 }, &mut rng);
        assert_eq!(clouds.clouds[1].x, 1000.0);
    }

    #[test]
    fn test_vertical_clamp() {
        let (mut clouds, mut rng) = system(3);
        for _ in 0..10_000 {
            clouds.update(REFERENCE_FRAME, Wind { x: 0.0, y: 0.5 }, &mut rng);
        }
        assert!(clouds.clouds().iter().all(|c| c.y <= 600.0 * 0.45 && c.y >= TOP_MARGIN));
    }

    #[test]
    fn test_render_brightens_sky() {
        let (mut clouds, _) = system(1);
        clouds.clouds[0].x = 400.0;
        clouds.clouds[0].y = 150.0;
        clouds.clouds[0].scale = 1.0;
        clouds.clouds[0].shape = CloudShape {
            kind: 0,
            puffs: vec![Puff {
                dx: 0.0,
                dy: 0.0,
                radius: 40.0,
            }],
        };
        let mut canvas = Canvas::new(100, 38);
        for row in 0..38 {
            for col in 0..100 {
                canvas.set_bg(col, row, rgb(0, 0, 80));
            }
        }
        clouds.render(&mut canvas);
        let (col, row) = to_cell(400.0, 150.0);
        let bg = canvas.cell(col as u16, row as u16).map(|c| c.bg);
        assert_ne!(bg, Some(rgb(0, 0, 80)));
    }
}
