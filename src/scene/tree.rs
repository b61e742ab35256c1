//! Procedural holiday tree.
//!
//! The tree is generated once per viewport size and baked into a cell
//! image. Ornaments and lights are kept out of the image so they can be
//! animated independently every frame.

use crossterm::style::Color;
use std::f32::consts::TAU;

use crate::noise::{NoiseRng, fbm_1d, hash1, mix_seed};
use crate::render::{CELL_H, CELL_W, Canvas, Viewport, lerp_color, rgb, scale_color};
use crate::scene::ground::BASE_GROUND_HEIGHT;

const ORNAMENT_COLORS: [Color; 5] = [
    Color::Rgb { r: 220, g: 40, b: 50 },
    Color::Rgb { r: 250, g: 200, b: 40 },
    Color::Rgb { r: 70, g: 120, b: 230 },
    Color::Rgb { r: 200, g: 90, b: 210 },
    Color::Rgb { r: 235, g: 235, b: 245 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeCell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ornament {
    pub x: f32,
    pub y: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub x: f32,
    pub y: f32,
    pub phase: f32,
    pub color: Color,
}

/// Baked tree image plus its animated anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeCache {
    pub seed: u32,
    pub viewport: Viewport,
    pub origin: (i32, i32),
    pub cols: usize,
    pub rows: usize,
    pub cells: Vec<Option<TreeCell>>,
    pub ornaments: Vec<Ornament>,
    pub lights: Vec<Light>,
    pub star: (f32, f32),
}

struct Layer {
    top: f32,
    bottom: f32,
    half_width: f32,
}

struct Shape {
    seed: u32,
    center_x: f32,
    base_y: f32,
    top_y: f32,
    trunk_top: f32,
    trunk_half: f32,
    layers: Vec<Layer>,
}

impl Shape {
    fn generate(seed: u32, viewport: Viewport, rng: &mut NoiseRng) -> Self {
        let tree_height = (viewport.height * 0.5).clamp(120.0, 420.0);
        let center_x = (viewport.width * 0.2).max(tree_height * 0.4);
        let base_y = viewport.height - BASE_GROUND_HEIGHT + 6.0;
        let top_y = base_y - tree_height;
        let trunk_height = tree_height * 0.12;
        let canopy_height = tree_height - trunk_height;
        let max_half = tree_height * 0.36;

        let count = rng.range_u32(4, 6) as usize;
        let layers = (0..count)
            .map(|k| {
                let k_f = k as f32;
                let n = count as f32;
                let jitter = rng.range(-0.04, 0.04) * canopy_height;
                Layer {
                    top: top_y + canopy_height * (k_f / n) * 0.8 + jitter.min(0.0),
                    bottom: top_y + canopy_height * (k_f + 1.0) / n + jitter.max(0.0) * 0.5,
                    half_width: max_half * (0.4 + 0.6 * (k_f + 1.0) / n) * rng.range(0.92, 1.05),
                }
            })
            .collect();

        Self {
            seed,
            center_x,
            base_y,
            top_y,
            trunk_top: base_y - trunk_height - 6.0,
            trunk_half: (tree_height * 0.04).max(CELL_W * 0.75),
            layers,
        }
    }

    /// Half width of layer `k` at height `y`, with noisy edges.
    fn half_width_at(&self, k: usize, y: f32) -> f32 {
        let layer = &self.layers[k];
        let t = ((y - layer.top) / (layer.bottom - layer.top).max(1.0)).clamp(0.0, 1.0);
        let wobble = 1.0 + 0.12 * fbm_1d(y * 0.05 + k as f32 * 13.0, self.seed);
        layer.half_width * t * wobble
    }

    /// Front-most layer containing the point, if any.
    fn layer_at(&self, x: f32, y: f32) -> Option<usize> {
        let dx = (x - self.center_x).abs();
        self.layers.iter().enumerate().find_map(|(k, layer)| {
            let sag = 6.0 * fbm_1d(x * 0.06, self.seed ^ (k as u32 + 1));
            let inside = y >= layer.top && y <= layer.bottom + sag && dx <= self.half_width_at(k, y);
            inside.then_some(k)
        })
    }

    fn garland_y(&self, k: usize, x: f32) -> f32 {
        let layer = &self.layers[k];
        layer.top + (layer.bottom - layer.top) * 0.68 + (x * 0.04 + k as f32).sin() * 6.0
    }

    fn bounds(&self) -> (f32, f32, f32, f32) {
        let widest = self
            .layers
            .iter()
            .map(|l| l.half_width)
            .fold(0.0_f32, f32::max)
            * 1.2;
        (
            self.center_x - widest,
            self.top_y - CELL_H * 2.0,
            self.center_x + widest,
            self.base_y,
        )
    }
}

pub fn seed_for_viewport(viewport: Viewport) -> u32 {
    mix_seed(viewport.width as u32, viewport.height as u32)
}

impl TreeCache {
    /// Builds the tree. Pure in `seed` and `viewport`.
    pub fn build(seed: u32, viewport: Viewport) -> Self {
        let mut rng = NoiseRng::seed(seed);
        let shape = Shape::generate(seed, viewport, &mut rng);

        let (left, top, right, bottom) = shape.bounds();
        let origin = ((left / CELL_W).floor() as i32, (top / CELL_H).floor() as i32);
        let cols = ((right / CELL_W).ceil() as i32 - origin.0).max(1) as usize;
        let rows = ((bottom / CELL_H).ceil() as i32 - origin.1).max(1) as usize;

        let mut cells = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                let x = (origin.0 + c as i32) as f32 * CELL_W + CELL_W * 0.5;
                let y = (origin.1 + r as i32) as f32 * CELL_H + CELL_H * 0.5;
                cells.push(bake_cell(&shape, x, y, c as i32 * 7919 + r as i32));
            }
        }

        let ornaments = place_ornaments(&shape, &mut rng);
        let lights = place_lights(&shape, &mut rng);
        let star = (shape.center_x, shape.top_y - CELL_H * 0.5);

        Self {
            seed,
            viewport,
            origin,
            cols,
            rows,
            cells,
            ornaments,
            lights,
            star,
        }
    }

    pub fn for_viewport(viewport: Viewport) -> Self {
        Self::build(seed_for_viewport(viewport), viewport)
    }

    pub fn render(&self, canvas: &mut Canvas, elapsed: f32) {
        for r in 0..self.rows {
            for c in 0..self.cols {
                if let Some(cell) = self.cells[r * self.cols + c] {
                    canvas.fill(
                        self.origin.0 + c as i32,
                        self.origin.1 + r as i32,
                        cell.ch,
                        cell.fg,
                        cell.bg,
                    );
                }
            }
        }

        for ornament in &self.ornaments {
            canvas.plot(ornament.x, ornament.y, '●', ornament.color);
        }

        for light in &self.lights {
            let on = (elapsed * 3.0 + light.phase).sin() > -0.2;
            let color = if on {
                light.color
            } else {
                scale_color(light.color, 0.35)
            };
            canvas.plot(light.x, light.y, '•', color);
        }

        let twinkle = 0.8 + 0.2 * (elapsed * 2.0).sin();
        canvas.plot(self.star.0, self.star.1, '★', scale_color(rgb(255, 215, 0), twinkle));
    }
}

fn bake_cell(shape: &Shape, x: f32, y: f32, cell_key: i32) -> Option<TreeCell> {
    if let Some(k) = shape.layer_at(x, y) {
        let layer = &shape.layers[k];
        let half = shape.half_width_at(k, y).max(1.0);
        let across = ((x - shape.center_x).abs() / half).clamp(0.0, 1.0);
        let down = ((y - layer.top) / (layer.bottom - layer.top).max(1.0)).clamp(0.0, 1.0);

        let light_side = if x < shape.center_x { 1.08 } else { 0.9 };
        let base = lerp_color(rgb(46, 139, 87), rgb(12, 60, 30), across * 0.7 + down * 0.3);
        let bg = scale_color(base, light_side);

        // snow resting on the lower edge of each layer
        if y > layer.bottom - 6.0 && across < 0.9 {
            return Some(TreeCell {
                ch: '▄',
                fg: rgb(240, 245, 255),
                bg,
            });
        }

        if (y - shape.garland_y(k, x)).abs() < CELL_H * 0.5 {
            return Some(TreeCell {
                ch: '~',
                fg: rgb(232, 190, 60),
                bg,
            });
        }

        let texture = hash1(cell_key, shape.seed);
        let ch = if texture > 0.55 {
            '^'
        } else if texture < -0.7 {
            '"'
        } else {
            ' '
        };
        return Some(TreeCell {
            ch,
            fg: scale_color(bg, 0.6),
            bg,
        });
    }

    let dx = (x - shape.center_x).abs();
    if dx <= shape.trunk_half && y >= shape.trunk_top && y <= shape.base_y {
        let bark = if hash1(cell_key, shape.seed ^ 0xBA5E) > 0.3 { '|' } else { ' ' };
        return Some(TreeCell {
            ch: bark,
            fg: rgb(70, 40, 20),
            bg: rgb(101, 67, 33),
        });
    }

    None
}

fn place_ornaments(shape: &Shape, rng: &mut NoiseRng) -> Vec<Ornament> {
    let count = shape.layers.len() * 3 + rng.range_u32(0, 4) as usize;
    (0..count)
        .map(|_| {
            let k = rng.range_u32(0, shape.layers.len() as u32 - 1) as usize;
            let layer = &shape.layers[k];
            let y = layer.top + (layer.bottom - layer.top) * rng.range(0.35, 0.85);
            let half = shape.half_width_at(k, y);
            let x = shape.center_x + rng.range(-0.8, 0.8) * half;
            Ornament {
                x,
                y,
                color: ORNAMENT_COLORS[rng.range_u32(0, ORNAMENT_COLORS.len() as u32 - 1) as usize],
            }
        })
        .collect()
}

fn place_lights(shape: &Shape, rng: &mut NoiseRng) -> Vec<Light> {
    let mut lights = Vec::new();
    for k in 0..shape.layers.len() {
        let n = rng.range_u32(5, 8);
        let y_mid = shape.garland_y(k, shape.center_x);
        let half = shape.half_width_at(k, y_mid) * 0.85;
        for i in 0..n {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
            let x = shape.center_x - half + 2.0 * half * t;
            lights.push(Light {
                x,
                y: shape.garland_y(k, x),
                phase: rng.range(0.0, TAU),
                color: ORNAMENT_COLORS[rng.range_u32(0, ORNAMENT_COLORS.len() as u32 - 1) as usize],
            });
        }
    }
    lights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_tree() {
        let vp = Viewport::new(800.0, 600.0);
        let a = TreeCache::build(1234, vp);
        let b = TreeCache::build(1234, vp);
        assert_eq!(a.ornaments, b.ornaments);
        assert_eq!(a.lights, b.lights);
        assert_eq!(a.cells, b.cells);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let vp = Viewport::new(800.0, 600.0);
        let a = TreeCache::build(1, vp);
        let b = TreeCache::build(2, vp);
        assert!(a.ornaments != b.ornaments || a.lights != b.lights);
    }

    #[test]
    fn test_seed_follows_viewport() {
        let a = Viewport::new(800.0, 600.0);
        let b = Viewport::new(808.0, 600.0);
        assert_eq!(seed_for_viewport(a), seed_for_viewport(a));
        assert_ne!(seed_for_viewport(a), seed_for_viewport(b));
        assert_eq!(TreeCache::for_viewport(a), TreeCache::for_viewport(a));
    }

    #[test]
    fn test_anchors_sit_inside_the_image() {
        let tree = TreeCache::for_viewport(Viewport::new(1280.0, 720.0));
        let left = tree.origin.0 as f32 * CELL_W;
        let top = tree.origin.1 as f32 * CELL_H;
        let right = left + tree.cols as f32 * CELL_W;
        let bottom = top + tree.rows as f32 * CELL_H;
        for o in &tree.ornaments {
            assert!(o.x >= left && o.x <= right && o.y >= top && o.y <= bottom);
        }
        for l in &tree.lights {
            assert!(l.x >= left && l.x <= right);
        }
        assert!(!tree.lights.is_empty());
        assert!(tree.ornaments.len() >= 12);
    }

    #[test]
    fn test_image_has_canopy_and_trunk() {
        let tree = TreeCache::for_viewport(Viewport::new(800.0, 600.0));
        let filled = tree.cells.iter().flatten().count();
        assert!(filled > 50);
        let brown = tree
            .cells
            .iter()
            .flatten()
            .filter(|c| c.bg == rgb(101, 67, 33))
            .count();
        assert!(brown > 0);
    }

    #[test]
    fn test_render_draws_star() {
        let vp_cells = (100, 38);
        let mut canvas = Canvas::new(vp_cells.0, vp_cells.1);
        let tree = TreeCache::for_viewport(canvas.viewport());
        tree.render(&mut canvas, 0.0);
        let (col, row) = crate::render::to_cell(tree.star.0, tree.star.1);
        assert_eq!(canvas.cell(col as u16, row as u16).map(|c| c.ch), Some('★'));
    }
}
