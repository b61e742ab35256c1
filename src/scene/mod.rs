pub mod ground;
pub mod tree;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::animation::gift_dropper::GiftDropper;
use crate::animation::gifts::GiftPile;
use crate::animation::snow_plow::SnowPlow;
use crate::animation_manager::AnimationManager;
use crate::app_state::AppState;
use crate::celestial::{LocalTime, render_moon, render_sky, render_sun};
use crate::noise::mix_seed;
use crate::render::{Canvas, Viewport, cell_center};
use ground::GroundSurface;
use tree::{TreeCache, seed_for_viewport};

/// Darkening applied to the far corners of the frame.
const VIGNETTE_STRENGTH: f32 = 0.3;

/// Ground, tree and the two actors. Present only in holiday mode.
pub struct HolidayScene {
    pub ground: GroundSurface,
    pub tree: TreeCache,
    pub gifts: GiftPile,
    pub dropper: GiftDropper,
    pub plow: SnowPlow,
}

impl HolidayScene {
    fn new(viewport: Viewport, seed: u32, now_ms: f64, rng: &mut SmallRng) -> Self {
        Self {
            ground: GroundSurface::new(viewport, ground_seed(viewport, seed)),
            tree: TreeCache::for_viewport(viewport),
            gifts: GiftPile::new(),
            dropper: GiftDropper::new(viewport, now_ms, rng),
            plow: SnowPlow::new(now_ms, rng),
        }
    }
}

fn ground_seed(viewport: Viewport, seed: u32) -> u32 {
    mix_seed(seed_for_viewport(viewport), seed)
}

/// All mutable state of one running scene.
pub struct SceneState {
    viewport: Viewport,
    state: AppState,
    rng: SmallRng,
    animations: AnimationManager,
    holiday: Option<HolidayScene>,
    elapsed: f32,
}

impl SceneState {
    pub fn new(viewport: Viewport, state: AppState, now_ms: f64) -> Self {
        let mut rng = SmallRng::seed_from_u64(u64::from(state.seed));
        let animations = AnimationManager::new(viewport, &state.conditions, &mut rng);
        let holiday = state
            .holiday
            .then(|| HolidayScene::new(viewport, state.seed, now_ms, &mut rng));

        Self {
            viewport,
            state,
            rng,
            animations,
            holiday,
            elapsed: 0.0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn animations(&self) -> &AnimationManager {
        &self.animations
    }

    pub fn holiday(&self) -> Option<&HolidayScene> {
        self.holiday.as_ref()
    }

    pub fn holiday_mut(&mut self) -> Option<&mut HolidayScene> {
        self.holiday.as_mut()
    }

    pub fn refresh_celestial(&mut self, time: LocalTime) {
        self.state.refresh_celestial(time);
    }

    /// Rebuilds everything sized to the viewport. Snow mass, gifts and the
    /// actors' schedules survive.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.animations
            .reset(viewport, &self.state.conditions, &mut self.rng);

        if let Some(holiday) = &mut self.holiday {
            holiday
                .ground
                .resize(viewport, ground_seed(viewport, self.state.seed));
            holiday.tree = TreeCache::for_viewport(viewport);
            tracing::debug!(
                seed = holiday.tree.seed,
                width = viewport.width,
                height = viewport.height,
                "tree rebuilt"
            );
        }
        tracing::info!(width = viewport.width, height = viewport.height, "scene resized");
    }

    /// Advances the simulation by `dt` seconds and composes one frame.
    pub fn frame(&mut self, canvas: &mut Canvas, now_ms: f64, dt: f32) {
        self.elapsed += dt;
        let elapsed = self.elapsed;
        let viewport = self.viewport;
        let wind = self.state.wind_at(elapsed);
        let conditions = self.state.conditions;
        let celestial = self.state.celestial;

        render_sky(canvas, &celestial, &conditions);
        if celestial.is_day {
            if conditions.show_sun() {
                render_sun(canvas, &celestial, elapsed);
            }
        } else if !conditions.is_overcast() {
            self.animations.update_stars(dt, &mut self.rng);
            self.animations.render_stars(canvas, elapsed);
            render_moon(canvas, &celestial);
        }

        if let Some(holiday) = &mut self.holiday {
            holiday
                .ground
                .update(dt, wind.x, holiday.plow.is_active());
            holiday.ground.render(canvas);
            holiday.tree.render(canvas, elapsed);

            holiday.gifts.update(dt, &holiday.ground, &mut self.rng);
            holiday.gifts.render(canvas);

            holiday
                .dropper
                .update(now_ms, dt, viewport, &mut self.rng, &mut holiday.gifts);
            holiday.dropper.render(canvas);
        }

        let hits = self.animations.update_and_render_weather(
            canvas,
            dt,
            wind,
            self.state.wind.speed_kmh,
            self.holiday.as_ref().map(|h| &h.ground),
            &mut self.rng,
        );

        if let Some(holiday) = &mut self.holiday {
            // no snow settles under an active pass
            if !holiday.plow.is_active() {
                holiday.ground.accumulate(hits, dt);
            }
            holiday
                .plow
                .update(now_ms, dt, viewport, &mut self.rng, &mut holiday.ground);
            holiday.plow.render(canvas, &holiday.ground);
        }

        render_vignette(canvas);
    }
}

/// Radially darkens the frame toward its corners.
pub fn render_vignette(canvas: &mut Canvas) {
    let viewport = canvas.viewport();
    let (cx, cy) = (viewport.width / 2.0, viewport.height / 2.0);
    let reach = (cx * cx + cy * cy).sqrt().max(1.0);
    let (cols, rows) = canvas.size();
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = cell_center(col, row);
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / reach;
            let edge = ((d - 0.55) / 0.45).clamp(0.0, 1.0);
            if edge > 0.0 {
                canvas.shade(col as i32, row as i32, 1.0 - VIGNETTE_STRENGTH * edge * edge);
            }
        }
    }
}
