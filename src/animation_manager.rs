use rand::rngs::SmallRng;

use crate::animation::clouds::CloudSystem;
use crate::animation::rain::RainSystem;
use crate::animation::snow::SnowSystem;
use crate::animation::stars::StarSystem;
use crate::render::{Canvas, Viewport};
use crate::scene::ground::GroundSurface;
use crate::weather::{Wind, WeatherConditions};

/// Owns the weather-driven particle pools. Pool sizes are fixed by the
/// conditions; `reset` is the only place they are reallocated.
pub struct AnimationManager {
    stars: StarSystem,
    clouds: CloudSystem,
    rain: Option<RainSystem>,
    snow: Option<SnowSystem>,
}

impl AnimationManager {
    pub fn new(viewport: Viewport, conditions: &WeatherConditions, rng: &mut SmallRng) -> Self {
        let stars = StarSystem::new(viewport, rng);
        let clouds = CloudSystem::new(
            viewport,
            conditions.cloud_count(),
            conditions.is_overcast(),
            rng,
        );
        let rain = conditions
            .is_raining()
            .then(|| RainSystem::new(viewport, conditions.raindrop_count(), rng));
        let snow = conditions
            .is_snowing()
            .then(|| SnowSystem::new(viewport, rng));

        Self {
            stars,
            clouds,
            rain,
            snow,
        }
    }

    /// Rebuilds every pool for a new viewport or new conditions.
    pub fn reset(&mut self, viewport: Viewport, conditions: &WeatherConditions, rng: &mut SmallRng) {
        *self = Self::new(viewport, conditions, rng);
    }

    pub fn stars(&self) -> &StarSystem {
        &self.stars
    }

    pub fn clouds(&self) -> &CloudSystem {
        &self.clouds
    }

    pub fn rain(&self) -> Option<&RainSystem> {
        self.rain.as_ref()
    }

    pub fn snow(&self) -> Option<&SnowSystem> {
        self.snow.as_ref()
    }

    pub fn update_stars(&mut self, dt: f32, rng: &mut SmallRng) {
        self.stars.update(dt, rng);
    }

    pub fn render_stars(&self, canvas: &mut Canvas, elapsed: f32) {
        self.stars.render(canvas, elapsed);
    }

    /// Advances and draws clouds, rain and snow in that order. Returns how
    /// many flakes reached the ground.
    pub fn update_and_render_weather(
        &mut self,
        canvas: &mut Canvas,
        dt: f32,
        wind: Wind,
        wind_speed_kmh: f32,
        ground: Option<&GroundSurface>,
        rng: &mut SmallRng,
    ) -> usize {
        self.clouds.update(dt, wind, rng);
        self.clouds.render(canvas);

        if let Some(rain) = &mut self.rain {
            rain.update(dt, wind, rng);
            rain.render(canvas, wind);
        }

        match &mut self.snow {
            Some(snow) => {
                let hits = snow.update(dt, wind, wind_speed_kmh, ground, rng);
                snow.render(canvas);
                hits
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherInput;
    use rand::SeedableRng;

    fn conditions(code: u16, cloud_cover: f32) -> WeatherConditions {
        WeatherConditions::classify(&WeatherInput {
            code,
            cloud_cover,
            ..WeatherInput::default()
        })
    }

    #[test]
    fn test_pools_follow_conditions() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(1);

        let clear = AnimationManager::new(vp, &conditions(0, 0.0), &mut rng);
        assert_eq!(clear.clouds().clouds().len(), 4);
        assert!(clear.rain().is_none() && clear.snow().is_none());

        let heavy = AnimationManager::new(vp, &conditions(65, 100.0), &mut rng);
        assert_eq!(heavy.clouds().clouds().len(), 15);
        assert_eq!(heavy.rain().map(|r| r.drops().len()), Some(180));
        assert!(heavy.snow().is_none());

        let snow = AnimationManager::new(vp, &conditions(73, 70.0), &mut rng);
        assert!(snow.rain().is_none());
        assert_eq!(
            snow.snow().map(|s| s.flakes().len()),
            Some(crate::animation::snow::FLAKE_COUNT)
        );
    }

    #[test]
    fn test_reset_switches_pools() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut manager = AnimationManager::new(vp, &conditions(63, 80.0), &mut rng);
        assert!(manager.rain().is_some());
        manager.reset(Viewport::new(400.0, 300.0), &conditions(0, 0.0), &mut rng);
        assert!(manager.rain().is_none());
    }

    #[test]
    fn test_no_hits_without_snow() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut manager = AnimationManager::new(vp, &conditions(63, 80.0), &mut rng);
        let mut canvas = Canvas::new(100, 38);
        let ground = GroundSurface::new(vp, 1);
        let hits = manager.update_and_render_weather(
            &mut canvas,
            1.0 / 60.0,
            Wind::default(),
            10.0,
            Some(&ground),
            &mut rng,
        );
        assert_eq!(hits, 0);
    }
}
