use crate::celestial::{Celestial, LocalTime};
use crate::config::{Config, SkySettings, WeatherInput};
use crate::weather::{Wind, WeatherCondition, WeatherConditions, WindField};

/// Command-line adjustments layered over the loaded config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub simulate: Option<WeatherCondition>,
    pub night: bool,
    pub no_holiday: bool,
    pub gusting: bool,
    pub seed: Option<u32>,
}

/// Everything the scene needs to know about its surroundings, resolved
/// once from config and CLI.
#[derive(Debug, Clone)]
pub struct AppState {
    pub input: WeatherInput,
    pub conditions: WeatherConditions,
    pub wind: WindField,
    pub sky: SkySettings,
    pub celestial: Celestial,
    pub holiday: bool,
    pub force_night: bool,
    pub seed: u32,
}

impl AppState {
    pub fn new(config: &Config, overrides: &Overrides, time: LocalTime) -> Self {
        let input = match overrides.simulate {
            Some(condition) => condition.apply_to(&config.weather),
            None => config.weather.clone(),
        };
        let conditions = WeatherConditions::classify(&input);
        let wind = WindField::from_report(
            input.wind_speed,
            input.wind_direction,
            config.scene.gusting || overrides.gusting,
        );
        let seed = overrides
            .seed
            .or(config.scene.seed)
            .unwrap_or_else(rand::random::<u32>);

        let mut state = Self {
            input,
            conditions,
            wind,
            sky: config.sky.clone(),
            celestial: Celestial::compute(time, &config.sky),
            holiday: config.scene.holiday && !overrides.no_holiday,
            force_night: overrides.night,
            seed,
        };
        state.refresh_celestial(time);

        tracing::info!(
            code = state.input.code,
            sky = ?state.conditions.sky,
            precipitation = ?state.conditions.precipitation,
            wind_kmh = state.wind.speed_kmh,
            is_day = state.celestial.is_day,
            holiday = state.holiday,
            seed = state.seed,
            "scene inputs resolved"
        );
        state
    }

    pub fn refresh_celestial(&mut self, time: LocalTime) {
        self.celestial = Celestial::compute(time, &self.sky);
        if self.force_night {
            self.celestial.is_day = false;
        }
    }

    pub fn wind_at(&self, elapsed: f32) -> Wind {
        self.wind.sample(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Precipitation;
    use chrono::NaiveDate;

    fn noon() -> LocalTime {
        LocalTime {
            hour: 12.0,
            date: NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
        }
    }

    #[test]
    fn test_simulate_replaces_condition_keeps_wind() {
        let mut config = Config::default();
        config.weather.wind_speed = 40.0;
        let overrides = Overrides {
            simulate: Some(WeatherCondition::Snow),
            seed: Some(1),
            ..Overrides::default()
        };
        let state = AppState::new(&config, &overrides, noon());
        assert_eq!(state.conditions.precipitation, Precipitation::Snow);
        assert_eq!(state.wind.speed_kmh, 40.0);
    }

    #[test]
    fn test_night_override() {
        let config = Config::default();
        let overrides = Overrides {
            night: true,
            seed: Some(1),
            ..Overrides::default()
        };
        let mut state = AppState::new(&config, &overrides, noon());
        assert!(!state.celestial.is_day);
        state.refresh_celestial(noon());
        assert!(!state.celestial.is_day);
    }

    #[test]
    fn test_holiday_and_seed_precedence() {
        let mut config = Config::default();
        config.scene.seed = Some(5);
        let state = AppState::new(&config, &Overrides::default(), noon());
        assert!(state.holiday);
        assert_eq!(state.seed, 5);

        let overrides = Overrides {
            no_holiday: true,
            seed: Some(9),
            ..Overrides::default()
        };
        let state = AppState::new(&config, &overrides, noon());
        assert!(!state.holiday);
        assert_eq!(state.seed, 9);
    }

    #[test]
    fn test_gusting_from_either_source() {
        let mut config = Config::default();
        config.scene.seed = Some(1);
        assert!(!AppState::new(&config, &Overrides::default(), noon()).wind.is_gusting());
        let overrides = Overrides {
            gusting: true,
            ..Overrides::default()
        };
        assert!(AppState::new(&config, &overrides, noon()).wind.is_gusting());
        config.scene.gusting = true;
        assert!(AppState::new(&config, &Overrides::default(), noon()).wind.is_gusting());
    }
}
