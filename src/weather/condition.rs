use std::str::FromStr;

use crate::config::WeatherInput;
use crate::error::ConditionParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyCover {
    Clear,
    PartlyCloudy,
    Overcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    Rain,
    HeavyRain,
    Snow,
}

/// Classified view of the host-supplied weather inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherConditions {
    pub sky: SkyCover,
    pub precipitation: Precipitation,
    pub cloud_cover: f32,
}

const OVERCAST_CLOUD_COVER: f32 = 90.0;
const PARTLY_CLOUDY_COVER: f32 = 50.0;

fn has_word(description: &str, prefixes: &[&str]) -> bool {
    description
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| prefixes.iter().any(|p| word.starts_with(p)))
}

impl WeatherConditions {
    /// Maps a WMO code, free-text description and cloud cover to a single
    /// consistent rule set. Anything unrecognized is a clear sky.
    pub fn classify(input: &WeatherInput) -> Self {
        let code = input.code;
        let description = input.description.to_lowercase();
        let cloud_cover = if input.cloud_cover.is_finite() {
            input.cloud_cover.clamp(0.0, 100.0)
        } else {
            0.0
        };

        let is_snowy = matches!(code, 71..=77 | 85..=86) || has_word(&description, &["snow", "kar"]);
        let is_rainy = !is_snowy
            && (matches!(code, 51..=67 | 80..=82 | 95..=99)
                || has_word(
                    &description,
                    &["rain", "drizzle", "shower", "thunder", "yağmur", "sağanak"],
                ));
        let is_heavy = is_rainy
            && (matches!(code, 65 | 67 | 82 | 95..=99)
                || has_word(&description, &["heavy", "şiddetli", "sağanak", "thunder"]));

        let precipitation = if is_snowy {
            Precipitation::Snow
        } else if is_heavy {
            Precipitation::HeavyRain
        } else if is_rainy {
            Precipitation::Rain
        } else {
            Precipitation::None
        };

        let sky = if code == 3
            || cloud_cover >= OVERCAST_CLOUD_COVER
            || has_word(&description, &["overcast", "kapalı"])
        {
            SkyCover::Overcast
        } else if code == 2 || cloud_cover >= PARTLY_CLOUDY_COVER {
            SkyCover::PartlyCloudy
        } else {
            SkyCover::Clear
        };

        Self {
            sky,
            precipitation,
            cloud_cover,
        }
    }

    pub fn is_overcast(&self) -> bool {
        self.sky == SkyCover::Overcast
    }

    pub fn is_raining(&self) -> bool {
        matches!(
            self.precipitation,
            Precipitation::Rain | Precipitation::HeavyRain
        )
    }

    pub fn is_snowing(&self) -> bool {
        self.precipitation == Precipitation::Snow
    }

    pub fn show_sun(&self) -> bool {
        !self.is_overcast() && self.precipitation == Precipitation::None
    }

    pub fn cloud_count(&self) -> usize {
        match self.sky {
            SkyCover::Overcast => 15,
            SkyCover::PartlyCloudy => 8 + (self.cloud_cover / 15.0) as usize,
            SkyCover::Clear => 4,
        }
    }

    pub fn raindrop_count(&self) -> usize {
        match self.precipitation {
            Precipitation::HeavyRain => 180,
            Precipitation::Rain => 120,
            _ => 0,
        }
    }
}

/// Named presets for `--simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Overcast,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
}

impl WeatherCondition {
    pub fn wmo_code(self) -> u16 {
        match self {
            WeatherCondition::Clear => 0,
            WeatherCondition::PartlyCloudy => 2,
            WeatherCondition::Overcast => 3,
            WeatherCondition::Drizzle => 51,
            WeatherCondition::Rain => 63,
            WeatherCondition::HeavyRain => 65,
            WeatherCondition::Snow => 73,
        }
    }

    fn cloud_cover(self) -> f32 {
        match self {
            WeatherCondition::Clear => 10.0,
            WeatherCondition::PartlyCloudy => 60.0,
            WeatherCondition::Overcast => 100.0,
            WeatherCondition::Drizzle | WeatherCondition::Snow => 70.0,
            WeatherCondition::Rain | WeatherCondition::HeavyRain => 85.0,
        }
    }

    /// Replaces the condition fields of `base`, keeping its wind.
    pub fn apply_to(self, base: &WeatherInput) -> WeatherInput {
        WeatherInput {
            code: self.wmo_code(),
            description: String::new(),
            cloud_cover: self.cloud_cover(),
            ..base.clone()
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = ConditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "clear" | "sunny" => Ok(WeatherCondition::Clear),
            "partly-cloudy" | "cloudy" => Ok(WeatherCondition::PartlyCloudy),
            "overcast" => Ok(WeatherCondition::Overcast),
            "drizzle" => Ok(WeatherCondition::Drizzle),
            "rain" => Ok(WeatherCondition::Rain),
            "heavy-rain" | "storm" => Ok(WeatherCondition::HeavyRain),
            "snow" => Ok(WeatherCondition::Snow),
            other => Err(ConditionParseError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(code: u16, description: &str, cloud_cover: f32) -> WeatherInput {
        WeatherInput {
            code,
            description: description.to_string(),
            cloud_cover,
            ..WeatherInput::default()
        }
    }

    #[test]
    fn test_clear_defaults() {
        let c = WeatherConditions::classify(&WeatherInput::default());
        assert_eq!(c.sky, SkyCover::Clear);
        assert_eq!(c.precipitation, Precipitation::None);
        assert!(c.show_sun());
        assert_eq!(c.cloud_count(), 4);
    }

    #[test]
    fn test_overcast_by_code_and_cover() {
        assert!(WeatherConditions::classify(&input(3, "", 0.0)).is_overcast());
        assert!(WeatherConditions::classify(&input(0, "", 90.0)).is_overcast());
        assert!(!WeatherConditions::classify(&input(0, "", 89.0)).is_overcast());
        assert!(WeatherConditions::classify(&input(0, "Kapalı", 0.0)).is_overcast());
    }

    #[test]
    fn test_partly_cloudy_cloud_count() {
        let c = WeatherConditions::classify(&input(2, "", 60.0));
        assert_eq!(c.sky, SkyCover::PartlyCloudy);
        assert_eq!(c.cloud_count(), 12);
    }

    #[test]
    fn test_snow_codes_are_not_rain() {
        for code in [71, 73, 75, 77, 85, 86] {
            let c = WeatherConditions::classify(&input(code, "", 50.0));
            assert!(c.is_snowing(), "code {} should be snow", code);
            assert!(!c.is_raining(), "code {} should not be rain", code);
            assert!(!c.show_sun());
        }
    }

    #[test]
    fn test_rain_and_heavy_rain() {
        assert_eq!(
            WeatherConditions::classify(&input(61, "", 0.0)).precipitation,
            Precipitation::Rain
        );
        assert_eq!(
            WeatherConditions::classify(&input(82, "", 0.0)).precipitation,
            Precipitation::HeavyRain
        );
        assert_eq!(
            WeatherConditions::classify(&input(0, "sağanak yağış", 0.0)).precipitation,
            Precipitation::HeavyRain
        );
        assert_eq!(WeatherConditions::classify(&input(61, "", 0.0)).raindrop_count(), 120);
    }

    #[test]
    fn test_description_snow() {
        assert!(WeatherConditions::classify(&input(0, "Light snow", 0.0)).is_snowing());
        assert!(WeatherConditions::classify(&input(0, "hafif kar", 0.0)).is_snowing());
    }

    #[test]
    fn test_unknown_code_is_clear() {
        let c = WeatherConditions::classify(&input(42, "mystery", f32::NAN));
        assert_eq!(c.sky, SkyCover::Clear);
        assert_eq!(c.precipitation, Precipitation::None);
        assert_eq!(c.cloud_cover, 0.0);
    }

    #[test]
    fn test_parse_condition_names() {
        assert_eq!("snow".parse::<WeatherCondition>().unwrap(), WeatherCondition::Snow);
        assert_eq!(
            "Partly_Cloudy".parse::<WeatherCondition>().unwrap(),
            WeatherCondition::PartlyCloudy
        );
        assert!("hail-of-frogs".parse::<WeatherCondition>().is_err());
    }

    #[test]
    fn test_simulated_condition_round_trips_through_classifier() {
        let base = WeatherInput::default();
        let snow = WeatherCondition::Snow.apply_to(&base);
        assert!(WeatherConditions::classify(&snow).is_snowing());
        let heavy = WeatherCondition::HeavyRain.apply_to(&base);
        assert_eq!(
            WeatherConditions::classify(&heavy).precipitation,
            Precipitation::HeavyRain
        );
        assert_eq!(snow.wind_speed, base.wind_speed);
    }
}
