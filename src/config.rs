use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_WEATHER_CODE: &str = "WINTERSKY_WEATHER_CODE";
pub const ENV_UTC_OFFSET: &str = "WINTERSKY_UTC_OFFSET";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherInput,
    #[serde(default)]
    pub sky: SkySettings,
    #[serde(default)]
    pub scene: SceneSettings,
}

/// Environmental inputs supplied by the host. Read once at startup.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherInput {
    /// WMO weather interpretation code.
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub description: String,
    /// Percent, 0-100.
    #[serde(default)]
    pub cloud_cover: f32,
    /// km/h
    #[serde(default = "default_wind_speed")]
    pub wind_speed: f32,
    /// Degrees, meteorological (0 = north).
    #[serde(default = "default_wind_direction")]
    pub wind_direction: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SkySettings {
    #[serde(default = "default_sunrise_hour")]
    pub sunrise_hour: f32,
    #[serde(default = "default_sunset_hour")]
    pub sunset_hour: f32,
    /// Fixed offset from UTC. Unset means the device's local time.
    #[serde(default)]
    pub utc_offset_hours: Option<f32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Ground, tree, sleigh and plow.
    #[serde(default = "default_true")]
    pub holiday: bool,
    #[serde(default)]
    pub gusting: bool,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Seed for runtime randomness; random per session when unset.
    #[serde(default)]
    pub seed: Option<u32>,
}

pub fn default_wind_speed() -> f32 {
    10.0
}

pub fn default_wind_direction() -> f32 {
    180.0
}

pub fn default_sunrise_hour() -> f32 {
    7.0
}

pub fn default_sunset_hour() -> f32 {
    18.0
}

fn default_true() -> bool {
    true
}

pub fn default_fps() -> u32 {
    30
}

impl Default for WeatherInput {
    fn default() -> Self {
        Self {
            code: 0,
            description: String::new(),
            cloud_cover: 0.0,
            wind_speed: default_wind_speed(),
            wind_direction: default_wind_direction(),
        }
    }
}

impl Default for SkySettings {
    fn default() -> Self {
        Self {
            sunrise_hour: default_sunrise_hour(),
            sunset_hour: default_sunset_hour(),
            utc_offset_hours: None,
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            holiday: true,
            gusting: false,
            fps: default_fps(),
            seed: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides()?;
            return Ok(config);
        }

        let mut config = Self::load_from_path(&config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(ENV_WEATHER_CODE) {
            let code = val
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: ENV_WEATHER_CODE,
                    value: val.clone(),
                })?;
            self.weather.code = code;
        }

        if let Ok(val) = env::var(ENV_UTC_OFFSET) {
            let offset = val
                .trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: ENV_UTC_OFFSET,
                    value: val.clone(),
                })?;
            self.sky.utc_offset_hours = Some(offset);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let SkySettings {
            sunrise_hour: sunrise,
            sunset_hour: sunset,
            ..
        } = self.sky;
        if !(0.0..=24.0).contains(&sunrise) || !(0.0..=24.0).contains(&sunset) || sunrise >= sunset
        {
            return Err(ConfigError::InvalidSunWindow { sunrise, sunset });
        }

        if !(0.0..=100.0).contains(&self.weather.cloud_cover) {
            return Err(ConfigError::InvalidCloudCover(self.weather.cloud_cover));
        }

        if !(1..=120).contains(&self.scene.fps) {
            return Err(ConfigError::InvalidFps(self.scene.fps));
        }

        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(ConfigError::ParseError)
    }

    pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config)
        } else {
            dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
                .ok_or(ConfigError::NoConfigDir)?
        };

        Ok(config_dir.join("wintersky"))
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_deserialize_valid() {
        let toml_content = r#"
[weather]
code = 73
description = "moderate snow"
cloud_cover = 80
wind_speed = 22.5
wind_direction = 270

[sky]
sunrise_hour = 8
sunset_hour = 16.5
utc_offset_hours = 3
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.weather.code, 73);
        assert_eq!(config.weather.description, "moderate snow");
        assert_eq!(config.weather.cloud_cover, 80.0);
        assert_eq!(config.weather.wind_speed, 22.5);
        assert_eq!(config.weather.wind_direction, 270.0);
        assert_eq!(config.sky.sunrise_hour, 8.0);
        assert_eq!(config.sky.sunset_hour, 16.5);
        assert_eq!(config.sky.utc_offset_hours, Some(3.0));
    }

    #[test]
    fn test_config_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.weather, WeatherInput::default());
        assert_eq!(config.sky, SkySettings::default());
        assert!(config.scene.holiday);
        assert!(!config.scene.gusting);
        assert_eq!(config.scene.fps, 30);
        assert_eq!(config.scene.seed, None);
    }

    #[test]
    fn test_config_partial_weather_section() {
        let toml_content = r#"
[weather]
code = 3
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.weather.code, 3);
        assert_eq!(config.weather.wind_speed, default_wind_speed());
        assert_eq!(config.weather.wind_direction, default_wind_direction());
    }

    #[test]
    fn test_config_scene_section() {
        let toml_content = r#"
[scene]
holiday = false
gusting = true
fps = 60
seed = 1234
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(!config.scene.holiday);
        assert!(config.scene.gusting);
        assert_eq!(config.scene.fps, 60);
        assert_eq!(config.scene.seed, Some(1234));
    }

    #[test]
    fn test_config_load_from_path_file_not_found() {
        let nonexistent_path = PathBuf::from("/tmp/nonexistent_wintersky_config_12345.toml");
        let result = Config::load_from_path(&nonexistent_path);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), "ReadError");
    }

    #[test]
    fn test_config_load_from_path_invalid_toml() {
        let toml_content = "this is not valid toml {{{{";
        let temp_dir = std::env::temp_dir();
        let test_config_path = temp_dir.join("wintersky_test_invalid.toml");
        fs::write(&test_config_path, toml_content).unwrap();

        let result = Config::load_from_path(&test_config_path);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), "ParseError");

        fs::remove_file(test_config_path).ok();
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_sunrise_after_sunset() {
        let mut config = Config::default();
        config.sky.sunrise_hour = 19.0;
        let result = config.validate();
        assert_eq!(result.unwrap_err().kind(), "InvalidSunWindow");
    }

    #[test]
    fn test_validation_sun_window_out_of_range() {
        let mut config = Config::default();
        config.sky.sunset_hour = 25.0;
        assert_eq!(config.validate().unwrap_err().kind(), "InvalidSunWindow");

        let mut config = Config::default();
        config.sky.sunrise_hour = -1.0;
        assert_eq!(config.validate().unwrap_err().kind(), "InvalidSunWindow");
    }

    #[test]
    fn test_validation_cloud_cover() {
        let mut config = Config::default();
        config.weather.cloud_cover = 101.0;
        assert_eq!(config.validate().unwrap_err().kind(), "InvalidCloudCover");
    }

    #[test]
    fn test_validation_fps() {
        let mut config = Config::default();
        config.scene.fps = 0;
        assert_eq!(config.validate().unwrap_err().kind(), "InvalidFps");
        config.scene.fps = 121;
        assert_eq!(config.validate().unwrap_err().kind(), "InvalidFps");
    }

    #[test]
    fn test_env_var_weather_code_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::set_var(ENV_WEATHER_CODE, " 71 ");
            env::remove_var(ENV_UTC_OFFSET);
        }
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.weather.code, 71);
        assert_eq!(config.sky.utc_offset_hours, None);
        unsafe { env::remove_var(ENV_WEATHER_CODE) };
    }

    #[test]
    fn test_env_var_utc_offset_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::remove_var(ENV_WEATHER_CODE);
            env::set_var(ENV_UTC_OFFSET, "5.5");
        }
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.sky.utc_offset_hours, Some(5.5));
        unsafe { env::remove_var(ENV_UTC_OFFSET) };
    }

    #[test]
    fn test_env_var_invalid_weather_code() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::set_var(ENV_WEATHER_CODE, "snowy");
            env::remove_var(ENV_UTC_OFFSET);
        }
        let mut config = Config::default();
        let result = config.apply_env_overrides();
        assert_eq!(result.unwrap_err().kind(), "InvalidEnvVar");
        unsafe { env::remove_var(ENV_WEATHER_CODE) };
    }
}
