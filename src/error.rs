use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("could not determine a config directory")]
    NoConfigDir,

    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnvVar { name: &'static str, value: String },

    #[error("invalid daylight window: sunrise {sunrise} must be before sunset {sunset}, both within 0-24")]
    InvalidSunWindow { sunrise: f32, sunset: f32 },

    #[error("cloud cover must be between 0 and 100, got {0}")]
    InvalidCloudCover(f32),

    #[error("fps must be between 1 and 120, got {0}")]
    InvalidFps(u32),
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::ReadError { .. } => "ReadError",
            ConfigError::ParseError(_) => "ParseError",
            ConfigError::NoConfigDir => "NoConfigDir",
            ConfigError::InvalidEnvVar { .. } => "InvalidEnvVar",
            ConfigError::InvalidSunWindow { .. } => "InvalidSunWindow",
            ConfigError::InvalidCloudCover(_) => "InvalidCloudCover",
            ConfigError::InvalidFps(_) => "InvalidFps",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConditionParseError {
    #[error("unknown weather condition '{0}', expected one of: clear, partly-cloudy, overcast, drizzle, rain, heavy-rain, snow")]
    Unknown(String),
}
