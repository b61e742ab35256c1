pub mod condition;
pub mod wind;

pub use condition::{Precipitation, SkyCover, WeatherCondition, WeatherConditions};
pub use wind::{Wind, WindField};
