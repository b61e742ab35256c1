pub mod animation;
pub mod animation_manager;
pub mod app;
pub mod app_state;
pub mod celestial;
pub mod config;
pub mod error;
pub mod frame_clock;
pub mod noise;
pub mod render;
pub mod scene;
pub mod weather;
