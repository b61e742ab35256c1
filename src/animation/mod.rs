pub mod clouds;
pub mod gift_dropper;
pub mod gifts;
pub mod rain;
pub mod snow;
pub mod snow_plow;
pub mod stars;
