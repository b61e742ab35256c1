use std::f32::consts::TAU;

const GUST_PERIOD_A: f32 = 7.3;
const GUST_PERIOD_B: f32 = 17.9;

/// Wind in pixels per reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wind {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindField {
    base: Wind,
    /// Reported wind speed in km/h.
    pub speed_kmh: f32,
    gusting: bool,
}

/// Drift multiplier for a reported wind speed. Light breezes barely move
/// anything; storms push clouds across in seconds.
pub fn speed_multiplier(speed_kmh: f32) -> f32 {
    if speed_kmh < 5.0 {
        0.02
    } else if speed_kmh < 10.0 {
        0.05
    } else if speed_kmh < 20.0 {
        0.1
    } else if speed_kmh < 35.0 {
        0.2
    } else {
        0.4
    }
}

impl WindField {
    pub fn calm() -> Self {
        Self {
            base: Wind::default(),
            speed_kmh: 0.0,
            gusting: false,
        }
    }

    /// Builds the field from meteorological speed and direction (degrees,
    /// 0 = north, 90 = east). Non-finite or negative input is calm.
    pub fn from_report(speed_kmh: f32, direction_deg: f32, gusting: bool) -> Self {
        if !speed_kmh.is_finite() || !direction_deg.is_finite() || speed_kmh < 0.0 {
            return Self {
                gusting,
                ..Self::calm()
            };
        }

        let multiplier = speed_multiplier(speed_kmh);
        let angle = (direction_deg - 90.0).to_radians();
        Self {
            base: Wind {
                x: angle.cos() * multiplier,
                y: angle.sin() * multiplier * 0.2,
            },
            speed_kmh,
            gusting,
        }
    }

    pub fn base(&self) -> Wind {
        self.base
    }

    pub fn is_gusting(&self) -> bool {
        self.gusting
    }

    /// Wind at `t` seconds since the scene started.
    pub fn sample(&self, t: f32) -> Wind {
        if !self.gusting {
            return self.base;
        }
        let amplitude = self.base.x.abs().max(0.05);
        let gust = 0.6 * (TAU * t / GUST_PERIOD_A).sin() + 0.4 * (TAU * t / GUST_PERIOD_B).sin();
        Wind {
            x: self.base.x + amplitude * gust,
            y: self.base.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_tiers() {
        assert_eq!(speed_multiplier(0.0), 0.02);
        assert_eq!(speed_multiplier(7.0), 0.05);
        assert_eq!(speed_multiplier(10.0), 0.1);
        assert_eq!(speed_multiplier(34.9), 0.2);
        assert_eq!(speed_multiplier(80.0), 0.4);
    }

    #[test]
    fn test_direction_rotates_by_quarter_turn() {
        // 180 deg maps to a 90 deg screen angle: no sideways push
        let from_south = WindField::from_report(10.0, 180.0, false);
        assert!(from_south.base().x.abs() < 1e-6);
        assert!((from_south.base().y - 0.1 * 0.2).abs() < 1e-6);

        // 90 deg maps to 0: full push to the right
        let from_east = WindField::from_report(25.0, 90.0, false);
        assert!((from_east.base().x - 0.2).abs() < 1e-6);
        assert!(from_east.base().y.abs() < 1e-6);
    }

    #[test]
    fn test_invalid_report_is_calm() {
        assert_eq!(WindField::from_report(f32::NAN, 0.0, false).base(), Wind::default());
        assert_eq!(WindField::from_report(10.0, f32::INFINITY, false).base(), Wind::default());
        assert_eq!(WindField::from_report(-3.0, 0.0, false).base(), Wind::default());
    }

    #[test]
    fn test_steady_sample_is_constant() {
        let field = WindField::from_report(12.0, 270.0, false);
        assert_eq!(field.sample(0.0), field.sample(123.4));
    }

    #[test]
    fn test_gusts_oscillate_around_base() {
        let field = WindField::from_report(12.0, 90.0, true);
        let base = field.base().x;
        let samples: Vec<f32> = (0..400).map(|i| field.sample(i as f32 * 0.1).x).collect();
        assert!(samples.iter().any(|&x| x > base + 0.01));
        assert!(samples.iter().any(|&x| x < base - 0.01));
        assert!(samples.iter().all(|&x| (x - base).abs() <= base.abs() + 1e-5));
    }
}
