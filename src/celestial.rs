//! Sun and moon placement, day/night state and the sky palette.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Timelike, Utc};
use crossterm::style::Color;
use std::f32::consts::{PI, TAU};

use crate::config::SkySettings;
use crate::render::{Canvas, Viewport, cell_center, gradient, lerp_color, rgb, to_cell};
use crate::weather::WeatherConditions;

pub const SYNODIC_MONTH_DAYS: f64 = 29.53;
const HORIZON_THRESHOLD: f32 = 0.15;
const SUN_RADIUS: f32 = 38.0;
const MOON_RADIUS: f32 = 28.0;
const SUN_PEAK: f32 = 0.12;
const SUN_HORIZON: f32 = 0.40;
const SPOT_COLOR: Color = Color::Rgb { r: 255, g: 224, b: 130 };

/// Flares sit on the line from the sun through the frame center:
/// (fraction of that line, radius in pixels, tint, strength).
const FLARES: [(f32, f32, Color, f32); 4] = [
    (0.3, 30.0, Color::Rgb { r: 255, g: 200, b: 100 }, 0.15),
    (0.5, 50.0, Color::Rgb { r: 100, g: 200, b: 255 }, 0.10),
    (0.7, 40.0, Color::Rgb { r: 255, g: 150, b: 50 }, 0.08),
    (1.2, 70.0, Color::Rgb { r: 150, g: 255, b: 200 }, 0.06),
];

/// Hour of day (with minutes as a fraction) and calendar date at the
/// scene's location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTime {
    pub hour: f32,
    pub date: NaiveDate,
}

impl LocalTime {
    pub fn now(utc_offset_hours: Option<f32>) -> Self {
        Self::at(Utc::now(), utc_offset_hours)
    }

    /// Shifts `utc` by a fixed offset; an absent or out-of-range offset
    /// uses the device's local zone.
    pub fn at(utc: DateTime<Utc>, utc_offset_hours: Option<f32>) -> Self {
        let offset = utc_offset_hours
            .filter(|h| h.is_finite())
            .and_then(|h| FixedOffset::east_opt((h * 3600.0).round() as i32));

        match offset {
            Some(offset) => {
                let t = utc.with_timezone(&offset);
                Self::from_parts(t.hour(), t.minute(), t.date_naive())
            }
            None => {
                if utc_offset_hours.is_some() {
                    tracing::warn!(?utc_offset_hours, "invalid UTC offset, using local time");
                }
                let t = utc.with_timezone(&Local);
                Self::from_parts(t.hour(), t.minute(), t.date_naive())
            }
        }
    }

    fn from_parts(hour: u32, minute: u32, date: NaiveDate) -> Self {
        Self {
            hour: hour as f32 + minute as f32 / 60.0,
            date,
        }
    }
}

/// Fraction of the synodic month: 0 new, 0.5 full.
pub fn moon_phase(date: NaiveDate) -> f32 {
    let c = (365.25 * date.year() as f64).floor() + (30.6 * date.month() as f64).floor()
        + date.day() as f64
        - 694_039.09;
    let phase = c / SYNODIC_MONTH_DAYS;
    (phase - phase.floor()) as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celestial {
    pub hour: f32,
    pub sunrise: f32,
    pub sunset: f32,
    pub is_day: bool,
    pub day_progress: f32,
    pub moon_phase: f32,
}

impl Celestial {
    pub fn compute(time: LocalTime, sky: &SkySettings) -> Self {
        let sunrise = sky.sunrise_hour;
        let sunset = sky.sunset_hour;
        let day_length = (sunset - sunrise).max(f32::EPSILON);
        Self {
            hour: time.hour,
            sunrise,
            sunset,
            is_day: time.hour >= sunrise && time.hour < sunset,
            day_progress: ((time.hour - sunrise) / day_length).clamp(0.0, 1.0),
            moon_phase: moon_phase(time.date),
        }
    }

    pub fn sun_position(&self, viewport: Viewport) -> (f32, f32) {
        let p = self.day_progress;
        let x = viewport.width * (0.10 + p * 0.80);
        let low = viewport.height * SUN_HORIZON;
        let high = viewport.height * SUN_PEAK;
        let y = low - (p * PI).sin() * (low - high);
        (x, y)
    }

    /// 0 away from the horizon, ramping to 1 at sunrise and sunset.
    pub fn horizon_factor(&self) -> f32 {
        let p = self.day_progress;
        if p < HORIZON_THRESHOLD {
            1.0 - p / HORIZON_THRESHOLD
        } else if p > 1.0 - HORIZON_THRESHOLD {
            (p - (1.0 - HORIZON_THRESHOLD)) / HORIZON_THRESHOLD
        } else {
            0.0
        }
    }

    pub fn moon_position(&self, viewport: Viewport) -> (f32, f32) {
        (viewport.width * 0.85, viewport.height * 0.18)
    }

    /// Horizontal offset of the terminator ellipse from the moon's center.
    /// Positive while waxing toward full, negative past it.
    pub fn moon_shadow_offset(&self) -> f32 {
        (self.moon_phase * TAU).cos() * MOON_RADIUS * 2.0
    }

    pub fn sky_gradient(&self, conditions: &WeatherConditions) -> Vec<(f32, Color)> {
        if !self.is_day {
            vec![
                (0.0, rgb(10, 10, 26)),
                (0.3, rgb(15, 22, 56)),
                (0.7, rgb(26, 35, 126)),
                (1.0, rgb(40, 53, 147)),
            ]
        } else if conditions.is_overcast() {
            vec![
                (0.0, rgb(144, 164, 174)),
                (0.4, rgb(176, 190, 197)),
                (1.0, rgb(207, 216, 220)),
            ]
        } else if self.hour < 9.0 {
            vec![
                (0.0, rgb(110, 181, 255)),
                (0.4, rgb(135, 206, 235)),
                (0.7, rgb(255, 212, 163)),
                (1.0, rgb(255, 179, 71)),
            ]
        } else if self.hour >= 16.0 {
            vec![
                (0.0, rgb(74, 111, 165)),
                (0.3, rgb(255, 140, 66)),
                (0.6, rgb(255, 107, 53)),
                (1.0, rgb(214, 48, 49)),
            ]
        } else {
            vec![
                (0.0, rgb(41, 128, 185)),
                (0.4, rgb(86, 204, 242)),
                (0.8, rgb(135, 206, 235)),
                (1.0, rgb(168, 216, 234)),
            ]
        }
    }
}

pub fn render_sky(canvas: &mut Canvas, celestial: &Celestial, conditions: &WeatherConditions) {
    let stops = celestial.sky_gradient(conditions);
    let (cols, rows) = canvas.size();
    for row in 0..rows {
        let t = if rows > 1 {
            row as f32 / (rows - 1) as f32
        } else {
            0.0
        };
        let color = gradient(&stops, t);
        for col in 0..cols {
            canvas.fill(col as i32, row as i32, ' ', Color::White, color);
        }
    }
}

/// Three drifting surface spots as `(x, y, radius)`.
pub fn sun_spots(sx: f32, sy: f32, elapsed: f32) -> [(f32, f32, f32); 3] {
    std::array::from_fn(|i| {
        let i = i as f32;
        (
            sx + (elapsed * 0.5 + i * 2.0).cos() * SUN_RADIUS * 0.4,
            sy + (elapsed * 0.3 + i * 2.5).sin() * SUN_RADIUS * 0.3,
            SUN_RADIUS * (0.15 + (elapsed + i).sin() * 0.05),
        )
    })
}

/// Lens flare centers, radii, tints and strengths for a sun at `(sx, sy)`.
pub fn lens_flares(viewport: Viewport, sx: f32, sy: f32) -> [(f32, f32, f32, Color, f32); 4] {
    let dx = viewport.width / 2.0 - sx;
    let dy = viewport.height / 2.0 - sy;
    FLARES.map(|(along, radius, color, strength)| {
        (sx + dx * along, sy + dy * along, radius, color, strength)
    })
}

pub fn render_sun(canvas: &mut Canvas, celestial: &Celestial, elapsed: f32) {
    let viewport = canvas.viewport();
    let (sx, sy) = celestial.sun_position(viewport);
    let horizon = celestial.horizon_factor();

    let (core, rim, glow) = if horizon > 0.3 {
        (rgb(255, 228, 181), rgb(255, 99, 71), rgb(255, 120, 80))
    } else if horizon > 0.0 {
        (rgb(255, 248, 220), rgb(255, 165, 0), rgb(255, 200, 120))
    } else {
        (rgb(255, 254, 245), rgb(255, 235, 59), rgb(255, 250, 220))
    };

    let (cols, rows) = canvas.size();
    let reach = SUN_RADIUS * 3.0;
    let spin = elapsed * 0.1;
    let spots = sun_spots(sx, sy, elapsed);
    for row in 0..rows {
        for col in 0..cols {
            let (px, py) = cell_center(col, row);
            let dx = px - sx;
            let dy = py - sy;
            let d = (dx * dx + dy * dy).sqrt();
            if d > reach {
                continue;
            }
            let (c, r) = (col as i32, row as i32);
            if d <= SUN_RADIUS {
                let t = d / SUN_RADIUS;
                let mut color =
                    gradient(&[(0.0, rgb(255, 255, 255)), (0.4, core), (1.0, rim)], t);
                let on_spot = spots.iter().any(|&(x, y, radius)| {
                    (px - x).powi(2) + (py - y).powi(2) <= radius * radius
                });
                if on_spot {
                    color = lerp_color(color, SPOT_COLOR, 0.15);
                }
                canvas.fill(c, r, '█', color, color);
            } else {
                // twelve slowly rotating rays
                let angle = dy.atan2(dx) - spin;
                let ray = ((angle * 6.0 / PI).round() - angle * 6.0 / PI).abs() < 0.12;
                let falloff = 1.0 - (d - SUN_RADIUS) / (reach - SUN_RADIUS);
                if ray && d < SUN_RADIUS * 2.4 {
                    canvas.put(c, r, '·', glow);
                }
                if let Some(cell) = canvas.cell(col, row).copied() {
                    let bg = lerp_color(cell.bg, glow, falloff * 0.35);
                    canvas.set_bg(c, r, bg);
                }
            }
        }
    }

    for (fx, fy, radius, tint, strength) in lens_flares(viewport, sx, sy) {
        let (c0, r0) = to_cell(fx - radius, fy - radius);
        let (c1, r1) = to_cell(fx + radius, fy + radius);
        for row in r0.max(0)..=r1 {
            for col in c0.max(0)..=c1 {
                let (px, py) = cell_center(col as u16, row as u16);
                let d = ((px - fx).powi(2) + (py - fy).powi(2)).sqrt();
                if d > radius {
                    continue;
                }
                if let Some(cell) = canvas.cell(col as u16, row as u16).copied() {
                    let bg = lerp_color(cell.bg, tint, strength * (1.0 - d / radius));
                    canvas.set_bg(col, row, bg);
                }
            }
        }
    }
}

pub fn render_moon(canvas: &mut Canvas, celestial: &Celestial) {
    let viewport = canvas.viewport();
    let (mx, my) = celestial.moon_position(viewport);
    let offset = celestial.moon_shadow_offset();
    let shadow_rx = offset.abs().max(f32::EPSILON);

    let craters = [(-8.0, -10.0, 7.0), (12.0, 5.0, 5.0), (-5.0, 12.0, 6.0), (8.0, -8.0, 4.0)];

    let (cols, rows) = canvas.size();
    for row in 0..rows {
        for col in 0..cols {
            let (px, py) = cell_center(col, row);
            let dx = px - mx;
            let dy = py - my;
            let d = (dx * dx + dy * dy).sqrt();
            let (c, r) = (col as i32, row as i32);
            if d <= MOON_RADIUS {
                let sx = (px - (mx + offset)) / shadow_rx;
                let sy = dy / MOON_RADIUS;
                let in_shadow = sx * sx + sy * sy <= 1.0;
                let on_crater = craters.iter().any(|&(cx, cy, cr)| {
                    let ex = dx - cx;
                    let ey = dy - cy;
                    ex * ex + ey * ey <= cr * cr
                });
                let color = if in_shadow {
                    rgb(20, 20, 40)
                } else if on_crater {
                    rgb(200, 196, 176)
                } else {
                    rgb(245, 245, 220)
                };
                canvas.fill(c, r, '█', color, color);
            } else if d <= MOON_RADIUS * 3.0 {
                if let Some(cell) = canvas.cell(col, row).copied() {
                    let falloff = 1.0 - (d - MOON_RADIUS) / (MOON_RADIUS * 2.0);
                    let bg = lerp_color(cell.bg, rgb(200, 200, 220), falloff * 0.15);
                    canvas.set_bg(c, r, bg);
                }
            }
        }
    }
}
