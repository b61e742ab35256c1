use crate::app_state::AppState;
use crate::celestial::LocalTime;
use crate::frame_clock::FrameClock;
use crate::render::{TerminalRenderer, Viewport};
use crate::scene::SceneState;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::io;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

pub struct App {
    scene: SceneState,
    clock: FrameClock,
    started: Instant,
    frame_duration: Duration,
}

impl App {
    pub fn new(state: AppState, fps: u32, term_width: u16, term_height: u16) -> Self {
        let viewport = Viewport::from_cells(term_width, term_height);
        Self {
            scene: SceneState::new(viewport, state, 0.0),
            clock: FrameClock::new(),
            started: Instant::now(),
            frame_duration: Duration::from_millis(1000 / fps.clamp(1, 120) as u64),
        }
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub async fn run(&mut self, renderer: &mut TerminalRenderer) -> io::Result<()> {
        let mut interval = tokio::time::interval(self.frame_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Resize(width, height) => {
                        renderer.manual_resize(width, height)?;
                        self.on_resize(width, height);
                    }
                    Event::Key(key_event) if is_quit(&key_event) => return Ok(()),
                    _ => {}
                }
            }

            let now = self.now_ms();
            let dt = self.clock.tick(now);
            let canvas = renderer.canvas_mut();
            canvas.clear();
            self.scene.frame(canvas, now, dt);
            renderer.flush()?;
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        let time = LocalTime::now(self.scene.state().sky.utc_offset_hours);
        self.scene.refresh_celestial(time);
        self.scene.resize(Viewport::from_cells(width, height));
    }
}

fn is_quit(key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key_event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&key(KeyCode::Char('x'), KeyModifiers::NONE)));
    }
}
