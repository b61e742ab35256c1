use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, IsTerminal, Stdout, Write};

/// Width of one terminal cell in virtual pixels.
pub const CELL_W: f32 = 8.0;
/// Height of one terminal cell in virtual pixels.
pub const CELL_H: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: cols as f32 * CELL_W,
            height: rows as f32 * CELL_H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

/// Back buffer every scene stage draws into.
///
/// Callers work in virtual pixels through [`Canvas::plot`] or in cells
/// through [`Canvas::put`]; anything outside the grid is dropped.
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols as usize * rows as usize],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_cells(self.cols, self.rows)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Cell::default(); cols as usize * rows as usize];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index(col as i32, row as i32).map(|i| &self.cells[i])
    }

    pub fn put(&mut self, col: i32, row: i32, ch: char, fg: Color) {
        if let Some(i) = self.index(col, row) {
            self.cells[i].ch = ch;
            self.cells[i].fg = fg;
        }
    }

    pub fn set_bg(&mut self, col: i32, row: i32, bg: Color) {
        if let Some(i) = self.index(col, row) {
            self.cells[i].bg = bg;
        }
    }

    /// Fills a cell completely: glyph, foreground and background.
    pub fn fill(&mut self, col: i32, row: i32, ch: char, fg: Color, bg: Color) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = Cell { ch, fg, bg };
        }
    }

    /// Multiplies both colors of a cell by `factor` (RGB colors only).
    pub fn shade(&mut self, col: i32, row: i32, factor: f32) {
        if let Some(i) = self.index(col, row) {
            let cell = &mut self.cells[i];
            cell.fg = scale_color(cell.fg, factor);
            cell.bg = scale_color(cell.bg, factor);
        }
    }

    pub fn plot(&mut self, x: f32, y: f32, ch: char, fg: Color) {
        let (col, row) = to_cell(x, y);
        self.put(col, row, ch, fg);
    }
}

pub fn to_cell(x: f32, y: f32) -> (i32, i32) {
    ((x / CELL_W).floor() as i32, (y / CELL_H).floor() as i32)
}

/// Pixel coordinates of a cell's center.
pub fn cell_center(col: u16, row: u16) -> (f32, f32) {
    (
        (col as f32 + 0.5) * CELL_W,
        (row as f32 + 0.5) * CELL_H,
    )
}

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

pub fn scale_color(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb { r, g, b } => {
            let f = factor.clamp(0.0, 2.0);
            let s = |c: u8| (c as f32 * f).round().clamp(0.0, 255.0) as u8;
            Color::Rgb {
                r: s(r),
                g: s(g),
                b: s(b),
            }
        }
        other => other,
    }
}

/// Linear blend between two RGB colors; non-RGB inputs return `a`.
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    match (a, b) {
        (Color::Rgb { r: r1, g: g1, b: b1 }, Color::Rgb { r: r2, g: g2, b: b2 }) => {
            let t = t.clamp(0.0, 1.0);
            let m = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
            Color::Rgb {
                r: m(r1, r2),
                g: m(g1, g2),
                b: m(b1, b2),
            }
        }
        _ => a,
    }
}

/// Samples a multi-stop gradient at `t` in `[0, 1]`.
pub fn gradient(stops: &[(f32, Color)], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match stops {
        [] => Color::Black,
        [only] => only.1,
        _ => {
            for pair in stops.windows(2) {
                let (t0, c0) = pair[0];
                let (t1, c1) = pair[1];
                if t <= t1 {
                    let span = (t1 - t0).max(f32::EPSILON);
                    return lerp_color(c0, c1, (t - t0) / span);
                }
            }
            stops[stops.len() - 1].1
        }
    }
}

pub struct TerminalRenderer {
    stdout: Stdout,
    canvas: Canvas,
}

impl TerminalRenderer {
    /// Returns `None` when stdout is not attached to a terminal.
    pub fn new() -> io::Result<Option<Self>> {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return Ok(None);
        }
        let (cols, rows) = terminal::size()?;
        Ok(Some(Self {
            stdout,
            canvas: Canvas::new(cols, rows),
        }))
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn get_size(&self) -> (u16, u16) {
        self.canvas.size()
    }

    pub fn manual_resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.canvas.resize(cols, rows);
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let (cols, rows) = self.canvas.size();
        let mut fg = None;
        let mut bg = None;
        for row in 0..rows {
            queue!(self.stdout, cursor::MoveTo(0, row))?;
            for col in 0..cols {
                let Some(cell) = self.canvas.cell(col, row).copied() else {
                    continue;
                };
                if fg != Some(cell.fg) {
                    queue!(self.stdout, SetForegroundColor(cell.fg))?;
                    fg = Some(cell.fg);
                }
                if bg != Some(cell.bg) {
                    queue!(self.stdout, SetBackgroundColor(cell.bg))?;
                    bg = Some(cell.bg);
                }
                queue!(self.stdout, Print(cell.ch))?;
            }
        }
        self.stdout.flush()
    }
}
