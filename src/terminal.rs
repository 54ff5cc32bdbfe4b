use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use unicode_width::UnicodeWidthStr;

use crate::error::GameError;
use crate::game::{Frame, RoundSummary};
use crate::ghost::GhostKind;
use crate::grid::{Cell, Dir};
use crate::round::{RoundOutcome, START_LIVES};
use crate::scheduler::{Controls, Display};

const HEART_SOLID: &str = "♥";
const HEART_EMPTY: &str = "♡";
const KEY_WAIT: Duration = Duration::from_millis(50);

/// Raw mode plus alternate screen for as long as it lives.
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    /// Once raw mode is on, any later failure still restores the terminal on drop.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = Self {
            stdout: io::stdout(),
        };
        guard.stdout.execute(EnterAlternateScreen)?;
        guard.stdout.execute(Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.stdout.execute(Show) {
            tracing::error!(?err, "failed to show cursor");
        }
        if let Err(err) = self.stdout.execute(LeaveAlternateScreen) {
            tracing::error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
    }
}

fn key_char(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::Char(c) => Some(c),
        KeyCode::Enter => Some('\r'),
        KeyCode::Up => Some('w'),
        KeyCode::Left => Some('a'),
        KeyCode::Down => Some('s'),
        KeyCode::Right => Some('d'),
        KeyCode::Esc => Some('q'),
        _ => None,
    }
}

/// Next key press, if one is already waiting.
fn try_read_key() -> io::Result<Option<char>> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                if let Some(c) = key_char(key.code) {
                    return Ok(Some(c));
                }
            }
        }
    }
    Ok(None)
}

fn wait_key() -> io::Result<char> {
    loop {
        if event::poll(KEY_WAIT)? {
            if let Some(c) = try_read_key()? {
                return Ok(c);
            }
        }
    }
}

fn drain_keys() -> io::Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

#[derive(Default)]
pub struct KeyboardControls;

impl Controls for KeyboardControls {
    fn poll_key(&mut self) -> Result<Option<char>, GameError> {
        Ok(try_read_key()?)
    }
}

fn cell_style(cell: Cell, powered: bool) -> (&'static str, Color) {
    match cell {
        Cell::Wall => ("█", Color::Blue),
        Cell::Empty => (" ", Color::Reset),
        Cell::Pellet => (".", Color::DarkYellow),
        Cell::Power => ("o", Color::White),
        Cell::PortalLeft => ("[", Color::DarkCyan),
        Cell::PortalRight => ("]", Color::DarkCyan),
        Cell::Player(dir) => {
            // Mouth opens toward the direction of travel.
            let text = match dir {
                Dir::Up => "v",
                Dir::Down => "^",
                Dir::Left => ">",
                Dir::Right => "<",
            };
            (text, Color::Yellow)
        }
        Cell::Ghost(kind) => {
            let text = match kind {
                GhostKind::Blinky => "M",
                GhostKind::Pinky => "W",
                GhostKind::Inky => "Y",
                GhostKind::Clyde => "U",
            };
            let color = if powered {
                Color::White
            } else {
                match kind {
                    GhostKind::Blinky => Color::Red,
                    GhostKind::Pinky => Color::Magenta,
                    GhostKind::Inky => Color::Green,
                    GhostKind::Clyde => Color::Cyan,
                }
            };
            (text, color)
        }
    }
}

/// Colorized board renderer that only redraws cells that changed.
pub struct TerminalDisplay {
    stdout: Stdout,
    last: Vec<(Cell, bool)>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self {
            stdout: io::stdout(),
            last: Vec::new(),
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

impl TerminalDisplay {
    fn hud(frame: &Frame<'_>) -> String {
        let round = frame.round;
        let hearts: String = (0..START_LIVES)
            .map(|i| if i < round.lives() { HEART_SOLID } else { HEART_EMPTY })
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Level {}  Score: {}  Lives: {}  Pickups: {}/{}{}",
            frame.level,
            round.score(),
            hearts,
            round.pickups_consumed(),
            round.total_pickups(),
            if round.is_powered() { "  SUPER" } else { "" }
        )
    }

    fn print_line(&mut self, x: u16, y: u16, text: &str, color: Color, width: usize) -> io::Result<()> {
        self.stdout.queue(MoveTo(x, y))?;
        self.stdout.queue(SetForegroundColor(color))?;
        self.stdout.queue(Print(text))?;
        let used = UnicodeWidthStr::width(text);
        if used < width {
            self.stdout.queue(Print(" ".repeat(width - used)))?;
        }
        self.stdout.queue(ResetColor)?;
        Ok(())
    }

    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let grid = frame.grid;
        let width = grid.width();
        let needed_w = width as u16;
        let needed_h = grid.height() as u16 + 2;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            self.stdout.queue(MoveTo(0, 0))?;
            self.stdout.queue(Clear(ClearType::All))?;
            self.stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            self.stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != width * grid.height() {
            self.last = vec![(Cell::Empty, false); width * grid.height()];
            self.needs_full = true;
        }
        if self.needs_full {
            self.stdout.queue(Clear(ClearType::All))?;
        }

        let hud = Self::hud(frame);
        if self.needs_full || hud != self.last_hud {
            let line_w = term_w.saturating_sub(self.origin_x) as usize;
            self.print_line(self.origin_x, self.origin_y - 1, &hud, Color::White, line_w)?;
            self.last_hud = hud;
        }

        let powered = frame.round.is_powered();
        for (y, row) in grid.rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let idx = y * width + x;
                let state = (*cell, powered && cell.is_ghost());
                if !self.needs_full && self.last[idx] == state {
                    continue;
                }
                self.last[idx] = state;
                let (text, color) = cell_style(*cell, powered);
                self.stdout
                    .queue(MoveTo(self.origin_x + x as u16, self.origin_y + y as u16))?;
                self.stdout.queue(SetForegroundColor(color))?;
                self.stdout.queue(Print(text))?;
            }
        }
        self.stdout.queue(ResetColor)?;

        let message = format!("[GAME] {}", frame.round.message());
        let line_w = term_w.saturating_sub(self.origin_x) as usize;
        self.print_line(
            self.origin_x,
            self.origin_y + grid.height() as u16,
            &message,
            Color::DarkYellow,
            line_w,
        )?;
        self.needs_full = false;
        self.stdout.flush()
    }
}

impl Display for TerminalDisplay {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), GameError> {
        Ok(self.render(frame)?)
    }
}

fn show_lines(stdout: &mut Stdout, lines: &[(String, Color)]) -> io::Result<()> {
    stdout.queue(Clear(ClearType::All))?;
    for (row, (text, color)) in lines.iter().enumerate() {
        stdout.queue(MoveTo(2, row as u16 + 1))?;
        stdout.queue(SetForegroundColor(*color))?;
        stdout.queue(Print(text))?;
    }
    stdout.queue(ResetColor)?;
    stdout.flush()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuChoice {
    Play(u8),
    Quit,
}

/// Title screen keys. Movement keys are ignored so a stray arrow press does not start a round.
fn menu_choice(key: char) -> Option<MenuChoice> {
    match key {
        '1' | '\r' | '\n' => Some(MenuChoice::Play(1)),
        '2' => Some(MenuChoice::Play(2)),
        'q' | 'Q' => Some(MenuChoice::Quit),
        _ => None,
    }
}

/// Asks for a level. `None` means quit.
pub fn title_screen() -> io::Result<Option<u8>> {
    let mut stdout = io::stdout();
    drain_keys()?;
    show_lines(
        &mut stdout,
        &[
            ("MAZE CHASE".to_string(), Color::Yellow),
            (String::new(), Color::Reset),
            ("1 / 2  start level 1 or 2".to_string(), Color::White),
            ("w a s d or arrows  move".to_string(), Color::White),
            ("q  quit".to_string(), Color::White),
        ],
    )?;
    loop {
        match menu_choice(wait_key()?) {
            Some(MenuChoice::Play(level)) => return Ok(Some(level)),
            Some(MenuChoice::Quit) => return Ok(None),
            None => {}
        }
    }
}

/// Shows the result. Returns true when the player wants another round.
pub fn end_screen(summary: &RoundSummary) -> io::Result<bool> {
    let mut stdout = io::stdout();
    let (headline, color) = match summary.outcome {
        RoundOutcome::Won => ("YOU WON", Color::Green),
        RoundOutcome::Lost => ("GAME OVER", Color::Red),
        RoundOutcome::Aborted => ("ROUND ABANDONED", Color::Yellow),
    };
    drain_keys()?;
    show_lines(
        &mut stdout,
        &[
            (headline.to_string(), color),
            (String::new(), Color::Reset),
            (format!("Score: {}", summary.score), Color::White),
            (
                format!("Pickups: {}/{}", summary.pickups, summary.total_pickups),
                Color::White,
            ),
            (String::new(), Color::Reset),
            (
                "Press 'r' to play again, any other key to exit.".to_string(),
                Color::Cyan,
            ),
        ],
    )?;
    Ok(matches!(wait_key()?, 'r' | 'R'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_to_movement_keys() {
        assert_eq!(key_char(KeyCode::Up), Some('w'));
        assert_eq!(key_char(KeyCode::Down), Some('s'));
        assert_eq!(key_char(KeyCode::Esc), Some('q'));
        assert_eq!(key_char(KeyCode::Tab), None);
    }

    #[test]
    fn title_screen_ignores_movement_keys() {
        for key in ['w', 'a', 's', 'd', 'S'] {
            assert_eq!(menu_choice(key), None, "{key:?}");
        }
        assert_eq!(menu_choice(key_char(KeyCode::Down).unwrap()), None);
        assert_eq!(menu_choice('1'), Some(MenuChoice::Play(1)));
        assert_eq!(menu_choice(key_char(KeyCode::Enter).unwrap()), Some(MenuChoice::Play(1)));
        assert_eq!(menu_choice('2'), Some(MenuChoice::Play(2)));
        assert_eq!(menu_choice('q'), Some(MenuChoice::Quit));
    }

    #[test]
    fn powered_ghosts_turn_white() {
        let (text, color) = cell_style(Cell::Ghost(GhostKind::Blinky), true);
        assert_eq!((text, color), ("M", Color::White));
        assert_eq!(cell_style(Cell::Ghost(GhostKind::Blinky), false).1, Color::Red);
        assert_eq!(cell_style(Cell::Player(Dir::Left), false).0, ">");
    }
}
