use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use rand::rngs::ThreadRng;

use crate::board::{Tile, SIDE};
use crate::session::{transition, Action, Effect, Session};

const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;
const ORIGIN_X: u16 = 2;
const ORIGIN_Y: u16 = 1;

pub fn run(mut session: Session, mut rng: ThreadRng) -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    let result = event_loop(&mut stdout, &mut session, &mut rng);

    execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn event_loop(
    stdout: &mut io::Stdout,
    session: &mut Session,
    rng: &mut ThreadRng,
) -> io::Result<()> {
    loop {
        draw(stdout, session)?;

        // Short timeout so the clock repaints while the player thinks.
        if !event::poll(Duration::from_millis(125))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('s') => dispatch(session, Action::Shuffle, rng),
                KeyCode::Char('r') => dispatch(session, Action::Restart, rng),
                KeyCode::Char('n') => dispatch(session, Action::NearWinShuffle, rng),
                KeyCode::Enter if session.is_end => dispatch(session, Action::Restart, rng),
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
                    if !session.is_end =>
                {
                    if let Some(index) = arrow_target(session, key.code) {
                        dispatch(session, Action::Start, rng);
                        dispatch(session, Action::Move(index), rng);
                    }
                }
                _ => {}
            },
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                if session.is_end {
                    dispatch(session, Action::Restart, rng);
                } else if let Some(index) = cell_at(column, row) {
                    dispatch(session, Action::Start, rng);
                    dispatch(session, Action::Move(index), rng);
                }
            }
            _ => {}
        }
    }
}

fn dispatch(session: &mut Session, action: Action, rng: &mut ThreadRng) {
    let (next, effects) = transition(session, action, rng);
    *session = next;
    for effect in effects {
        match effect {
            Effect::StartTimer => dispatch(session, Action::SetStartTime(Instant::now()), rng),
        }
    }
}

/// Arrow keys slide the tile on the opposite side of the blank into it:
/// Up takes the tile below the blank, Left the tile to its right, and so
/// on. None at a grid edge.
fn arrow_target(session: &Session, code: KeyCode) -> Option<usize> {
    let empty = session.board.blank_index()?;
    let (row, col) = (empty / SIDE, empty % SIDE);

    match code {
        KeyCode::Up if row < SIDE - 1 => Some(empty + SIDE),
        KeyCode::Down if row > 0 => Some(empty - SIDE),
        KeyCode::Left if col < SIDE - 1 => Some(empty + 1),
        KeyCode::Right if col > 0 => Some(empty - 1),
        _ => None,
    }
}

fn cell_at(column: u16, row: u16) -> Option<usize> {
    if column < ORIGIN_X || row < ORIGIN_Y {
        return None;
    }
    let col = ((column - ORIGIN_X) / CELL_WIDTH) as usize;
    let grid_row = ((row - ORIGIN_Y) / CELL_HEIGHT) as usize;
    if col < SIDE && grid_row < SIDE {
        Some(grid_row * SIDE + col)
    } else {
        None
    }
}

fn draw(stdout: &mut io::Stdout, session: &Session) -> io::Result<()> {
    for (index, &tile) in session.board.tiles().iter().enumerate() {
        draw_cell(stdout, index, tile)?;
    }

    let status = match session.start_time {
        Some(started) => {
            let secs = started.elapsed().as_secs();
            format!(
                "time {}:{:02}   s shuffle  r restart  q quit",
                secs / 60,
                secs % 60
            )
        }
        None => "s shuffle  r restart  q quit".to_string(),
    };
    queue!(
        stdout,
        MoveTo(ORIGIN_X, ORIGIN_Y + SIDE as u16 * CELL_HEIGHT + 1),
        Clear(ClearType::UntilNewLine),
        Print(status),
    )?;

    if session.is_end {
        draw_overlay(stdout)?;
    }

    stdout.flush()
}

fn draw_cell(stdout: &mut io::Stdout, index: usize, tile: Tile) -> io::Result<()> {
    let x = ORIGIN_X + (index % SIDE) as u16 * CELL_WIDTH;
    let y = ORIGIN_Y + (index / SIDE) as u16 * CELL_HEIGHT;

    let (background, foreground) = match tile {
        Tile::Number(_) => (Color::DarkYellow, Color::Black),
        Tile::Blank => (Color::DarkMagenta, Color::DarkMagenta),
    };

    queue!(
        stdout,
        SetBackgroundColor(background),
        SetForegroundColor(foreground)
    )?;
    // Paint one column and one row short of the pitch so the terminal
    // background shows through as the grid lines.
    for line in 0..CELL_HEIGHT - 1 {
        let text = if line == (CELL_HEIGHT - 1) / 2 {
            format!("  {}  ", tile)
        } else {
            " ".repeat(CELL_WIDTH as usize - 1)
        };
        queue!(stdout, MoveTo(x, y + line), Print(text))?;
    }
    queue!(stdout, ResetColor)
}

fn draw_overlay(stdout: &mut io::Stdout) -> io::Result<()> {
    let grid_width = SIDE as u16 * CELL_WIDTH;
    let center_y = ORIGIN_Y + SIDE as u16 * CELL_HEIGHT / 2;
    let title = "Victory!";
    let prompt = "Click to continue.";

    queue!(
        stdout,
        SetBackgroundColor(Color::Black),
        SetForegroundColor(Color::White),
        MoveTo(ORIGIN_X + (grid_width - title.len() as u16) / 2, center_y - 1),
        Print(title),
        MoveTo(ORIGIN_X + (grid_width - prompt.len() as u16) / 2, center_y + 1),
        Print(prompt),
        ResetColor,
    )
}
