mod app;
mod data;
mod records;
mod render;
mod theme;

use app::{App, AppAction};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use litbingo_core::{Board, Catalog, Session};
use records::Records;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Literary bingo in the terminal: fill the 3×3 grid with book titles
/// matching both the row and column category.
#[derive(Debug, Parser)]
#[command(name = "litbingo", version, about)]
struct Args {
    /// Path to the book catalog JSON.
    #[arg(long, default_value = "data/books.json", value_name = "FILE")]
    books: PathBuf,

    /// Path to a specific board JSON. A random board from --boards-dir is
    /// used when omitted.
    #[arg(long, value_name = "FILE")]
    board: Option<PathBuf>,

    /// Directory of board files to pick from.
    #[arg(long, default_value = "data/boards", value_name = "DIR")]
    boards_dir: PathBuf,

    /// Start with the limited guess budget instead of infinite mode.
    #[arg(long)]
    limited: bool,

    /// Start in hardcore mode (a wrong guess locks the cell).
    #[arg(long)]
    hardcore: bool,

    /// Start with the light theme.
    #[arg(long)]
    light: bool,
}

fn load_data(args: &Args) -> Result<(Catalog, Board), data::DataError> {
    let catalog = data::load_catalog(&args.books)?;
    let board_path = match &args.board {
        Some(path) => path.clone(),
        None => data::pick_board(&args.boards_dir)?,
    };
    let board = data::load_board(&board_path)?;
    Ok((catalog, board))
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    // Load data before touching the terminal so errors print cleanly.
    let (catalog, board) = match load_data(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let records = Records::load();
    let mut session = Session::new(board);
    if args.limited {
        session.toggle_infinite();
    }
    if args.hardcore || records.hardcore_preferred {
        // Always permitted here: no attempt exists yet.
        let _ = session.toggle_hardcore();
    }
    let mut app = App::new(catalog, session, records, args.light);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with a timeout so the timer keeps ticking.
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    AppAction::Continue => {}
                    AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
