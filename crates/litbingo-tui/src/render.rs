use crate::app::{title_case, App, ScreenState};
use crate::records::format_time;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use litbingo_core::{Cell, LockStatus, Reward, Visibility};
use std::io;

/// Row label column width.
const LABEL_W: usize = 14;
/// Cell interior width.
const CELL_W: usize = 22;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    execute!(stdout, Clear(ClearType::All))?;
    match app.screen {
        ScreenState::Playing => render_game(stdout, app),
        ScreenState::Results => render_results(stdout, app),
    }
}

fn print_at(stdout: &mut io::Stdout, x: u16, y: u16, color: Color, text: &str) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    )
}

fn print_at_bg(
    stdout: &mut io::Stdout,
    x: u16,
    y: u16,
    fg: Color,
    bg: Color,
    text: &str,
) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(fg),
        SetBackgroundColor(bg),
        Print(text),
        ResetColor
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn cell_x(col: usize) -> u16 {
    (LABEL_W + 1 + col * (CELL_W + 1)) as u16
}

fn render_game(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let theme = &app.theme;
    let board = app.session.board();

    let mut header = format!("📚 Literary Bingo — {}", board.id);
    if let Some(declared) = board.declared_theme() {
        header.push_str(&format!("   Declared theme: {}", title_case(declared)));
    }
    print_at(stdout, 1, 0, theme.accent, &header)?;

    // Column labels
    for (col, label) in board.columns.iter().enumerate() {
        print_at(
            stdout,
            cell_x(col),
            2,
            theme.label,
            &truncate(label, CELL_W),
        )?;
    }

    // Grid borders and rows
    let border_line = {
        let seg = "-".repeat(CELL_W);
        format!(
            "{}+{seg}+{seg}+{seg}+",
            " ".repeat(LABEL_W)
        )
    };
    for r in 0..4 {
        let y = 3 + (r as u16) * 3;
        print_at(stdout, 0, y, theme.border, &border_line)?;
    }

    for row in 0..3 {
        let y = 4 + (row as u16) * 3;
        print_at(
            stdout,
            0,
            y,
            theme.label,
            &truncate(&board.rows[row], LABEL_W - 1),
        )?;
        for line in 0..2 {
            print_at(stdout, LABEL_W as u16, y + line, theme.border, "|")?;
            for col in 0..3 {
                print_at(
                    stdout,
                    cell_x(col) + CELL_W as u16,
                    y + line,
                    theme.border,
                    "|",
                )?;
            }
        }
        for col in 0..3 {
            render_cell(stdout, app, Cell::new(row, col), y)?;
        }
    }

    // Input line
    let input_y = 13;
    print_at(
        stdout,
        1,
        input_y,
        theme.key,
        &format!("Guess [{}]:", app.cursor),
    )?;
    print_at(
        stdout,
        13,
        input_y,
        theme.fg,
        &format!("{}_", app.input),
    )?;

    // Autocomplete suggestions
    for (i, suggestion) in app.suggestions.iter().enumerate() {
        let y = input_y + 1 + i as u16;
        let text = format!("  {}", title_case(suggestion));
        if app.suggestion_idx == Some(i) {
            print_at_bg(stdout, 1, y, theme.fg, theme.selected_bg, &text)?;
        } else {
            print_at(stdout, 1, y, theme.info, &text)?;
        }
    }

    // Info line
    let guesses = match app.session.guesses_remaining() {
        Some(n) => n.to_string(),
        None => "∞".to_string(),
    };
    let best = match app.records.best_score {
        Some(b) => b.to_string(),
        None => "—".to_string(),
    };
    let info = format!(
        "Score: {}   Guesses left: {}   ♾ {}   🔥 {}   Time: {}   Best: {}",
        app.session.score(),
        guesses,
        if app.session.infinite_mode() { "On" } else { "Off" },
        if app.session.hardcore_mode() { "On" } else { "Off" },
        format_time(app.session.elapsed().as_secs()),
        best,
    );
    print_at(stdout, 1, 20, theme.info, &info)?;

    if let Some(ref msg) = app.message {
        print_at(stdout, 1, 21, theme.accent, msg)?;
    }

    print_at(
        stdout,
        1,
        22,
        theme.key,
        "Type a title · Enter submit · Tab/↑↓ pick match · ←→↑↓ move · Ctrl+G infinite · Ctrl+R hardcore · Ctrl+E end · Ctrl+T theme · Esc quit",
    )?;

    Ok(())
}

fn render_cell(stdout: &mut io::Stdout, app: &App, cell: Cell, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let state = app.session.cell_state(cell);
    let x = cell_x(cell.col);
    let selected = app.cursor == cell;

    let (line1, color) = match state.status() {
        LockStatus::LockedCorrect => (
            truncate(&title_case(state.locked_title().unwrap_or("")), CELL_W),
            theme.correct,
        ),
        LockStatus::LockedIncorrect => (
            truncate(&title_case(state.locked_title().unwrap_or("")), CELL_W),
            theme.incorrect,
        ),
        LockStatus::Open => {
            if selected && !app.input.is_empty() {
                (truncate(&app.input, CELL_W), theme.fg)
            } else {
                ("·".to_string(), theme.info)
            }
        }
    };

    let line2 = match state.status() {
        LockStatus::LockedCorrect => "✔ locked".to_string(),
        LockStatus::LockedIncorrect => "✖ locked".to_string(),
        LockStatus::Open => match state.attempts().len() {
            0 => String::new(),
            1 => "1 try".to_string(),
            n => format!("{} tries", n),
        },
    };

    if selected {
        let pad1 = format!("{:<width$}", line1, width = CELL_W);
        print_at_bg(stdout, x, y, color, theme.selected_bg, &pad1)?;
        let pad2 = format!("{:<width$}", line2, width = CELL_W);
        print_at_bg(stdout, x, y + 1, theme.info, theme.selected_bg, &pad2)?;
    } else {
        print_at(stdout, x, y, color, &line1)?;
        print_at(stdout, x, y + 1, theme.info, &line2)?;
    }
    Ok(())
}

fn reward_str(reward: Reward) -> String {
    match reward {
        Reward::Points(p) => format!("+{}", p),
        Reward::Multiplier(m) => format!("×{}", m),
    }
}

fn render_results(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let theme = &app.theme;
    let Some(ref report) = app.report else {
        return Ok(());
    };

    let x = 4;
    let mut y = 1;

    print_at(stdout, x, y, theme.accent, "═══ Game Summary ═══")?;
    y += 2;
    print_at(
        stdout,
        x,
        y,
        theme.fg,
        &format!("Total play time: {}", format_time(report.elapsed.as_secs())),
    )?;
    y += 1;
    print_at(
        stdout,
        x,
        y,
        theme.correct,
        &format!("Correct answers: {}", report.correct),
    )?;
    y += 1;
    print_at(
        stdout,
        x,
        y,
        theme.incorrect,
        &format!("Wrong answers:   {}", report.wrong),
    )?;
    y += 1;
    print_at(
        stdout,
        x,
        y,
        theme.fg,
        &format!("Base score:      {}", report.breakdown.base_score),
    )?;
    y += 2;

    print_at(stdout, x, y, theme.accent, "Bonuses awarded")?;
    y += 1;
    if report.earned.is_empty() {
        print_at(stdout, x, y, theme.info, "  (none this time)")?;
        y += 1;
    }
    for earned in &report.earned {
        let secret = if earned.visibility == Visibility::Hidden {
            "  (secret)"
        } else {
            ""
        };
        let text = format!(
            "  {} {} {}{}",
            earned.icon,
            earned.label,
            reward_str(earned.reward),
            secret
        );
        print_at(stdout, x, y, theme.fg, &text)?;
        y += 1;
    }

    for secret in &report.secret_themes {
        let text = format!("  ☽ Secret theme unlocked: {}", title_case(secret));
        print_at(stdout, x, y, theme.accent, &text)?;
        y += 1;
    }

    for failure in &report.failures {
        let text = format!(
            "  ? {} could not be evaluated: {}",
            failure.label, failure.reason
        );
        print_at(stdout, x, y, theme.info, &text)?;
        y += 1;
    }
    y += 1;

    print_at(
        stdout,
        x,
        y,
        theme.fg,
        &format!(
            "Flat bonus: +{}   Multiplier: ×{}",
            report.breakdown.flat_bonus, report.breakdown.multiplier
        ),
    )?;
    y += 1;
    print_at(
        stdout,
        x,
        y,
        theme.accent,
        &format!("Final score: {}", report.breakdown.final_score),
    )?;
    y += 1;

    let best = app.records.best_score.unwrap_or(report.breakdown.final_score);
    let best_line = if app.new_best {
        format!("Your best score: {}  ★ NEW BEST!", best)
    } else {
        format!("Your best score: {}", best)
    };
    print_at(stdout, x, y, theme.key, &best_line)?;
    y += 2;

    print_at(stdout, x, y, theme.info, "Press Enter or Esc to exit")?;
    Ok(())
}
