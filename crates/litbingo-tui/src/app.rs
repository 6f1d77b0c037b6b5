use crate::records::Records;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use litbingo_core::{bonus, normalize, BonusReport, Catalog, Cell, GuessOutcome, Session};

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Normal gameplay
    Playing,
    /// End-of-game summary with the bonus report
    Results,
}

/// Maximum autocomplete suggestions shown at once.
pub const MAX_SUGGESTIONS: usize = 5;

/// Ticks a popup message stays on screen (~3s at the 200ms tick).
const MESSAGE_TICKS: u32 = 15;

/// Minimum typed length before suggestions appear. Titles this short or
/// shorter match exactly from the first character instead.
const SUGGESTION_MIN_LEN: usize = 4;

/// The main application state
pub struct App {
    pub catalog: Catalog,
    pub session: Session,
    /// Currently selected cell
    pub cursor: Cell,
    /// Guess being typed
    pub input: String,
    /// Autocomplete matches for the current input
    pub suggestions: Vec<String>,
    /// Highlighted suggestion, if any
    pub suggestion_idx: Option<usize>,
    /// Popup message
    pub message: Option<String>,
    message_timer: u32,
    pub screen: ScreenState,
    /// Bonus report, populated at game end
    pub report: Option<BonusReport>,
    /// Whether the last game set a new best score
    pub new_best: bool,
    pub records: Records,
    pub theme: Theme,
    dark: bool,
}

impl App {
    pub fn new(catalog: Catalog, session: Session, records: Records, light: bool) -> Self {
        Self {
            catalog,
            session,
            cursor: Cell::new(0, 0),
            input: String::new(),
            suggestions: Vec::new(),
            suggestion_idx: None,
            message: None,
            message_timer: 0,
            screen: ScreenState::Playing,
            report: None,
            new_best: false,
            records,
            theme: if light { Theme::light() } else { Theme::dark() },
            dark: !light,
        }
    }

    /// Advance timers; called on every tick.
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_timer = MESSAGE_TICKS;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen {
            ScreenState::Results => self.handle_results_key(key),
            ScreenState::Playing => self.handle_playing_key(key),
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => AppAction::Quit,
            _ => AppAction::Continue,
        }
    }

    fn handle_playing_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('g') => {
                    let on = self.session.toggle_infinite();
                    self.set_message(format!(
                        "♾ Infinite Mode: {}",
                        if on { "On" } else { "Off" }
                    ));
                }
                KeyCode::Char('r') => match self.session.toggle_hardcore() {
                    Ok(on) => {
                        self.records.set_hardcore_preference(on);
                        self.set_message(format!(
                            "🔥 Hardcore Mode: {}",
                            if on { "On" } else { "Off" }
                        ));
                    }
                    Err(e) => self.set_message(format!("⚠ {}", e)),
                },
                KeyCode::Char('e') => self.end_game(),
                KeyCode::Char('t') => {
                    self.dark = !self.dark;
                    self.theme = if self.dark { Theme::dark() } else { Theme::light() };
                }
                _ => {}
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Esc => {
                if self.input.is_empty() {
                    return AppAction::Quit;
                }
                self.clear_input();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.cycle_suggestion(1),
            KeyCode::Up => {
                if self.suggestions.is_empty() {
                    self.cursor = Cell::new((self.cursor.row + 2) % 3, self.cursor.col);
                } else {
                    self.cycle_suggestion(-1);
                }
            }
            KeyCode::Down => {
                if self.suggestions.is_empty() {
                    self.cursor = Cell::new((self.cursor.row + 1) % 3, self.cursor.col);
                } else {
                    self.cycle_suggestion(1);
                }
            }
            KeyCode::Left if self.input.is_empty() => {
                self.cursor = Cell::new(self.cursor.row, (self.cursor.col + 2) % 3);
            }
            KeyCode::Right if self.input.is_empty() => {
                self.cursor = Cell::new(self.cursor.row, (self.cursor.col + 1) % 3);
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.update_suggestions();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.update_suggestions();
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.suggestion_idx = None;
    }

    fn cycle_suggestion(&mut self, step: isize) {
        if self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len() as isize;
        let next = match self.suggestion_idx {
            Some(i) => (i as isize + step).rem_euclid(len),
            None => {
                if step >= 0 {
                    0
                } else {
                    len - 1
                }
            }
        };
        self.suggestion_idx = Some(next as usize);
    }

    /// Recompute autocomplete matches for the current input. Substring
    /// match over catalog titles, capped; very short titles match from
    /// the first typed character.
    fn update_suggestions(&mut self) {
        self.suggestion_idx = None;
        let value = normalize(&self.input);
        if value.is_empty() {
            self.suggestions.clear();
            return;
        }

        let is_short = self
            .catalog
            .titles()
            .any(|t| t.len() <= SUGGESTION_MIN_LEN && t == value);
        if value.len() < SUGGESTION_MIN_LEN && !is_short {
            self.suggestions.clear();
            return;
        }

        let mut matches: Vec<String> = self
            .catalog
            .titles()
            .filter(|t| t.contains(&value))
            .map(String::from)
            .collect();
        matches.sort();
        matches.truncate(MAX_SUGGESTIONS);
        self.suggestions = matches;
    }

    /// Submit the highlighted suggestion, or the raw input.
    fn submit(&mut self) {
        let guess = match self.suggestion_idx {
            Some(i) => self.suggestions[i].clone(),
            None => self.input.trim().to_string(),
        };
        if guess.is_empty() {
            return;
        }

        let outcome = self.session.submit_guess(&self.catalog, &guess, self.cursor);
        self.clear_input();

        match outcome {
            GuessOutcome::UnknownTitle => self.set_message(format!(
                "⚠ \"{}\" is not in the accepted book list.",
                title_case(&guess)
            )),
            GuessOutcome::CellLocked => {}
            GuessOutcome::DuplicateGlobal => self.set_message("⛔ Already used"),
            GuessOutcome::DuplicateLocal => self.set_message("⛔ Already attempted"),
            GuessOutcome::UndefinedCell => {
                self.set_message("⚠ This cell has no answer key — try another cell.");
            }
            GuessOutcome::InsufficientData => {
                self.set_message(format!("⚠ Not enough data for \"{}\"", title_case(&guess)));
            }
            GuessOutcome::Correct { board_complete } => {
                self.set_message("✅ Correct!");
                if board_complete {
                    self.end_game();
                }
            }
            GuessOutcome::Incorrect {
                cell_locked,
                board_complete,
            } => {
                if cell_locked {
                    self.set_message("❌ Incorrect — cell locked");
                } else {
                    self.set_message("❌ Incorrect");
                }
                if board_complete {
                    self.end_game();
                }
            }
        }
    }

    /// Run the bonus pass and switch to the results screen.
    fn end_game(&mut self) {
        self.session.finish();
        let report = bonus::evaluate(&self.session, &self.catalog);
        self.new_best = self.records.record_final_score(report.breakdown.final_score);
        self.report = Some(report);
        self.screen = ScreenState::Results;
    }
}

const SMALL_WORDS: [&str; 20] = [
    "a", "an", "and", "but", "or", "for", "nor", "the", "as", "at", "by", "from", "in", "into",
    "near", "of", "on", "onto", "to", "with",
];

/// Title-case a normalized title for display, leaving small words lower
/// except at the start.
pub fn title_case(title: &str) -> String {
    normalize(title)
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            if i != 0 && SMALL_WORDS.contains(&word) {
                word.to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
