use crate::board::{Board, Cell, INSUFFICIENT_DATA};
use crate::catalog::{normalize, Catalog};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Fixed score penalty for a wrong guess.
pub const WRONG_GUESS_PENALTY: u32 = 1;

/// Starting guess budget when not playing in infinite mode.
pub const STARTING_GUESSES: u32 = 9;

/// Terminal status of a cell. Once locked (correct, or incorrect in
/// hardcore mode) a cell accepts no further mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockStatus {
    Open,
    LockedCorrect,
    LockedIncorrect,
}

impl LockStatus {
    pub fn is_locked(self) -> bool {
        self != LockStatus::Open
    }
}

/// Per-cell attempt history and lock status.
#[derive(Debug, Clone, Default)]
pub struct CellState {
    attempts: Vec<String>,
    status: LockStatus,
}

impl Default for LockStatus {
    fn default() -> Self {
        LockStatus::Open
    }
}

impl CellState {
    /// Normalized guesses in insertion order. No duplicates.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    pub fn status(&self) -> LockStatus {
        self.status
    }

    /// The title this cell locked on (the final attempt), if locked.
    pub fn locked_title(&self) -> Option<&str> {
        if self.status.is_locked() {
            self.attempts.last().map(String::as_str)
        } else {
            None
        }
    }
}

/// Outcome of a single guess submission. Every variant is a recoverable,
/// user-facing condition; none of them unwind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Normalized guess is not in the catalog. Nothing was recorded.
    UnknownTitle,
    /// Target cell is already locked; the submission was silently ignored.
    CellLocked,
    /// Title already locked into some cell on the board. Not recorded.
    DuplicateGlobal,
    /// Same guess already attempted in this cell. Not re-recorded.
    DuplicateLocal,
    /// The board defines no answer key for this cell. Attempt recorded.
    UndefinedCell,
    /// The cell is flagged as unscoreable. Attempt recorded, cell stays open.
    InsufficientData,
    /// Match: cell locked correct, title consumed globally.
    Correct { board_complete: bool },
    /// No match: penalty applied; cell locked only in hardcore mode.
    Incorrect { cell_locked: bool, board_complete: bool },
}

/// Refusals from session operations that are errors rather than outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("hardcore mode must be toggled before the first guess")]
    HardcoreLocked,
}

/// All mutable state of one game: the cell tracker, the global used-title
/// set, score, guess budget, and mode flags. Mutation funnels exclusively
/// through [`Session::submit_guess`] and the toggles, so the invariants
/// hold everywhere else:
///
/// - a title locked into any cell can never enter another cell;
/// - a (cell, title) pair is attempted at most once;
/// - a locked cell's history is immutable;
/// - `used_titles` is exactly the locked titles, one per locked cell.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    cells: [[CellState; 3]; 3],
    used_titles: HashSet<String>,
    score: u32,
    wrong_guesses: u32,
    guesses_remaining: u32,
    infinite_mode: bool,
    hardcore_mode: bool,
    attempts_made: u32,
    first_attempt_order: Vec<Cell>,
    started: Option<Instant>,
    finished: Option<Duration>,
    complete_signaled: bool,
}

impl Session {
    /// Start a fresh session on a board. Infinite mode is on by default,
    /// hardcore off; both can be toggled before play begins.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            cells: Default::default(),
            used_titles: HashSet::new(),
            score: 0,
            wrong_guesses: 0,
            guesses_remaining: STARTING_GUESSES,
            infinite_mode: true,
            hardcore_mode: false,
            attempts_made: 0,
            first_attempt_order: Vec::new(),
            started: None,
            finished: None,
            complete_signaled: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell_state(&self, cell: Cell) -> &CellState {
        &self.cells[cell.row][cell.col]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    /// Remaining guess budget. Informational only: exhaustion never blocks
    /// a submission. `None` in infinite mode.
    pub fn guesses_remaining(&self) -> Option<u32> {
        if self.infinite_mode {
            None
        } else {
            Some(self.guesses_remaining)
        }
    }

    pub fn infinite_mode(&self) -> bool {
        self.infinite_mode
    }

    pub fn hardcore_mode(&self) -> bool {
        self.hardcore_mode
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Cells in the order they first received an attempt.
    pub fn first_attempt_order(&self) -> &[Cell] {
        &self.first_attempt_order
    }

    pub fn used_titles(&self) -> &HashSet<String> {
        &self.used_titles
    }

    pub fn locked_count(&self) -> usize {
        Cell::all()
            .filter(|c| self.cell_state(*c).status().is_locked())
            .count()
    }

    /// Whether all nine cells are locked.
    pub fn is_complete(&self) -> bool {
        self.locked_count() == 9
    }

    /// Time since the first interaction, frozen once the game ends.
    pub fn elapsed(&self) -> Duration {
        if let Some(d) = self.finished {
            d
        } else {
            self.started.map(|s| s.elapsed()).unwrap_or(Duration::ZERO)
        }
    }

    /// Freeze the clock for end-of-game evaluation. Idempotent; called
    /// automatically when the ninth cell locks.
    pub fn finish(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(self.elapsed());
        }
    }

    /// Flip infinite mode, returning the new state. Allowed at any time.
    pub fn toggle_infinite(&mut self) -> bool {
        self.infinite_mode = !self.infinite_mode;
        self.infinite_mode
    }

    /// Flip hardcore mode, returning the new state. Refused once any
    /// attempt has been recorded anywhere on the board.
    pub fn toggle_hardcore(&mut self) -> Result<bool, SessionError> {
        if self.attempts_made > 0 {
            return Err(SessionError::HardcoreLocked);
        }
        self.hardcore_mode = !self.hardcore_mode;
        Ok(self.hardcore_mode)
    }

    /// Evaluate one guess against a cell. Checks run strictly in order;
    /// the first matching condition decides the outcome, and only the
    /// fall-through case records an attempt.
    pub fn submit_guess(&mut self, catalog: &Catalog, raw: &str, cell: Cell) -> GuessOutcome {
        // First interaction starts the clock, whatever the outcome.
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }

        let guess = normalize(raw);

        if !catalog.contains(&guess) {
            return GuessOutcome::UnknownTitle;
        }

        if self.cell_state(cell).status().is_locked() {
            return GuessOutcome::CellLocked;
        }

        if self.used_titles.contains(&guess) {
            return GuessOutcome::DuplicateGlobal;
        }

        if self.cell_state(cell).attempts.contains(&guess) {
            return GuessOutcome::DuplicateLocal;
        }

        self.record_attempt(cell, guess.clone());

        // Resolve the cell's verdict before mutating any further state.
        #[derive(Clone, Copy)]
        enum Verdict {
            Undefined,
            Insufficient,
            Match,
            NoMatch,
        }
        let verdict = match self.board.accepted_answers(cell) {
            None => Verdict::Undefined,
            Some(accepted) if accepted.iter().any(|a| a == INSUFFICIENT_DATA) => {
                Verdict::Insufficient
            }
            Some(accepted) if accepted.contains(&guess) => Verdict::Match,
            Some(_) => Verdict::NoMatch,
        };

        match verdict {
            Verdict::Undefined => return GuessOutcome::UndefinedCell,
            Verdict::Insufficient => return GuessOutcome::InsufficientData,
            Verdict::Match => {
                self.lock(cell, guess, LockStatus::LockedCorrect);
                return GuessOutcome::Correct {
                    board_complete: self.check_complete(),
                };
            }
            Verdict::NoMatch => {}
        }

        self.score += WRONG_GUESS_PENALTY;
        self.wrong_guesses += 1;
        if !self.infinite_mode {
            self.guesses_remaining = self.guesses_remaining.saturating_sub(1);
        }

        if self.hardcore_mode {
            self.lock(cell, guess, LockStatus::LockedIncorrect);
            GuessOutcome::Incorrect {
                cell_locked: true,
                board_complete: self.check_complete(),
            }
        } else {
            GuessOutcome::Incorrect {
                cell_locked: false,
                board_complete: false,
            }
        }
    }

    fn record_attempt(&mut self, cell: Cell, guess: String) {
        let state = &mut self.cells[cell.row][cell.col];
        if state.attempts.is_empty() {
            self.first_attempt_order.push(cell);
        }
        state.attempts.push(guess);
        self.attempts_made += 1;
    }

    fn lock(&mut self, cell: Cell, guess: String, status: LockStatus) {
        debug_assert!(status.is_locked());
        self.cells[cell.row][cell.col].status = status;
        self.used_titles.insert(guess);
    }

    /// Signal board completion exactly once, freezing the clock.
    fn check_complete(&mut self) -> bool {
        if !self.complete_signaled && self.is_complete() {
            self.complete_signaled = true;
            self.finish();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Book;
    use std::collections::HashMap;

    /// Nine accepted titles t00..t22 (one per cell), one known-but-wrong
    /// title per cell worth of slack, and a `[verify]` cell on demand.
    fn catalog() -> Catalog {
        let mut books: Vec<Book> = Vec::new();
        for cell in Cell::all() {
            books.push(book(&format!("t{}{}", cell.row, cell.col)));
        }
        for i in 0..9 {
            books.push(book(&format!("wrong{}", i)));
        }
        Catalog::new(books)
    }

    fn book(title: &str) -> Book {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "author": "Author",
        }))
        .unwrap()
    }

    fn board() -> Board {
        let mut answers = HashMap::new();
        for cell in Cell::all() {
            answers.insert(
                cell.to_string(),
                vec![format!("t{}{}", cell.row, cell.col)],
            );
        }
        board_with(answers)
    }

    fn board_with(answers: HashMap<String, Vec<String>>) -> Board {
        Board::new(
            "test".into(),
            vec!["r0".into(), "r1".into(), "r2".into()],
            vec!["c0".into(), "c1".into(), "c2".into()],
            Some("gothic".into()),
            answers,
        )
        .unwrap()
    }

    #[test]
    fn unknown_title_records_nothing() {
        let catalog = catalog();
        let mut session = Session::new(board());
        let cell = Cell::new(0, 0);
        assert_eq!(
            session.submit_guess(&catalog, "not a real book", cell),
            GuessOutcome::UnknownTitle
        );
        assert!(session.cell_state(cell).attempts().is_empty());
        assert_eq!(session.attempts_made(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn correct_guess_locks_and_consumes_title() {
        let catalog = catalog();
        let mut session = Session::new(board());
        let cell = Cell::new(1, 2);
        assert_eq!(
            session.submit_guess(&catalog, " T12 ", cell),
            GuessOutcome::Correct { board_complete: false }
        );
        assert_eq!(session.cell_state(cell).status(), LockStatus::LockedCorrect);
        assert_eq!(session.cell_state(cell).locked_title(), Some("t12"));
        assert!(session.used_titles().contains("t12"));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn repeat_guess_is_duplicate_local() {
        let catalog = catalog();
        let mut session = Session::new(board());
        let cell = Cell::new(0, 0);
        assert_eq!(
            session.submit_guess(&catalog, "wrong0", cell),
            GuessOutcome::Incorrect { cell_locked: false, board_complete: false }
        );
        assert_eq!(
            session.submit_guess(&catalog, "Wrong0", cell),
            GuessOutcome::DuplicateLocal
        );
        // Not re-recorded.
        assert_eq!(session.cell_state(cell).attempts(), ["wrong0"]);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn locked_title_is_duplicate_global_elsewhere() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.submit_guess(&catalog, "t00", Cell::new(0, 0));
        assert_eq!(
            session.submit_guess(&catalog, "t00", Cell::new(0, 1)),
            GuessOutcome::DuplicateGlobal
        );
        assert!(session.cell_state(Cell::new(0, 1)).attempts().is_empty());
    }

    #[test]
    fn locked_cell_ignores_further_guesses() {
        let catalog = catalog();
        let mut session = Session::new(board());
        let cell = Cell::new(0, 0);
        session.submit_guess(&catalog, "t00", cell);
        assert_eq!(
            session.submit_guess(&catalog, "wrong0", cell),
            GuessOutcome::CellLocked
        );
        assert_eq!(session.cell_state(cell).attempts(), ["t00"]);
        assert_eq!(session.cell_state(cell).status(), LockStatus::LockedCorrect);
    }

    #[test]
    fn wrong_guess_in_limited_mode_costs_a_guess() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.toggle_infinite();
        assert_eq!(session.guesses_remaining(), Some(9));
        let outcome = session.submit_guess(&catalog, "wrong0", Cell::new(0, 0));
        assert_eq!(
            outcome,
            GuessOutcome::Incorrect { cell_locked: false, board_complete: false }
        );
        assert_eq!(session.score(), 1);
        assert_eq!(session.guesses_remaining(), Some(8));
        assert_eq!(session.cell_state(Cell::new(0, 0)).status(), LockStatus::Open);
    }

    #[test]
    fn guess_budget_clamps_at_zero_and_never_blocks() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.toggle_infinite();
        for i in 0..9 {
            session.submit_guess(&catalog, &format!("wrong{}", i), Cell::new(0, 0));
        }
        assert_eq!(session.guesses_remaining(), Some(0));
        // Exhaustion is informational: valid submissions still run.
        assert_eq!(
            session.submit_guess(&catalog, "t00", Cell::new(0, 0)),
            GuessOutcome::Correct { board_complete: false }
        );
        assert_eq!(session.guesses_remaining(), Some(0));
    }

    #[test]
    fn hardcore_wrong_guess_locks_cell_and_title() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.toggle_hardcore().unwrap();
        let cell = Cell::new(1, 1);
        assert_eq!(
            session.submit_guess(&catalog, "wrong3", cell),
            GuessOutcome::Incorrect { cell_locked: true, board_complete: false }
        );
        assert_eq!(session.cell_state(cell).status(), LockStatus::LockedIncorrect);
        assert!(session.used_titles().contains("wrong3"));
        // The consumed title is globally unusable now.
        assert_eq!(
            session.submit_guess(&catalog, "wrong3", Cell::new(2, 2)),
            GuessOutcome::DuplicateGlobal
        );
    }

    #[test]
    fn hardcore_toggle_refused_after_first_attempt() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.submit_guess(&catalog, "wrong0", Cell::new(0, 0));
        assert_eq!(session.toggle_hardcore(), Err(SessionError::HardcoreLocked));
        assert!(!session.hardcore_mode());
    }

    #[test]
    fn unknown_title_does_not_lock_hardcore_toggle() {
        let catalog = catalog();
        let mut session = Session::new(board());
        // Rejected at the catalog gate: no attempt recorded session-wide.
        session.submit_guess(&catalog, "nope", Cell::new(0, 0));
        assert_eq!(session.toggle_hardcore(), Ok(true));
    }

    #[test]
    fn undefined_cell_records_attempt() {
        let catalog = catalog();
        let mut answers = HashMap::new();
        answers.insert("0-0".to_string(), vec!["t00".to_string()]);
        let mut session = Session::new(board_with(answers));
        let cell = Cell::new(2, 2);
        assert_eq!(
            session.submit_guess(&catalog, "t22", cell),
            GuessOutcome::UndefinedCell
        );
        assert_eq!(session.cell_state(cell).attempts(), ["t22"]);
        assert_eq!(session.cell_state(cell).status(), LockStatus::Open);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn insufficient_data_cell_neither_wins_nor_loses() {
        let catalog = catalog();
        let mut answers = HashMap::new();
        answers.insert("0-0".to_string(), vec![INSUFFICIENT_DATA.to_string()]);
        let mut session = Session::new(board_with(answers));
        let cell = Cell::new(0, 0);
        assert_eq!(
            session.submit_guess(&catalog, "t00", cell),
            GuessOutcome::InsufficientData
        );
        assert_eq!(session.cell_state(cell).attempts(), ["t00"]);
        assert_eq!(session.cell_state(cell).status(), LockStatus::Open);
        assert_eq!(session.score(), 0);
        assert!(session.used_titles().is_empty());
    }

    #[test]
    fn used_titles_tracks_locked_cells_one_to_one() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.toggle_hardcore().unwrap();
        session.submit_guess(&catalog, "t00", Cell::new(0, 0));
        session.submit_guess(&catalog, "wrong1", Cell::new(0, 1));
        session.submit_guess(&catalog, "t02", Cell::new(0, 2));
        assert_eq!(session.used_titles().len(), session.locked_count());
        assert_eq!(session.locked_count(), 3);
    }

    #[test]
    fn completion_signaled_exactly_once() {
        let catalog = catalog();
        let mut session = Session::new(board());
        let mut signals = 0;
        for cell in Cell::all() {
            let title = format!("t{}{}", cell.row, cell.col);
            if let GuessOutcome::Correct { board_complete: true } =
                session.submit_guess(&catalog, &title, cell)
            {
                signals += 1;
            }
        }
        assert_eq!(signals, 1);
        assert!(session.is_complete());
    }

    #[test]
    fn first_attempt_order_is_tracked_once_per_cell() {
        let catalog = catalog();
        let mut session = Session::new(board());
        session.submit_guess(&catalog, "wrong0", Cell::new(1, 1));
        session.submit_guess(&catalog, "wrong1", Cell::new(1, 1));
        session.submit_guess(&catalog, "t00", Cell::new(0, 0));
        assert_eq!(
            session.first_attempt_order(),
            [Cell::new(1, 1), Cell::new(0, 0)]
        );
    }
}
