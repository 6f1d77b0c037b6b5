//! End-of-game pattern, theme, and achievement detection.
//!
//! Runs once over the final session snapshot. Geometric patterns key off
//! locked (filled) cells — correct or not — matching the observed game
//! behavior; thematic detection uses only cells whose final locked guess
//! was correct. Every achievement predicate is evaluated in isolation: a
//! failed evaluation counts as not earned and is reported separately,
//! never aborting the pass.

use crate::board::{Board, Cell};
use crate::catalog::{normalize, Book, Catalog};
use crate::score::{self, ScoreBreakdown};
use crate::session::{LockStatus, Session};
use std::collections::HashMap;
use std::time::Duration;

/// Cells forming the X pattern: corners plus center.
const PATTERN_X: [Cell; 5] = [
    Cell { row: 0, col: 0 },
    Cell { row: 0, col: 2 },
    Cell { row: 1, col: 1 },
    Cell { row: 2, col: 0 },
    Cell { row: 2, col: 2 },
];

/// Cells forming the H pattern: both side columns plus the middle row.
const PATTERN_H: [Cell; 7] = [
    Cell { row: 0, col: 0 },
    Cell { row: 0, col: 2 },
    Cell { row: 1, col: 0 },
    Cell { row: 1, col: 1 },
    Cell { row: 1, col: 2 },
    Cell { row: 2, col: 0 },
    Cell { row: 2, col: 2 },
];

/// Elapsed-time ceiling for the Lightning Round achievement.
const LIGHTNING_ROUND: Duration = Duration::from_secs(90);

/// Reward attached to an achievement: flat points added to the base, or a
/// factor multiplied into the final score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    Points(u32),
    Multiplier(f64),
}

/// Whether an achievement is advertised up front or a surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

/// A predicate evaluation that could not complete, e.g. because the
/// catalog lacks the metadata the predicate needs. Treated as not earned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    #[error("no catalog entry for locked title {0:?}")]
    MissingBook(String),
    #[error("missing publication year for {0:?}")]
    MissingYear(String),
}

/// One entry in the fixed achievement table.
pub struct Achievement {
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub visibility: Visibility,
    pub reward: Reward,
    predicate: fn(&Snapshot) -> Result<bool, PredicateError>,
}

/// Combo bonus: unlocked only when all of its base achievements (by
/// label) were earned in the same run. Always hidden-category.
struct Combo {
    label: &'static str,
    icon: &'static str,
    description: &'static str,
    requires: &'static [&'static str],
    reward: Reward,
}

/// An achievement (base or combo) earned in this run.
#[derive(Debug, Clone, PartialEq)]
pub struct EarnedBonus {
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub visibility: Visibility,
    pub reward: Reward,
}

/// A predicate that failed to evaluate, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateFailure {
    pub label: &'static str,
    pub reason: String,
}

/// The full end-of-game report handed to the score aggregator and the UI.
#[derive(Debug, Clone)]
pub struct BonusReport {
    pub correct: usize,
    pub wrong: u32,
    pub elapsed: Duration,
    pub pattern_x: bool,
    pub pattern_h: bool,
    pub methodical: bool,
    pub theme_match: bool,
    pub full_theme: bool,
    pub secret_themes: Vec<String>,
    pub earned: Vec<EarnedBonus>,
    pub failures: Vec<PredicateFailure>,
    pub breakdown: ScoreBreakdown,
}

/// Read-only view of the finished board that predicates run against.
struct Snapshot<'a> {
    board: &'a Board,
    locked_cells: Vec<Cell>,
    correct_titles: Vec<String>,
    correct_books: Vec<&'a Book>,
    first_attempt_order: &'a [Cell],
    wrong_guesses: u32,
    elapsed: Duration,
    hardcore: bool,
}

impl<'a> Snapshot<'a> {
    fn capture(session: &'a Session, catalog: &'a Catalog) -> Self {
        let mut locked_cells = Vec::new();
        let mut correct_titles = Vec::new();
        let mut correct_books = Vec::new();

        for cell in Cell::all() {
            let state = session.cell_state(cell);
            if state.status().is_locked() {
                locked_cells.push(cell);
            }
            if state.status() == LockStatus::LockedCorrect {
                if let Some(title) = state.locked_title() {
                    correct_titles.push(title.to_string());
                    if let Some(book) = catalog.lookup(title) {
                        correct_books.push(book);
                    }
                }
            }
        }

        Self {
            board: session.board(),
            locked_cells,
            correct_titles,
            correct_books,
            first_attempt_order: session.first_attempt_order(),
            wrong_guesses: session.wrong_guesses(),
            elapsed: session.elapsed(),
            hardcore: session.hardcore_mode(),
        }
    }

    fn correct(&self) -> usize {
        self.correct_titles.len()
    }

    fn perfect_board(&self) -> bool {
        self.correct() == 9 && self.wrong_guesses == 0
    }

    fn pattern_x(&self) -> bool {
        PATTERN_X.iter().all(|c| self.locked_cells.contains(c))
    }

    fn pattern_h(&self) -> bool {
        PATTERN_H.iter().all(|c| self.locked_cells.contains(c))
    }

    /// All nine cells first attempted in exact row-major order.
    fn methodical(&self) -> bool {
        self.first_attempt_order.len() == 9
            && self.first_attempt_order.iter().copied().eq(Cell::all())
    }

    /// Tag occurrence counts across the correct books.
    fn tag_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for book in &self.correct_books {
            for tag in book.tag_set() {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        counts
    }

    /// How many correct books carry the board's declared theme tag.
    fn declared_theme_count(&self) -> usize {
        match self.board.declared_theme() {
            Some(theme) => self.tag_counts().get(theme).copied().unwrap_or(0),
            None => 0,
        }
    }

    /// Tags shared by all nine correct books — not necessarily declared.
    fn secret_themes(&self) -> Vec<String> {
        if self.correct() != 9 || self.correct_books.len() != 9 {
            return Vec::new();
        }
        let mut themes: Vec<String> = self
            .tag_counts()
            .into_iter()
            .filter(|(_, count)| *count == 9)
            .map(|(tag, _)| tag)
            .collect();
        themes.sort();
        themes
    }

    /// The nine correct books, or an error naming what's missing. Used by
    /// predicates that need complete metadata coverage.
    fn full_board_books(&self) -> Result<&[&'a Book], PredicateError> {
        if self.correct() == 9 && self.correct_books.len() < 9 {
            let missing = self
                .correct_titles
                .iter()
                .find(|t| !self.correct_books.iter().any(|b| &normalize(&b.title) == *t))
                .cloned()
                .unwrap_or_default();
            return Err(PredicateError::MissingBook(missing));
        }
        Ok(&self.correct_books)
    }
}

const X_MARKS_THE_SPOT: &str = "X Marks the Spot";
const H_FOR_HEROISM: &str = "H for Heroism";
const METHODICAL_READER: &str = "Methodical Reader";
const THEME_MATCH: &str = "Theme Match";
const FULL_THEME: &str = "Full Theme";
const SECRET_WHISPERER: &str = "Secret Whisperer";
const IRON_READER: &str = "Iron Reader";
const AUTHOR_LOYALIST: &str = "Author Loyalist";
const TIME_CAPSULE: &str = "Time Capsule";
const LIGHTNING: &str = "Lightning Round";
const FRESH_VOICES: &str = "Fresh Voices";
const IN_TRANSLATION: &str = "In Translation";
const FORBIDDEN_SHELF: &str = "Forbidden Shelf";
const MANY_VOICES: &str = "Many Voices";
const FLAWLESS: &str = "Flawless";

/// The fixed achievement table. Order is display order; evaluation is
/// independent per entry.
pub fn achievements() -> &'static [Achievement] {
    ACHIEVEMENTS
}

static ACHIEVEMENTS: &[Achievement] = &[
        Achievement {
            label: X_MARKS_THE_SPOT,
            icon: "✖",
            description: "Fill both diagonals: corners and center",
            visibility: Visibility::Shown,
            reward: Reward::Points(3),
            predicate: |s| Ok(s.pattern_x()),
        },
        Achievement {
            label: H_FOR_HEROISM,
            icon: "Ⓗ",
            description: "Fill both side columns and the middle row",
            visibility: Visibility::Shown,
            reward: Reward::Points(3),
            predicate: |s| Ok(s.pattern_h()),
        },
        Achievement {
            label: METHODICAL_READER,
            icon: "≡",
            description: "First touch every cell in reading order",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| Ok(s.methodical()),
        },
        Achievement {
            label: THEME_MATCH,
            icon: "◐",
            description: "7 or 8 correct answers carry the board's theme",
            visibility: Visibility::Shown,
            reward: Reward::Multiplier(1.25),
            predicate: |s| Ok((7..=8).contains(&s.declared_theme_count())),
        },
        Achievement {
            label: FULL_THEME,
            icon: "●",
            description: "All 9 correct answers carry the board's theme",
            visibility: Visibility::Shown,
            reward: Reward::Multiplier(1.5),
            predicate: |s| Ok(s.correct() == 9 && s.declared_theme_count() == 9),
        },
        Achievement {
            label: SECRET_WHISPERER,
            icon: "☽",
            description: "Some tag unites all 9 correct answers",
            visibility: Visibility::Hidden,
            reward: Reward::Multiplier(1.5),
            predicate: |s| Ok(!s.secret_themes().is_empty()),
        },
        Achievement {
            label: IRON_READER,
            icon: "♜",
            description: "Perfect board in hardcore mode",
            visibility: Visibility::Shown,
            reward: Reward::Multiplier(1.5),
            predicate: |s| Ok(s.hardcore && s.perfect_board()),
        },
        Achievement {
            label: AUTHOR_LOYALIST,
            icon: "✒",
            description: "3+ correct answers share an author",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for book in &s.correct_books {
                    *counts.entry(book.author.as_str()).or_insert(0) += 1;
                }
                Ok(counts.values().any(|&n| n >= 3))
            },
        },
        Achievement {
            label: TIME_CAPSULE,
            icon: "⌛",
            description: "All 9 answers published before 1970",
            visibility: Visibility::Hidden,
            reward: Reward::Points(3),
            predicate: |s| {
                if s.correct() != 9 {
                    return Ok(false);
                }
                let books = s.full_board_books()?;
                let mut all_old = true;
                for book in books {
                    match book.year_published {
                        Some(year) => all_old &= year < 1970,
                        None => return Err(PredicateError::MissingYear(book.title.clone())),
                    }
                }
                Ok(all_old)
            },
        },
        Achievement {
            label: LIGHTNING,
            icon: "⚡",
            description: "Perfect board in under 90 seconds",
            visibility: Visibility::Hidden,
            reward: Reward::Points(5),
            predicate: |s| Ok(s.perfect_board() && s.elapsed < LIGHTNING_ROUND),
        },
        Achievement {
            label: FRESH_VOICES,
            icon: "✿",
            description: "3+ correct answers are debut novels",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| Ok(s.correct_books.iter().filter(|b| b.is_debut).count() >= 3),
        },
        Achievement {
            label: IN_TRANSLATION,
            icon: "⇄",
            description: "3+ correct answers are works in translation",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| Ok(s.correct_books.iter().filter(|b| b.is_translated).count() >= 3),
        },
        Achievement {
            label: FORBIDDEN_SHELF,
            icon: "✕",
            description: "3+ correct answers have been banned somewhere",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| Ok(s.correct_books.iter().filter(|b| b.is_banned).count() >= 3),
        },
        Achievement {
            label: MANY_VOICES,
            icon: "❖",
            description: "5+ correct answers by authors of color",
            visibility: Visibility::Hidden,
            reward: Reward::Points(2),
            predicate: |s| {
                Ok(s.correct_books.iter().filter(|b| b.author_is_of_color).count() >= 5)
            },
        },
        Achievement {
            label: FLAWLESS,
            icon: "★",
            description: "All 9 correct with no wrong guesses",
            visibility: Visibility::Shown,
            reward: Reward::Points(3),
            predicate: |s| Ok(s.perfect_board()),
        },
    ];

/// Combo bonuses, evaluated only after the base pass.
static COMBOS: &[Combo] = &[
        Combo {
            label: "Iron Whisperer",
            icon: "♛",
            description: "Iron Reader and Secret Whisperer in one run",
            requires: &[IRON_READER, SECRET_WHISPERER],
            reward: Reward::Multiplier(1.25),
        },
        Combo {
            label: "Grandmaster",
            icon: "♚",
            description: "Flawless and Lightning Round in one run",
            requires: &[FLAWLESS, LIGHTNING],
            reward: Reward::Points(5),
        },
        Combo {
            label: "Crossed Letters",
            icon: "✚",
            description: "X and H patterns on the same board",
            requires: &[X_MARKS_THE_SPOT, H_FOR_HEROISM],
            reward: Reward::Points(3),
        },
    ];

/// Run the full bonus pass over a finished session and reduce it to a
/// score breakdown. Safe to call on an unfinished board too — open cells
/// simply contribute nothing.
pub fn evaluate(session: &Session, catalog: &Catalog) -> BonusReport {
    let snapshot = Snapshot::capture(session, catalog);

    let mut earned = Vec::new();
    let mut failures = Vec::new();

    for achievement in achievements() {
        match (achievement.predicate)(&snapshot) {
            Ok(true) => earned.push(EarnedBonus {
                label: achievement.label,
                icon: achievement.icon,
                description: achievement.description,
                visibility: achievement.visibility,
                reward: achievement.reward,
            }),
            Ok(false) => {}
            Err(e) => failures.push(PredicateFailure {
                label: achievement.label,
                reason: e.to_string(),
            }),
        }
    }

    for combo in COMBOS {
        let unlocked = combo
            .requires
            .iter()
            .all(|label| earned.iter().any(|e| e.label == *label));
        if unlocked {
            earned.push(EarnedBonus {
                label: combo.label,
                icon: combo.icon,
                description: combo.description,
                visibility: Visibility::Hidden,
                reward: combo.reward,
            });
        }
    }

    let breakdown = score::aggregate(session.score(), earned.iter().map(|e| e.reward));
    let declared_count = snapshot.declared_theme_count();

    BonusReport {
        correct: snapshot.correct(),
        wrong: snapshot.wrong_guesses,
        elapsed: snapshot.elapsed,
        pattern_x: snapshot.pattern_x(),
        pattern_h: snapshot.pattern_h(),
        methodical: snapshot.methodical(),
        theme_match: (7..=8).contains(&declared_count),
        full_theme: snapshot.correct() == 9 && declared_count == 9,
        secret_themes: snapshot.secret_themes(),
        earned,
        failures,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::catalog::Book;
    use std::collections::HashMap;

    fn book(title: &str, extra: serde_json::Value) -> Book {
        let mut value = serde_json::json!({
            "title": title,
            "author": "Author",
        });
        value
            .as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        serde_json::from_value(value).unwrap()
    }

    /// Nine gothic books t00..t22 plus nine known wrong answers.
    fn gothic_catalog() -> Catalog {
        let mut books = Vec::new();
        for cell in Cell::all() {
            books.push(book(
                &format!("t{}{}", cell.row, cell.col),
                serde_json::json!({
                    "genres": ["Gothic"],
                    "yearPublished": 1890,
                }),
            ));
        }
        for i in 0..9 {
            books.push(book(&format!("wrong{}", i), serde_json::json!({})));
        }
        Catalog::new(books)
    }

    fn full_board() -> Board {
        let mut answers = HashMap::new();
        for cell in Cell::all() {
            answers.insert(
                cell.to_string(),
                vec![format!("t{}{}", cell.row, cell.col)],
            );
        }
        Board::new(
            "test".into(),
            vec!["r0".into(), "r1".into(), "r2".into()],
            vec!["c0".into(), "c1".into(), "c2".into()],
            Some("Gothic".into()),
            answers,
        )
        .unwrap()
    }

    fn play_all_correct(catalog: &Catalog) -> Session {
        let mut session = Session::new(full_board());
        for cell in Cell::all() {
            session.submit_guess(catalog, &format!("t{}{}", cell.row, cell.col), cell);
        }
        session
    }

    #[test]
    fn pattern_x_without_h() {
        let catalog = gothic_catalog();
        let mut session = Session::new(full_board());
        session.toggle_hardcore().unwrap();
        // Lock the X cells, mixing correct and hardcore-incorrect locks —
        // patterns key off locked, not correct.
        session.submit_guess(&catalog, "t00", Cell::new(0, 0));
        session.submit_guess(&catalog, "t02", Cell::new(0, 2));
        session.submit_guess(&catalog, "wrong0", Cell::new(1, 1));
        session.submit_guess(&catalog, "t20", Cell::new(2, 0));
        session.submit_guess(&catalog, "t22", Cell::new(2, 2));

        let report = evaluate(&session, &catalog);
        assert!(report.pattern_x);
        assert!(!report.pattern_h);
        assert!(report.earned.iter().any(|e| e.label == "X Marks the Spot"));
        assert!(!report.earned.iter().any(|e| e.label == "H for Heroism"));
    }

    #[test]
    fn full_theme_excludes_partial_match() {
        let catalog = gothic_catalog();
        let session = play_all_correct(&catalog);
        let report = evaluate(&session, &catalog);
        assert_eq!(report.correct, 9);
        assert!(report.full_theme);
        assert!(!report.theme_match);
        // Gothic is on all nine, so it also surfaces as a secret theme.
        assert_eq!(report.secret_themes, ["gothic"]);
    }

    #[test]
    fn methodical_requires_exact_row_major_order() {
        let catalog = gothic_catalog();
        let session = play_all_correct(&catalog);
        assert!(evaluate(&session, &catalog).methodical);

        let mut out_of_order = Session::new(full_board());
        out_of_order.submit_guess(&catalog, "t11", Cell::new(1, 1));
        for cell in Cell::all() {
            out_of_order.submit_guess(&catalog, &format!("t{}{}", cell.row, cell.col), cell);
        }
        assert!(!evaluate(&out_of_order, &catalog).methodical);
    }

    #[test]
    fn perfect_board_earns_flawless_and_lightning() {
        let catalog = gothic_catalog();
        let session = play_all_correct(&catalog);
        let report = evaluate(&session, &catalog);
        let labels: Vec<_> = report.earned.iter().map(|e| e.label).collect();
        assert!(labels.contains(&"Flawless"));
        assert!(labels.contains(&"Lightning Round"));
        // Both earned in the same run unlocks the combo.
        assert!(labels.contains(&"Grandmaster"));
    }

    #[test]
    fn predicate_failure_is_isolated() {
        // One correct book lacks a publication year: Time Capsule cannot
        // evaluate, but everything else still does.
        let mut books = Vec::new();
        for cell in Cell::all() {
            let extra = if cell == Cell::new(2, 2) {
                serde_json::json!({"genres": ["Gothic"]})
            } else {
                serde_json::json!({"genres": ["Gothic"], "yearPublished": 1890})
            };
            books.push(book(&format!("t{}{}", cell.row, cell.col), extra));
        }
        let catalog = Catalog::new(books);
        let session = play_all_correct(&catalog);
        let report = evaluate(&session, &catalog);

        assert!(report.failures.iter().any(|f| f.label == "Time Capsule"));
        assert!(!report.earned.iter().any(|e| e.label == "Time Capsule"));
        assert!(report.earned.iter().any(|e| e.label == "Flawless"));
        assert!(report.full_theme);
    }

    #[test]
    fn iron_reader_and_combo() {
        let catalog = gothic_catalog();
        let mut session = Session::new(full_board());
        session.toggle_hardcore().unwrap();
        for cell in Cell::all() {
            session.submit_guess(&catalog, &format!("t{}{}", cell.row, cell.col), cell);
        }
        let report = evaluate(&session, &catalog);
        let labels: Vec<_> = report.earned.iter().map(|e| e.label).collect();
        assert!(labels.contains(&"Iron Reader"));
        assert!(labels.contains(&"Secret Whisperer"));
        assert!(labels.contains(&"Iron Whisperer"));
    }

    #[test]
    fn metadata_counting_achievements() {
        let mut books = Vec::new();
        for (i, cell) in Cell::all().enumerate() {
            books.push(book(
                &format!("t{}{}", cell.row, cell.col),
                serde_json::json!({
                    "author": if i < 3 { "Shared Author" } else { "Other" },
                    "isDebut": i < 3,
                    "isBanned": i < 4,
                    "yearPublished": 1960,
                }),
            ));
        }
        let catalog = Catalog::new(books);
        let session = play_all_correct(&catalog);
        let report = evaluate(&session, &catalog);
        let labels: Vec<_> = report.earned.iter().map(|e| e.label).collect();
        assert!(labels.contains(&"Author Loyalist"));
        assert!(labels.contains(&"Fresh Voices"));
        assert!(labels.contains(&"Forbidden Shelf"));
        assert!(labels.contains(&"Time Capsule"));
        assert!(!labels.contains(&"Many Voices"));
        assert!(!labels.contains(&"In Translation"));
    }

    #[test]
    fn empty_session_earns_nothing_scored() {
        let catalog = gothic_catalog();
        let session = Session::new(full_board());
        let report = evaluate(&session, &catalog);
        assert_eq!(report.correct, 0);
        assert!(!report.pattern_x && !report.pattern_h);
        assert!(report.secret_themes.is_empty());
        // No correct cells: only the trivially-true perfect-board family
        // must not fire (wrong == 0 but correct != 9).
        assert!(!report.earned.iter().any(|e| e.label == "Flawless"));
    }
}
