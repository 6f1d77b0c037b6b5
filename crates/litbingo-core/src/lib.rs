//! Literary bingo engine.
//!
//! A single-session 3×3 grid puzzle: each cell wants a book title that
//! satisfies both its row and column category, checked against a per-board
//! answer key. This crate is the validation and scoring engine only —
//! rendering, input handling, and data loading live in the front-end crate.
//!
//! The pieces, leaf-first:
//! - [`Catalog`]: read-only lookup of known titles and book metadata.
//! - [`Board`]: a loaded puzzle definition with its accepted-answer lists.
//! - [`Session`]: all mutable play state, mutated only through
//!   [`Session::submit_guess`] and the mode toggles.
//! - [`bonus`]: the end-of-game pattern/theme/achievement pass.
//! - [`score`]: reduction of the bonus report to a final score.

pub mod board;
pub mod bonus;
pub mod catalog;
pub mod score;
pub mod session;

pub use board::{Board, Cell, INSUFFICIENT_DATA};
pub use bonus::{Achievement, BonusReport, EarnedBonus, Reward, Visibility};
pub use catalog::{normalize, Book, Catalog};
pub use score::ScoreBreakdown;
pub use session::{CellState, GuessOutcome, LockStatus, Session, SessionError};
