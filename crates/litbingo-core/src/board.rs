use crate::catalog::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Sentinel accepted-answer value meaning the cell cannot be scored:
/// the board author flagged it as lacking data. A guess against such a
/// cell is recorded but neither wins nor loses.
pub const INSUFFICIENT_DATA: &str = "[verify]";

/// A grid position, row and column each in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Create a cell position. Panics if out of the 3×3 range; callers
    /// constructing from user input should use `FromStr` instead.
    pub fn new(row: usize, col: usize) -> Self {
        assert!(row < 3 && col < 3, "cell out of range: {}-{}", row, col);
        Self { row, col }
    }

    /// All nine cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..3).flat_map(|row| (0..3).map(move |col| Cell { row, col }))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for Cell {
    type Err = ();

    /// Parse the `"row-col"` key form used by board data.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (r, c) = s.split_once('-').ok_or(())?;
        let row: usize = r.parse().map_err(|_| ())?;
        let col: usize = c.parse().map_err(|_| ())?;
        if row < 3 && col < 3 {
            Ok(Cell { row, col })
        } else {
            Err(())
        }
    }
}

/// A loaded puzzle definition: category labels, optional declared theme,
/// and the per-cell accepted-answer lists.
///
/// Loaded fresh per game; replacing the board resets all session state.
/// A cell missing from `answers` is the distinct "undefined cell"
/// condition — not the same as a cell with an empty accepted list.
#[derive(Debug, Clone)]
pub struct Board {
    pub id: String,
    pub rows: [String; 3],
    pub columns: [String; 3],
    declared_theme: Option<String>,
    answers: HashMap<Cell, Vec<String>>,
}

/// Wire shape of a board file, matching the original JSON layout.
#[derive(Debug, Deserialize)]
struct BoardData {
    id: String,
    categories: BoardCategories,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    answers: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct BoardCategories {
    rows: Vec<CategoryLabel>,
    columns: Vec<CategoryLabel>,
}

#[derive(Debug, Deserialize)]
struct CategoryLabel {
    label: String,
}

/// Reasons a board file is unusable.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board must declare exactly 3 row and 3 column categories")]
    BadCategories,
    #[error("unrecognized cell key {0:?} in answers table")]
    BadCellKey(String),
}

impl Board {
    /// Build a board from labels and a raw answers table keyed by
    /// `"row-col"` strings. Accepted titles are normalized here, once.
    pub fn new(
        id: String,
        rows: Vec<String>,
        columns: Vec<String>,
        declared_theme: Option<String>,
        raw_answers: HashMap<String, Vec<String>>,
    ) -> Result<Self, BoardError> {
        let rows: [String; 3] = rows.try_into().map_err(|_| BoardError::BadCategories)?;
        let columns: [String; 3] = columns.try_into().map_err(|_| BoardError::BadCategories)?;

        let mut answers = HashMap::new();
        for (key, titles) in raw_answers {
            let cell: Cell = key.parse().map_err(|()| BoardError::BadCellKey(key))?;
            let titles = titles.iter().map(|t| normalize(t)).collect();
            answers.insert(cell, titles);
        }

        Ok(Self {
            id,
            rows,
            columns,
            declared_theme: declared_theme.map(|t| normalize(&t)),
            answers,
        })
    }

    /// Accepted (normalized) answers for a cell, or `None` if the board
    /// defines no entry for it — the undefined-cell condition.
    pub fn accepted_answers(&self, cell: Cell) -> Option<&[String]> {
        self.answers.get(&cell).map(Vec::as_slice)
    }

    pub fn declared_theme(&self) -> Option<&str> {
        self.declared_theme.as_deref()
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = BoardData::deserialize(deserializer)?;
        let rows = data.categories.rows.into_iter().map(|c| c.label).collect();
        let columns = data.categories.columns.into_iter().map(|c| c.label).collect();
        Board::new(data.id, rows, columns, data.theme, data.answers)
            .map_err(serde::de::Error::custom)
    }
}
