//! Loading of the static JSON data: the book catalog and board
//! definitions. The engine trusts whatever these files say; malformed
//! book records simply miss on lookup later.

use litbingo_core::{Board, Book, Catalog};
use rand::seq::SliceRandom;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no board files (*.json) found in {0}")]
    NoBoards(PathBuf),
}

fn read(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the book catalog from a JSON array of book records.
pub fn load_catalog(path: &Path) -> Result<Catalog, DataError> {
    let json = read(path)?;
    let books: Vec<Book> = serde_json::from_str(&json).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Catalog::new(books))
}

/// Load a single board definition.
pub fn load_board(path: &Path) -> Result<Board, DataError> {
    let json = read(path)?;
    serde_json::from_str(&json).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick a random board file from a directory of `*.json` boards.
pub fn pick_board(dir: &Path) -> Result<PathBuf, DataError> {
    let entries = std::fs::read_dir(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut boards: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    boards.sort();

    boards
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| DataError::NoBoards(dir.to_path_buf()))
}
