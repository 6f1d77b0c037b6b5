use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Canonical form of a title: trimmed and lowercased.
///
/// Every title comparison in the engine goes through this — the catalog key,
/// the per-cell attempt history, the global used-title set, and the board's
/// accepted-answer lists are all stored normalized.
pub fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A single book record from the catalog data.
///
/// Immutable once loaded. Field names follow the camelCase JSON the catalog
/// ships in; absent tag lists and flags default to empty/false, and a
/// missing publication year stays `None` (achievement predicates that need
/// it report an evaluation failure rather than guessing).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub literary_movements: Vec<String>,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default)]
    pub is_debut: bool,
    #[serde(default)]
    pub is_translated: bool,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub author_is_of_color: bool,
}

impl Book {
    /// Union of genres, themes, and literary movements, normalized.
    /// This is the tag set the theme and achievement detectors match on.
    pub fn tag_set(&self) -> HashSet<String> {
        self.genres
            .iter()
            .chain(&self.themes)
            .chain(&self.literary_movements)
            .map(|t| normalize(t))
            .collect()
    }
}

/// Read-only lookup table of known books, keyed by normalized title.
///
/// The catalog gates every guess before board-specific validation: a title
/// absent here is rejected outright and never recorded as an attempt.
/// Malformed records are not repaired — they simply miss on lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: HashMap<String, Book>,
}

impl Catalog {
    pub fn new(books: Vec<Book>) -> Self {
        let books = books
            .into_iter()
            .map(|b| (normalize(&b.title), b))
            .collect();
        Self { books }
    }

    /// Look up a book by title (any casing).
    pub fn lookup(&self, title: &str) -> Option<&Book> {
        self.books.get(&normalize(title))
    }

    /// Whether the title exists in the catalog at all.
    pub fn contains(&self, title: &str) -> bool {
        self.books.contains_key(&normalize(title))
    }

    /// All normalized titles, for autocomplete in the front-end.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
