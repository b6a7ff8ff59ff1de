//! Book content — the human-authored text of the book.
//!
//! These types define *what the book says*, not how it is drawn. The engine
//! reads them and resolves them into draw calls for a given page index.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ContentLoadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub cover: Cover,
    #[serde(default)]
    pub pages: Vec<PageSpread>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub title: String,
    pub author: String,
}

/// The two text blocks shown when the book lies open at one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpread {
    pub left: String,
    pub right: String,
}

impl Book {
    /// Read and parse a book from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentLoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ContentLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let book: Book = serde_json::from_str(&json).map_err(|source| ContentLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            title = %book.cover.title,
            spreads = book.pages.len(),
            "loaded book"
        );
        Ok(book)
    }

    /// Highest valid page index. Index 0 is the cover.
    pub fn last_page(&self) -> usize {
        self.pages.len()
    }

    /// The spread shown at `page_index`, or `None` for the cover and for
    /// indices past the end.
    pub fn spread(&self, page_index: usize) -> Option<&PageSpread> {
        page_index
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
    }
}
