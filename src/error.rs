use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a `Book` from its JSON source.
///
/// No reader session is ever built without a `Book`, so this error leaves
/// the book unrendered and navigation unavailable.
#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("failed to read book content from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse book content from {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
