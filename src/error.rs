use std::path::PathBuf;

use thiserror::Error;

use crate::sgf::SgfError;

/// Why a game record could not be opened.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("game record not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] SgfError),
}
