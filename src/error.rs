//! Error types for content loading and link checks

use std::path::PathBuf;

/// Errors raised inside the content layer.
///
/// These never escape the post store's public operations; they are logged
/// there and turned into "absent" or "empty" results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a file or directory failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The frontmatter block could not be parsed.
    #[error("invalid frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    /// The slug cannot name a file inside the posts directory.
    #[error("invalid slug: {0:?}")]
    InvalidSlug(String),

    /// An existence check could not be completed.
    #[error("existence check failed for {slug:?}: {reason}")]
    Check { slug: String, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn check(slug: &str, reason: impl ToString) -> Self {
        Error::Check {
            slug: slug.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
