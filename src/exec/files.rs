//! File analysis executor: find a file under the root tree and count its
//! palindrome words.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::RequestError;
use crate::types::{ContentKind, Outcome};

/// Executor for the file-analysis flavor, rooted at a fixed directory tree.
#[derive(Debug, Clone)]
pub struct FileAnalyzer {
    root: PathBuf,
}

impl FileAnalyzer {
    /// Create an analyzer rooted at `root`, creating the directory if absent.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating root directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Directory tree searched for requested files
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Analyze the named file.
    ///
    /// Searches the whole root tree for an exact filename match. With
    /// several matches the first one in traversal order wins; that order is
    /// filesystem-dependent.
    pub async fn analyze(&self, filename: &str) -> Result<Outcome, RequestError> {
        let Some(path) = self.find(filename).await.map_err(RequestError::Upstream)? else {
            return Err(RequestError::NotFound(format!(
                "file '{}' not found under {}",
                filename,
                self.root.display()
            )));
        };
        debug!(file = %path.display(), "analyzing");

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
            .map_err(RequestError::Upstream)?;

        let count = count_palindromes(&content);
        let body = if count > 0 {
            format!("File '{filename}' contains {count} palindrome word(s).")
        } else {
            format!("File '{filename}' contains no palindrome words.")
        };
        Ok(Outcome::ok(body, ContentKind::Plain))
    }

    /// Depth-first search of the root tree for an exact filename match.
    async fn find(&self, filename: &str) -> Result<Option<PathBuf>> {
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("listing {}", dir.display()))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .with_context(|| format!("listing {}", dir.display()))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .with_context(|| format!("inspecting {}", entry.path().display()))?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if entry.file_name() == filename {
                    return Ok(Some(entry.path()));
                }
            }
        }
        Ok(None)
    }
}

/// Count palindrome words in `text`.
///
/// Words are maximal runs of word characters (letters, digits, underscore).
/// Empty tokens are discarded; each remaining word is tested with
/// [`is_palindrome`].
#[must_use]
pub fn count_palindromes(text: &str) -> usize {
    text.split(|c: char| !is_word_char(c))
        .filter(|word| !word.is_empty())
        .filter(|word| is_palindrome(word))
        .count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Palindrome test on the cleaned form of a word.
///
/// Cleaning strips everything non-alphanumeric and lowercases the rest.
/// Single characters and empty cleaned forms never count.
#[must_use]
pub fn is_palindrome(word: &str) -> bool {
    let cleaned: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if cleaned.len() <= 1 {
        return false;
    }
    cleaned.iter().eq(cleaned.iter().rev())
}
