//! Dictionary word list
//!
//! Loads a newline-separated word file (e.g. `/usr/share/dict/words`) once
//! and answers exact-match membership queries.

use crate::error::{CrawlError, Result};
use crate::types::WordList;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct DictionaryWordList {
    words: HashSet<String>,
}

impl DictionaryWordList {
    /// Load a word file; lines are trimmed and blank lines skipped
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Config(format!(
                "Cannot read dictionary {}: {}",
                path.display(),
                e
            ))
        })?;

        let list = Self::from_words(content.lines());
        tracing::info!(path = %path.display(), words = list.len(), "Dictionary loaded");
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordList for DictionaryWordList {
    fn is_word(&self, token: &str) -> bool {
        !token.is_empty() && self.words.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_words_membership() {
        let list = DictionaryWordList::from_words(["cat", " sky ", "", "Blue"]);
        assert_eq!(list.len(), 3);
        assert!(list.is_word("cat"));
        assert!(list.is_word("sky"));
        assert!(list.is_word("Blue"));
        // Exact match only
        assert!(!list.is_word("blue"));
        assert!(!list.is_word(""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words");
        std::fs::write(&path, "apple\nbanana\n\ncherry\n").unwrap();

        let list = DictionaryWordList::load(&path).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.is_word("banana"));
        assert!(!list.is_word("durian"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = DictionaryWordList::load(Path::new("/nonexistent/dict/words"));
        assert!(matches!(result, Err(CrawlError::Config(_))));
    }
}
