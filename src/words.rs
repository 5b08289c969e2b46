//! Word pool: the secret words a game can be dealt, each tagged with a theme.
//!
//! The source format is a flat list of `word:theme` entries separated by `;`.
//! Whitespace around entries (including newlines) is ignored, so a file with
//! one entry per line works as long as each line ends with `;`.

use crate::error::{GameError, GameResult};
use crate::types::WordEntry;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;

pub const ENTRY_DELIMITER: char = ';';
pub const PAIR_DELIMITER: char = ':';

#[derive(Debug, thiserror::Error)]
pub enum WordPoolError {
    #[error("Failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed entry #{index}: {entry:?} (expected word:theme)")]
    Malformed { index: usize, entry: String },
}

#[derive(Debug, Clone, Default)]
pub struct WordPool {
    entries: Vec<WordEntry>,
}

impl WordPool {
    /// Build a pool, dropping repeated words (case-insensitive, first wins)
    pub fn new(entries: Vec<WordEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.word.to_lowercase()))
            .collect();
        Self { entries }
    }

    pub fn parse(source: &str) -> Result<Self, WordPoolError> {
        let mut entries = Vec::new();

        for (i, raw) in source.split(ENTRY_DELIMITER).enumerate() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let (word, theme) = raw
                .split_once(PAIR_DELIMITER)
                .map(|(w, t)| (w.trim(), t.trim()))
                .filter(|(w, t)| !w.is_empty() && !t.is_empty())
                .ok_or_else(|| WordPoolError::Malformed {
                    index: i + 1,
                    entry: raw.to_string(),
                })?;

            entries.push(WordEntry {
                word: word.to_string(),
                theme: theme.to_string(),
            });
        }

        Ok(Self::new(entries))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, WordPoolError> {
        let source = tokio::fs::read_to_string(path.as_ref()).await?;
        let pool = Self::parse(&source)?;
        tracing::info!(
            "Loaded {} words from {}",
            pool.len(),
            path.as_ref().display()
        );
        Ok(pool)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick a secret word and its theme uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> GameResult<WordEntry> {
        self.entries.choose(rng).cloned().ok_or(GameError::EmptyPool)
    }
}
