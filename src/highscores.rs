//! Personal high score table
//!
//! Persisted per profile, tracks the top 10 runs by score.

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;
use crate::persistence::{KeyValueStore, ProfileStore, StorageError};
use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = LEADERBOARD_SIZE;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Altitude reached (metres)
    pub altitude: f32,
    pub coins: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: i64,
}

/// High score table, sorted by score descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run. Returns the rank achieved (1-indexed).
    pub fn add_run(&mut self, run: &RunSummary, timestamp: i64) -> Option<usize> {
        if !self.qualifies(run.score) {
            return None;
        }

        let entry = HighScoreEntry {
            score: run.score,
            altitude: run.altitude,
            coins: run.coins_collected,
            timestamp,
        };

        // Ties go below existing entries
        let pos = self.entries.iter().position(|e| run.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the table; missing or corrupt data starts fresh
    pub fn load<S: KeyValueStore>(store: &ProfileStore<S>) -> Self {
        match store.load::<HighScores>(Self::STORAGE_KEY) {
            Some(mut scores) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &ProfileStore<S>) -> Result<(), StorageError> {
        store.save(Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format an age in ms as a relative date string
pub fn format_age(now: i64, timestamp: i64) -> String {
    let diff_mins = (now - timestamp).max(0) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    match (diff_days, diff_hours, diff_mins) {
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{d} days ago"),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{h} hours ago"),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m > 1 => format!("{m} mins ago"),
        _ => "Just now".to_string(),
    }
}
