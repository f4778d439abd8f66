//! Leaderboard ranking
//!
//! Keeps the top 5 entries sorted by score, descending.

use serde::{Deserialize, Serialize};

/// Number of entries shown in the ranking
pub const RANKING_SIZE: usize = 5;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Top-N ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<LeaderboardEntry>,
}

impl Ranking {
    /// Build from unordered entries. Equal scores keep their input order.
    pub fn from_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(RANKING_SIZE);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display lines: "1. name - score"
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} - {}", i + 1, e.name, e.score))
            .collect()
    }
}
