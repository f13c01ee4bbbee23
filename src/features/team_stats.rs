//! Team history tracking
//!
//! Per-team scoring history accumulated while games are replayed in
//! chronological order.

use crate::{MatchRecord, TeamId};
use std::collections::HashMap;

/// Default number of games averaged for recent form
pub const DEFAULT_RECENT_FORM_WINDOW: usize = 5;

/// One game from a team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameScore {
    pub points_for: u16,
    pub points_against: u16,
}

/// Statistics read from a team's history at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamSnapshot {
    /// Average points scored per game
    pub points_for_avg: f64,
    /// Average points conceded per game
    pub points_against_avg: f64,
    /// Average points scored over the most recent games
    pub recent_form: f64,
    /// Games observed so far
    pub games: usize,
}

/// Append-only scoring history for every team seen during one replay
#[derive(Debug, Clone)]
pub struct TeamHistoryTracker {
    /// Games per team, oldest first
    history: HashMap<TeamId, Vec<GameScore>>,
    recent_form_window: usize,
}

impl TeamHistoryTracker {
    /// Create an empty tracker with the given recent form window
    pub fn new(recent_form_window: usize) -> Self {
        TeamHistoryTracker {
            history: HashMap::new(),
            recent_form_window: recent_form_window.max(1),
        }
    }

    /// Append one game to a team's history
    pub fn observe(&mut self, team: &TeamId, points_for: u16, points_against: u16) {
        self.history.entry(team.clone()).or_default().push(GameScore {
            points_for,
            points_against,
        });
    }

    /// Record a completed game for both participants.
    ///
    /// Take snapshots for this game before calling this.
    pub fn observe_match(&mut self, record: &MatchRecord) {
        self.observe(&record.home_team, record.home_score, record.away_score);
        self.observe(&record.away_team, record.away_score, record.home_score);
    }

    /// Current statistics for a team, or None if it has not played yet
    pub fn snapshot(&self, team: &TeamId) -> Option<TeamSnapshot> {
        let games = self.history.get(team)?;
        if games.is_empty() {
            return None;
        }

        // Integer sums are exact, so the averages only depend on the history
        // contents and never on how the history was reached
        let n = games.len();
        let total_for: u64 = games.iter().map(|g| u64::from(g.points_for)).sum();
        let total_against: u64 = games.iter().map(|g| u64::from(g.points_against)).sum();

        let recent = &games[n.saturating_sub(self.recent_form_window)..];
        let recent_for: u64 = recent.iter().map(|g| u64::from(g.points_for)).sum();

        Some(TeamSnapshot {
            points_for_avg: total_for as f64 / n as f64,
            points_against_avg: total_against as f64 / n as f64,
            recent_form: recent_for as f64 / recent.len() as f64,
            games: n,
        })
    }

    /// Number of games observed for a team
    pub fn games_played(&self, team: &TeamId) -> usize {
        self.history.get(team).map(|g| g.len()).unwrap_or(0)
    }

    /// Full history for a team, oldest first
    pub fn history(&self, team: &TeamId) -> &[GameScore] {
        self.history.get(team).map(|g| g.as_slice()).unwrap_or(&[])
    }

    /// Number of distinct teams seen
    pub fn team_count(&self) -> usize {
        self.history.len()
    }

    pub fn recent_form_window(&self) -> usize {
        self.recent_form_window
    }
}

impl Default for TeamHistoryTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_FORM_WINDOW)
    }
}
