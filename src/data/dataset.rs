//! Completed-game dataset preparation
//!
//! Converts raw feed records into completed games and summarizes the result.

use crate::{GridironError, MatchRecord, RawMatch};
use serde::Serialize;
use std::collections::BTreeSet;

/// Result of validating a batch of raw games
#[derive(Debug, Default)]
pub struct CompletedMatches {
    /// Games with both scores, in input order
    pub matches: Vec<MatchRecord>,
    /// Games that were rejected, with the reason
    pub rejected: Vec<GridironError>,
}

/// Keep completed games and collect the rest as `InvalidMatch` errors.
///
/// Nothing is substituted for a missing score.
pub fn completed_matches<I>(raws: I) -> CompletedMatches
where
    I: IntoIterator<Item = RawMatch>,
{
    let mut out = CompletedMatches::default();
    for raw in raws {
        match MatchRecord::try_from(raw) {
            Ok(record) => out.matches.push(record),
            Err(e) => {
                log::debug!("Skipping game: {}", e);
                out.rejected.push(e);
            }
        }
    }

    if !out.rejected.is_empty() {
        log::warn!(
            "Removed {} unplayed or incomplete games ({} completed)",
            out.rejected.len(),
            out.matches.len()
        );
    }
    out
}

/// Summary of a set of completed games
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_games: usize,
    pub home_wins: usize,
    pub away_wins: usize,
    /// Home wins as a percentage of all games
    pub home_win_pct: f64,
    pub seasons: Vec<i32>,
    /// Lowest and highest week present
    pub week_range: Option<(u32, u32)>,
    pub team_count: usize,
}

impl DatasetSummary {
    pub fn from_matches(matches: &[MatchRecord]) -> Self {
        let total_games = matches.len();
        let home_wins = matches.iter().filter(|m| m.home_win() == 1).count();

        let seasons: BTreeSet<i32> = matches.iter().map(|m| m.season).collect();
        let teams: BTreeSet<&str> = matches
            .iter()
            .flat_map(|m| [m.home_team.as_str(), m.away_team.as_str()])
            .collect();

        let week_range = matches
            .iter()
            .map(|m| m.week)
            .min()
            .zip(matches.iter().map(|m| m.week).max());

        DatasetSummary {
            total_games,
            home_wins,
            away_wins: total_games - home_wins,
            home_win_pct: if total_games == 0 {
                0.0
            } else {
                home_wins as f64 / total_games as f64 * 100.0
            },
            seasons: seasons.into_iter().collect(),
            week_range,
            team_count: teams.len(),
        }
    }
}
