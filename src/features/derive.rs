//! Team statistic derivation with league-average fallback

use serde::{Deserialize, Serialize};

use super::team_stats::TeamSnapshot;

/// Offense, defense and recent form for one team
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub avg_points_for: f64,
    pub avg_points_against: f64,
    pub recent_form: f64,
    /// True when the team had no history and league average was used
    #[serde(default)]
    pub fallback: bool,
}

impl TeamStatistics {
    /// League-average team, used for teams without history in scope
    pub fn league_average(league_average: f64) -> Self {
        TeamStatistics {
            avg_points_for: league_average,
            avg_points_against: league_average,
            recent_form: league_average,
            fallback: true,
        }
    }

    /// Average point differential per game
    pub fn avg_margin(&self) -> f64 {
        self.avg_points_for - self.avg_points_against
    }
}

impl From<TeamSnapshot> for TeamStatistics {
    fn from(snapshot: TeamSnapshot) -> Self {
        TeamStatistics {
            avg_points_for: snapshot.points_for_avg,
            avg_points_against: snapshot.points_against_avg,
            recent_form: snapshot.recent_form,
            fallback: false,
        }
    }
}

/// Derive a team's statistics from its snapshot.
///
/// A team with no history is treated as league average on offense, defense
/// and recent form alike. This is expected for opening weeks and new teams.
pub fn derive(snapshot: Option<TeamSnapshot>, league_average: f64) -> TeamStatistics {
    match snapshot {
        Some(snapshot) => TeamStatistics::from(snapshot),
        None => TeamStatistics::league_average(league_average),
    }
}
