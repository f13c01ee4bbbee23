//! Model input vector for a single matchup

use serde::{Deserialize, Serialize};

use super::derive::TeamStatistics;

/// Seven predictors for a home/away matchup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Home team offensive strength
    pub home_points_for_avg: f64,
    /// Home team defensive strength
    pub home_points_against_avg: f64,
    /// Away team offensive strength
    pub away_points_for_avg: f64,
    /// Away team defensive strength
    pub away_points_against_avg: f64,
    pub home_recent_form: f64,
    pub away_recent_form: f64,
    /// Always 1.0
    pub home_field_flag: f64,
}

impl FeatureVector {
    /// Dimension of feature vector
    pub const DIM: usize = 7;

    /// Column names, in `to_array` order
    pub const COLUMNS: [&'static str; Self::DIM] = [
        "home_team_avg_points_for",
        "home_team_avg_points_against",
        "away_team_avg_points_for",
        "away_team_avg_points_against",
        "home_recent_form",
        "away_recent_form",
        "home_field_advantage",
    ];

    /// Assemble the vector from both teams' statistics
    pub fn from_teams(home: &TeamStatistics, away: &TeamStatistics) -> Self {
        FeatureVector {
            home_points_for_avg: home.avg_points_for,
            home_points_against_avg: home.avg_points_against,
            away_points_for_avg: away.avg_points_for,
            away_points_against_avg: away.avg_points_against,
            home_recent_form: home.recent_form,
            away_recent_form: away.recent_form,
            home_field_flag: 1.0,
        }
    }

    /// Convert to a fixed-width array
    pub fn to_array(&self) -> [f64; Self::DIM] {
        [
            self.home_points_for_avg,
            self.home_points_against_avg,
            self.away_points_for_avg,
            self.away_points_against_avg,
            self.home_recent_form,
            self.away_recent_form,
            self.home_field_flag,
        ]
    }

    /// True when every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }
}
