//! Feature engine
//!
//! Batch mode replays every game in order and records each game's features
//! from the state before it was played. Query mode replays a scope to the end
//! and reads one matchup. Both go through the same replay and assembly code,
//! so a query on the games before a match reproduces that match's row.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Write;

use super::derive::{derive, TeamStatistics};
use super::league::league_average;
use super::match_repr::FeatureVector;
use super::team_stats::TeamHistoryTracker;
use crate::{FeatureConfig, MatchRecord, Result, TeamId};

/// One training row: identifying columns, features and label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    #[serde(flatten)]
    pub features: FeatureVector,
    /// 1 if the home team won
    pub home_win: u8,
}

impl FeatureRow {
    fn new(record: &MatchRecord, features: FeatureVector) -> Self {
        FeatureRow {
            game_id: record.game_id.clone(),
            season: record.season,
            week: record.week,
            home_team: record.home_team.clone(),
            away_team: record.away_team.clone(),
            home_score: record.home_score,
            away_score: record.away_score,
            features,
            home_win: record.home_win(),
        }
    }
}

/// Feature table for a set of games, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// League average used for teams without history
    pub league_average: f64,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter()
    }

    /// Feature matrix in `FeatureVector::COLUMNS` order
    pub fn feature_matrix(&self) -> Vec<[f64; FeatureVector::DIM]> {
        self.rows.iter().map(|r| r.features.to_array()).collect()
    }

    /// Training labels aligned with `feature_matrix`
    pub fn labels(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.home_win).collect()
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(
            out,
            "game_id,season,week,home_team,away_team,home_score,away_score,{},home_win",
            FeatureVector::COLUMNS.join(",")
        )?;
        for row in &self.rows {
            let features: Vec<String> = row
                .features
                .to_array()
                .iter()
                .map(|x| x.to_string())
                .collect();
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{}",
                csv_field(&row.game_id),
                row.season,
                row.week,
                csv_field(row.home_team.as_str()),
                csv_field(row.away_team.as_str()),
                row.home_score,
                row.away_score,
                features.join(","),
                row.home_win
            )?;
        }
        Ok(())
    }
}

/// Feature vector for one upcoming matchup plus the statistics behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub features: FeatureVector,
    pub home: TeamStatistics,
    pub away: TeamStatistics,
    pub league_average: f64,
    /// Games the home team played in scope
    pub home_games: usize,
    /// Games the away team played in scope
    pub away_games: usize,
}

/// Builds features from completed games. Holds configuration only; every
/// call replays into its own tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    pub fn new(config: FeatureConfig) -> Self {
        FeatureEngine { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Batch mode: one row per game, each from the state strictly before it.
    ///
    /// The league average covers every game in `matches`.
    pub fn build_feature_table(&self, matches: &[MatchRecord]) -> Result<FeatureTable> {
        self.table_for_scope(chronological(matches, None), None)
    }

    /// Batch mode over a single season
    pub fn build_season_feature_table(
        &self,
        matches: &[MatchRecord],
        season: i32,
    ) -> Result<FeatureTable> {
        self.table_for_scope(chronological(matches, Some(season)), Some(season))
    }

    /// Query mode: features for `home` vs `away` after every game in scope.
    ///
    /// With `season`, both the league average and the team histories only
    /// cover that season.
    pub fn derive_matchup_features(
        &self,
        matches: &[MatchRecord],
        home: &TeamId,
        away: &TeamId,
        season: Option<i32>,
    ) -> Result<Matchup> {
        let scope = chronological(matches, season);
        let league_avg = league_average(scope.iter().copied(), season)?;
        log::debug!(
            "Matchup {} vs {}: {} games in scope, league average {:.2}",
            home,
            away,
            scope.len(),
            league_avg
        );
        Ok(self.matchup_for_scope(&scope, home, away, league_avg))
    }

    /// Query mode with a league average computed by the caller, e.g. the one
    /// a feature table was built with
    pub fn matchup_with_league_average(
        &self,
        matches: &[MatchRecord],
        home: &TeamId,
        away: &TeamId,
        league_average: f64,
    ) -> Matchup {
        let scope = chronological(matches, None);
        self.matchup_for_scope(&scope, home, away, league_average)
    }

    fn table_for_scope(
        &self,
        scope: Vec<&MatchRecord>,
        season: Option<i32>,
    ) -> Result<FeatureTable> {
        let league_avg = league_average(scope.iter().copied(), season)?;
        log::debug!(
            "Building features for {} games (league average {:.2})",
            scope.len(),
            league_avg
        );

        let mut tracker = self.tracker();
        let mut rows = Vec::with_capacity(scope.len());

        for (idx, record) in scope.iter().enumerate() {
            // Snapshot both teams before this game is observed
            let (features, _, _) =
                assemble(&tracker, &record.home_team, &record.away_team, league_avg);
            rows.push(FeatureRow::new(record, features));
            tracker.observe_match(record);

            if (idx + 1) % 1000 == 0 {
                log::debug!("  Processed {}/{} games", idx + 1, scope.len());
            }
        }

        Ok(FeatureTable {
            league_average: league_avg,
            rows,
        })
    }

    fn matchup_for_scope(
        &self,
        scope: &[&MatchRecord],
        home: &TeamId,
        away: &TeamId,
        league_avg: f64,
    ) -> Matchup {
        let mut tracker = self.tracker();
        for record in scope {
            tracker.observe_match(record);
        }

        let (features, home_stats, away_stats) = assemble(&tracker, home, away, league_avg);
        Matchup {
            home_team: home.clone(),
            away_team: away.clone(),
            features,
            home: home_stats,
            away: away_stats,
            league_average: league_avg,
            home_games: tracker.games_played(home),
            away_games: tracker.games_played(away),
        }
    }

    fn tracker(&self) -> TeamHistoryTracker {
        TeamHistoryTracker::new(self.config.recent_form_window)
    }
}

/// Quote a text field when it holds a separator, quote or line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Games in scope, stable-sorted by (season, week)
fn chronological(matches: &[MatchRecord], season: Option<i32>) -> Vec<&MatchRecord> {
    let mut scope: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| season.map_or(true, |s| m.season == s))
        .collect();
    scope.sort_by_key(|m| m.order_key());
    scope
}

fn assemble(
    tracker: &TeamHistoryTracker,
    home: &TeamId,
    away: &TeamId,
    league_avg: f64,
) -> (FeatureVector, TeamStatistics, TeamStatistics) {
    let home_stats = derive(tracker.snapshot(home), league_avg);
    let away_stats = derive(tracker.snapshot(away), league_avg);
    (
        FeatureVector::from_teams(&home_stats, &away_stats),
        home_stats,
        away_stats,
    )
}
