//! Matchup prediction from stored games

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::data::Database;
use crate::features::{FeatureEngine, TeamStatistics};
use crate::model::WinProbabilityModel;
use crate::{ConfidenceLevel, GridironError, MatchRecord, Prediction, Result, TeamId};

/// Predictor for making matchup predictions
pub struct Predictor<M: WinProbabilityModel> {
    model: M,
    db: Database,
    engine: FeatureEngine,
    /// Completed games per scope (None = every season). Entries are never
    /// modified once loaded.
    games_cache: RefCell<HashMap<Option<i32>, Rc<[MatchRecord]>>>,
}

impl<M: WinProbabilityModel> Predictor<M> {
    /// Create a new predictor
    pub fn new(model: M, db: Database, engine: FeatureEngine) -> Self {
        Predictor {
            model,
            db,
            engine,
            games_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Predict `home` hosting `away`, optionally using one season's games only
    pub fn predict(&self, home: &str, away: &str, season: Option<i32>) -> Result<Prediction> {
        let home = TeamId::parse(home)?;
        let away = TeamId::parse(away)?;
        if home == away {
            return Err(GridironError::InvalidTeam(
                "home and away teams must be different".to_string(),
            ));
        }

        let known = self.db.get_teams(None)?;
        for team in [&home, &away] {
            if known.binary_search(team).is_err() {
                return Err(GridironError::UnknownTeam(team.to_string()));
            }
        }

        let games = self.load_games(season)?;
        let matchup = self
            .engine
            .derive_matchup_features(&games, &home, &away, season)?;

        let home_win_probability = self
            .model
            .home_win_probability(&matchup.features.to_array())?;
        let away_win_probability = 1.0 - home_win_probability;

        let current_week = match season {
            Some(s) => self.db.current_week(s)?,
            None => None,
        };

        let predicted_winner = if home_win_probability >= 0.5 {
            home.clone()
        } else {
            away.clone()
        };

        let mut prediction = Prediction {
            home_team: home,
            away_team: away,
            predicted_winner,
            home_win_probability,
            away_win_probability,
            home_stats: matchup.home,
            away_stats: matchup.away,
            home_games: matchup.home_games,
            away_games: matchup.away_games,
            season,
            current_week,
            confidence: ConfidenceLevel::Low,
        };
        prediction.confidence = ConfidenceLevel::from_probability(prediction.winner_probability());
        Ok(prediction)
    }

    /// Teams available for prediction
    pub fn teams(&self, season: Option<i32>) -> Result<Vec<TeamId>> {
        self.db.get_teams(season)
    }

    /// Completed games for a scope, loaded once per scope
    pub fn load_games(&self, season: Option<i32>) -> Result<Rc<[MatchRecord]>> {
        if let Some(games) = self.games_cache.borrow().get(&season) {
            return Ok(Rc::clone(games));
        }

        let games: Rc<[MatchRecord]> = self.db.get_completed_matches(season)?.into();
        log::debug!("Loaded {} completed games for {:?}", games.len(), season);
        self.games_cache
            .borrow_mut()
            .insert(season, Rc::clone(&games));
        Ok(games)
    }

    /// Drop every cached scope, e.g. after new results were stored
    pub fn invalidate(&self) {
        self.games_cache.borrow_mut().clear();
    }

    /// Get the database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Mutable database access. Clears the cache since games may change.
    pub fn database_mut(&mut self) -> &mut Database {
        self.games_cache.get_mut().clear();
        &mut self.db
    }
}

/// Format a prediction for display
pub fn format_prediction(pred: &Prediction) -> String {
    let title = match (pred.season, pred.current_week) {
        (Some(season), Some(week)) => format!("{} season, through week {}", season, week),
        (Some(season), None) => format!("{} season", season),
        (None, _) => "all seasons".to_string(),
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} (Home) vs {} (Away)
│  {}
├─────────────────────────────────────────────────┤
{}{}├─────────────────────────────────────────────────┤
│  Predicted winner:  {}
│  Win probability:   {} {:.1}% / {} {:.1}%
│  Confidence:        {}
└─────────────────────────────────────────────────┘
"#,
        pred.home_team,
        pred.away_team,
        title,
        format_team("Home", &pred.home_team, &pred.home_stats, pred.home_games),
        format_team("Away", &pred.away_team, &pred.away_stats, pred.away_games),
        pred.predicted_winner,
        pred.home_team,
        pred.home_win_probability * 100.0,
        pred.away_team,
        pred.away_win_probability * 100.0,
        pred.confidence
    )
}

fn format_team(label: &str, team: &TeamId, stats: &TeamStatistics, games: usize) -> String {
    let note = if stats.fallback {
        " (no games in scope, league average)"
    } else {
        ""
    };
    format!(
        "│  {} ({}): {} games{}\n\
         │    Avg points for:      {:.1}\n\
         │    Avg points against:  {:.1}\n\
         │    Recent form:         {:.1}\n",
        team, label, games, note, stats.avg_points_for, stats.avg_points_against, stats.recent_form
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::model::{LogisticModel, StandardScaler};
    use crate::RawMatch;

    /// Favors the team with the better points-for average
    fn offense_model() -> LogisticModel {
        LogisticModel::new(
            vec![0.2, 0.0, -0.2, 0.0, 0.0, 0.0, 0.0],
            0.0,
            StandardScaler::identity(),
        )
        .unwrap()
    }

    fn game(id: &str, season: i32, week: u32, home: &str, away: &str, score: Option<(u16, u16)>) -> RawMatch {
        RawMatch {
            game_id: id.to_string(),
            season,
            week,
            home_team: TeamId::from(home),
            away_team: TeamId::from(away),
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
        }
    }

    fn predictor() -> Predictor<LogisticModel> {
        let mut db = Database::in_memory().unwrap();
        db.upsert_games(&[
            game("g1", 2023, 1, "KC", "DEN", Some((35, 10))),
            game("g2", 2024, 1, "KC", "DEN", Some((10, 30))),
            game("g3", 2024, 2, "DEN", "LV", Some((24, 17))),
            game("g4", 2024, 3, "LV", "KC", None),
            game("g5", 2024, 4, "NYJ", "LV", None),
        ])
        .unwrap();
        Predictor::new(offense_model(), db, FeatureEngine::default())
    }

    #[test]
    fn test_predict_all_seasons() {
        let p = predictor();
        let pred = p.predict("kc", " den ", None).unwrap();

        assert_eq!(pred.home_team, TeamId::from("KC"));
        assert_eq!(pred.home_games, 2);
        assert_eq!(pred.home_stats.avg_points_for, 22.5);
        // DEN: 10, 30, 24 scored
        assert_eq!(pred.away_stats.avg_points_for, 64.0 / 3.0);
        assert!(pred.home_win_probability > 0.5);
        assert_eq!(pred.predicted_winner, TeamId::from("KC"));
        assert!((pred.home_win_probability + pred.away_win_probability - 1.0).abs() < 1e-12);
        assert_eq!(pred.current_week, None);
    }

    #[test]
    fn test_predict_season_scope() {
        let p = predictor();
        let pred = p.predict("KC", "DEN", Some(2024)).unwrap();

        assert_eq!(pred.home_stats.avg_points_for, 10.0);
        assert_eq!(pred.away_stats.avg_points_for, 27.0);
        assert_eq!(pred.predicted_winner, TeamId::from("DEN"));
        assert_eq!(pred.current_week, Some(2));
        assert_eq!(pred.season, Some(2024));
    }

    #[test]
    fn test_scheduled_team_without_results_falls_back() {
        let p = predictor();
        let pred = p.predict("NYJ", "KC", Some(2024)).unwrap();

        // 2024 completed games: 10, 30, 24, 17
        assert!(pred.home_stats.fallback);
        assert_eq!(pred.home_stats.avg_points_for, 20.25);
        assert_eq!(pred.home_stats.recent_form, 20.25);
        assert_eq!(pred.home_games, 0);
        assert!(!pred.away_stats.fallback);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let p = predictor();
        assert!(matches!(
            p.predict("KC", "kc", None),
            Err(GridironError::InvalidTeam(_))
        ));
        assert!(matches!(
            p.predict("KC", "", None),
            Err(GridironError::InvalidTeam(_))
        ));
        assert!(matches!(
            p.predict("KC", "XYZ", None),
            Err(GridironError::UnknownTeam(_))
        ));
        assert!(matches!(
            p.predict("KC", "DEN", Some(2019)),
            Err(GridironError::EmptyScope { season: Some(2019) })
        ));
    }

    #[test]
    fn test_cache_and_invalidate() {
        let mut p = predictor();
        assert_eq!(p.load_games(Some(2024)).unwrap().len(), 2);

        p.database_mut()
            .upsert_game(&game("g4", 2024, 3, "LV", "KC", Some((20, 27))))
            .unwrap();
        assert_eq!(p.load_games(Some(2024)).unwrap().len(), 3);

        // Writes through the shared reference are only seen after invalidation
        p.database()
            .upsert_game(&game("g5", 2024, 4, "NYJ", "LV", Some((13, 9))))
            .unwrap();
        assert_eq!(p.load_games(Some(2024)).unwrap().len(), 3);
        p.invalidate();
        assert_eq!(p.load_games(Some(2024)).unwrap().len(), 4);
    }

    #[test]
    fn test_matches_engine_directly() {
        let p = predictor();
        let games = p.load_games(None).unwrap();
        let matchup = FeatureEngine::default()
            .derive_matchup_features(&games, &TeamId::from("DEN"), &TeamId::from("KC"), None)
            .unwrap();
        let pred = p.predict("DEN", "KC", None).unwrap();

        let expected = offense_model()
            .home_win_probability(&matchup.features.to_array())
            .unwrap();
        assert_eq!(pred.home_win_probability, expected);
        assert_eq!(
            FeatureVector::from_teams(&pred.home_stats, &pred.away_stats),
            matchup.features
        );
    }

    #[test]
    fn test_predict_after_lowercase_import() {
        let raws: Vec<RawMatch> = serde_json::from_str(
            r#"[
                {"game_id": "g1", "season": 2024, "week": 1, "home_team": "kc", "away_team": "buf", "home_score": 27, "away_score": 24},
                {"game_id": "g2", "season": 2024, "week": 2, "home_team": " Buf ", "away_team": "kc"}
            ]"#,
        )
        .unwrap();
        let mut db = Database::in_memory().unwrap();
        assert_eq!(db.upsert_games(&raws).unwrap(), 2);

        let p = Predictor::new(offense_model(), db, FeatureEngine::default());
        let pred = p.predict("kc", "buf", None).unwrap();
        assert_eq!(pred.home_games, 1);
        assert_eq!(pred.home_stats.avg_points_for, 27.0);
        assert_eq!(pred.away_stats.avg_points_for, 24.0);
        assert_eq!(p.teams(Some(2024)).unwrap(), vec![TeamId::from("BUF"), TeamId::from("KC")]);
    }

    #[test]
    fn test_confidence_follows_winner_probability() {
        let p = predictor();
        let pred = p.predict("DEN", "KC", Some(2024)).unwrap();
        assert!(pred.winner_probability() >= 0.5);
        assert_eq!(
            pred.confidence,
            ConfidenceLevel::from_probability(pred.winner_probability())
        );
    }

    #[test]
    fn test_format_prediction() {
        let p = predictor();
        let pred = p.predict("NYJ", "KC", Some(2024)).unwrap();
        let text = format_prediction(&pred);
        assert!(text.contains("NYJ (Home) vs KC (Away)"));
        assert!(text.contains("2024 season, through week 2"));
        assert!(text.contains("league average"));
        assert!(text.contains("Confidence:"));
    }
}
