//! Gridiron game prediction from team scoring history
//!
//! Replays completed games in chronological order to build leakage-free
//! team statistics, for both training tables and single matchup queries.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Team identifier (league abbreviation, e.g. "KC")
///
/// Deserialized ids go through `TeamId::parse`, so feeds may use any case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    /// Normalize user input: trimmed and upper-cased, never empty
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(GridironError::InvalidTeam(
                "team name cannot be empty".to_string(),
            ));
        }
        Ok(TeamId(name.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TeamId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for TeamId {
    fn from(name: &str) -> Self {
        TeamId(name.to_string())
    }
}

/// A completed game. Both scores are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_id: String,
    pub season: i32,
    /// Ordering key within a season
    pub week: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: u16,
    pub away_score: u16,
}

impl MatchRecord {
    /// Chronological sort key
    pub fn order_key(&self) -> (i32, u32) {
        (self.season, self.week)
    }

    /// Training label: 1 if the home team won, 0 otherwise (ties count as 0)
    pub fn home_win(&self) -> u8 {
        u8::from(self.home_score > self.away_score)
    }

    /// Returns the winning team, or None for a tie
    pub fn winner(&self) -> Option<&TeamId> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(&self.home_team),
            std::cmp::Ordering::Less => Some(&self.away_team),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Check whether a team took part in this game
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.home_team == team || &self.away_team == team
    }
}

/// A game as delivered by the upstream feed; unplayed games have no scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
}

impl RawMatch {
    /// Storable copy of this record: team ids normalized and distinct, and
    /// either both scores or neither
    pub fn validated(&self) -> Result<RawMatch> {
        let invalid = |reason: &str| GridironError::InvalidMatch {
            game_id: self.game_id.clone(),
            reason: reason.to_string(),
        };

        let home_team = TeamId::parse(self.home_team.as_str())?;
        let away_team = TeamId::parse(self.away_team.as_str())?;
        if home_team == away_team {
            return Err(invalid("home and away team are the same"));
        }
        if self.home_score.is_some() != self.away_score.is_some() {
            return Err(invalid("only one score reported"));
        }

        Ok(RawMatch {
            home_team,
            away_team,
            ..self.clone()
        })
    }
}

impl TryFrom<RawMatch> for MatchRecord {
    type Error = GridironError;

    fn try_from(raw: RawMatch) -> Result<Self> {
        let invalid = |reason: &str| GridironError::InvalidMatch {
            game_id: raw.game_id.clone(),
            reason: reason.to_string(),
        };

        // Zero is a real score; only an absent value disqualifies the game
        let home_score = raw.home_score.ok_or_else(|| invalid("missing home score"))?;
        let away_score = raw.away_score.ok_or_else(|| invalid("missing away score"))?;
        if raw.home_team == raw.away_team {
            return Err(invalid("home and away team are the same"));
        }

        Ok(MatchRecord {
            game_id: raw.game_id,
            season: raw.season,
            week: raw.week,
            home_team: raw.home_team,
            away_team: raw.away_team,
            home_score,
            away_score,
        })
    }
}

/// Model prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub predicted_winner: TeamId,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub home_stats: features::TeamStatistics,
    pub away_stats: features::TeamStatistics,
    /// Games each team played in the scope the statistics came from
    pub home_games: usize,
    pub away_games: usize,
    pub season: Option<i32>,
    /// Latest completed week of `season`
    pub current_week: Option<u32>,
    pub confidence: ConfidenceLevel,
}

impl Prediction {
    /// Probability of the predicted winner
    pub fn winner_probability(&self) -> f64 {
        self.home_win_probability.max(self.away_win_probability)
    }
}

/// Confidence level based on the winner's probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,     // Above 65%
    Moderate, // Above 55%
    Low,      // Close matchup
}

impl ConfidenceLevel {
    pub fn from_probability(winner_probability: f64) -> Self {
        if winner_probability > 0.65 {
            ConfidenceLevel::High
        } else if winner_probability > 0.55 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Moderate => write!(f, "Moderate"),
            ConfidenceLevel::Low => write!(f, "Low (close matchup)"),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum GridironError {
    #[error("No completed games in scope{}", scope_suffix(.season))]
    EmptyScope { season: Option<i32> },

    #[error("Invalid game {game_id}: {reason}")]
    InvalidMatch { game_id: String, reason: String },

    #[error("Invalid team: {0}")]
    InvalidTeam(String),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Model not found - export a trained model to the configured model path")]
    NoModel,

    #[error("Model error: {0}")]
    Model(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridironError>;

fn scope_suffix(season: &Option<i32>) -> String {
    match season {
        Some(s) => format!(" (season {})", s),
        None => String::new(),
    }
}

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Number of most recent games averaged for recent form
    #[serde(default = "default_recent_form_window")]
    pub recent_form_window: usize,
}

fn default_recent_form_window() -> usize {
    features::team_stats::DEFAULT_RECENT_FORM_WINDOW
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            recent_form_window: default_recent_form_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            database_path: "data/games.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            model_path: "models/logistic_regression.json".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridironError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| GridironError::Config(format!("Failed to parse config: {}", e)))?;
        if config.features.recent_form_window == 0 {
            return Err(GridironError::Config(
                "features.recent_form_window must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridironError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
