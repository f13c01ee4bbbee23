//! SQLite storage for game results

use crate::{MatchRecord, RawMatch, Result, TeamId};
use rusqlite::{params, Connection};
use std::path::Path;

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                game_id TEXT PRIMARY KEY,
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                home_score INTEGER,
                away_score INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_games_order ON games(season, week);
            CREATE INDEX IF NOT EXISTS idx_games_teams ON games(home_team, away_team);
            "#,
        )?;
        Ok(())
    }

    // ==================== Game Operations ====================

    /// Insert or update a game. Unplayed games are stored without scores;
    /// records that fail `RawMatch::validated` are refused.
    pub fn upsert_game(&self, game: &RawMatch) -> Result<()> {
        upsert_on(&self.conn, &game.validated()?)
    }

    /// Insert multiple games in one transaction, skipping invalid records.
    /// Returns the number stored.
    pub fn upsert_games(&mut self, games: &[RawMatch]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut stored = 0;
        for game in games {
            match game.validated() {
                Ok(game) => {
                    upsert_on(&tx, &game)?;
                    stored += 1;
                }
                Err(e) => log::warn!("Not storing game: {}", e),
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    /// Completed games in chronological order, optionally for one season.
    ///
    /// Games missing either score have not been played and are left out.
    /// Rows that do not make a valid `MatchRecord` are skipped with a warning.
    pub fn get_completed_matches(&self, season: Option<i32>) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, season, week, home_team, away_team, home_score, away_score
             FROM games
             WHERE home_score IS NOT NULL AND away_score IS NOT NULL
               AND (?1 IS NULL OR season = ?1)
             ORDER BY season, week, rowid",
        )?;

        let rows = stmt
            .query_map(params![season], Self::row_to_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut matches = Vec::with_capacity(rows.len());
        for raw in rows {
            match MatchRecord::try_from(raw) {
                Ok(record) => matches.push(record),
                Err(e) => log::warn!("Skipping stored game: {}", e),
            }
        }

        Ok(matches)
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawMatch> {
        Ok(RawMatch {
            game_id: row.get(0)?,
            season: row.get(1)?,
            week: row.get(2)?,
            home_team: TeamId(row.get(3)?),
            away_team: TeamId(row.get(4)?),
            home_score: row.get(5)?,
            away_score: row.get(6)?,
        })
    }

    // ==================== Team Operations ====================

    /// Team identifiers appearing in the schedule, sorted
    pub fn get_teams(&self, season: Option<i32>) -> Result<Vec<TeamId>> {
        let mut stmt = self.conn.prepare(
            "SELECT home_team FROM games WHERE (?1 IS NULL OR season = ?1)
             UNION
             SELECT away_team FROM games WHERE (?1 IS NULL OR season = ?1)
             ORDER BY 1",
        )?;

        let teams = stmt
            .query_map(params![season], |row| Ok(TeamId(row.get(0)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(teams)
    }

    /// Latest week with a completed game in a season
    pub fn current_week(&self, season: i32) -> Result<Option<u32>> {
        let week: Option<u32> = self.conn.query_row(
            "SELECT MAX(week) FROM games
             WHERE season = ?1 AND home_score IS NOT NULL AND away_score IS NOT NULL",
            params![season],
            |row| row.get(0),
        )?;
        Ok(week)
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let completed_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE home_score IS NOT NULL AND away_score IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT season FROM games ORDER BY season")?;
        let seasons = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i32>, _>>()?;

        let team_count = self.get_teams(None)?.len();

        Ok(DatabaseStats {
            game_count: game_count as usize,
            completed_count: completed_count as usize,
            team_count,
            seasons,
        })
    }
}

fn upsert_on(conn: &Connection, game: &RawMatch) -> Result<()> {
    // A feed without scores never erases a stored result
    conn.execute(
        r#"
        INSERT INTO games (game_id, season, week, home_team, away_team, home_score, away_score)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(game_id) DO UPDATE SET
            season = excluded.season,
            week = excluded.week,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            home_score = COALESCE(excluded.home_score, home_score),
            away_score = COALESCE(excluded.away_score, away_score)
        "#,
        params![
            game.game_id,
            game.season,
            game.week,
            game.home_team.as_str(),
            game.away_team.as_str(),
            game.home_score,
            game.away_score,
        ],
    )?;
    Ok(())
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub game_count: usize,
    pub completed_count: usize,
    pub team_count: usize,
    pub seasons: Vec<i32>,
}
