//! League-wide scoring average

use crate::{GridironError, MatchRecord, Result};

/// Mean of every home and away score in scope.
///
/// `season` only labels the error when the scope is empty.
pub fn league_average<'a, I>(matches: I, season: Option<i32>) -> Result<f64>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut games: u64 = 0;
    let mut points: u64 = 0;
    for m in matches {
        games += 1;
        points += u64::from(m.home_score) + u64::from(m.away_score);
    }

    if games == 0 {
        return Err(GridironError::EmptyScope { season });
    }

    Ok(points as f64 / (2 * games) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamId;

    fn make_match(home_score: u16, away_score: u16) -> MatchRecord {
        MatchRecord {
            game_id: format!("g{}{}", home_score, away_score),
            season: 2023,
            week: 1,
            home_team: TeamId::from("GB"),
            away_team: TeamId::from("CHI"),
            home_score,
            away_score,
        }
    }

    #[test]
    fn test_league_average() {
        let matches = vec![make_match(21, 14), make_match(17, 20)];
        assert_eq!(league_average(&matches, None).unwrap(), 18.0);
    }

    #[test]
    fn test_shutouts_count() {
        let matches = vec![make_match(0, 0), make_match(10, 6)];
        assert_eq!(league_average(&matches, None).unwrap(), 4.0);
    }

    #[test]
    fn test_empty_scope() {
        let empty: Vec<MatchRecord> = Vec::new();
        let err = league_average(&empty, Some(2030)).unwrap_err();
        assert!(matches!(
            err,
            GridironError::EmptyScope { season: Some(2030) }
        ));
    }
}
