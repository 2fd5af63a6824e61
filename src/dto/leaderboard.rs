//! Statistics and leaderboard payloads, plus parsing of the leaderboard `sort` parameter.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::dto::{game::PlayerIdentity, game::SortDirection};

/// Aggregated results of one user over their finished games.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticView {
    /// Sum of scores.
    pub sum_score: i64,
    /// Average score, rounded to 2 decimals.
    pub avg_scores: f64,
    /// Number of finished games.
    pub games_count: u32,
    /// Games won.
    pub wins_count: u32,
    /// Games lost.
    pub losses_count: u32,
    /// Games drawn.
    pub draws_count: u32,
}

/// Leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayerView {
    /// Aggregated statistics.
    #[serde(flatten)]
    pub statistic: StatisticView,
    /// Who the entry belongs to.
    pub player: PlayerIdentity,
}

/// Columns the leaderboard can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardField {
    /// `sumScore`
    SumScore,
    /// `avgScores`
    AvgScores,
    /// `gamesCount`
    GamesCount,
    /// `winsCount`
    WinsCount,
    /// `lossesCount`
    LossesCount,
    /// `drawsCount`
    DrawsCount,
}

impl LeaderboardField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "sumScore" => Some(Self::SumScore),
            "avgScores" => Some(Self::AvgScores),
            "gamesCount" => Some(Self::GamesCount),
            "winsCount" => Some(Self::WinsCount),
            "lossesCount" => Some(Self::LossesCount),
            "drawsCount" => Some(Self::DrawsCount),
            _ => None,
        }
    }
}

/// One key of a multi-key leaderboard sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Column.
    pub field: LeaderboardField,
    /// Direction.
    pub direction: SortDirection,
}

/// Rejected `sort` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// The column is not sortable.
    #[error("unknown sort field `{0}`")]
    UnknownField(String),
    /// The direction is neither `asc` nor `desc`.
    #[error("unknown sort direction `{0}`")]
    UnknownDirection(String),
}

/// Default leaderboard order: best average first, then best total.
pub fn default_sort() -> Vec<SortKey> {
    vec![
        SortKey {
            field: LeaderboardField::AvgScores,
            direction: SortDirection::Desc,
        },
        SortKey {
            field: LeaderboardField::SumScore,
            direction: SortDirection::Desc,
        },
    ]
}

/// Parse repeated `sort` values of the form `field dir` or `field.dir`.
///
/// A value without a direction sorts descending. No values yields [`default_sort`].
pub fn parse_sort<S: AsRef<str>>(values: &[S]) -> Result<Vec<SortKey>, SortError> {
    let keys = values
        .iter()
        .map(|value| value.as_ref().trim())
        .filter(|value| !value.is_empty())
        .map(parse_key)
        .collect::<Result<Vec<_>, _>>()?;

    if keys.is_empty() {
        Ok(default_sort())
    } else {
        Ok(keys)
    }
}

fn parse_key(value: &str) -> Result<SortKey, SortError> {
    let (field, direction) = match value.split_once(|c: char| c == ' ' || c == '.') {
        Some((field, direction)) => (field.trim(), Some(direction.trim())),
        None => (value, None),
    };

    let field =
        LeaderboardField::parse(field).ok_or_else(|| SortError::UnknownField(field.to_owned()))?;
    let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("desc") => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some(other) => return Err(SortError::UnknownDirection(other.to_owned())),
    };

    Ok(SortKey { field, direction })
}
