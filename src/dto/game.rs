use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{AnswerStatus, GameStatus};
use crate::dto::format_system_time;

/// Body of an answer submission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    /// Raw answer text, compared exactly against the accepted answers.
    #[validate(length(max = 500))]
    pub answer: String,
}

/// Public identity of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerIdentity {
    /// User id (not the per-game player record id).
    pub id: Uuid,
    /// Display login.
    pub login: String,
}

/// One recorded answer as shown in a game view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    /// Question that was answered.
    pub question_id: Uuid,
    /// Verdict recorded for the answer.
    pub answer_status: AnswerStatus,
    /// RFC 3339 submission timestamp.
    pub added_at: String,
}

impl AnswerView {
    /// Build from stored parts.
    pub fn new(question_id: Uuid, answer_status: AnswerStatus, added_at: SystemTime) -> Self {
        Self {
            question_id,
            answer_status,
            added_at: format_system_time(added_at),
        }
    }
}

/// Progress of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerProgressView {
    /// Answers in question order.
    pub answers: Vec<AnswerView>,
    /// Who is playing.
    pub player: PlayerIdentity,
    /// Persisted cumulative score.
    pub score: i32,
}

/// Question shown to both players while a game is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionPreview {
    /// Question id.
    pub id: Uuid,
    /// Question text.
    pub body: String,
}

/// Full game view returned by the quiz endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Game id.
    pub id: Uuid,
    /// Progress of the player who opened the game.
    pub first_player_progress: PlayerProgressView,
    /// Progress of the player who joined, once there is one.
    pub second_player_progress: Option<PlayerProgressView>,
    /// Question sequence, empty unless the game is active.
    pub questions: Vec<QuestionPreview>,
    /// Lifecycle status.
    pub status: GameStatus,
    /// When the first player opened the game.
    pub pair_created_date: String,
    /// When the second player joined.
    pub start_game_date: Option<String>,
    /// When the game finished.
    pub finish_game_date: Option<String>,
}

/// Columns the game listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum GameSortField {
    /// Creation date of the game.
    #[default]
    PairCreatedDate,
    /// Start date; games that never started sort as oldest.
    StartGameDate,
    /// Finish date; unfinished games sort as oldest.
    FinishGameDate,
    /// Lifecycle status, in lifecycle order.
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

/// Query parameters of the "my games" listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GamesQuery {
    /// Sort column (default `pairCreatedDate`).
    pub sort_by: Option<GameSortField>,
    /// Sort direction (default `desc`).
    pub sort_direction: Option<SortDirection>,
    /// Page number, starting at 1 (default 1).
    pub page_number: Option<u32>,
    /// Items per page (default 10, at most 100).
    pub page_size: Option<u32>,
}
