use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account known to the identity provider. Only the fields the quiz needs are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier of the account.
    pub id: Uuid,
    /// Public login shown next to scores.
    pub login: String,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

/// Question stored in the question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question.
    pub id: Uuid,
    /// Text shown to the players.
    pub body: String,
    /// Accepted answers, matched exactly (case-sensitive, order irrelevant).
    pub correct_answers: Vec<String>,
    /// Only published questions can be drawn for a new game.
    pub published: bool,
    /// Soft-delete marker.
    pub deleted_at: Option<SystemTime>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last edit (publication toggle included).
    pub updated_at: Option<SystemTime>,
}

impl QuestionEntity {
    /// Whether the question can be drawn for a new match.
    pub fn is_drawable(&self) -> bool {
        self.published && self.deleted_at.is_none()
    }
}

/// Final standing of a player once their game is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PlayerOutcome {
    /// Strictly higher score than the opponent.
    Winner,
    /// Strictly lower score than the opponent.
    Losing,
    /// Same score as the opponent.
    Draw,
}

impl PlayerOutcome {
    /// Outcome of a player holding `score` against an opponent holding `opponent_score`.
    pub fn from_scores(score: i32, opponent_score: i32) -> Self {
        match score.cmp(&opponent_score) {
            std::cmp::Ordering::Greater => PlayerOutcome::Winner,
            std::cmp::Ordering::Less => PlayerOutcome::Losing,
            std::cmp::Ordering::Equal => PlayerOutcome::Draw,
        }
    }

    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerOutcome::Winner => "Winner",
            PlayerOutcome::Losing => "Losing",
            PlayerOutcome::Draw => "Draw",
        }
    }
}

/// Game-specific participant record attached to a user.
///
/// A user owns one player record per game they take part in. At most one record per user is
/// open (no outcome yet); it is the record matchmaking and scoring operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Account this player belongs to.
    pub user_id: Uuid,
    /// Cumulative score, one point per correct answer.
    pub score: i32,
    /// Set when the game is finalized.
    pub outcome: Option<PlayerOutcome>,
    /// Creation timestamp, used to find the latest record of a user.
    pub created_at: SystemTime,
}

impl PlayerEntity {
    /// Fresh player record for `user_id` with a zero score.
    pub fn new(user_id: Uuid, now: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            score: 0,
            outcome: None,
            created_at: now,
        }
    }

    /// Whether the player's game, if any, has not been finalized yet.
    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GameStatus {
    /// Created by the first joiner, waiting for an opponent.
    PendingSecondPlayer,
    /// Both players are in and answering.
    Active,
    /// Terminal state.
    Finished,
}

impl GameStatus {
    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::PendingSecondPlayer => "PendingSecondPlayer",
            GameStatus::Active => "Active",
            GameStatus::Finished => "Finished",
        }
    }

    /// Parse the storage representation back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PendingSecondPlayer" => Some(GameStatus::PendingSecondPlayer),
            "Active" => Some(GameStatus::Active),
            "Finished" => Some(GameStatus::Finished),
            _ => None,
        }
    }
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Player who created the game.
    pub first_player_id: Uuid,
    /// Player who joined the pending game.
    pub second_player_id: Option<Uuid>,
    /// Ordered question sequence, fixed when the game becomes active.
    pub question_ids: Vec<Uuid>,
    /// When the first player opened the game.
    pub pair_created_at: SystemTime,
    /// When the second player joined.
    pub started_at: Option<SystemTime>,
    /// When the game reached [`GameStatus::Finished`].
    pub finished_at: Option<SystemTime>,
}

impl GameEntity {
    /// Whether `player_id` occupies one of the two slots.
    pub fn has_player(&self, player_id: Uuid) -> bool {
        self.first_player_id == player_id || self.second_player_id == Some(player_id)
    }

    /// Identifier of the other participant, if any.
    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        if self.first_player_id == player_id {
            self.second_player_id
        } else if self.second_player_id == Some(player_id) {
            Some(self.first_player_id)
        } else {
            None
        }
    }
}

/// Verdict recorded for a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AnswerStatus {
    /// The body matched one of the accepted answers.
    Correct,
    /// No match, or the answer was forfeited.
    Incorrect,
}

impl AnswerStatus {
    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Correct => "Correct",
            AnswerStatus::Incorrect => "Incorrect",
        }
    }
}

/// Answer submitted by a player for one position of the game's question sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Primary key of the answer.
    pub id: Uuid,
    /// Player who answered.
    pub player_id: Uuid,
    /// Game the answer belongs to.
    pub game_id: Uuid,
    /// Question answered.
    pub question_id: Uuid,
    /// Index in the game's question sequence. Unique per player.
    pub position: usize,
    /// Raw answer text (empty for forfeited answers).
    pub body: String,
    /// Verdict.
    pub status: AnswerStatus,
    /// Submission timestamp.
    pub added_at: SystemTime,
}

/// Result of trying to open a new pending game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSlot {
    /// The game was stored as the single pending game.
    Created,
    /// Another pending game already exists.
    Occupied,
    /// The opening player already sits in a game.
    PlayerBusy,
}

/// Result of trying to record an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSlot {
    /// The answer was stored.
    Recorded,
    /// The player already has an answer at this position.
    Taken,
}

/// Everything that must be written to finish a game.
///
/// Storage backends apply it so that re-applying after a partial failure is harmless:
/// answers at filled positions are skipped and the game only flips from
/// [`GameStatus::Active`] once. Outcomes are not part of the plan; backends derive them from
/// the scores stored when the finalization commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFinalization {
    /// Game in its finished state.
    pub game: GameEntity,
    /// Incorrect answers recorded on behalf of a player who stopped answering.
    pub forfeited_answers: Vec<AnswerEntity>,
}
