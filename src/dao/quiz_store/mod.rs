pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    AnswerEntity, AnswerSlot, GameEntity, GameFinalization, GameStatus, PendingSlot,
    PlayerEntity, QuestionEntity, UserEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemoryQuizStore;

/// Abstraction over the persistence layer for users, questions, players, games and answers.
///
/// Operations that guard a game invariant are conditional writes and report whether they
/// took effect, so concurrent callers can detect that they lost a race.
pub trait QuizStore: Send + Sync {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a question, soft-deleted ones included.
    fn find_question(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Fetch questions by id, soft-deleted ones included. Order is unspecified.
    fn find_questions(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Non-deleted questions, newest first.
    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Random sample of at most `count` published, non-deleted questions.
    fn sample_published_questions(
        &self,
        count: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;

    /// Open player of `candidate.user_id`, storing `candidate` when the user has none.
    ///
    /// A user has at most one open player, even under concurrent calls.
    fn open_player(&self, candidate: PlayerEntity)
    -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    /// Most recently created player of `user_id`.
    fn latest_player(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn find_players(&self, ids: Vec<Uuid>)
    -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn players_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    /// Store `game` as the pending game unless another pending game already exists or its
    /// first player already sits in a game.
    fn create_pending_game(&self, game: GameEntity)
    -> BoxFuture<'static, StorageResult<PendingSlot>>;
    /// Oldest pending game not opened by `exclude_player`.
    fn find_pending_game(
        &self,
        exclude_player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Persist an activated game, only if the stored copy is still waiting for a second player
    /// and the second player sits in no other game.
    fn activate_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Game of `player_id` whose status is one of `statuses`.
    fn game_for_player(
        &self,
        player_id: Uuid,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn games_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn games_with_status(
        &self,
        status: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Apply a finalization and record both outcomes from the scores stored at commit time.
    /// Returns `false` when the game was no longer active.
    fn finish_game(
        &self,
        finalization: GameFinalization,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Record an answer unless the player already answered that position.
    ///
    /// A recorded [`AnswerStatus::Correct`] answer brings the player's score up to their
    /// number of correct answers before this returns. [`QuizStore::finish_game`] settles the
    /// final scores from the answers themselves.
    ///
    /// [`AnswerStatus::Correct`]: crate::dao::models::AnswerStatus::Correct
    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<AnswerSlot>>;
    /// Answers of the given players ordered by position.
    fn answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
