#![allow(dead_code)]

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use futures::future::BoxFuture;
use pair_quiz_back::{
    dao::{
        models::{
            AnswerEntity, AnswerSlot, GameEntity, GameFinalization, GameStatus, PendingSlot,
            PlayerEntity, QuestionEntity, UserEntity,
        },
        quiz_store::{MemoryQuizStore, QuizStore},
        storage::StorageResult,
    },
    services::matchmaking_service::JoinSettings,
};
use uuid::Uuid;

pub const SETTINGS: JoinSettings = JoinSettings {
    questions_per_game: 5,
    attempts: 3,
};

pub fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
}

pub fn memory_store() -> Arc<dyn QuizStore> {
    Arc::new(MemoryQuizStore::new())
}

/// Memory store whose calls yield to the scheduler before and after running, so concurrent
/// tasks interleave between store calls the way they would against a remote database.
pub fn yielding_store() -> Arc<dyn QuizStore> {
    Arc::new(YieldingStore(MemoryQuizStore::new()))
}

struct YieldingStore(MemoryQuizStore);

fn yielding<T: Send + 'static>(call: BoxFuture<'static, T>) -> BoxFuture<'static, T> {
    Box::pin(async move {
        tokio::task::yield_now().await;
        let out = call.await;
        tokio::task::yield_now().await;
        out
    })
}

impl QuizStore for YieldingStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        yielding(self.0.save_user(user))
    }
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        yielding(self.0.find_user(id))
    }
    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        yielding(self.0.find_user_by_login(login))
    }
    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        yielding(self.0.find_users(ids))
    }
    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        yielding(self.0.save_question(question))
    }
    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        yielding(self.0.find_question(id))
    }
    fn find_questions(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        yielding(self.0.find_questions(ids))
    }
    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        yielding(self.0.list_questions())
    }
    fn sample_published_questions(
        &self,
        count: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        yielding(self.0.sample_published_questions(count))
    }
    fn open_player(
        &self,
        candidate: PlayerEntity,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        yielding(self.0.open_player(candidate))
    }
    fn latest_player(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        yielding(self.0.latest_player(user_id))
    }
    fn find_players(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        yielding(self.0.find_players(ids))
    }
    fn players_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        yielding(self.0.players_for_user(user_id))
    }
    fn create_pending_game(
        &self,
        game: GameEntity,
    ) -> BoxFuture<'static, StorageResult<PendingSlot>> {
        yielding(self.0.create_pending_game(game))
    }
    fn find_pending_game(
        &self,
        exclude_player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        yielding(self.0.find_pending_game(exclude_player))
    }
    fn activate_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<bool>> {
        yielding(self.0.activate_game(game))
    }
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        yielding(self.0.find_game(id))
    }
    fn game_for_player(
        &self,
        player_id: Uuid,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        yielding(self.0.game_for_player(player_id, statuses))
    }
    fn games_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        yielding(self.0.games_for_players(player_ids))
    }
    fn games_with_status(
        &self,
        status: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        yielding(self.0.games_with_status(status))
    }
    fn finish_game(
        &self,
        finalization: GameFinalization,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        yielding(self.0.finish_game(finalization))
    }
    fn insert_answer(
        &self,
        answer: AnswerEntity,
    ) -> BoxFuture<'static, StorageResult<AnswerSlot>> {
        yielding(self.0.insert_answer(answer))
    }
    fn answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        yielding(self.0.answers_for_players(player_ids))
    }
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        yielding(self.0.health_check())
    }
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        yielding(self.0.try_reconnect())
    }
}

pub async fn seed_user(store: &dyn QuizStore, login: &str) -> Uuid {
    let user = UserEntity {
        id: Uuid::new_v4(),
        login: login.to_owned(),
        created_at: at(0),
    };
    store.save_user(user.clone()).await.unwrap();
    user.id
}

/// Publish `count` questions whose only accepted answer is their own id.
pub async fn seed_questions(store: &dyn QuizStore, count: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        let id = Uuid::new_v4();
        store
            .save_question(QuestionEntity {
                id,
                body: format!("Question number {index}?"),
                correct_answers: vec![id.to_string()],
                published: true,
                deleted_at: None,
                created_at: at(0),
                updated_at: None,
            })
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

/// Accepted answer for position `position` of `game`.
pub fn correct(game: &GameEntity, position: usize) -> String {
    game.question_ids[position].to_string()
}
