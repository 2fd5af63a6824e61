//! In-process [`QuizStore`] used for local development and tests.
//!
//! Users and questions are independent keyed records and live in concurrent maps. Players,
//! games and answers take part in multi-record invariants (one open player per user, single
//! pending game, one game per player, one answer per position, exactly-once finish) so they
//! share one ledger behind an async mutex.

use std::{cmp::Reverse, sync::Arc};

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use rand::{rng, seq::SliceRandom};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    models::{
        AnswerEntity, AnswerSlot, AnswerStatus, GameEntity, GameFinalization, GameStatus,
        PendingSlot, PlayerEntity, PlayerOutcome, QuestionEntity, UserEntity,
    },
    quiz_store::QuizStore,
    storage::StorageResult,
};

/// Memory-backed [`QuizStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: DashMap<Uuid, UserEntity>,
    questions: DashMap<Uuid, QuestionEntity>,
    ledger: Mutex<Ledger>,
}

#[derive(Default)]
struct Ledger {
    players: IndexMap<Uuid, PlayerEntity>,
    games: IndexMap<Uuid, GameEntity>,
    answers: Vec<AnswerEntity>,
}

impl Ledger {
    fn seated(&self, player_id: Uuid) -> bool {
        self.games.values().any(|game| game.has_player(player_id))
    }

    fn score_of(&self, player_id: Uuid) -> i32 {
        self.players
            .get(&player_id)
            .map(|player| player.score)
            .unwrap_or_default()
    }

    fn position_taken(&self, player_id: Uuid, position: usize) -> bool {
        self.answers
            .iter()
            .any(|answer| answer.player_id == player_id && answer.position == position)
    }
}

impl MemoryQuizStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sample_questions(&self, count: usize) -> Vec<QuestionEntity> {
        let mut drawable: Vec<QuestionEntity> = self
            .inner
            .questions
            .iter()
            .filter(|entry| entry.value().is_drawable())
            .map(|entry| entry.value().clone())
            .collect();
        drawable.shuffle(&mut rng());
        drawable.truncate(count);
        drawable
    }
}

impl QuizStore for MemoryQuizStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.users.insert(user.id, user);
            Ok(())
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.users.get(&id).map(|entry| entry.value().clone())) })
    }

    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .users
                .iter()
                .find(|entry| entry.value().login == login)
                .map(|entry| entry.value().clone()))
        })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(ids
                .iter()
                .filter_map(|id| inner.users.get(id).map(|entry| entry.value().clone()))
                .collect())
        })
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.questions.insert(question.id, question);
            Ok(())
        })
    }

    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.questions.get(&id).map(|entry| entry.value().clone())) })
    }

    fn find_questions(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(ids
                .iter()
                .filter_map(|id| inner.questions.get(id).map(|entry| entry.value().clone()))
                .collect())
        })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut questions: Vec<QuestionEntity> = inner
                .questions
                .iter()
                .filter(|entry| entry.value().deleted_at.is_none())
                .map(|entry| entry.value().clone())
                .collect();
            questions.sort_by_key(|question| Reverse(question.created_at));
            Ok(questions)
        })
    }

    fn sample_published_questions(
        &self,
        count: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let sample = self.sample_questions(count);
        Box::pin(async move { Ok(sample) })
    }

    fn open_player(
        &self,
        candidate: PlayerEntity,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut ledger = inner.ledger.lock().await;
            let open = ledger
                .players
                .values()
                .find(|player| player.user_id == candidate.user_id && player.is_open())
                .cloned();
            if let Some(open) = open {
                return Ok(open);
            }
            ledger.players.insert(candidate.id, candidate.clone());
            Ok(candidate)
        })
    }

    fn latest_player(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .players
                .values()
                .rev()
                .find(|player| player.user_id == user_id)
                .cloned())
        })
    }

    fn find_players(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ids
                .iter()
                .filter_map(|id| ledger.players.get(id).cloned())
                .collect())
        })
    }

    fn players_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .players
                .values()
                .filter(|player| player.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn create_pending_game(
        &self,
        game: GameEntity,
    ) -> BoxFuture<'static, StorageResult<PendingSlot>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut ledger = inner.ledger.lock().await;
            if ledger.seated(game.first_player_id) {
                return Ok(PendingSlot::PlayerBusy);
            }
            let occupied = ledger
                .games
                .values()
                .any(|existing| existing.status == GameStatus::PendingSecondPlayer);
            if occupied {
                return Ok(PendingSlot::Occupied);
            }
            ledger.games.insert(game.id, game);
            Ok(PendingSlot::Created)
        })
    }

    fn find_pending_game(
        &self,
        exclude_player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .games
                .values()
                .filter(|game| {
                    game.status == GameStatus::PendingSecondPlayer
                        && game.first_player_id != exclude_player
                })
                .min_by_key(|game| game.pair_created_at)
                .cloned())
        })
    }

    fn activate_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut ledger = inner.ledger.lock().await;
            if game
                .second_player_id
                .is_none_or(|second_player_id| ledger.seated(second_player_id))
            {
                return Ok(false);
            }
            match ledger.games.get_mut(&game.id) {
                Some(stored)
                    if stored.status == GameStatus::PendingSecondPlayer
                        && stored.second_player_id.is_none() =>
                {
                    *stored = game;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.ledger.lock().await.games.get(&id).cloned()) })
    }

    fn game_for_player(
        &self,
        player_id: Uuid,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .games
                .values()
                .find(|game| game.has_player(player_id) && statuses.contains(&game.status))
                .cloned())
        })
    }

    fn games_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .games
                .values()
                .filter(|game| player_ids.iter().any(|id| game.has_player(*id)))
                .cloned()
                .collect())
        })
    }

    fn games_with_status(
        &self,
        status: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            Ok(ledger
                .games
                .values()
                .filter(|game| game.status == status)
                .cloned()
                .collect())
        })
    }

    fn finish_game(
        &self,
        finalization: GameFinalization,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut ledger = inner.ledger.lock().await;
            let still_active = ledger
                .games
                .get(&finalization.game.id)
                .is_some_and(|game| game.status == GameStatus::Active);
            if !still_active {
                return Ok(false);
            }

            for answer in finalization.forfeited_answers {
                if !ledger.position_taken(answer.player_id, answer.position) {
                    ledger.answers.push(answer);
                }
            }
            let game = &finalization.game;
            if let Some(second_player_id) = game.second_player_id {
                let first_score = ledger.score_of(game.first_player_id);
                let second_score = ledger.score_of(second_player_id);
                for (player_id, outcome) in [
                    (
                        game.first_player_id,
                        PlayerOutcome::from_scores(first_score, second_score),
                    ),
                    (
                        second_player_id,
                        PlayerOutcome::from_scores(second_score, first_score),
                    ),
                ] {
                    if let Some(player) = ledger.players.get_mut(&player_id) {
                        player.outcome = Some(outcome);
                    }
                }
            }
            ledger
                .games
                .insert(finalization.game.id, finalization.game);
            Ok(true)
        })
    }

    fn insert_answer(
        &self,
        answer: AnswerEntity,
    ) -> BoxFuture<'static, StorageResult<AnswerSlot>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut ledger = inner.ledger.lock().await;
            if ledger.position_taken(answer.player_id, answer.position) {
                return Ok(AnswerSlot::Taken);
            }
            if answer.status == AnswerStatus::Correct {
                if let Some(player) = ledger.players.get_mut(&answer.player_id) {
                    player.score += 1;
                }
            }
            ledger.answers.push(answer);
            Ok(AnswerSlot::Recorded)
        })
    }

    fn answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let ledger = inner.ledger.lock().await;
            let mut answers: Vec<AnswerEntity> = ledger
                .answers
                .iter()
                .filter(|answer| player_ids.contains(&answer.player_id))
                .cloned()
                .collect();
            answers.sort_by_key(|answer| (answer.position, answer.added_at));
            Ok(answers)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
