use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Cursor, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::IndexOptions,
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key, is_duplicate_key_on},
    models::{
        ANSWER_COLLECTION_NAME, GAME_COLLECTION_NAME, MongoAnswerDocument, MongoGameDocument,
        MongoPlayerDocument, MongoQuestionDocument, MongoUserDocument, PLAYER_COLLECTION_NAME,
        QUESTION_COLLECTION_NAME, USER_COLLECTION_NAME, doc_id, id_list,
    },
};
use crate::dao::{
    models::{
        AnswerEntity, AnswerSlot, AnswerStatus, GameEntity, GameFinalization, GameStatus,
        PendingSlot, PlayerEntity, PlayerOutcome, QuestionEntity, UserEntity,
    },
    quiz_store::QuizStore,
    storage::StorageResult,
};

/// MongoDB-backed [`QuizStore`] implementation.
#[derive(Clone)]
pub struct MongoQuizStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

async fn collect<D, E>(collection: &'static str, cursor: Cursor<D>) -> MongoResult<Vec<E>>
where
    D: DeserializeOwned + Unpin + Send + Sync,
    E: TryFrom<D, Error = MongoDaoError>,
{
    let documents: Vec<D> = cursor
        .try_collect()
        .await
        .map_err(|source| MongoDaoError::Read { collection, source })?;
    documents.into_iter().map(E::try_from).collect()
}

fn status_list(statuses: &[GameStatus]) -> Vec<&'static str> {
    statuses.iter().map(GameStatus::as_str).collect()
}

const SINGLE_PENDING_INDEX: &str = "game_single_pending_idx";
const PLAYER_SEAT_INDEX: &str = "game_player_seat_idx";
const OPEN_PLAYER_INDEX: &str = "player_open_user_idx";

fn player_filter(player_id: Uuid) -> Document {
    doc! {"player_ids": player_id.to_string()}
}

impl MongoQuizStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let indexes: [(&'static str, &'static str, IndexModel); 6] = [
            (
                USER_COLLECTION_NAME,
                "login",
                IndexModel::builder()
                    .keys(doc! {"login": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some("user_login_idx".to_owned()))
                            .unique(Some(true))
                            .build(),
                    )
                    .build(),
            ),
            (
                PLAYER_COLLECTION_NAME,
                "user_id,created_at",
                IndexModel::builder()
                    .keys(doc! {"user_id": 1, "created_at": -1})
                    .options(
                        IndexOptions::builder()
                            .name(Some("player_user_idx".to_owned()))
                            .build(),
                    )
                    .build(),
            ),
            // At most one player per user may still await an outcome.
            (
                PLAYER_COLLECTION_NAME,
                "user_id (open)",
                IndexModel::builder()
                    .keys(doc! {"user_id": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some(OPEN_PLAYER_INDEX.to_owned()))
                            .unique(Some(true))
                            .partial_filter_expression(Some(doc! {"open": true}))
                            .build(),
                    )
                    .build(),
            ),
            // At most one game may wait for a second player at any time.
            (
                GAME_COLLECTION_NAME,
                "status (pending)",
                IndexModel::builder()
                    .keys(doc! {"status": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some(SINGLE_PENDING_INDEX.to_owned()))
                            .unique(Some(true))
                            .partial_filter_expression(Some(
                                doc! {"status": GameStatus::PendingSecondPlayer.as_str()},
                            ))
                            .build(),
                    )
                    .build(),
            ),
            // A player sits in exactly one game.
            (
                GAME_COLLECTION_NAME,
                "player_ids",
                IndexModel::builder()
                    .keys(doc! {"player_ids": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some(PLAYER_SEAT_INDEX.to_owned()))
                            .unique(Some(true))
                            .build(),
                    )
                    .build(),
            ),
            (
                ANSWER_COLLECTION_NAME,
                "player_id,position",
                IndexModel::builder()
                    .keys(doc! {"player_id": 1, "position": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some("answer_player_position_idx".to_owned()))
                            .unique(Some(true))
                            .build(),
                    )
                    .build(),
            ),
        ];

        for (collection, index, model) in indexes {
            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database().await.collection(USER_COLLECTION_NAME)
    }

    async fn questions(&self) -> Collection<MongoQuestionDocument> {
        self.database().await.collection(QUESTION_COLLECTION_NAME)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYER_COLLECTION_NAME)
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database().await.collection(GAME_COLLECTION_NAME)
    }

    async fn answers(&self) -> Collection<MongoAnswerDocument> {
        self.database().await.collection(ANSWER_COLLECTION_NAME)
    }

    async fn save_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let document: MongoUserDocument = user.into();
        self.users()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: USER_COLLECTION_NAME,
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_user_by(&self, filter: Document) -> MongoResult<Option<UserEntity>> {
        self.users()
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: USER_COLLECTION_NAME,
                source,
            })?
            .map(UserEntity::try_from)
            .transpose()
    }

    async fn find_users(&self, ids: Vec<Uuid>) -> MongoResult<Vec<UserEntity>> {
        let cursor = self
            .users()
            .await
            .find(doc! {"_id": {"$in": id_list(&ids)}})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: USER_COLLECTION_NAME,
                source,
            })?;
        collect(USER_COLLECTION_NAME, cursor).await
    }

    async fn save_question(&self, question: QuestionEntity) -> MongoResult<()> {
        let id = question.id;
        let document: MongoQuestionDocument = question.into();
        self.questions()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: QUESTION_COLLECTION_NAME,
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_question(&self, id: Uuid) -> MongoResult<Option<QuestionEntity>> {
        self.questions()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: QUESTION_COLLECTION_NAME,
                source,
            })?
            .map(QuestionEntity::try_from)
            .transpose()
    }

    async fn find_questions_by(
        &self,
        filter: Document,
        sort: Document,
    ) -> MongoResult<Vec<QuestionEntity>> {
        let cursor = self
            .questions()
            .await
            .find(filter)
            .sort(sort)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: QUESTION_COLLECTION_NAME,
                source,
            })?;
        collect(QUESTION_COLLECTION_NAME, cursor).await
    }

    async fn sample_published_questions(&self, count: usize) -> MongoResult<Vec<QuestionEntity>> {
        let pipeline = [
            doc! {"$match": {"published": true, "deleted_at": null}},
            doc! {"$sample": {"size": count as i64}},
        ];
        let cursor = self
            .questions()
            .await
            .aggregate(pipeline)
            .with_type::<MongoQuestionDocument>()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: QUESTION_COLLECTION_NAME,
                source,
            })?;
        collect(QUESTION_COLLECTION_NAME, cursor).await
    }

    async fn find_open_player(&self, user_id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        self.players()
            .await
            .find_one(doc! {"user_id": user_id.to_string(), "open": true})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: PLAYER_COLLECTION_NAME,
                source,
            })?
            .map(PlayerEntity::try_from)
            .transpose()
    }

    async fn open_player(&self, candidate: PlayerEntity) -> MongoResult<PlayerEntity> {
        let user_id = candidate.user_id;
        if let Some(open) = self.find_open_player(user_id).await? {
            return Ok(open);
        }

        let id = candidate.id;
        let document: MongoPlayerDocument = candidate.clone().into();
        match self.players().await.insert_one(&document).await {
            Ok(_) => Ok(candidate),
            Err(source) if is_duplicate_key_on(&source, OPEN_PLAYER_INDEX) => {
                debug!(%user_id, "open player created concurrently");
                self.find_open_player(user_id)
                    .await?
                    .ok_or_else(|| MongoDaoError::Malformed {
                        collection: PLAYER_COLLECTION_NAME,
                        reason: format!("open player of user `{user_id}` vanished"),
                    })
            }
            Err(source) => Err(MongoDaoError::Write {
                collection: PLAYER_COLLECTION_NAME,
                id,
                source,
            }),
        }
    }

    async fn latest_player(&self, user_id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        self.players()
            .await
            .find_one(doc! {"user_id": user_id.to_string()})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: PLAYER_COLLECTION_NAME,
                source,
            })?
            .map(PlayerEntity::try_from)
            .transpose()
    }

    async fn find_players_by(&self, filter: Document) -> MongoResult<Vec<PlayerEntity>> {
        let cursor = self
            .players()
            .await
            .find(filter)
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: PLAYER_COLLECTION_NAME,
                source,
            })?;
        collect(PLAYER_COLLECTION_NAME, cursor).await
    }

    async fn correct_answers(&self, player_id: Uuid) -> MongoResult<i32> {
        let count = self
            .answers()
            .await
            .count_documents(doc! {
                "player_id": player_id.to_string(),
                "status": AnswerStatus::Correct.as_str(),
            })
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: ANSWER_COLLECTION_NAME,
                source,
            })?;
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    /// Raise the stored score to the number of correct answers. `$max` makes a stale
    /// recount harmless and a later one repairs a recount that never ran.
    async fn sync_score(&self, player_id: Uuid) -> MongoResult<()> {
        let score = self.correct_answers(player_id).await?;
        self.players()
            .await
            .update_one(doc_id(player_id), doc! {"$max": {"score": score}})
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: PLAYER_COLLECTION_NAME,
                id: player_id,
                source,
            })?;
        Ok(())
    }

    async fn create_pending_game(&self, game: GameEntity) -> MongoResult<PendingSlot> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        match self.games().await.insert_one(&document).await {
            Ok(_) => Ok(PendingSlot::Created),
            Err(source) if is_duplicate_key_on(&source, PLAYER_SEAT_INDEX) => {
                debug!(game_id = %id, "first player already sits in a game");
                Ok(PendingSlot::PlayerBusy)
            }
            Err(source) if is_duplicate_key_on(&source, SINGLE_PENDING_INDEX) => {
                debug!(game_id = %id, "another pending game already exists");
                Ok(PendingSlot::Occupied)
            }
            Err(source) => Err(MongoDaoError::Write {
                collection: GAME_COLLECTION_NAME,
                id,
                source,
            }),
        }
    }

    async fn find_game_by(&self, filter: Document) -> MongoResult<Option<GameEntity>> {
        self.games()
            .await
            .find_one(filter)
            .sort(doc! {"pair_created_at": 1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: GAME_COLLECTION_NAME,
                source,
            })?
            .map(GameEntity::try_from)
            .transpose()
    }

    async fn find_games_by(&self, filter: Document) -> MongoResult<Vec<GameEntity>> {
        let cursor = self
            .games()
            .await
            .find(filter)
            .sort(doc! {"pair_created_at": 1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: GAME_COLLECTION_NAME,
                source,
            })?;
        collect(GAME_COLLECTION_NAME, cursor).await
    }

    async fn activate_game(&self, game: GameEntity) -> MongoResult<bool> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let result = self
            .games()
            .await
            .update_one(
                doc! {
                    "_id": id.to_string(),
                    "status": GameStatus::PendingSecondPlayer.as_str(),
                    "second_player_id": null,
                },
                doc! {"$set": {
                    "status": document.status.as_str(),
                    "second_player_id": document.second_player_id,
                    "player_ids": document.player_ids,
                    "question_ids": document.question_ids,
                    "started_at": document.started_at,
                }},
            )
            .await;
        match result {
            Ok(result) => Ok(result.modified_count == 1),
            Err(source) if is_duplicate_key_on(&source, PLAYER_SEAT_INDEX) => {
                debug!(game_id = %id, "second player already sits in a game");
                Ok(false)
            }
            Err(source) => Err(MongoDaoError::Write {
                collection: GAME_COLLECTION_NAME,
                id,
                source,
            }),
        }
    }

    async fn finish_game(&self, finalization: GameFinalization) -> MongoResult<bool> {
        let game_id = finalization.game.id;
        let answers = self.answers().await;
        for answer in finalization.forfeited_answers {
            let answer_id = answer.id;
            let document: MongoAnswerDocument = answer.into();
            match answers.insert_one(&document).await {
                Ok(_) => {}
                Err(source) if is_duplicate_key(&source) => {
                    debug!(%game_id, position = document.position, "forfeited answer already recorded");
                }
                Err(source) => {
                    return Err(MongoDaoError::Write {
                        collection: ANSWER_COLLECTION_NAME,
                        id: answer_id,
                        source,
                    });
                }
            }
        }

        // Every position is filled now, so the answer set and the scores it implies are final.
        let first_player_id = finalization.game.first_player_id;
        if let Some(second_player_id) = finalization.game.second_player_id {
            let first_score = self.correct_answers(first_player_id).await?;
            let second_score = self.correct_answers(second_player_id).await?;
            let players = self.players().await;
            for (player_id, score, opponent_score) in [
                (first_player_id, first_score, second_score),
                (second_player_id, second_score, first_score),
            ] {
                let outcome = PlayerOutcome::from_scores(score, opponent_score);
                players
                    .update_one(
                        doc_id(player_id),
                        doc! {"$set": {
                            "score": score,
                            "outcome": outcome.as_str(),
                            "open": false,
                        }},
                    )
                    .await
                    .map_err(|source| MongoDaoError::Write {
                        collection: PLAYER_COLLECTION_NAME,
                        id: player_id,
                        source,
                    })?;
            }
        }

        let finished_at = finalization
            .game
            .finished_at
            .map(DateTime::from_system_time)
            .unwrap_or_else(DateTime::now);
        let result = self
            .games()
            .await
            .update_one(
                doc! {"_id": game_id.to_string(), "status": GameStatus::Active.as_str()},
                doc! {"$set": {
                    "status": GameStatus::Finished.as_str(),
                    "finished_at": finished_at,
                }},
            )
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: GAME_COLLECTION_NAME,
                id: game_id,
                source,
            })?;
        Ok(result.modified_count == 1)
    }

    async fn insert_answer(&self, answer: AnswerEntity) -> MongoResult<AnswerSlot> {
        let id = answer.id;
        let player_id = answer.player_id;
        let correct = answer.status == AnswerStatus::Correct;
        let document: MongoAnswerDocument = answer.into();
        match self.answers().await.insert_one(&document).await {
            Ok(_) => {
                if correct {
                    self.sync_score(player_id).await?;
                }
                Ok(AnswerSlot::Recorded)
            }
            Err(source) if is_duplicate_key(&source) => Ok(AnswerSlot::Taken),
            Err(source) => Err(MongoDaoError::Write {
                collection: ANSWER_COLLECTION_NAME,
                id,
                source,
            }),
        }
    }

    async fn answers_for_players(&self, player_ids: Vec<Uuid>) -> MongoResult<Vec<AnswerEntity>> {
        let cursor = self
            .answers()
            .await
            .find(doc! {"player_id": {"$in": id_list(&player_ids)}})
            .sort(doc! {"position": 1, "added_at": 1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: ANSWER_COLLECTION_NAME,
                source,
            })?;
        collect(ANSWER_COLLECTION_NAME, cursor).await
    }
}

impl QuizStore for MongoQuizStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_user(user).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user_by(doc_id(id)).await.map_err(Into::into) })
    }

    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_user_by(doc! {"login": login})
                .await
                .map_err(Into::into)
        })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_users(ids).await.map_err(Into::into) })
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_question(question).await.map_err(Into::into) })
    }

    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn find_questions(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_questions_by(doc! {"_id": {"$in": id_list(&ids)}}, doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_questions_by(doc! {"deleted_at": null}, doc! {"created_at": -1})
                .await
                .map_err(Into::into)
        })
    }

    fn sample_published_questions(
        &self,
        count: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .sample_published_questions(count)
                .await
                .map_err(Into::into)
        })
    }

    fn open_player(
        &self,
        candidate: PlayerEntity,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let store = self.clone();
        Box::pin(async move { store.open_player(candidate).await.map_err(Into::into) })
    }

    fn latest_player(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.latest_player(user_id).await.map_err(Into::into) })
    }

    fn find_players(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_players_by(doc! {"_id": {"$in": id_list(&ids)}})
                .await
                .map_err(Into::into)
        })
    }

    fn players_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_players_by(doc! {"user_id": user_id.to_string()})
                .await
                .map_err(Into::into)
        })
    }

    fn create_pending_game(
        &self,
        game: GameEntity,
    ) -> BoxFuture<'static, StorageResult<PendingSlot>> {
        let store = self.clone();
        Box::pin(async move { store.create_pending_game(game).await.map_err(Into::into) })
    }

    fn find_pending_game(
        &self,
        exclude_player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_game_by(doc! {
                    "status": GameStatus::PendingSecondPlayer.as_str(),
                    "first_player_id": {"$ne": exclude_player.to_string()},
                })
                .await
                .map_err(Into::into)
        })
    }

    fn activate_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.activate_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_by(doc_id(id)).await.map_err(Into::into) })
    }

    fn game_for_player(
        &self,
        player_id: Uuid,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut filter = player_filter(player_id);
            filter.insert("status", doc! {"$in": status_list(&statuses)});
            store.find_game_by(filter).await.map_err(Into::into)
        })
    }

    fn games_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_games_by(doc! {"player_ids": {"$in": id_list(&player_ids)}})
                .await
                .map_err(Into::into)
        })
    }

    fn games_with_status(
        &self,
        status: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_games_by(doc! {"status": status.as_str()})
                .await
                .map_err(Into::into)
        })
    }

    fn finish_game(
        &self,
        finalization: GameFinalization,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.finish_game(finalization).await.map_err(Into::into) })
    }

    fn insert_answer(
        &self,
        answer: AnswerEntity,
    ) -> BoxFuture<'static, StorageResult<AnswerSlot>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer(answer).await.map_err(Into::into) })
    }

    fn answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .answers_for_players(player_ids)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
