use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{
    AnswerEntity, AnswerStatus, GameEntity, GameStatus, PlayerEntity, PlayerOutcome,
    QuestionEntity, UserEntity,
};

pub const USER_COLLECTION_NAME: &str = "users";
pub const QUESTION_COLLECTION_NAME: &str = "questions";
pub const PLAYER_COLLECTION_NAME: &str = "players";
pub const GAME_COLLECTION_NAME: &str = "games";
pub const ANSWER_COLLECTION_NAME: &str = "answers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub login: String,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub body: String,
    pub correct_answers: Vec<String>,
    pub published: bool,
    pub deleted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub score: i32,
    pub outcome: Option<PlayerOutcome>,
    /// Mirrors `outcome.is_none()`; a partial unique index keeps one open player per user.
    pub open: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: GameStatus,
    pub first_player_id: String,
    pub second_player_id: Option<String>,
    /// Seated players; a unique multikey index keeps each player in one game.
    pub player_ids: Vec<String>,
    pub question_ids: Vec<String>,
    pub pair_created_at: DateTime,
    pub started_at: Option<DateTime>,
    pub finished_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub player_id: String,
    pub game_id: String,
    pub question_id: String,
    pub position: i64,
    pub body: String,
    pub status: AnswerStatus,
    pub added_at: DateTime,
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn id_list(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

fn parse_id(collection: &'static str, value: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(value).map_err(|err| MongoDaoError::Malformed {
        collection,
        reason: format!("invalid identifier `{value}`: {err}"),
    })
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            login: value.login,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(USER_COLLECTION_NAME, &value.id)?,
            login: value.login,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<QuestionEntity> for MongoQuestionDocument {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id.to_string(),
            body: value.body,
            correct_answers: value.correct_answers,
            published: value.published,
            deleted_at: value.deleted_at.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: value.updated_at.map(DateTime::from_system_time),
        }
    }
}

impl TryFrom<MongoQuestionDocument> for QuestionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoQuestionDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(QUESTION_COLLECTION_NAME, &value.id)?,
            body: value.body,
            correct_answers: value.correct_answers,
            published: value.published,
            deleted_at: value.deleted_at.map(DateTime::to_system_time),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.map(DateTime::to_system_time),
        })
    }
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            score: value.score,
            open: value.is_open(),
            outcome: value.outcome,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoPlayerDocument> for PlayerEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPlayerDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(PLAYER_COLLECTION_NAME, &value.id)?,
            user_id: parse_id(PLAYER_COLLECTION_NAME, &value.user_id)?,
            score: value.score,
            outcome: value.outcome,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        let player_ids = std::iter::once(value.first_player_id)
            .chain(value.second_player_id)
            .map(|id| id.to_string())
            .collect();
        Self {
            id: value.id.to_string(),
            status: value.status,
            first_player_id: value.first_player_id.to_string(),
            second_player_id: value.second_player_id.map(|id| id.to_string()),
            player_ids,
            question_ids: id_list(&value.question_ids),
            pair_created_at: DateTime::from_system_time(value.pair_created_at),
            started_at: value.started_at.map(DateTime::from_system_time),
            finished_at: value.finished_at.map(DateTime::from_system_time),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        let question_ids = value
            .question_ids
            .iter()
            .map(|id| parse_id(GAME_COLLECTION_NAME, id))
            .collect::<Result<Vec<_>, _>>()?;
        let second_player_id = value
            .second_player_id
            .as_deref()
            .map(|id| parse_id(GAME_COLLECTION_NAME, id))
            .transpose()?;

        Ok(Self {
            id: parse_id(GAME_COLLECTION_NAME, &value.id)?,
            status: value.status,
            first_player_id: parse_id(GAME_COLLECTION_NAME, &value.first_player_id)?,
            second_player_id,
            question_ids,
            pair_created_at: value.pair_created_at.to_system_time(),
            started_at: value.started_at.map(DateTime::to_system_time),
            finished_at: value.finished_at.map(DateTime::to_system_time),
        })
    }
}

impl From<AnswerEntity> for MongoAnswerDocument {
    fn from(value: AnswerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            player_id: value.player_id.to_string(),
            game_id: value.game_id.to_string(),
            question_id: value.question_id.to_string(),
            position: value.position as i64,
            body: value.body,
            status: value.status,
            added_at: DateTime::from_system_time(value.added_at),
        }
    }
}

impl TryFrom<MongoAnswerDocument> for AnswerEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoAnswerDocument) -> Result<Self, Self::Error> {
        let position = usize::try_from(value.position).map_err(|_| MongoDaoError::Malformed {
            collection: ANSWER_COLLECTION_NAME,
            reason: format!("negative position {}", value.position),
        })?;

        Ok(Self {
            id: parse_id(ANSWER_COLLECTION_NAME, &value.id)?,
            player_id: parse_id(ANSWER_COLLECTION_NAME, &value.player_id)?,
            game_id: parse_id(ANSWER_COLLECTION_NAME, &value.game_id)?,
            question_id: parse_id(ANSWER_COLLECTION_NAME, &value.question_id)?,
            position,
            body: value.body,
            status: value.status,
            added_at: value.added_at.to_system_time(),
        })
    }
}
