//! Payloads of the question bank administration endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::QuestionEntity,
    dto::{format_system_time, validation::validate_correct_answers},
};

/// Payload creating a question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    /// Question text.
    #[validate(length(min = 10, max = 500))]
    pub body: String,
    /// Accepted answers, matched exactly.
    #[validate(custom(function = "validate_correct_answers"))]
    pub correct_answers: Vec<String>,
}

/// Payload toggling publication.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Whether the question can be drawn for new games.
    pub published: bool,
}

/// Question as seen by administrators.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAdminView {
    /// Question id.
    pub id: Uuid,
    /// Question text.
    pub body: String,
    /// Accepted answers.
    pub correct_answers: Vec<String>,
    /// Publication flag.
    pub published: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last change.
    pub updated_at: Option<String>,
}

impl From<QuestionEntity> for QuestionAdminView {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            body: value.body,
            correct_answers: value.correct_answers,
            published: value.published,
            created_at: format_system_time(value.created_at),
            updated_at: value.updated_at.map(format_system_time),
        }
    }
}
