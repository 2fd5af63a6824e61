use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::QuestionEntity, quiz_store::QuizStore},
    dto::question::{CreateQuestionRequest, QuestionAdminView},
    error::ServiceError,
    state::SharedState,
};

async fn require_question(
    store: &dyn QuizStore,
    id: Uuid,
) -> Result<QuestionEntity, ServiceError> {
    store
        .find_question(id)
        .await?
        .filter(|question| question.deleted_at.is_none())
        .ok_or_else(|| ServiceError::NotFound(format!("question `{id}` not found")))
}

/// Add an unpublished question to the bank.
pub async fn create_question(
    state: &SharedState,
    request: CreateQuestionRequest,
) -> Result<QuestionAdminView, ServiceError> {
    let store = state.require_store().await?;
    let question = QuestionEntity {
        id: Uuid::new_v4(),
        body: request.body,
        correct_answers: request.correct_answers,
        published: false,
        deleted_at: None,
        created_at: SystemTime::now(),
        updated_at: None,
    };
    store.save_question(question.clone()).await?;
    info!(question_id = %question.id, "question created");
    Ok(question.into())
}

/// Every non-deleted question, newest first.
pub async fn list_questions(state: &SharedState) -> Result<Vec<QuestionAdminView>, ServiceError> {
    let store = state.require_store().await?;
    let questions = store.list_questions().await?;
    Ok(questions.into_iter().map(Into::into).collect())
}

/// Publish or unpublish a question. Games that already drew it keep it.
pub async fn set_published(
    state: &SharedState,
    id: Uuid,
    published: bool,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let mut question = require_question(store.as_ref(), id).await?;
    question.published = published;
    question.updated_at = Some(SystemTime::now());
    store.save_question(question).await?;
    info!(question_id = %id, published, "question publication changed");
    Ok(())
}

/// Soft-delete a question. It stays readable for games that already use it.
pub async fn delete_question(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let mut question = require_question(store.as_ref(), id).await?;
    let now = SystemTime::now();
    question.deleted_at = Some(now);
    question.updated_at = Some(now);
    store.save_question(question).await?;
    info!(question_id = %id, "question deleted");
    Ok(())
}
