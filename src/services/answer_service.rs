use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{AnswerEntity, AnswerSlot, GameEntity, GameStatus},
        quiz_store::QuizStore,
    },
    dto::game::{AnswerRequest, AnswerView},
    error::ServiceError,
    state::{
        SharedState,
        game::{both_finished, complete_game, judge, next_question},
    },
};

/// Record the caller's answer to their next question.
pub async fn submit_answer(
    state: &SharedState,
    user_id: Uuid,
    request: AnswerRequest,
) -> Result<AnswerView, ServiceError> {
    let store = state.require_store().await?;
    submit(store.as_ref(), user_id, request.answer, SystemTime::now()).await
}

/// Answer flow against an explicit store and clock.
pub async fn submit(
    store: &dyn QuizStore,
    user_id: Uuid,
    body: String,
    now: SystemTime,
) -> Result<AnswerView, ServiceError> {
    let player = store
        .latest_player(user_id)
        .await?
        .ok_or_else(|| ServiceError::Forbidden("you have no active game".into()))?;
    let game = store
        .game_for_player(player.id, vec![GameStatus::Active])
        .await?
        .ok_or_else(|| ServiceError::Forbidden("you have no active game".into()))?;

    let answered = answers_in_game(store, player.id, game.id).await?;
    let (position, question_id) = next_question(&game, answered)
        .ok_or_else(|| ServiceError::Forbidden("you already answered every question".into()))?;

    let question = store
        .find_question(question_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{question_id}` not found")))?;
    let status = judge(&question, &body);

    let answer = AnswerEntity {
        id: Uuid::new_v4(),
        player_id: player.id,
        game_id: game.id,
        question_id,
        position,
        body,
        status,
        added_at: now,
    };
    if store.insert_answer(answer).await? == AnswerSlot::Taken {
        debug!(player_id = %player.id, position, "duplicate answer rejected");
        return Err(ServiceError::Forbidden(
            "this question was already answered".into(),
        ));
    }
    debug!(
        game_id = %game.id,
        player_id = %player.id,
        position,
        status = status.as_str(),
        "answer recorded"
    );

    finish_if_complete(store, &game, now).await?;

    Ok(AnswerView::new(question_id, status, now))
}

async fn answers_in_game(
    store: &dyn QuizStore,
    player_id: Uuid,
    game_id: Uuid,
) -> Result<usize, ServiceError> {
    Ok(store
        .answers_for_players(vec![player_id])
        .await?
        .iter()
        .filter(|answer| answer.game_id == game_id)
        .count())
}

/// Finish `game` when both players answered every question.
async fn finish_if_complete(
    store: &dyn QuizStore,
    game: &GameEntity,
    now: SystemTime,
) -> Result<(), ServiceError> {
    let Some(second_player_id) = game.second_player_id else {
        return Ok(());
    };

    let first_count = answers_in_game(store, game.first_player_id, game.id).await?;
    let second_count = answers_in_game(store, second_player_id, game.id).await?;
    if !both_finished(game, first_count, second_count) {
        return Ok(());
    }

    let finalization = complete_game(game, now)?;
    if store.finish_game(finalization).await? {
        info!(game_id = %game.id, "game finished");
    } else {
        debug!(game_id = %game.id, "game was already finished");
    }
    Ok(())
}
