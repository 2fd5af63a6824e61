use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameStatus, PendingSlot, PlayerEntity},
        quiz_store::QuizStore,
    },
    dto::game::GameView,
    error::ServiceError,
    services::{query_service::assemble_view, user_service::require_user},
    state::{
        SharedState,
        game::{open_game, start_match},
    },
};

/// Knobs of the join loop, taken from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct JoinSettings {
    /// Questions drawn for each game.
    pub questions_per_game: usize,
    /// How many times the claim/create cycle is retried after losing a race.
    pub attempts: u32,
}

/// Pair the caller with the pending game, or open a new one.
pub async fn join(state: &SharedState, user_id: Uuid) -> Result<GameView, ServiceError> {
    let store = state.require_store().await?;
    let config = state.config();
    let settings = JoinSettings {
        questions_per_game: config.questions_per_game,
        attempts: config.join_attempts,
    };
    join_with(store.as_ref(), user_id, settings, SystemTime::now()).await
}

/// Join loop against an explicit store and clock.
pub async fn join_with(
    store: &dyn QuizStore,
    user_id: Uuid,
    settings: JoinSettings,
    now: SystemTime,
) -> Result<GameView, ServiceError> {
    require_user(store, user_id).await?;
    // Concurrent joins of one user resolve to the same open player.
    let player = store.open_player(PlayerEntity::new(user_id, now)).await?;

    for attempt in 1..=settings.attempts.max(1) {
        ensure_idle(store, player.id).await?;

        if let Some(pending) = store.find_pending_game(player.id).await? {
            let questions = store
                .sample_published_questions(settings.questions_per_game)
                .await?;
            let question_ids = questions.iter().map(|question| question.id).collect();
            let game = start_match(
                &pending,
                player.id,
                question_ids,
                settings.questions_per_game,
                now,
            )?;

            if store.activate_game(game.clone()).await? {
                info!(
                    game_id = %game.id,
                    player_id = %player.id,
                    "second player joined, game started"
                );
                return assemble_view(store, game).await;
            }
            debug!(game_id = %pending.id, attempt, "pending game claimed by someone else");
            continue;
        }

        let game = open_game(player.id, now);
        match store.create_pending_game(game.clone()).await? {
            PendingSlot::Created => {
                info!(game_id = %game.id, player_id = %player.id, "pending game opened");
                return assemble_view(store, game).await;
            }
            PendingSlot::Occupied => {
                debug!(attempt, "another pending game appeared concurrently");
            }
            PendingSlot::PlayerBusy => return Err(already_playing()),
        }
    }

    Err(ServiceError::Conflict(
        "could not join a game, please retry".into(),
    ))
}

fn already_playing() -> ServiceError {
    ServiceError::Forbidden("you are already participating in an unfinished game".into())
}

async fn ensure_idle(store: &dyn QuizStore, player_id: Uuid) -> Result<(), ServiceError> {
    let unfinished = store
        .game_for_player(
            player_id,
            vec![GameStatus::PendingSecondPlayer, GameStatus::Active],
        )
        .await?;
    match unfinished {
        Some(_) => Err(already_playing()),
        None => Ok(()),
    }
}
