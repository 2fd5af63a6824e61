//! Periodic scan that forfeits games where one player stopped answering.

use std::time::{Duration, SystemTime};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{AnswerEntity, GameEntity, GameStatus},
        quiz_store::QuizStore,
    },
    error::ServiceError,
    state::{
        SharedState,
        game::{grace_elapsed, plan_forfeit, stalled_side},
    },
};

/// Counters of one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FinalizerReport {
    /// Active games inspected.
    pub scanned: usize,
    /// Games this scan finished.
    pub finalized: usize,
    /// Games skipped because of an error.
    pub failed: usize,
}

/// Scan every active game once and forfeit the stalled ones whose grace window elapsed.
pub async fn tick(
    store: &dyn QuizStore,
    now: SystemTime,
    grace: Duration,
) -> Result<FinalizerReport, ServiceError> {
    let games = store.games_with_status(GameStatus::Active).await?;
    let mut report = FinalizerReport {
        scanned: games.len(),
        ..FinalizerReport::default()
    };

    for game in games {
        match finalize_if_stalled(store, &game, now, grace).await {
            Ok(true) => report.finalized += 1,
            Ok(false) => {}
            Err(err) => {
                warn!(game_id = %game.id, error = %err, "failed to finalize stalled game");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn game_answers(answers: &[AnswerEntity], player_id: Uuid, game_id: Uuid) -> Vec<AnswerEntity> {
    answers
        .iter()
        .filter(|answer| answer.player_id == player_id && answer.game_id == game_id)
        .cloned()
        .collect()
}

async fn finalize_if_stalled(
    store: &dyn QuizStore,
    game: &GameEntity,
    now: SystemTime,
    grace: Duration,
) -> Result<bool, ServiceError> {
    let Some(second_player_id) = game.second_player_id else {
        return Ok(false);
    };

    let answers = store
        .answers_for_players(vec![game.first_player_id, second_player_id])
        .await?;
    let first_answers = game_answers(&answers, game.first_player_id, game.id);
    let second_answers = game_answers(&answers, second_player_id, game.id);

    let Some(stall) = stalled_side(game, first_answers.len(), second_answers.len()) else {
        return Ok(false);
    };
    let (finished_answers, laggard_answers) = if stall.finished_player_id == game.first_player_id
    {
        (&first_answers, &second_answers)
    } else {
        (&second_answers, &first_answers)
    };

    let Some(last_answer_at) = finished_answers.iter().map(|answer| answer.added_at).max() else {
        return Ok(false);
    };
    if !grace_elapsed(last_answer_at, now, grace) {
        return Ok(false);
    }

    // The game may have finished since the scan started.
    let Some(current) = store.find_game(game.id).await? else {
        return Ok(false);
    };
    if current.status != GameStatus::Active {
        return Ok(false);
    }

    let finalization = plan_forfeit(&current, stall.laggard_player_id, laggard_answers, now)?;
    let forfeited = finalization.forfeited_answers.len();
    let finished = store.finish_game(finalization).await?;
    if finished {
        info!(
            game_id = %current.id,
            laggard_player_id = %stall.laggard_player_id,
            forfeited,
            "stalled game finalized"
        );
    }
    Ok(finished)
}

/// Run [`tick`] every `finalizer_interval` until the task is dropped.
pub async fn run(state: SharedState) {
    let config = state.config();
    let grace = config.grace_window;
    let mut ticker = interval(config.finalizer_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(store) = state.quiz_store().await else {
            continue;
        };

        match tick(store.as_ref(), SystemTime::now(), grace).await {
            Ok(report) if report.finalized > 0 || report.failed > 0 => {
                debug!(?report, "finalizer scan complete");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "finalizer scan failed"),
        }
    }
}
