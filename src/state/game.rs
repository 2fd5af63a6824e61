//! Pure game rules. Every function here computes the next state from its inputs; persisting it
//! is left to the caller.

use std::{
    collections::HashSet,
    time::{Duration, SystemTime},
};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{
        AnswerEntity, AnswerStatus, GameEntity, GameFinalization, GameStatus, QuestionEntity,
    },
    state::state_machine::{GameEvent, InvalidTransition, next_status},
};

/// Reasons a game rule refuses to produce a new state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The lifecycle does not allow the event from the current status.
    #[error(transparent)]
    Invalid(#[from] InvalidTransition),
    /// A player tried to join the game they opened.
    #[error("a player cannot join their own game")]
    SelfPairing,
    /// Not enough questions to start the game.
    #[error("expected {expected} questions, got {actual}")]
    QuestionCount {
        /// Questions required per game.
        expected: usize,
        /// Questions supplied.
        actual: usize,
    },
    /// The game has no second player where one is required.
    #[error("game has no second player")]
    MissingOpponent,
}

/// Pending game opened by `first_player_id`.
pub fn open_game(first_player_id: Uuid, now: SystemTime) -> GameEntity {
    GameEntity {
        id: Uuid::new_v4(),
        status: GameStatus::PendingSecondPlayer,
        first_player_id,
        second_player_id: None,
        question_ids: Vec::new(),
        pair_created_at: now,
        started_at: None,
        finished_at: None,
    }
}

/// Activate `game` with `second_player_id` and the drawn question sequence.
pub fn start_match(
    game: &GameEntity,
    second_player_id: Uuid,
    question_ids: Vec<Uuid>,
    expected_questions: usize,
    now: SystemTime,
) -> Result<GameEntity, TransitionError> {
    let status = next_status(game.status, GameEvent::SecondPlayerJoined)?;
    if game.first_player_id == second_player_id {
        return Err(TransitionError::SelfPairing);
    }
    if question_ids.len() != expected_questions {
        return Err(TransitionError::QuestionCount {
            expected: expected_questions,
            actual: question_ids.len(),
        });
    }

    Ok(GameEntity {
        status,
        second_player_id: Some(second_player_id),
        question_ids,
        started_at: Some(now),
        ..game.clone()
    })
}

/// Exact, case-sensitive membership of `body` in the accepted answers.
pub fn judge(question: &QuestionEntity, body: &str) -> AnswerStatus {
    if question.correct_answers.iter().any(|accepted| accepted == body) {
        AnswerStatus::Correct
    } else {
        AnswerStatus::Incorrect
    }
}

/// Position and question id of the next unanswered question, if any remain.
pub fn next_question(game: &GameEntity, answered: usize) -> Option<(usize, Uuid)> {
    game.question_ids
        .get(answered)
        .map(|question_id| (answered, *question_id))
}

fn finished(
    game: &GameEntity,
    event: GameEvent,
    now: SystemTime,
) -> Result<GameEntity, TransitionError> {
    let status = next_status(game.status, event)?;
    Ok(GameEntity {
        status,
        finished_at: Some(now),
        ..game.clone()
    })
}

/// Whether both answer counts reached the number of questions.
pub fn both_finished(game: &GameEntity, first_count: usize, second_count: usize) -> bool {
    let total = game.question_ids.len();
    total > 0 && first_count >= total && second_count >= total
}

/// Finalization after both players answered everything.
pub fn complete_game(
    game: &GameEntity,
    now: SystemTime,
) -> Result<GameFinalization, TransitionError> {
    Ok(GameFinalization {
        game: finished(game, GameEvent::AllQuestionsAnswered, now)?,
        forfeited_answers: Vec::new(),
    })
}

/// One player finished every question while the other still has some left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stall {
    /// Player who answered everything.
    pub finished_player_id: Uuid,
    /// Player who still has questions left.
    pub laggard_player_id: Uuid,
}

/// Detect a game where exactly one player is done.
pub fn stalled_side(game: &GameEntity, first_count: usize, second_count: usize) -> Option<Stall> {
    let second_player_id = game.second_player_id?;
    let total = game.question_ids.len();
    if total == 0 {
        return None;
    }

    match (first_count >= total, second_count >= total) {
        (true, false) => Some(Stall {
            finished_player_id: game.first_player_id,
            laggard_player_id: second_player_id,
        }),
        (false, true) => Some(Stall {
            finished_player_id: second_player_id,
            laggard_player_id: game.first_player_id,
        }),
        _ => None,
    }
}

/// Strictly more than `grace` elapsed between `last_answer_at` and `now`.
pub fn grace_elapsed(last_answer_at: SystemTime, now: SystemTime, grace: Duration) -> bool {
    now.duration_since(last_answer_at)
        .map(|elapsed| elapsed > grace)
        .unwrap_or(false)
}

/// Finalization forced on a game where `laggard_player_id` stopped answering.
///
/// Every position the laggard has not filled gets an incorrect, empty answer, in sequence
/// order. Forfeits never score, so outcomes follow the scores stored at commit time.
pub fn plan_forfeit(
    game: &GameEntity,
    laggard_player_id: Uuid,
    laggard_answers: &[AnswerEntity],
    now: SystemTime,
) -> Result<GameFinalization, TransitionError> {
    let finished_game = finished(game, GameEvent::TimedOut, now)?;
    if game.second_player_id.is_none() {
        return Err(TransitionError::MissingOpponent);
    }

    let taken: HashSet<usize> = laggard_answers
        .iter()
        .filter(|answer| answer.player_id == laggard_player_id)
        .map(|answer| answer.position)
        .collect();

    let forfeited_answers = game
        .question_ids
        .iter()
        .enumerate()
        .filter(|(position, _)| !taken.contains(position))
        .map(|(position, question_id)| AnswerEntity {
            id: Uuid::new_v4(),
            player_id: laggard_player_id,
            game_id: game.id,
            question_id: *question_id,
            position,
            body: String::new(),
            status: AnswerStatus::Incorrect,
            added_at: now,
        })
        .collect();

    Ok(GameFinalization {
        game: finished_game,
        forfeited_answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::PlayerOutcome;

    fn question(answers: &[&str]) -> QuestionEntity {
        QuestionEntity {
            id: Uuid::new_v4(),
            body: "What is the answer?".into(),
            correct_answers: answers.iter().map(|a| a.to_string()).collect(),
            published: true,
            deleted_at: None,
            created_at: SystemTime::UNIX_EPOCH,
            updated_at: None,
        }
    }

    fn active_game(first: Uuid, second: Uuid, questions: usize) -> GameEntity {
        let pending = open_game(first, SystemTime::UNIX_EPOCH);
        let ids = (0..questions).map(|_| Uuid::new_v4()).collect();
        start_match(&pending, second, ids, questions, SystemTime::UNIX_EPOCH).unwrap()
    }

    fn answer(player_id: Uuid, game: &GameEntity, position: usize) -> AnswerEntity {
        AnswerEntity {
            id: Uuid::new_v4(),
            player_id,
            game_id: game.id,
            question_id: game.question_ids[position],
            position,
            body: "x".into(),
            status: AnswerStatus::Correct,
            added_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn start_match_assigns_second_player_and_questions() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(5);
        let pending = open_game(first, SystemTime::UNIX_EPOCH);
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let game = start_match(&pending, second, ids.clone(), 5, now).unwrap();

        assert_eq!(game.id, pending.id);
        assert_eq!(game.status, GameStatus::Active);
        assert_eq!(game.second_player_id, Some(second));
        assert_eq!(game.question_ids, ids);
        assert_eq!(game.started_at, Some(now));
        assert_eq!(game.pair_created_at, pending.pair_created_at);
    }

    #[test]
    fn start_match_rejects_self_pairing() {
        let first = Uuid::new_v4();
        let pending = open_game(first, SystemTime::UNIX_EPOCH);
        let ids = (0..5).map(|_| Uuid::new_v4()).collect();

        let err = start_match(&pending, first, ids, 5, SystemTime::UNIX_EPOCH).unwrap_err();
        assert_eq!(err, TransitionError::SelfPairing);
    }

    #[test]
    fn start_match_requires_full_question_set() {
        let pending = open_game(Uuid::new_v4(), SystemTime::UNIX_EPOCH);
        let ids = (0..3).map(|_| Uuid::new_v4()).collect();

        let err =
            start_match(&pending, Uuid::new_v4(), ids, 5, SystemTime::UNIX_EPOCH).unwrap_err();
        assert_eq!(
            err,
            TransitionError::QuestionCount {
                expected: 5,
                actual: 3
            }
        );
    }

    #[test]
    fn active_game_cannot_be_started_twice() {
        let game = active_game(Uuid::new_v4(), Uuid::new_v4(), 5);
        let ids = (0..5).map(|_| Uuid::new_v4()).collect();

        let err =
            start_match(&game, Uuid::new_v4(), ids, 5, SystemTime::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, TransitionError::Invalid(_)));
    }

    #[test]
    fn judge_is_exact_and_case_sensitive() {
        let q = question(&["Paris", "paris city"]);
        assert_eq!(judge(&q, "Paris"), AnswerStatus::Correct);
        assert_eq!(judge(&q, "paris city"), AnswerStatus::Correct);
        assert_eq!(judge(&q, "paris"), AnswerStatus::Incorrect);
        assert_eq!(judge(&q, " Paris"), AnswerStatus::Incorrect);
        assert_eq!(judge(&q, ""), AnswerStatus::Incorrect);
    }

    #[test]
    fn next_question_follows_sequence_and_stops_at_the_end() {
        let game = active_game(Uuid::new_v4(), Uuid::new_v4(), 5);
        assert_eq!(next_question(&game, 0), Some((0, game.question_ids[0])));
        assert_eq!(next_question(&game, 4), Some((4, game.question_ids[4])));
        assert_eq!(next_question(&game, 5), None);
    }

    #[test]
    fn outcomes_follow_score_comparison() {
        assert_eq!(PlayerOutcome::from_scores(3, 2), PlayerOutcome::Winner);
        assert_eq!(PlayerOutcome::from_scores(2, 3), PlayerOutcome::Losing);
        assert_eq!(PlayerOutcome::from_scores(2, 2), PlayerOutcome::Draw);
    }

    #[test]
    fn complete_game_finishes_once() {
        let game = active_game(Uuid::new_v4(), Uuid::new_v4(), 5);
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(60);

        let finalization = complete_game(&game, now).unwrap();
        assert_eq!(finalization.game.status, GameStatus::Finished);
        assert_eq!(finalization.game.finished_at, Some(now));
        assert!(finalization.forfeited_answers.is_empty());

        let err = complete_game(&finalization.game, now).unwrap_err();
        assert!(matches!(err, TransitionError::Invalid(_)));
    }

    #[test]
    fn both_finished_needs_every_answer() {
        let game = active_game(Uuid::new_v4(), Uuid::new_v4(), 5);
        assert!(both_finished(&game, 5, 5));
        assert!(!both_finished(&game, 5, 4));
        assert!(!both_finished(&open_game(Uuid::new_v4(), SystemTime::UNIX_EPOCH), 0, 0));
    }

    #[test]
    fn stalled_side_identifies_the_laggard() {
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let game = active_game(first, second, 5);

        assert_eq!(
            stalled_side(&game, 5, 2),
            Some(Stall {
                finished_player_id: first,
                laggard_player_id: second
            })
        );
        assert_eq!(
            stalled_side(&game, 0, 5),
            Some(Stall {
                finished_player_id: second,
                laggard_player_id: first
            })
        );
        assert_eq!(stalled_side(&game, 5, 5), None);
        assert_eq!(stalled_side(&game, 3, 3), None);
    }

    #[test]
    fn grace_window_is_exclusive() {
        let last = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let grace = Duration::from_secs(10);
        assert!(!grace_elapsed(last, last + Duration::from_secs(10), grace));
        assert!(grace_elapsed(last, last + Duration::from_millis(10_001), grace));
        assert!(!grace_elapsed(last, SystemTime::UNIX_EPOCH, grace));
    }

    #[test]
    fn forfeit_fills_only_missing_positions() {
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let game = active_game(first, second, 5);
        let laggard_answers = vec![answer(second, &game, 0), answer(second, &game, 1)];
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(30);

        let finalization = plan_forfeit(&game, second, &laggard_answers, now).unwrap();

        let positions: Vec<usize> = finalization
            .forfeited_answers
            .iter()
            .map(|a| a.position)
            .collect();
        assert_eq!(positions, vec![2, 3, 4]);
        for forfeited in &finalization.forfeited_answers {
            assert_eq!(forfeited.player_id, second);
            assert_eq!(forfeited.status, AnswerStatus::Incorrect);
            assert!(forfeited.body.is_empty());
            assert_eq!(forfeited.question_id, game.question_ids[forfeited.position]);
        }
        assert_eq!(finalization.game.status, GameStatus::Finished);
        assert_eq!(finalization.game.finished_at, Some(now));
    }

    #[test]
    fn forfeit_of_a_silent_player_fills_every_position() {
        let first = Uuid::new_v4();
        let game = active_game(first, Uuid::new_v4(), 5);

        let finalization = plan_forfeit(&game, first, &[], SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(finalization.forfeited_answers.len(), 5);

        let err = plan_forfeit(&finalization.game, first, &[], SystemTime::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, TransitionError::Invalid(_)));
    }
}
