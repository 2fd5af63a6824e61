//! Two-stage read model for game views.
//!
//! [`project_rows`] flattens games and their related records into one [`GameRow`] per
//! game × question slot × answer. [`group_rows`] folds those rows back into one
//! [`GameView`] per game. Both stages are pure; loading the records is the caller's job.

use std::{collections::HashMap, time::SystemTime};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dao::models::{
        AnswerEntity, AnswerStatus, GameEntity, GameStatus, PlayerEntity, QuestionEntity,
        UserEntity,
    },
    dto::{
        format_system_time,
        game::{AnswerView, GameView, PlayerIdentity, PlayerProgressView, QuestionPreview},
    },
};

/// Participant columns of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerColumns {
    /// Per-game player record.
    pub player_id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Login of the owning user.
    pub login: String,
    /// Persisted score.
    pub score: i32,
}

/// Question slot columns of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotColumns {
    /// Index in the game's sequence.
    pub position: usize,
    /// Question id.
    pub question_id: Uuid,
    /// Question text.
    pub body: String,
}

/// Answer columns of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerColumns {
    /// Answer id.
    pub answer_id: Uuid,
    /// Player who answered.
    pub player_id: Uuid,
    /// Question answered.
    pub question_id: Uuid,
    /// Verdict.
    pub status: AnswerStatus,
    /// Submission timestamp.
    pub added_at: SystemTime,
}

/// One flat row of the game read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    /// Game id.
    pub game_id: Uuid,
    /// Game status.
    pub status: GameStatus,
    /// When the game was opened.
    pub pair_created_at: SystemTime,
    /// When it became active.
    pub started_at: Option<SystemTime>,
    /// When it finished.
    pub finished_at: Option<SystemTime>,
    /// Player who opened the game.
    pub first: PlayerColumns,
    /// Player who joined it.
    pub second: Option<PlayerColumns>,
    /// Question slot, absent for games without questions.
    pub slot: Option<SlotColumns>,
    /// Answer given at that slot, absent when nobody answered it.
    pub answer: Option<AnswerColumns>,
}

/// Records a set of games refers to, indexed for projection.
#[derive(Debug, Default)]
pub struct ViewCatalog {
    players: HashMap<Uuid, PlayerEntity>,
    users: HashMap<Uuid, UserEntity>,
    questions: HashMap<Uuid, QuestionEntity>,
    answers: Vec<AnswerEntity>,
}

impl ViewCatalog {
    /// Index the loaded records.
    pub fn new(
        players: Vec<PlayerEntity>,
        users: Vec<UserEntity>,
        questions: Vec<QuestionEntity>,
        answers: Vec<AnswerEntity>,
    ) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            questions: questions.into_iter().map(|q| (q.id, q)).collect(),
            answers,
        }
    }

    fn player_columns(&self, player_id: Uuid) -> Result<PlayerColumns, MissingRecord> {
        let player = self
            .players
            .get(&player_id)
            .ok_or(MissingRecord::Player(player_id))?;
        let user = self
            .users
            .get(&player.user_id)
            .ok_or(MissingRecord::User(player.user_id))?;
        Ok(PlayerColumns {
            player_id,
            user_id: user.id,
            login: user.login.clone(),
            score: player.score,
        })
    }
}

/// A game refers to a record the catalog does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingRecord {
    /// Unknown player id.
    #[error("player `{0}` referenced by a game does not exist")]
    Player(Uuid),
    /// Unknown user id.
    #[error("user `{0}` referenced by a player does not exist")]
    User(Uuid),
    /// Unknown question id.
    #[error("question `{0}` referenced by a game does not exist")]
    Question(Uuid),
}

/// Flatten `games` into rows, in game order then question order.
pub fn project_rows(
    games: &[GameEntity],
    catalog: &ViewCatalog,
) -> Result<Vec<GameRow>, MissingRecord> {
    let mut rows = Vec::new();

    for game in games {
        let first = catalog.player_columns(game.first_player_id)?;
        let second = game
            .second_player_id
            .map(|id| catalog.player_columns(id))
            .transpose()?;

        let base = GameRow {
            game_id: game.id,
            status: game.status,
            pair_created_at: game.pair_created_at,
            started_at: game.started_at,
            finished_at: game.finished_at,
            first,
            second,
            slot: None,
            answer: None,
        };

        if game.question_ids.is_empty() {
            rows.push(base);
            continue;
        }

        for (position, question_id) in game.question_ids.iter().enumerate() {
            let question = catalog
                .questions
                .get(question_id)
                .ok_or(MissingRecord::Question(*question_id))?;
            let slot = SlotColumns {
                position,
                question_id: question.id,
                body: question.body.clone(),
            };

            let answered: Vec<AnswerColumns> = catalog
                .answers
                .iter()
                .filter(|answer| answer.game_id == game.id && answer.position == position)
                .map(|answer| AnswerColumns {
                    answer_id: answer.id,
                    player_id: answer.player_id,
                    question_id: answer.question_id,
                    status: answer.status,
                    added_at: answer.added_at,
                })
                .collect();

            if answered.is_empty() {
                rows.push(GameRow {
                    slot: Some(slot),
                    ..base.clone()
                });
            } else {
                for answer in answered {
                    rows.push(GameRow {
                        slot: Some(slot.clone()),
                        answer: Some(answer),
                        ..base.clone()
                    });
                }
            }
        }
    }

    Ok(rows)
}

struct Accumulator {
    head: GameRow,
    slots: IndexMap<usize, QuestionPreview>,
    answers: IndexMap<Uuid, (usize, AnswerColumns)>,
}

/// Group rows back into one view per game, keeping the order games first appear in.
///
/// Questions are listed in sequence order and disclosed only while the game is active.
/// Each player's answers are filtered from the shared rows and ordered by position.
pub fn group_rows(rows: Vec<GameRow>) -> Vec<GameView> {
    let mut games: IndexMap<Uuid, Accumulator> = IndexMap::new();

    for row in rows {
        let slot = row.slot.clone();
        let answer = row.answer.clone();
        let acc = games.entry(row.game_id).or_insert_with(|| Accumulator {
            head: row,
            slots: IndexMap::new(),
            answers: IndexMap::new(),
        });

        if let Some(slot) = slot {
            if let Some(answer) = answer {
                acc.answers.insert(answer.answer_id, (slot.position, answer));
            }
            acc.slots.entry(slot.position).or_insert(QuestionPreview {
                id: slot.question_id,
                body: slot.body,
            });
        }
    }

    games.into_values().map(into_view).collect()
}

fn progress(player: &PlayerColumns, answers: &[(usize, AnswerColumns)]) -> PlayerProgressView {
    let mut own: Vec<&(usize, AnswerColumns)> = answers
        .iter()
        .filter(|(_, answer)| answer.player_id == player.player_id)
        .collect();
    own.sort_by_key(|(position, _)| *position);

    PlayerProgressView {
        answers: own
            .into_iter()
            .map(|(_, answer)| AnswerView::new(answer.question_id, answer.status, answer.added_at))
            .collect(),
        player: PlayerIdentity {
            id: player.user_id,
            login: player.login.clone(),
        },
        score: player.score,
    }
}

fn into_view(mut acc: Accumulator) -> GameView {
    acc.slots.sort_keys();
    let answers: Vec<(usize, AnswerColumns)> = acc.answers.into_values().collect();
    let head = acc.head;

    let questions = if head.status == GameStatus::Active {
        acc.slots.into_values().collect()
    } else {
        Vec::new()
    };

    GameView {
        id: head.game_id,
        first_player_progress: progress(&head.first, &answers),
        second_player_progress: head.second.as_ref().map(|second| progress(second, &answers)),
        questions,
        status: head.status,
        pair_created_date: format_system_time(head.pair_created_at),
        start_game_date: head.started_at.map(format_system_time),
        finish_game_date: head.finished_at.map(format_system_time),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::game::{open_game, start_match};

    struct Fixture {
        catalog: ViewCatalog,
        game: GameEntity,
        first: PlayerEntity,
        second: PlayerEntity,
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn user(login: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            login: login.into(),
            created_at: at(0),
        }
    }

    fn question(body: &str) -> QuestionEntity {
        QuestionEntity {
            id: Uuid::new_v4(),
            body: body.into(),
            correct_answers: vec!["yes".into()],
            published: true,
            deleted_at: None,
            created_at: at(0),
            updated_at: None,
        }
    }

    fn answer(
        player: &PlayerEntity,
        game: &GameEntity,
        position: usize,
        secs: u64,
    ) -> AnswerEntity {
        AnswerEntity {
            id: Uuid::new_v4(),
            player_id: player.id,
            game_id: game.id,
            question_id: game.question_ids[position],
            position,
            body: "yes".into(),
            status: AnswerStatus::Correct,
            added_at: at(secs),
        }
    }

    fn active_fixture(
        answers: impl Fn(&PlayerEntity, &PlayerEntity, &GameEntity) -> Vec<AnswerEntity>,
    ) -> Fixture {
        let (alice, bob) = (user("alice"), user("bob"));
        let first = PlayerEntity {
            score: 2,
            ..PlayerEntity::new(alice.id, at(0))
        };
        let second = PlayerEntity::new(bob.id, at(0));
        let questions: Vec<QuestionEntity> = (0..3).map(|i| question(&format!("Q{i}"))).collect();
        let game = start_match(
            &open_game(first.id, at(1)),
            second.id,
            questions.iter().map(|q| q.id).collect(),
            3,
            at(2),
        )
        .unwrap();
        let answers = answers(&first, &second, &game);

        Fixture {
            catalog: ViewCatalog::new(
                vec![first.clone(), second.clone()],
                vec![alice, bob],
                questions,
                answers,
            ),
            game,
            first,
            second,
        }
    }

    #[test]
    fn rows_are_one_per_slot_and_answer() {
        let fx = active_fixture(|first, second, game| {
            vec![
                answer(first, game, 0, 3),
                answer(second, game, 0, 4),
                answer(first, game, 1, 5),
            ]
        });

        let rows = project_rows(std::slice::from_ref(&fx.game), &fx.catalog).unwrap();
        // slot 0: two answers, slot 1: one answer, slot 2: none
        assert_eq!(rows.len(), 4);
        assert!(rows[3].answer.is_none());
        assert_eq!(rows[3].slot.as_ref().unwrap().position, 2);
    }

    #[test]
    fn grouping_splits_answers_per_player_in_order() {
        let fx = active_fixture(|first, second, game| {
            vec![
                answer(first, game, 1, 6),
                answer(second, game, 0, 4),
                answer(first, game, 0, 3),
            ]
        });

        let rows = project_rows(std::slice::from_ref(&fx.game), &fx.catalog).unwrap();
        let views = group_rows(rows);
        assert_eq!(views.len(), 1);
        let view = &views[0];

        assert_eq!(view.id, fx.game.id);
        assert_eq!(view.first_player_progress.player.id, fx.first.user_id);
        assert_eq!(view.first_player_progress.player.login, "alice");
        assert_eq!(view.first_player_progress.score, 2);
        let first_questions: Vec<Uuid> = view
            .first_player_progress
            .answers
            .iter()
            .map(|a| a.question_id)
            .collect();
        assert_eq!(
            first_questions,
            vec![fx.game.question_ids[0], fx.game.question_ids[1]]
        );

        let second = view.second_player_progress.as_ref().unwrap();
        assert_eq!(second.player.id, fx.second.user_id);
        assert_eq!(second.answers.len(), 1);

        let question_ids: Vec<Uuid> = view.questions.iter().map(|q| q.id).collect();
        assert_eq!(question_ids, fx.game.question_ids);
        assert_eq!(view.questions[0].body, "Q0");
    }

    #[test]
    fn questions_are_hidden_once_finished() {
        let mut fx = active_fixture(|_, _, _| Vec::new());
        fx.game.status = GameStatus::Finished;
        fx.game.finished_at = Some(at(9));

        let views = group_rows(project_rows(&[fx.game.clone()], &fx.catalog).unwrap());
        assert!(views[0].questions.is_empty());
        assert!(views[0].finish_game_date.is_some());
    }

    #[test]
    fn pending_game_yields_single_row_and_no_second_player() {
        let alice = user("alice");
        let player = PlayerEntity::new(alice.id, at(0));
        let game = open_game(player.id, at(1));
        let catalog = ViewCatalog::new(vec![player], vec![alice], Vec::new(), Vec::new());

        let rows = project_rows(std::slice::from_ref(&game), &catalog).unwrap();
        assert_eq!(rows.len(), 1);

        let views = group_rows(rows);
        assert_eq!(views[0].status, GameStatus::PendingSecondPlayer);
        assert!(views[0].second_player_progress.is_none());
        assert!(views[0].questions.is_empty());
        assert!(views[0].start_game_date.is_none());
    }

    #[test]
    fn grouping_preserves_game_order() {
        let alice = user("alice");
        let player = PlayerEntity::new(alice.id, at(0));
        let older = open_game(player.id, at(1));
        let newer = open_game(player.id, at(2));
        let catalog = ViewCatalog::new(vec![player], vec![alice], Vec::new(), Vec::new());

        let views = group_rows(project_rows(&[newer.clone(), older.clone()], &catalog).unwrap());
        let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn missing_player_is_reported() {
        let game = open_game(Uuid::new_v4(), at(0));
        let err = project_rows(&[game.clone()], &ViewCatalog::default()).unwrap_err();
        assert_eq!(err, MissingRecord::Player(game.first_player_id));
    }
}
