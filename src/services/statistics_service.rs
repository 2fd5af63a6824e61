use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameEntity, GameStatus, PlayerEntity, PlayerOutcome},
        quiz_store::QuizStore,
    },
    dto::{
        game::{PlayerIdentity, SortDirection},
        leaderboard::{LeaderboardField, SortKey, StatisticView, TopPlayerView},
        pagination::{PageRequest, Paginator},
    },
    error::ServiceError,
    state::SharedState,
};

/// Scores of one finished game from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    /// Score of the participant.
    pub score: i32,
    /// Score of their opponent.
    pub opponent_score: i32,
}

/// Fold game results into a statistic.
pub fn aggregate(results: &[GameResult]) -> StatisticView {
    let mut view = StatisticView {
        sum_score: 0,
        avg_scores: 0.0,
        games_count: 0,
        wins_count: 0,
        losses_count: 0,
        draws_count: 0,
    };

    for result in results {
        view.sum_score += i64::from(result.score);
        view.games_count += 1;
        match PlayerOutcome::from_scores(result.score, result.opponent_score) {
            PlayerOutcome::Winner => view.wins_count += 1,
            PlayerOutcome::Losing => view.losses_count += 1,
            PlayerOutcome::Draw => view.draws_count += 1,
        }
    }

    if view.games_count > 0 {
        let avg = view.sum_score as f64 / f64::from(view.games_count);
        view.avg_scores = (avg * 100.0).round() / 100.0;
    }
    view
}

/// Results of every finished game, grouped by the user behind each player.
///
/// Games whose players are missing from `players` are ignored.
pub fn results_by_user(
    games: &[GameEntity],
    players: &[PlayerEntity],
) -> IndexMap<Uuid, Vec<GameResult>> {
    let players: HashMap<Uuid, &PlayerEntity> =
        players.iter().map(|player| (player.id, player)).collect();
    let mut results: IndexMap<Uuid, Vec<GameResult>> = IndexMap::new();

    for game in games.iter().filter(|game| game.status == GameStatus::Finished) {
        let Some(second_player_id) = game.second_player_id else {
            continue;
        };
        let (Some(first), Some(second)) = (
            players.get(&game.first_player_id),
            players.get(&second_player_id),
        ) else {
            continue;
        };

        results.entry(first.user_id).or_default().push(GameResult {
            score: first.score,
            opponent_score: second.score,
        });
        results.entry(second.user_id).or_default().push(GameResult {
            score: second.score,
            opponent_score: first.score,
        });
    }

    results
}

fn compare_field(a: &StatisticView, b: &StatisticView, field: LeaderboardField) -> Ordering {
    match field {
        LeaderboardField::SumScore => a.sum_score.cmp(&b.sum_score),
        LeaderboardField::AvgScores => a.avg_scores.total_cmp(&b.avg_scores),
        LeaderboardField::GamesCount => a.games_count.cmp(&b.games_count),
        LeaderboardField::WinsCount => a.wins_count.cmp(&b.wins_count),
        LeaderboardField::LossesCount => a.losses_count.cmp(&b.losses_count),
        LeaderboardField::DrawsCount => a.draws_count.cmp(&b.draws_count),
    }
}

/// Order leaderboard entries by `keys`, then by login.
pub fn sort_leaderboard(entries: &mut [TopPlayerView], keys: &[SortKey]) {
    entries.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ordering = compare_field(&a.statistic, &b.statistic, key.field);
                match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.player.login.cmp(&b.player.login))
    });
}

/// Statistic of the caller over their finished games.
pub async fn my_statistic(
    state: &SharedState,
    user_id: Uuid,
) -> Result<StatisticView, ServiceError> {
    let store = state.require_store().await?;
    user_statistic(store.as_ref(), user_id).await
}

/// Statistic of `user_id` against an explicit store.
pub async fn user_statistic(
    store: &dyn QuizStore,
    user_id: Uuid,
) -> Result<StatisticView, ServiceError> {
    let own_ids: Vec<Uuid> = store
        .players_for_user(user_id)
        .await?
        .into_iter()
        .map(|player| player.id)
        .collect();
    if own_ids.is_empty() {
        return Ok(aggregate(&[]));
    }

    let games: Vec<GameEntity> = store
        .games_for_players(own_ids)
        .await?
        .into_iter()
        .filter(|game| game.status == GameStatus::Finished)
        .collect();
    let players = store.find_players(participants(&games)).await?;

    let results = results_by_user(&games, &players);
    Ok(aggregate(results.get(&user_id).map(Vec::as_slice).unwrap_or_default()))
}

/// Leaderboard over every user with at least one finished game.
pub async fn top_users(
    state: &SharedState,
    keys: &[SortKey],
    page: PageRequest,
) -> Result<Paginator<TopPlayerView>, ServiceError> {
    let store = state.require_store().await?;
    leaderboard(store.as_ref(), keys, page).await
}

/// Leaderboard against an explicit store.
pub async fn leaderboard(
    store: &dyn QuizStore,
    keys: &[SortKey],
    page: PageRequest,
) -> Result<Paginator<TopPlayerView>, ServiceError> {
    let games = store.games_with_status(GameStatus::Finished).await?;
    let players = store.find_players(participants(&games)).await?;
    let results = results_by_user(&games, &players);

    let users = store.find_users(results.keys().copied().collect()).await?;
    let logins: HashMap<Uuid, String> = users
        .into_iter()
        .map(|user| (user.id, user.login))
        .collect();

    let mut entries: Vec<TopPlayerView> = results
        .iter()
        .filter_map(|(user_id, games)| {
            logins.get(user_id).map(|login| TopPlayerView {
                statistic: aggregate(games),
                player: PlayerIdentity {
                    id: *user_id,
                    login: login.clone(),
                },
            })
        })
        .collect();
    sort_leaderboard(&mut entries, keys);

    Ok(Paginator::paginate(entries, page))
}

fn participants(games: &[GameEntity]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = games
        .iter()
        .flat_map(|game| std::iter::once(game.first_player_id).chain(game.second_player_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
