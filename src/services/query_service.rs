use std::{cmp::Ordering, collections::HashSet};

use uuid::Uuid;

use crate::{
    dao::{
        models::{GameEntity, GameStatus},
        quiz_store::QuizStore,
    },
    dto::{
        game::{GameSortField, GameView, GamesQuery, SortDirection},
        pagination::{PageRequest, Paginator},
    },
    error::ServiceError,
    services::game_rows::{ViewCatalog, group_rows, project_rows},
    state::SharedState,
};

/// Load everything `games` refer to and assemble their views, preserving order.
pub async fn assemble_views(
    store: &dyn QuizStore,
    games: Vec<GameEntity>,
) -> Result<Vec<GameView>, ServiceError> {
    if games.is_empty() {
        return Ok(Vec::new());
    }

    let mut player_ids = Vec::new();
    let mut question_ids = Vec::new();
    for game in &games {
        player_ids.push(game.first_player_id);
        player_ids.extend(game.second_player_id);
        question_ids.extend(game.question_ids.iter().copied());
    }
    dedup(&mut player_ids);
    dedup(&mut question_ids);

    let players = store.find_players(player_ids.clone()).await?;
    let mut user_ids: Vec<Uuid> = players.iter().map(|player| player.user_id).collect();
    dedup(&mut user_ids);
    let users = store.find_users(user_ids).await?;
    let questions = store.find_questions(question_ids).await?;
    let answers = store.answers_for_players(player_ids).await?;

    let catalog = ViewCatalog::new(players, users, questions, answers);
    let rows = project_rows(&games, &catalog)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;
    Ok(group_rows(rows))
}

/// Assemble the view of a single game.
pub async fn assemble_view(
    store: &dyn QuizStore,
    game: GameEntity,
) -> Result<GameView, ServiceError> {
    let game_id = game.id;
    assemble_views(store, vec![game])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::Internal(format!("no view assembled for game `{game_id}`")))
}

fn dedup(ids: &mut Vec<Uuid>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

/// Game `raw_id`, visible to its participants only.
pub async fn get_game_by_id(
    state: &SharedState,
    user_id: Uuid,
    raw_id: &str,
) -> Result<GameView, ServiceError> {
    let game_id = Uuid::parse_str(raw_id)
        .map_err(|_| ServiceError::InvalidInput(format!("`{raw_id}` is not a valid game id")))?;
    let store = state.require_store().await?;

    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))?;

    let players = store.players_for_user(user_id).await?;
    if !players.iter().any(|player| game.has_player(player.id)) {
        return Err(ServiceError::Forbidden(
            "you are not a participant of this game".into(),
        ));
    }

    assemble_view(store.as_ref(), game).await
}

/// The caller's unfinished game.
pub async fn get_current_game(
    state: &SharedState,
    user_id: Uuid,
) -> Result<GameView, ServiceError> {
    let store = state.require_store().await?;
    let not_found = || ServiceError::NotFound("no current game".into());

    let player = store.latest_player(user_id).await?.ok_or_else(not_found)?;
    let game = store
        .game_for_player(
            player.id,
            vec![GameStatus::PendingSecondPlayer, GameStatus::Active],
        )
        .await?
        .ok_or_else(not_found)?;

    assemble_view(store.as_ref(), game).await
}

/// Every game the caller took part in, sorted and paginated.
pub async fn get_all_games(
    state: &SharedState,
    user_id: Uuid,
    query: &GamesQuery,
) -> Result<Paginator<GameView>, ServiceError> {
    let store = state.require_store().await?;

    let player_ids: Vec<Uuid> = store
        .players_for_user(user_id)
        .await?
        .into_iter()
        .map(|player| player.id)
        .collect();
    let mut games = if player_ids.is_empty() {
        Vec::new()
    } else {
        store.games_for_players(player_ids).await?
    };

    sort_games(
        &mut games,
        query.sort_by.unwrap_or_default(),
        query.sort_direction.unwrap_or_default(),
    );

    let request = PageRequest::new(query.page_number, query.page_size);
    let page = Paginator::paginate(games, request);
    let items = assemble_views(store.as_ref(), page.items).await?;

    Ok(Paginator {
        pages_count: page.pages_count,
        page: page.page,
        page_size: page.page_size,
        total_count: page.total_count,
        items,
    })
}

fn status_rank(status: GameStatus) -> u8 {
    match status {
        GameStatus::PendingSecondPlayer => 0,
        GameStatus::Active => 1,
        GameStatus::Finished => 2,
    }
}

/// Sort by the requested column, newest creation first among equals.
fn sort_games(games: &mut [GameEntity], field: GameSortField, direction: SortDirection) {
    games.sort_by(|a, b| {
        let primary = match field {
            GameSortField::PairCreatedDate => a.pair_created_at.cmp(&b.pair_created_at),
            GameSortField::StartGameDate => a.started_at.cmp(&b.started_at),
            GameSortField::FinishGameDate => a.finished_at.cmp(&b.finished_at),
            GameSortField::Status => status_rank(a.status).cmp(&status_rank(b.status)),
        };
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        match primary {
            Ordering::Equal => b.pair_created_at.cmp(&a.pair_created_at),
            other => other,
        }
    });
}
