use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    auth::AuthUser,
    dto::{
        game::{AnswerRequest, GameView, GamesQuery},
        leaderboard::{StatisticView, TopPlayerView, parse_sort},
        pagination::{PageRequest, Paginator},
    },
    error::AppError,
    services::{answer_service, matchmaking_service, query_service, statistics_service},
    state::SharedState,
};

/// Player-facing quiz routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/pair-game-quiz/pairs/connection", post(connect))
        .route("/pair-game-quiz/pairs/my-current", get(my_current))
        .route("/pair-game-quiz/pairs/my-current/answers", post(answer))
        .route("/pair-game-quiz/pairs/my", get(my_games))
        .route("/pair-game-quiz/pairs/{id}", get(game_by_id))
        .route("/pair-game-quiz/users/my-statistic", get(my_statistic))
        .route("/pair-game-quiz/users/top", get(top_users))
}

/// Join the pending game or open a new one.
#[utoipa::path(
    post,
    path = "/pair-game-quiz/pairs/connection",
    tag = "quiz",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Game joined or opened", body = GameView),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Already in an unfinished game"),
        (status = 409, description = "Not enough published questions, or join kept racing")
    )
)]
pub async fn connect(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(matchmaking_service::join(&state, user_id).await?))
}

/// Answer the next question of the current game.
#[utoipa::path(
    post,
    path = "/pair-game-quiz/pairs/my-current/answers",
    tag = "quiz",
    security(("bearer" = [])),
    request_body = AnswerRequest,
    responses(
        (status = 204, description = "Answer recorded"),
        (status = 400, description = "Invalid body"),
        (status = 403, description = "No active game, or every question answered")
    )
)]
pub async fn answer(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnswerRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    answer_service::submit_answer(&state, user_id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's unfinished game.
#[utoipa::path(
    get,
    path = "/pair-game-quiz/pairs/my-current",
    tag = "quiz",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current game", body = GameView),
        (status = 404, description = "No unfinished game")
    )
)]
pub async fn my_current(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(query_service::get_current_game(&state, user_id).await?))
}

/// Every game the caller took part in.
#[utoipa::path(
    get,
    path = "/pair-game-quiz/pairs/my",
    tag = "quiz",
    security(("bearer" = [])),
    params(GamesQuery),
    responses((status = 200, description = "Page of games", body = Paginator<GameView>))
)]
pub async fn my_games(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<GamesQuery>,
) -> Result<Json<Paginator<GameView>>, AppError> {
    Ok(Json(
        query_service::get_all_games(&state, user_id, &query).await?,
    ))
}

/// A game the caller takes part in.
#[utoipa::path(
    get,
    path = "/pair-game-quiz/pairs/{id}",
    tag = "quiz",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = GameView),
        (status = 400, description = "Malformed identifier"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn game_by_id(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(
        query_service::get_game_by_id(&state, user_id, &id).await?,
    ))
}

/// Aggregated results of the caller.
#[utoipa::path(
    get,
    path = "/pair-game-quiz/users/my-statistic",
    tag = "quiz",
    security(("bearer" = [])),
    responses((status = 200, description = "Statistic", body = StatisticView))
)]
pub async fn my_statistic(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatisticView>, AppError> {
    Ok(Json(statistics_service::my_statistic(&state, user_id).await?))
}

/// Public leaderboard.
///
/// `sort` may be repeated; each value is `field dir` or `field.dir`.
#[utoipa::path(
    get,
    path = "/pair-game-quiz/users/top",
    tag = "quiz",
    params(
        ("sort" = Option<Vec<String>>, Query, description = "Sort keys, e.g. `avgScores desc`"),
        ("pageNumber" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("pageSize" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Page of players", body = Paginator<TopPlayerView>),
        (status = 400, description = "Unknown sort field or direction")
    )
)]
pub async fn top_users(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Paginator<TopPlayerView>>, AppError> {
    let mut sort = Vec::new();
    let mut page_number = None;
    let mut page_size = None;
    for (key, value) in params {
        match key.as_str() {
            "sort" => sort.push(value),
            "pageNumber" => page_number = Some(parse_page_param(&key, &value)?),
            "pageSize" => page_size = Some(parse_page_param(&key, &value)?),
            _ => {}
        }
    }

    let keys = parse_sort(&sort).map_err(|err| AppError::BadRequest(err.to_string()))?;
    let page = PageRequest::new(page_number, page_size);
    Ok(Json(statistics_service::top_users(&state, &keys, page).await?))
}

fn parse_page_param(key: &str, value: &str) -> Result<u32, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("`{key}` must be a positive integer")))
}
