use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        question::{CreateQuestionRequest, PublishRequest, QuestionAdminView},
        user::{CreateUserRequest, CreatedUserResponse},
    },
    error::AppError,
    services::{question_service, user_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Question bank and user administration, guarded by the admin token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/sa/quiz/questions",
            get(list_questions).post(create_question),
        )
        .route("/sa/quiz/questions/{id}", delete(delete_question))
        .route("/sa/quiz/questions/{id}/publish", put(publish_question))
        .route("/sa/users", post(create_user))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Add an unpublished question to the bank.
#[utoipa::path(
    post,
    path = "/sa/quiz/questions",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionAdminView),
        (status = 400, description = "Invalid body")
    )
)]
pub async fn create_question(
    State(state): State<SharedState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionAdminView>), AppError> {
    payload.validate()?;
    let question = question_service::create_question(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// List every non-deleted question, newest first.
#[utoipa::path(
    get,
    path = "/sa/quiz/questions",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    responses((status = 200, description = "Questions", body = [QuestionAdminView]))
)]
pub async fn list_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionAdminView>>, AppError> {
    Ok(Json(question_service::list_questions(&state).await?))
}

/// Publish or unpublish a question.
#[utoipa::path(
    put,
    path = "/sa/quiz/questions/{id}/publish",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Question identifier")),
    request_body = PublishRequest,
    responses(
        (status = 204, description = "Publication updated"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn publish_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishRequest>,
) -> Result<StatusCode, AppError> {
    question_service::set_published(&state, id, payload.published).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete a question.
#[utoipa::path(
    delete,
    path = "/sa/quiz/questions/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Question identifier")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn delete_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    question_service::delete_question(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register a user and return a bearer token for it.
#[utoipa::path(
    post,
    path = "/sa/users",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Invalid login"),
        (status = 409, description = "Login already taken")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), AppError> {
    payload.validate()?;
    let created = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided == state.config().admin_token {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
