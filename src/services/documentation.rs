use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pair Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::connect,
        crate::routes::quiz::answer,
        crate::routes::quiz::my_current,
        crate::routes::quiz::my_games,
        crate::routes::quiz::game_by_id,
        crate::routes::quiz::my_statistic,
        crate::routes::quiz::top_users,
        crate::routes::admin::create_question,
        crate::routes::admin::list_questions,
        crate::routes::admin::publish_question,
        crate::routes::admin::delete_question,
        crate::routes::admin::create_user,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::AnswerRequest,
            crate::dto::game::AnswerView,
            crate::dto::game::GameView,
            crate::dto::game::PlayerProgressView,
            crate::dto::game::PlayerIdentity,
            crate::dto::game::QuestionPreview,
            crate::dto::game::GameSortField,
            crate::dto::game::SortDirection,
            crate::dto::leaderboard::StatisticView,
            crate::dto::leaderboard::TopPlayerView,
            crate::dto::question::CreateQuestionRequest,
            crate::dto::question::PublishRequest,
            crate::dto::question::QuestionAdminView,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::CreatedUserResponse,
            crate::dao::models::GameStatus,
            crate::dao::models::AnswerStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Pair quiz matchmaking, answers and results"),
        (name = "admin", description = "Question bank and user administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
