/// Answer submission and scoring.
pub mod answer_service;
/// Bearer token issuing and verification.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Periodic forfeit of stalled games.
pub mod finalizer;
/// Flat row projection and grouping of game views.
pub mod game_rows;
/// Health check service.
pub mod health_service;
/// Pairing of joining players into games.
pub mod matchmaking_service;
/// Game view read paths.
pub mod query_service;
/// Question bank administration.
pub mod question_service;
/// Per-user statistics and leaderboard.
pub mod statistics_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// User registration.
pub mod user_service;
