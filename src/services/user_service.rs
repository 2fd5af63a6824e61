use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::UserEntity, quiz_store::QuizStore},
    dto::user::{CreateUserRequest, CreatedUserResponse},
    error::ServiceError,
    state::SharedState,
};

/// Fetch a user or fail with [`ServiceError::NotFound`].
pub async fn require_user(
    store: &dyn QuizStore,
    user_id: Uuid,
) -> Result<UserEntity, ServiceError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))
}

/// Register a user and issue a bearer token for it.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<CreatedUserResponse, ServiceError> {
    let store = state.require_store().await?;

    if store.find_user_by_login(request.login.clone()).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "login `{}` is already taken",
            request.login
        )));
    }

    let now = SystemTime::now();
    let user = UserEntity {
        id: Uuid::new_v4(),
        login: request.login,
        created_at: now,
    };
    store.save_user(user.clone()).await?;
    info!(user_id = %user.id, login = %user.login, "user created");

    let token = state
        .tokens()
        .issue(user.id, now)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    Ok(CreatedUserResponse::new(user, token))
}
