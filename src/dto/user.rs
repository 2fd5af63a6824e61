//! Payloads of the user administration endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::{format_system_time, validation::validate_login},
};

/// Payload creating a user.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Unique login, 3 to 10 characters of `[0-9A-Za-z_-]`.
    #[validate(custom(function = "validate_login"))]
    pub login: String,
}

/// Created user together with a bearer token for it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    /// User id.
    pub id: Uuid,
    /// Login.
    pub login: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Bearer token to use on the quiz endpoints.
    pub access_token: String,
}

impl CreatedUserResponse {
    /// Pair a stored user with the token issued for it.
    pub fn new(user: UserEntity, access_token: String) -> Self {
        Self {
            id: user.id,
            login: user.login,
            created_at: format_system_time(user.created_at),
            access_token,
        }
    }
}
