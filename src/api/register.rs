use aide::axum::routing::post_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::Json;
use chrono::{Duration, Utc};
use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::database::schema::AccountCreate;
use crate::database::AppState;
use crate::env;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ROLE_USER;
use crate::request_state::RequestState;

use super::accounts::AccountDto;
use super::password_hash_create;
use super::users::UserDto;

pub fn router(app_state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/register", post_with(register, register_docs))
        .with_state(app_state)
}

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
pub struct RegisterDto {
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct RegisteredDto {
    pub account: AccountDto,
    pub user: UserDto,
    /// Session token of the new account, the client is logged in right away.
    pub token: String,
}

/// Self service sign up for patients.
async fn register(
    mut state: RequestState,
    form: Json<RegisterDto>,
) -> ServiceResult<Json<RegisteredDto>> {
    let form = form.0;

    let role = state
        .db
        .roles()
        .find_by_name(ROLE_USER)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalServerError(format!("Role '{}' does not exist", ROLE_USER))
        })?;

    let (account, user) = state
        .db
        .register_user(
            AccountCreate {
                username: form.username,
                email: form.email,
                password: password_hash_create(&form.password)?,
                role_id: role.id,
                avatar_id: None,
            },
            form.firstname,
            form.lastname,
            form.phone_number,
        )
        .await?;

    let token = state
        .db
        .create_session_token(
            account.id,
            Utc::now() + Duration::minutes(*env::SESSION_DURATION_MINUTES),
        )
        .await?;

    info!("Registered account {} ({})", account.id, account.username);
    Ok(Json(RegisteredDto {
        account: AccountDto::from(&account),
        user: UserDto::from(&user),
        token,
    }))
}

fn register_docs(op: TransformOperation) -> TransformOperation {
    op.description("Register a new patient account with its user profile.")
        .tag("auth")
        .response::<200, Json<RegisteredDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid input!"))
        .response_with::<409, (), _>(|res| res.description("Username or email already in use!"))
}
