use aide::axum::routing::{delete_with, get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use aide::OperationOutput;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use headers::{HeaderMap, HeaderValue};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::database::AppState;
use crate::env;
use crate::error::{ServiceError, ServiceResult};
use crate::request_state::RequestState;
use crate::SESSION_COOKIE_NAME;

use super::accounts::AccountDto;
use super::password_hash_verify;

pub fn router(app_state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/auth/password",
            post_with(auth_password_based, auth_password_based_docs),
        )
        .api_route(
            "/auth/account",
            get_with(auth_get_account, auth_get_account_docs),
        )
        .api_route("/auth", delete_with(auth_delete, auth_delete_docs))
        .with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct AuthTokenDto {
    pub token: String,
}

impl OperationOutput for AuthTokenDto {
    type Inner = AuthTokenDto;
}
impl IntoResponse for AuthTokenDto {
    fn into_response(self) -> axum::response::Response {
        let mut header = HeaderMap::new();
        match HeaderValue::from_str(&format!(
            "{}={}; Path=/api/v1; HttpOnly; SameSite=None",
            SESSION_COOKIE_NAME, self.token
        )) {
            Ok(cookie) => {
                header.insert(header::SET_COOKIE, cookie);
            }
            Err(e) => warn!("Could not build session cookie: {}", e),
        }

        (StatusCode::OK, header, Json(self)).into_response()
    }
}

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
pub struct AuthPasswordBasedDto {
    pub username: String,
    pub password: String,
}

async fn auth_password_based(
    mut state: RequestState,
    form: Json<AuthPasswordBasedDto>,
) -> ServiceResult<AuthTokenDto> {
    let form = form.0;
    let account = state.db.accounts().find_by_username(&form.username).await?;

    if let Some(account) = account {
        if password_hash_verify(&account.password, &form.password)? {
            let token = state
                .db
                .create_session_token(
                    account.id,
                    Utc::now() + Duration::minutes(*env::SESSION_DURATION_MINUTES),
                )
                .await?;

            info!("Account {} logged in", account.id);
            return Ok(AuthTokenDto { token });
        }
    }

    Err(ServiceError::Unauthorized("Invalid username or password"))
}

fn auth_password_based_docs(op: TransformOperation) -> TransformOperation {
    op.description("Login with username and password.")
        .tag("auth")
        .response::<200, Json<AuthTokenDto>>()
        .response_with::<401, (), _>(|res| res.description("Invalid username or password!"))
}

async fn auth_get_account(state: RequestState) -> ServiceResult<Json<AccountDto>> {
    let session = state.session_require()?;
    Ok(Json(AccountDto::from(&session.account)))
}

fn auth_get_account_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get the account of the current session.")
        .tag("auth")
        .response::<200, Json<AccountDto>>()
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

async fn auth_delete(mut state: RequestState) -> ServiceResult<StatusCode> {
    let session = state.session_require()?;
    state.db.delete_session_token(session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn auth_delete_docs(op: TransformOperation) -> TransformOperation {
    op.description("Logout and invalidate the current session token.")
        .tag("auth")
        .response_with::<204, (), _>(|res| res.description("The session was closed!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_sets_cookie() {
        let response = AuthTokenDto {
            token: "abc".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::SET_COOKIE).unwrap(),
            &format!(
                "{}=abc; Path=/api/v1; HttpOnly; SameSite=None",
                SESSION_COOKIE_NAME
            )
        );
    }
}
