use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::Path;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::schema::UserCreate;
use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models;
use crate::request_state::{Access, RequestState};

use super::accounts::AccountDto;
use super::appointments::AppointmentDto;
use super::crud::{self, ApiModel};

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/users",
            crud::list_route::<models::User>().post_with(create_user, create_user_docs),
        )
        .api_route("/user/:id", crud::item_route::<models::User>())
        .api_route(
            "/user/:id/details",
            get_with(get_user_details, get_user_details_docs),
        );

    crud::query_routes::<models::User>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct UserDto {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub account_id: u64,
}

impl From<&models::User> for UserDto {
    fn from(value: &models::User) -> Self {
        Self {
            id: value.id,
            firstname: value.firstname.to_owned(),
            lastname: value.lastname.to_owned(),
            phone_number: value.phone_number.to_owned(),
            account_id: value.account_id,
        }
    }
}

impl ApiModel for models::User {
    type Dto = UserDto;

    const NAME: &'static str = "user";
    const TAG: &'static str = "users";
    const ITEM_PATH: &'static str = "/user";
    const COLLECTION_PATH: &'static str = "/users";

    const READ: Access = Access::Staff;
    const WRITE: Access = Access::Admin;

    fn owner_account(&self) -> Option<u64> {
        Some(self.account_id)
    }
}

async fn create_user(
    mut state: RequestState,
    form: Json<UserCreate>,
) -> ServiceResult<Json<UserDto>> {
    let form = form.0;
    state.session_require_admin_or_self(form.account_id)?;

    let user = state.db.create_user(form).await?;
    Ok(Json(UserDto::from(&user)))
}

fn create_user_docs(op: TransformOperation) -> TransformOperation {
    op.description("Create the user profile of an account.")
        .tag("users")
        .response::<200, Json<UserDto>>()
        .response_with::<404, (), _>(|res| res.description("The account does not exist!"))
        .response_with::<409, (), _>(|res| {
            res.description("The account already has a staff or user profile!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin", "self"])
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct UserDetailsDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub account: AccountDto,
    pub appointments: Vec<AppointmentDto>,
}

async fn get_user_details(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<UserDetailsDto>> {
    let session = state.session_require()?;

    let details = state
        .db
        .get_user_details(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    if !Access::Staff.grants(&session) && details.user.account_id != session.account.id {
        return Err(ServiceError::Forbidden);
    }

    Ok(Json(UserDetailsDto {
        user: UserDto::from(&details.user),
        account: AccountDto::from(&details.account),
        appointments: details.appointments.iter().map(|a| a.into()).collect(),
    }))
}

fn get_user_details_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get a user with account and appointments.")
        .tag("users")
        .response::<200, Json<UserDetailsDto>>()
        .response_with::<404, (), _>(|res| res.description("The requested user does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["staff", "self"])
}
