use aide::axum::routing::{get_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::Json;
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::database::schema::{AccountCreate, AccountUpdate};
use crate::database::{AppState, DatabaseConnection};
use crate::error::{ServiceError, ServiceResult};
use crate::models;
use crate::request_state::{Access, RequestState};

use super::attachments::{self, AttachmentDto, FileResponse};
use super::crud::{self, ApiModel};
use super::roles::RoleDto;
use super::staff::StaffDto;
use super::users::UserDto;
use super::password_hash_create;

const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/webp"];

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/accounts",
            crud::list_route::<models::Account>().post_with(create_account, create_account_docs),
        )
        .api_route(
            "/account/:id",
            get_with(
                crud::get::<models::Account>,
                crud::get_docs::<models::Account>,
            )
            .put_with(update_account, update_account_docs)
            .delete_with(
                crud::delete::<models::Account>,
                crud::delete_docs::<models::Account>,
            ),
        )
        .api_route(
            "/account/:id/details",
            get_with(get_account_details, get_account_details_docs),
        )
        .api_route(
            "/account/:id/password",
            put_with(change_password, change_password_docs),
        )
        .api_route(
            "/account/:id/avatar",
            get_with(get_avatar, get_avatar_docs)
                .put_with(upload_avatar, upload_avatar_docs)
                .delete_with(delete_avatar, delete_avatar_docs),
        );

    crud::query_routes::<models::Account>(router).with_state(app_state)
}

/// Public view of an account, never contains the password hash.
#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct AccountDto {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role_id: u64,
    pub avatar_id: Option<u64>,
}

impl From<&models::Account> for AccountDto {
    fn from(value: &models::Account) -> Self {
        Self {
            id: value.id,
            username: value.username.to_owned(),
            email: value.email.to_owned(),
            role_id: value.role_id,
            avatar_id: value.avatar_id,
        }
    }
}

impl ApiModel for models::Account {
    type Dto = AccountDto;

    const NAME: &'static str = "account";
    const TAG: &'static str = "accounts";
    const ITEM_PATH: &'static str = "/account";
    const COLLECTION_PATH: &'static str = "/accounts";

    const READ: Access = Access::Admin;
    const WRITE: Access = Access::Admin;

    fn owner_account(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
pub struct CreateAccountDto {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: u64,
}

async fn create_account(
    mut state: RequestState,
    form: Json<CreateAccountDto>,
) -> ServiceResult<Json<AccountDto>> {
    state.session_require_admin()?;
    let form = form.0;

    let account = state
        .db
        .accounts()
        .create(AccountCreate {
            username: form.username,
            email: form.email,
            password: password_hash_create(&form.password)?,
            role_id: form.role_id,
            avatar_id: None,
        })
        .await?;

    info!("Created account {} ({})", account.id, account.username);
    Ok(Json(AccountDto::from(&account)))
}

fn create_account_docs(op: TransformOperation) -> TransformOperation {
    op.description("Create a new account.")
        .tag("accounts")
        .response::<200, Json<AccountDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid input!"))
        .response_with::<409, (), _>(|res| {
            res.description("Username or email already in use or the role does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin"])
}

async fn update_account(
    mut state: RequestState,
    Path(id): Path<u64>,
    form: Json<AccountUpdate>,
) -> ServiceResult<Json<AccountDto>> {
    let session = state.session_require_admin_or_self(id)?;
    let form = form.0;
    require_admin_fields(&session, &form)?;

    let account = state
        .db
        .accounts()
        .update(id, form)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(AccountDto::from(&account)))
}

/// The role and the avatar reference can only be changed by admins. Owners replace
/// their avatar through the upload route, which never points at foreign attachments.
fn require_admin_fields(session: &models::Session, form: &AccountUpdate) -> ServiceResult<()> {
    if session.is_admin() {
        return Ok(());
    }
    if form.role_id.is_some() || form.avatar_id.is_some() {
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

fn update_account_docs(op: TransformOperation) -> TransformOperation {
    op.description(
        "Update an existing account. Omitted fields are left unchanged. Only admins can change the role or the avatar id.",
    )
    .tag("accounts")
    .response::<200, Json<AccountDto>>()
    .response_with::<404, (), _>(|res| res.description("The requested account does not exist!"))
    .response_with::<409, (), _>(|res| {
        res.description("Username or email already in use or a reference does not exist!")
    })
    .response_with::<401, (), _>(|res| res.description("Missing login!"))
    .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
    .security_requirement_scopes("SessionToken", ["admin", "self"])
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct AccountDetailsDto {
    #[serde(flatten)]
    pub account: AccountDto,
    pub role: RoleDto,
    pub avatar: Option<AttachmentDto>,
    pub staff: Option<StaffDto>,
    pub user: Option<UserDto>,
}

async fn get_account_details(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<AccountDetailsDto>> {
    state.session_require_admin_or_self(id)?;

    let details = state
        .db
        .get_account_details(id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Json(AccountDetailsDto {
        account: AccountDto::from(&details.account),
        role: RoleDto::from(&details.role),
        avatar: details.avatar.as_ref().map(|a| a.into()),
        staff: details.staff.as_ref().map(|s| s.into()),
        user: details.user.as_ref().map(|u| u.into()),
    }))
}

fn get_account_details_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get an account with role, avatar and its staff or user profile.")
        .tag("accounts")
        .response::<200, Json<AccountDetailsDto>>()
        .response_with::<404, (), _>(|res| res.description("The requested account does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin", "self"])
}

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
pub struct ChangePasswordDto {
    pub password: String,
}

/// Sets a new password. When an admin resets the password of another account,
/// all sessions of that account are closed.
async fn change_password(
    mut state: RequestState,
    Path(id): Path<u64>,
    form: Json<ChangePasswordDto>,
) -> ServiceResult<StatusCode> {
    let session = state.session_require_admin_or_self(id)?;

    let password = password_hash_create(&form.0.password)?;
    state
        .db
        .accounts()
        .update(
            id,
            AccountUpdate {
                password: Some(password),
                ..Default::default()
            },
        )
        .await?
        .ok_or(ServiceError::NotFound)?;

    if session.account.id != id {
        let closed = state.db.delete_sessions_of_account(id).await?;
        info!("Password of account {} was reset, closed {} sessions", id, closed);
    }

    Ok(StatusCode::NO_CONTENT)
}

fn change_password_docs(op: TransformOperation) -> TransformOperation {
    op.description("Change the password of an account.")
        .tag("accounts")
        .response_with::<204, (), _>(|res| res.description("The password was changed!"))
        .response_with::<400, (), _>(|res| res.description("The password is empty!"))
        .response_with::<404, (), _>(|res| res.description("The requested account does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin", "self"])
}

async fn get_avatar(mut state: RequestState, Path(id): Path<u64>) -> ServiceResult<FileResponse> {
    state.session_require()?;

    let account = state
        .db
        .accounts()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let avatar_id = account.avatar_id.ok_or(ServiceError::NotFound)?;
    let avatar = state
        .db
        .attachments()
        .find_unique(avatar_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let data = tokio::fs::read(avatar.path()).await?;
    Ok(FileResponse {
        media_type: avatar.media_type,
        data,
    })
}

fn get_avatar_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get the avatar image of an account.")
        .tag("accounts")
        .response_with::<200, (), _>(|res| res.description("The avatar image."))
        .response_with::<404, (), _>(|res| {
            res.description("The account does not exist or has no avatar!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

async fn upload_avatar(
    mut state: RequestState,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> ServiceResult<Json<AccountDto>> {
    state.session_require_admin_or_self(id)?;

    let previous = state
        .db
        .accounts()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?
        .avatar_id;

    let (file_name, media_type, data) = attachments::read_upload(&mut multipart).await?;
    if !SUPPORTED_IMAGE_TYPES.iter().any(|t| *t == media_type) {
        return Err(ServiceError::BadRequest(
            "Unsupported image type",
            format!("Expected one of {}", SUPPORTED_IMAGE_TYPES.join(", ")),
        ));
    }

    let avatar = attachments::store_file(&mut state.db, &file_name, media_type, &data).await?;
    let account = attach_avatar(&mut state.db, id, &avatar, previous).await?;

    Ok(Json(AccountDto::from(&account)))
}

/// Points the account at the stored `avatar` and removes the `previous` one.
/// If the account cannot be updated the new attachment is removed again.
async fn attach_avatar(
    db: &mut DatabaseConnection,
    id: u64,
    avatar: &models::Attachment,
    previous: Option<u64>,
) -> ServiceResult<models::Account> {
    let updated = db
        .accounts()
        .update(
            id,
            AccountUpdate {
                avatar_id: Some(Some(avatar.id)),
                ..Default::default()
            },
        )
        .await
        .and_then(|account| account.ok_or(ServiceError::NotFound));

    let account = match updated {
        Ok(account) => account,
        Err(error) => {
            if let Err(e) = attachments::remove_file(db, avatar.id).await {
                warn!("Could not discard avatar upload {}: {}", avatar.id, e);
            }
            return Err(error);
        }
    };

    if let Some(previous) = previous {
        attachments::remove_file(db, previous).await?;
    }
    Ok(account)
}

fn upload_avatar_docs(op: TransformOperation) -> TransformOperation {
    op.description("Upload a new avatar image as multipart form data. Replaces the previous avatar.")
        .tag("accounts")
        .response::<200, Json<AccountDto>>()
        .response_with::<400, (), _>(|res| {
            res.description("Missing file, unsupported image type or file too large!")
        })
        .response_with::<404, (), _>(|res| res.description("The requested account does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin", "self"])
}

async fn delete_avatar(mut state: RequestState, Path(id): Path<u64>) -> ServiceResult<StatusCode> {
    state.session_require_admin_or_self(id)?;

    let account = state
        .db
        .accounts()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let avatar_id = account.avatar_id.ok_or(ServiceError::NotFound)?;

    state
        .db
        .accounts()
        .update(
            id,
            AccountUpdate {
                avatar_id: Some(None),
                ..Default::default()
            },
        )
        .await?;
    attachments::remove_file(&mut state.db, avatar_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn delete_avatar_docs(op: TransformOperation) -> TransformOperation {
    op.description("Remove the avatar image of an account.")
        .tag("accounts")
        .response_with::<204, (), _>(|res| res.description("The avatar was removed!"))
        .response_with::<404, (), _>(|res| {
            res.description("The account does not exist or has no avatar!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin", "self"])
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::PgPool;

    use super::*;
    use crate::database::filter::Where;
    use crate::models::{ROLE_ADMIN, ROLE_USER};

    fn session(role: &str) -> models::Session {
        models::Session {
            account: models::Account {
                id: 7,
                username: "jdoe".to_owned(),
                email: "jdoe@example.org".to_owned(),
                password: String::new(),
                role_id: 1,
                avatar_id: None,
            },
            role: models::Role {
                id: 1,
                name: role.to_owned(),
                description: String::new(),
            },
            token: "token".to_owned(),
            valid_until: Utc::now(),
        }
    }

    #[test]
    fn test_owners_cannot_change_role_or_avatar_reference() {
        let owner = session(ROLE_USER);
        let admin = session(ROLE_ADMIN);

        let email: AccountUpdate =
            serde_json::from_value(serde_json::json!({ "email": "new@example.org" })).unwrap();
        assert_eq!(require_admin_fields(&owner, &email), Ok(()));

        let avatar: AccountUpdate =
            serde_json::from_value(serde_json::json!({ "avatar_id": 42 })).unwrap();
        assert_eq!(require_admin_fields(&owner, &avatar), Err(ServiceError::Forbidden));
        assert_eq!(require_admin_fields(&admin, &avatar), Ok(()));

        let cleared: AccountUpdate =
            serde_json::from_value(serde_json::json!({ "avatar_id": null })).unwrap();
        assert_eq!(require_admin_fields(&owner, &cleared), Err(ServiceError::Forbidden));

        let role: AccountUpdate =
            serde_json::from_value(serde_json::json!({ "role_id": 1 })).unwrap();
        assert_eq!(require_admin_fields(&owner, &role), Err(ServiceError::Forbidden));
        assert_eq!(require_admin_fields(&admin, &role), Ok(()));
    }

    #[sqlx::test]
    async fn test_failed_avatar_update_discards_the_upload(pool: PgPool) {
        let app_state = AppState::from_pool(pool).await.unwrap();
        let mut db = app_state.connection().await.unwrap();

        let avatar = attachments::store_file(&mut db, "face.png", "image/png".to_owned(), b"png")
            .await
            .unwrap();
        assert!(avatar.path().exists());

        let result = attach_avatar(&mut db, 4711, &avatar, None).await;
        assert_eq!(result, Err(ServiceError::NotFound));
        assert_eq!(db.attachments().find_unique(avatar.id).await.unwrap(), None);
        assert!(!avatar.path().exists());
        assert_eq!(
            db.attachments().count(&Where::new(Default::default())).await.unwrap(),
            0
        );
    }

    #[test]
    fn test_account_dto_hides_password() {
        let account = models::Account {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.org".to_string(),
            password: "salt$hash".to_string(),
            role_id: 3,
            avatar_id: None,
        };

        let json = serde_json::to_value(AccountDto::from(&account)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "username": "alice",
                "email": "alice@example.org",
                "role_id": 3,
                "avatar_id": null,
            })
        );
    }

    #[test]
    fn test_password_is_not_deserialized_from_updates() {
        let update: AccountUpdate =
            serde_json::from_str(r#"{"email": "new@example.org", "password": "secret"}"#).unwrap();

        assert_eq!(update.email.as_deref(), Some("new@example.org"));
        assert_eq!(update.password, None);
        assert_eq!(update.avatar_id, None);
    }
}
