use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    double_option, id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter,
    StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Account;

use super::validate_not_blank;

/// Selectable columns of `accounts`. The password hash is deliberately not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountField {
    Id,
    Username,
    Email,
    RoleId,
    AvatarId,
}

impl ScalarField for AccountField {
    const ALL: &'static [Self] = &[
        AccountField::Id,
        AccountField::Username,
        AccountField::Email,
        AccountField::RoleId,
        AccountField::AvatarId,
    ];

    fn column(self) -> &'static str {
        match self {
            AccountField::Id => "id",
            AccountField::Username => "username",
            AccountField::Email => "email",
            AccountField::RoleId => "role_id",
            AccountField::AvatarId => "avatar_id",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            AccountField::Id | AccountField::RoleId | AccountField::AvatarId
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AccountFilter {
    pub id: Option<IdFilter>,
    pub username: Option<StringFilter>,
    pub email: Option<StringFilter>,
    pub role_id: Option<IdFilter>,
    pub avatar_id: Option<IdFilter>,
}

impl FieldFilters for AccountFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.username.conditions("username"));
        conditions.extend(self.email.conditions("email"));
        conditions.extend(self.role_id.conditions("role_id"));
        conditions.extend(self.avatar_id.conditions("avatar_id"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountCreate {
    pub username: String,
    pub email: String,
    /// Already hashed password.
    pub password: String,
    pub role_id: u64,
    pub avatar_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Already hashed password, can only be set from code.
    #[serde(skip)]
    pub password: Option<String>,
    pub role_id: Option<u64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schemars(with = "Option<u64>")]
    pub avatar_id: Option<Option<u64>>,
}

impl Model for Account {
    const TABLE: &'static str = "accounts";

    type Field = AccountField;
    type Filter = AccountFilter;
    type Create = AccountCreate;
    type Update = AccountUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Account {
            id: id_from_db(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role_id: id_from_db(row.try_get("role_id")?),
            avatar_id: row.try_get::<Option<i64>, _>("avatar_id")?.map(id_from_db),
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("username", &data.username)?;
        validate_not_blank("email", &data.email)?;

        Ok(vec![
            ("username", data.username.into()),
            ("email", data.email.into()),
            ("password", data.password.into()),
            ("role_id", data.role_id.into()),
            ("avatar_id", data.avatar_id.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(username) = data.username {
            validate_not_blank("username", &username)?;
            assignments.push(Assignment::Set("username", username.into()));
        }
        if let Some(email) = data.email {
            validate_not_blank("email", &email)?;
            assignments.push(Assignment::Set("email", email.into()));
        }
        if let Some(password) = data.password {
            assignments.push(Assignment::Set("password", password.into()));
        }
        if let Some(role_id) = data.role_id {
            assignments.push(Assignment::Set("role_id", role_id.into()));
        }
        if let Some(avatar_id) = data.avatar_id {
            assignments.push(Assignment::Set("avatar_id", avatar_id.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, Account> {
    pub async fn find_by_username(&mut self, username: &str) -> ServiceResult<Option<Account>> {
        self.find_unique_by(AccountField::Username, username.to_owned())
            .await
    }

    pub async fn find_by_email(&mut self, email: &str) -> ServiceResult<Option<Account>> {
        self.find_unique_by(AccountField::Email, email.to_owned()).await
    }
}
