use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::User;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Id,
    Firstname,
    Lastname,
    PhoneNumber,
    AccountId,
}

impl ScalarField for UserField {
    const ALL: &'static [Self] = &[
        UserField::Id,
        UserField::Firstname,
        UserField::Lastname,
        UserField::PhoneNumber,
        UserField::AccountId,
    ];

    fn column(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Firstname => "firstname",
            UserField::Lastname => "lastname",
            UserField::PhoneNumber => "phone_number",
            UserField::AccountId => "account_id",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, UserField::Id | UserField::AccountId)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserFilter {
    pub id: Option<IdFilter>,
    pub firstname: Option<StringFilter>,
    pub lastname: Option<StringFilter>,
    pub phone_number: Option<StringFilter>,
    pub account_id: Option<IdFilter>,
}

impl FieldFilters for UserFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.firstname.conditions("firstname"));
        conditions.extend(self.lastname.conditions("lastname"));
        conditions.extend(self.phone_number.conditions("phone_number"));
        conditions.extend(self.account_id.conditions("account_id"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct UserCreate {
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub phone_number: String,
    pub account_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct UserUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone_number: Option<String>,
}

impl Model for User {
    const TABLE: &'static str = "users";

    type Field = UserField;
    type Filter = UserFilter;
    type Create = UserCreate;
    type Update = UserUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: id_from_db(row.try_get("id")?),
            firstname: row.try_get("firstname")?,
            lastname: row.try_get("lastname")?,
            phone_number: row.try_get("phone_number")?,
            account_id: id_from_db(row.try_get("account_id")?),
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("firstname", &data.firstname)?;
        validate_not_blank("lastname", &data.lastname)?;

        Ok(vec![
            ("firstname", data.firstname.into()),
            ("lastname", data.lastname.into()),
            ("phone_number", data.phone_number.into()),
            ("account_id", data.account_id.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(firstname) = data.firstname {
            validate_not_blank("firstname", &firstname)?;
            assignments.push(Assignment::Set("firstname", firstname.into()));
        }
        if let Some(lastname) = data.lastname {
            validate_not_blank("lastname", &lastname)?;
            assignments.push(Assignment::Set("lastname", lastname.into()));
        }
        if let Some(phone_number) = data.phone_number {
            assignments.push(Assignment::Set("phone_number", phone_number.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, User> {
    pub async fn find_by_account(&mut self, account_id: u64) -> ServiceResult<Option<User>> {
        self.find_unique_by(UserField::AccountId, account_id).await
    }
}
