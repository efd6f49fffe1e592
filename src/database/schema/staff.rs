use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Staff;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaffField {
    Id,
    Firstname,
    Lastname,
    EducationLevel,
    AccountId,
}

impl ScalarField for StaffField {
    const ALL: &'static [Self] = &[
        StaffField::Id,
        StaffField::Firstname,
        StaffField::Lastname,
        StaffField::EducationLevel,
        StaffField::AccountId,
    ];

    fn column(self) -> &'static str {
        match self {
            StaffField::Id => "id",
            StaffField::Firstname => "firstname",
            StaffField::Lastname => "lastname",
            StaffField::EducationLevel => "education_level",
            StaffField::AccountId => "account_id",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, StaffField::Id | StaffField::AccountId)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StaffFilter {
    pub id: Option<IdFilter>,
    pub firstname: Option<StringFilter>,
    pub lastname: Option<StringFilter>,
    pub education_level: Option<StringFilter>,
    pub account_id: Option<IdFilter>,
}

impl FieldFilters for StaffFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.firstname.conditions("firstname"));
        conditions.extend(self.lastname.conditions("lastname"));
        conditions.extend(self.education_level.conditions("education_level"));
        conditions.extend(self.account_id.conditions("account_id"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct StaffCreate {
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub education_level: String,
    pub account_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct StaffUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub education_level: Option<String>,
}

impl Model for Staff {
    const TABLE: &'static str = "staff";

    type Field = StaffField;
    type Filter = StaffFilter;
    type Create = StaffCreate;
    type Update = StaffUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Staff {
            id: id_from_db(row.try_get("id")?),
            firstname: row.try_get("firstname")?,
            lastname: row.try_get("lastname")?,
            education_level: row.try_get("education_level")?,
            account_id: id_from_db(row.try_get("account_id")?),
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("firstname", &data.firstname)?;
        validate_not_blank("lastname", &data.lastname)?;

        Ok(vec![
            ("firstname", data.firstname.into()),
            ("lastname", data.lastname.into()),
            ("education_level", data.education_level.into()),
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
        if let Some(education_level) = data.education_level {
            assignments.push(Assignment::Set("education_level", education_level.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, Staff> {
    pub async fn find_by_account(&mut self, account_id: u64) -> ServiceResult<Option<Staff>> {
        self.find_unique_by(StaffField::AccountId, account_id).await
    }
}
