use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Role;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleField {
    Id,
    Name,
    Description,
}

impl ScalarField for RoleField {
    const ALL: &'static [Self] = &[RoleField::Id, RoleField::Name, RoleField::Description];

    fn column(self) -> &'static str {
        match self {
            RoleField::Id => "id",
            RoleField::Name => "name",
            RoleField::Description => "description",
        }
    }

    fn is_numeric(self) -> bool {
        self == RoleField::Id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RoleFilter {
    pub id: Option<IdFilter>,
    pub name: Option<StringFilter>,
    pub description: Option<StringFilter>,
}

impl FieldFilters for RoleFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.name.conditions("name"));
        conditions.extend(self.description.conditions("description"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct RoleCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Model for Role {
    const TABLE: &'static str = "roles";

    type Field = RoleField;
    type Filter = RoleFilter;
    type Create = RoleCreate;
    type Update = RoleUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Role {
            id: id_from_db(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("name", &data.name)?;

        Ok(vec![
            ("name", data.name.into()),
            ("description", data.description.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(name) = data.name {
            validate_not_blank("name", &name)?;
            assignments.push(Assignment::Set("name", name.into()));
        }
        if let Some(description) = data.description {
            assignments.push(Assignment::Set("description", description.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, Role> {
    pub async fn find_by_name(&mut self, name: &str) -> ServiceResult<Option<Role>> {
        self.find_unique_by(RoleField::Name, name.to_owned()).await
    }
}
