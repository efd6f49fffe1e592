use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Position;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PositionField {
    Id,
    Name,
}

impl ScalarField for PositionField {
    const ALL: &'static [Self] = &[PositionField::Id, PositionField::Name];

    fn column(self) -> &'static str {
        match self {
            PositionField::Id => "id",
            PositionField::Name => "name",
        }
    }

    fn is_numeric(self) -> bool {
        self == PositionField::Id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PositionFilter {
    pub id: Option<IdFilter>,
    pub name: Option<StringFilter>,
}

impl FieldFilters for PositionFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.name.conditions("name"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct PositionCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct PositionUpdate {
    pub name: Option<String>,
}

impl Model for Position {
    const TABLE: &'static str = "positions";

    type Field = PositionField;
    type Filter = PositionFilter;
    type Create = PositionCreate;
    type Update = PositionUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Position {
            id: id_from_db(row.try_get("id")?),
            name: row.try_get("name")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("name", &data.name)?;
        Ok(vec![("name", data.name.into())])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(name) = data.name {
            validate_not_blank("name", &name)?;
            assignments.push(Assignment::Set("name", name.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, Position> {
    pub async fn find_by_name(&mut self, name: &str) -> ServiceResult<Option<Position>> {
        self.find_unique_by(PositionField::Name, name.to_owned()).await
    }
}
