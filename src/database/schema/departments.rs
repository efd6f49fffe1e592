use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Delegate, Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, IntFilter,
    NumberUpdate, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Department;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentField {
    Id,
    Symbol,
    Floor,
    Name,
}

impl ScalarField for DepartmentField {
    const ALL: &'static [Self] = &[
        DepartmentField::Id,
        DepartmentField::Symbol,
        DepartmentField::Floor,
        DepartmentField::Name,
    ];

    fn column(self) -> &'static str {
        match self {
            DepartmentField::Id => "id",
            DepartmentField::Symbol => "symbol",
            DepartmentField::Floor => "floor",
            DepartmentField::Name => "name",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, DepartmentField::Id | DepartmentField::Floor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DepartmentFilter {
    pub id: Option<IdFilter>,
    pub symbol: Option<StringFilter>,
    pub floor: Option<IntFilter>,
    pub name: Option<StringFilter>,
}

impl FieldFilters for DepartmentFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.symbol.conditions("symbol"));
        conditions.extend(self.floor.conditions("floor"));
        conditions.extend(self.name.conditions("name"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct DepartmentCreate {
    pub symbol: String,
    pub floor: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct DepartmentUpdate {
    pub symbol: Option<String>,
    pub floor: Option<NumberUpdate<i32>>,
    pub name: Option<String>,
}

impl Model for Department {
    const TABLE: &'static str = "departments";

    type Field = DepartmentField;
    type Filter = DepartmentFilter;
    type Create = DepartmentCreate;
    type Update = DepartmentUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Department {
            id: id_from_db(row.try_get("id")?),
            symbol: row.try_get("symbol")?,
            floor: row.try_get("floor")?,
            name: row.try_get("name")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("symbol", &data.symbol)?;
        validate_not_blank("name", &data.name)?;

        Ok(vec![
            ("symbol", data.symbol.into()),
            ("floor", data.floor.into()),
            ("name", data.name.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(symbol) = data.symbol {
            validate_not_blank("symbol", &symbol)?;
            assignments.push(Assignment::Set("symbol", symbol.into()));
        }
        if let Some(floor) = data.floor {
            assignments.push(floor.assignment("floor")?);
        }
        if let Some(name) = data.name {
            validate_not_blank("name", &name)?;
            assignments.push(Assignment::Set("name", name.into()));
        }
        Ok(assignments)
    }
}

impl Delegate<'_, Department> {
    pub async fn find_by_symbol(&mut self, symbol: &str) -> ServiceResult<Option<Department>> {
        self.find_unique_by(DepartmentField::Symbol, symbol.to_owned())
            .await
    }
}
