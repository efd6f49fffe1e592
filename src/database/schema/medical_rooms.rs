use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, Condition, FieldFilter, FieldFilters, IdFilter, IntFilter,
    NumberUpdate, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::MedicalRoom;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MedicalRoomField {
    Id,
    Floor,
    Name,
    DepartmentId,
}

impl ScalarField for MedicalRoomField {
    const ALL: &'static [Self] = &[
        MedicalRoomField::Id,
        MedicalRoomField::Floor,
        MedicalRoomField::Name,
        MedicalRoomField::DepartmentId,
    ];

    fn column(self) -> &'static str {
        match self {
            MedicalRoomField::Id => "id",
            MedicalRoomField::Floor => "floor",
            MedicalRoomField::Name => "name",
            MedicalRoomField::DepartmentId => "department_id",
        }
    }

    fn is_numeric(self) -> bool {
        self != MedicalRoomField::Name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MedicalRoomFilter {
    pub id: Option<IdFilter>,
    pub floor: Option<IntFilter>,
    pub name: Option<StringFilter>,
    pub department_id: Option<IdFilter>,
}

impl FieldFilters for MedicalRoomFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.floor.conditions("floor"));
        conditions.extend(self.name.conditions("name"));
        conditions.extend(self.department_id.conditions("department_id"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct MedicalRoomCreate {
    pub floor: i32,
    pub name: String,
    pub department_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct MedicalRoomUpdate {
    pub floor: Option<NumberUpdate<i32>>,
    pub name: Option<String>,
    pub department_id: Option<u64>,
}

impl Model for MedicalRoom {
    const TABLE: &'static str = "medical_rooms";

    type Field = MedicalRoomField;
    type Filter = MedicalRoomFilter;
    type Create = MedicalRoomCreate;
    type Update = MedicalRoomUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(MedicalRoom {
            id: id_from_db(row.try_get("id")?),
            floor: row.try_get("floor")?,
            name: row.try_get("name")?,
            department_id: id_from_db(row.try_get("department_id")?),
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("name", &data.name)?;

        Ok(vec![
            ("floor", data.floor.into()),
            ("name", data.name.into()),
            ("department_id", data.department_id.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(floor) = data.floor {
            assignments.push(floor.assignment("floor")?);
        }
        if let Some(name) = data.name {
            validate_not_blank("name", &name)?;
            assignments.push(Assignment::Set("name", name.into()));
        }
        if let Some(department_id) = data.department_id {
            assignments.push(Assignment::Set("department_id", department_id.into()));
        }
        Ok(assignments)
    }
}
