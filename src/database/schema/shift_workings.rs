use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Model, ScalarField};
use crate::database::filter::{
    double_option, id_from_db, Assignment, Condition, DateTimeFilter, FieldFilter, FieldFilters,
    IdFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::ShiftWorking;

use super::validate_time_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShiftWorkingField {
    Id,
    DoctorId,
    RoomId,
    FromTime,
    ToTime,
}

impl ScalarField for ShiftWorkingField {
    const ALL: &'static [Self] = &[
        ShiftWorkingField::Id,
        ShiftWorkingField::DoctorId,
        ShiftWorkingField::RoomId,
        ShiftWorkingField::FromTime,
        ShiftWorkingField::ToTime,
    ];

    fn column(self) -> &'static str {
        match self {
            ShiftWorkingField::Id => "id",
            ShiftWorkingField::DoctorId => "doctor_id",
            ShiftWorkingField::RoomId => "room_id",
            ShiftWorkingField::FromTime => "from_time",
            ShiftWorkingField::ToTime => "to_time",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            ShiftWorkingField::Id | ShiftWorkingField::DoctorId | ShiftWorkingField::RoomId
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ShiftWorkingFilter {
    pub id: Option<IdFilter>,
    pub doctor_id: Option<IdFilter>,
    pub room_id: Option<IdFilter>,
    pub from_time: Option<DateTimeFilter>,
    pub to_time: Option<DateTimeFilter>,
}

impl FieldFilters for ShiftWorkingFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.doctor_id.conditions("doctor_id"));
        conditions.extend(self.room_id.conditions("room_id"));
        conditions.extend(self.from_time.conditions("from_time"));
        conditions.extend(self.to_time.conditions("to_time"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ShiftWorkingCreate {
    pub doctor_id: Option<u64>,
    pub room_id: u64,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
}

/// Partial update, the time range is checked against the stored row by the database.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct ShiftWorkingUpdate {
    #[serde(default, deserialize_with = "double_option")]
    #[schemars(with = "Option<u64>")]
    pub doctor_id: Option<Option<u64>>,
    pub room_id: Option<u64>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

impl Model for ShiftWorking {
    const TABLE: &'static str = "shift_workings";

    type Field = ShiftWorkingField;
    type Filter = ShiftWorkingFilter;
    type Create = ShiftWorkingCreate;
    type Update = ShiftWorkingUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(ShiftWorking {
            id: id_from_db(row.try_get("id")?),
            doctor_id: row.try_get::<Option<i64>, _>("doctor_id")?.map(id_from_db),
            room_id: id_from_db(row.try_get("room_id")?),
            from_time: row.try_get("from_time")?,
            to_time: row.try_get("to_time")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_time_range(data.from_time, data.to_time)?;

        Ok(vec![
            ("doctor_id", data.doctor_id.into()),
            ("room_id", data.room_id.into()),
            ("from_time", data.from_time.into()),
            ("to_time", data.to_time.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        if let (Some(from_time), Some(to_time)) = (data.from_time, data.to_time) {
            validate_time_range(from_time, to_time)?;
        }

        let mut assignments = Vec::new();
        if let Some(doctor_id) = data.doctor_id {
            assignments.push(Assignment::Set("doctor_id", doctor_id.into()));
        }
        if let Some(room_id) = data.room_id {
            assignments.push(Assignment::Set("room_id", room_id.into()));
        }
        if let Some(from_time) = data.from_time {
            assignments.push(Assignment::Set("from_time", from_time.into()));
        }
        if let Some(to_time) = data.to_time {
            assignments.push(Assignment::Set("to_time", to_time.into()));
        }
        Ok(assignments)
    }
}
