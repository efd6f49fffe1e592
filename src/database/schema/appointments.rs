use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Model, ScalarField};
use crate::database::filter::{
    double_option, id_from_db, Assignment, Condition, DateTimeFilter, FieldFilter, FieldFilters,
    IdFilter, StringFilter, Value,
};
use crate::error::ServiceResult;
use crate::models::Appointment;

use super::{validate_not_blank, validate_time_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentField {
    Id,
    PatientId,
    RoomId,
    UserId,
    FromTime,
    ToTime,
}

impl ScalarField for AppointmentField {
    const ALL: &'static [Self] = &[
        AppointmentField::Id,
        AppointmentField::PatientId,
        AppointmentField::RoomId,
        AppointmentField::UserId,
        AppointmentField::FromTime,
        AppointmentField::ToTime,
    ];

    fn column(self) -> &'static str {
        match self {
            AppointmentField::Id => "id",
            AppointmentField::PatientId => "patient_id",
            AppointmentField::RoomId => "room_id",
            AppointmentField::UserId => "user_id",
            AppointmentField::FromTime => "from_time",
            AppointmentField::ToTime => "to_time",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            AppointmentField::Id | AppointmentField::RoomId | AppointmentField::UserId
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AppointmentFilter {
    pub id: Option<IdFilter>,
    pub patient_id: Option<StringFilter>,
    pub room_id: Option<IdFilter>,
    pub user_id: Option<IdFilter>,
    pub from_time: Option<DateTimeFilter>,
    pub to_time: Option<DateTimeFilter>,
}

impl FieldFilters for AppointmentFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.patient_id.conditions("patient_id"));
        conditions.extend(self.room_id.conditions("room_id"));
        conditions.extend(self.user_id.conditions("user_id"));
        conditions.extend(self.from_time.conditions("from_time"));
        conditions.extend(self.to_time.conditions("to_time"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct AppointmentCreate {
    pub patient_id: String,
    pub room_id: u64,
    pub user_id: u64,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct AppointmentUpdate {
    pub patient_id: Option<String>,
    pub room_id: Option<u64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub from_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub to_time: Option<Option<DateTime<Utc>>>,
}

impl Model for Appointment {
    const TABLE: &'static str = "appointments";

    type Field = AppointmentField;
    type Filter = AppointmentFilter;
    type Create = AppointmentCreate;
    type Update = AppointmentUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Appointment {
            id: id_from_db(row.try_get("id")?),
            patient_id: row.try_get("patient_id")?,
            room_id: id_from_db(row.try_get("room_id")?),
            user_id: id_from_db(row.try_get("user_id")?),
            from_time: row.try_get("from_time")?,
            to_time: row.try_get("to_time")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("patient_id", &data.patient_id)?;
        if let (Some(from_time), Some(to_time)) = (data.from_time, data.to_time) {
            validate_time_range(from_time, to_time)?;
        }

        Ok(vec![
            ("patient_id", data.patient_id.into()),
            ("room_id", data.room_id.into()),
            ("user_id", data.user_id.into()),
            ("from_time", data.from_time.into()),
            ("to_time", data.to_time.into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        if let (Some(Some(from_time)), Some(Some(to_time))) = (data.from_time, data.to_time) {
            validate_time_range(from_time, to_time)?;
        }

        let mut assignments = Vec::new();
        if let Some(patient_id) = data.patient_id {
            validate_not_blank("patient_id", &patient_id)?;
            assignments.push(Assignment::Set("patient_id", patient_id.into()));
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
