//! Table descriptions of all models: scalar field enums, filters and inputs.
use chrono::{DateTime, Utc};

use crate::error::{ServiceError, ServiceResult};

mod accounts;
mod appointments;
mod attachments;
mod departments;
mod medical_rooms;
mod positions;
mod roles;
mod shift_workings;
mod staff;
mod users;

pub use accounts::*;
pub use appointments::*;
pub use attachments::*;
pub use departments::*;
pub use medical_rooms::*;
pub use positions::*;
pub use roles::*;
pub use shift_workings::*;
pub use staff::*;
pub use users::*;

/// Checks that a time slot ends after it starts.
pub fn validate_time_range(from: DateTime<Utc>, to: DateTime<Utc>) -> ServiceResult<()> {
    if from >= to {
        return Err(ServiceError::BadRequest(
            "Invalid time range",
            format!("'from_time' ({}) must be before 'to_time' ({})", from, to),
        ));
    }
    Ok(())
}

fn validate_not_blank(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::BadRequest(
            "Missing value",
            format!("'{}' must not be empty", field),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::database::delegate::{Model, ScalarField};
    use crate::database::filter::{Assignment, NumberUpdate, Value};

    #[test]
    fn test_time_range() {
        let now = Utc::now();
        assert!(validate_time_range(now, now + Duration::hours(8)).is_ok());
        assert!(validate_time_range(now, now).is_err());
        assert!(validate_time_range(now, now - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_shift_create_requires_ordered_times() {
        let now = Utc::now();
        let shift = ShiftWorkingCreate {
            doctor_id: None,
            room_id: 1,
            from_time: now,
            to_time: now - Duration::hours(1),
        };
        assert!(matches!(
            crate::models::ShiftWorking::create_values(shift),
            Err(ServiceError::BadRequest(_, _))
        ));
    }

    #[test]
    fn test_appointment_times_are_optional() {
        let appointment = AppointmentCreate {
            patient_id: "P-0001".to_owned(),
            room_id: 3,
            user_id: 4,
            from_time: None,
            to_time: None,
        };
        let values = crate::models::Appointment::create_values(appointment).unwrap();
        assert_eq!(
            values,
            vec![
                ("patient_id", Value::Text(Some("P-0001".to_owned()))),
                ("room_id", Value::BigInt(Some(3))),
                ("user_id", Value::BigInt(Some(4))),
                ("from_time", Value::Timestamp(None)),
                ("to_time", Value::Timestamp(None)),
            ]
        );
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let role = RoleCreate {
            name: "  ".to_owned(),
            description: String::new(),
        };
        assert!(crate::models::Role::create_values(role).is_err());
    }

    #[test]
    fn test_account_update_can_clear_avatar() {
        let update: AccountUpdate =
            serde_json::from_value(serde_json::json!({ "avatar_id": null })).unwrap();
        assert_eq!(update.avatar_id, Some(None));

        let assignments = crate::models::Account::update_assignments(update).unwrap();
        assert_eq!(
            assignments,
            vec![Assignment::Set("avatar_id", Value::BigInt(None))]
        );

        let update: AccountUpdate = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(update.avatar_id, None);
        assert!(crate::models::Account::update_assignments(update)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_account_update_ignores_password_from_json() {
        let update: AccountUpdate = serde_json::from_value(serde_json::json!({
            "password": "plain text",
            "email": "new@example.org"
        }))
        .unwrap();
        assert_eq!(update.password, None);
        assert_eq!(update.email.as_deref(), Some("new@example.org"));
    }

    #[test]
    fn test_department_floor_update() {
        let update: DepartmentUpdate =
            serde_json::from_value(serde_json::json!({ "floor": { "increment": 1 } })).unwrap();
        assert_eq!(update.floor, Some(NumberUpdate::Increment(1)));
        assert_eq!(
            crate::models::Department::update_assignments(update).unwrap(),
            vec![Assignment::Increment("floor", Value::Int(Some(1)))]
        );
    }

    #[test]
    fn test_field_enums_cover_columns() {
        assert_eq!(AccountField::RoleId.column(), "role_id");
        assert!(!AccountField::ALL.iter().any(|f| f.column() == "password"));
        assert!(AttachmentField::Length.is_numeric());
        assert!(!AttachmentField::MediaType.is_numeric());
        assert_eq!(ShiftWorkingField::ALL.len(), 5);

        let field: MedicalRoomField = serde_json::from_value(serde_json::json!("department_id")).unwrap();
        assert_eq!(field, MedicalRoomField::DepartmentId);
    }
}
