use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::schema::AppointmentCreate;
use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{self, Session};
use crate::request_state::{Access, RequestState};

use super::crud::{self, ApiModel};

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/appointments",
            crud::list_route::<models::Appointment>()
                .post_with(create_appointment, create_appointment_docs),
        )
        .api_route(
            "/appointment/:id",
            get_with(get_appointment, get_appointment_docs)
                .put_with(
                    crud::update::<models::Appointment>,
                    crud::update_docs::<models::Appointment>,
                )
                .delete_with(delete_appointment, delete_appointment_docs),
        );

    crud::query_routes::<models::Appointment>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct AppointmentDto {
    pub id: u64,
    pub patient_id: String,
    pub room_id: u64,
    pub user_id: u64,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

impl From<&models::Appointment> for AppointmentDto {
    fn from(value: &models::Appointment) -> Self {
        Self {
            id: value.id,
            patient_id: value.patient_id.to_owned(),
            room_id: value.room_id,
            user_id: value.user_id,
            from_time: value.from_time,
            to_time: value.to_time,
        }
    }
}

impl ApiModel for models::Appointment {
    type Dto = AppointmentDto;

    const NAME: &'static str = "appointment";
    const TAG: &'static str = "appointments";
    const ITEM_PATH: &'static str = "/appointment";
    const COLLECTION_PATH: &'static str = "/appointments";

    const READ: Access = Access::Staff;
    const WRITE: Access = Access::Staff;
}

/// Staff members may access all appointments, users only their own.
async fn require_staff_or_patient(
    state: &mut RequestState,
    user_id: u64,
) -> ServiceResult<Session> {
    let session = state.session_require()?;
    if Access::Staff.grants(&session) {
        return Ok(session);
    }

    let user = state.db.users().find_unique(user_id).await?;
    match user {
        Some(user) if user.account_id == session.account.id => Ok(session),
        _ => Err(ServiceError::Forbidden),
    }
}

async fn create_appointment(
    mut state: RequestState,
    form: Json<AppointmentCreate>,
) -> ServiceResult<Json<AppointmentDto>> {
    let form = form.0;
    require_staff_or_patient(&mut state, form.user_id).await?;

    let appointment = state.db.appointments().create(form).await?;
    Ok(Json(AppointmentDto::from(&appointment)))
}

fn create_appointment_docs(op: TransformOperation) -> TransformOperation {
    op.description("Create a new appointment. Users can only book appointments for themselves.")
        .tag("appointments")
        .response::<200, Json<AppointmentDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid time range!"))
        .response_with::<409, (), _>(|res| res.description("The room or user does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["staff", "self"])
}

async fn get_appointment(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<AppointmentDto>> {
    state.session_require()?;

    let appointment = state
        .db
        .appointments()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    require_staff_or_patient(&mut state, appointment.user_id).await?;

    Ok(Json(AppointmentDto::from(&appointment)))
}

fn get_appointment_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get an appointment by id.")
        .tag("appointments")
        .response::<200, Json<AppointmentDto>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested appointment does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["staff", "self"])
}

async fn delete_appointment(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<StatusCode> {
    state.session_require()?;

    let appointment = state
        .db
        .appointments()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    require_staff_or_patient(&mut state, appointment.user_id).await?;

    state.db.appointments().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn delete_appointment_docs(op: TransformOperation) -> TransformOperation {
    op.description("Cancel an appointment.")
        .tag("appointments")
        .response_with::<204, (), _>(|res| {
            res.description("The appointment was successfully deleted!")
        })
        .response_with::<404, (), _>(|res| {
            res.description("The requested appointment does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["staff", "self"])
}
