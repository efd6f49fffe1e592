use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::Path;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models;
use crate::request_state::{Access, RequestState};

use super::appointments::AppointmentDto;
use super::crud::{self, ApiModel};
use super::departments::DepartmentDto;
use super::shift_workings::ShiftWorkingDto;

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/medical-rooms",
            crud::list_route::<models::MedicalRoom>().post_with(
                crud::create::<models::MedicalRoom>,
                crud::create_docs::<models::MedicalRoom>,
            ),
        )
        .api_route("/medical-room/:id", crud::item_route::<models::MedicalRoom>())
        .api_route(
            "/medical-room/:id/details",
            get_with(get_medical_room_details, get_medical_room_details_docs),
        );

    crud::query_routes::<models::MedicalRoom>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct MedicalRoomDto {
    pub id: u64,
    pub floor: i32,
    pub name: String,
    pub department_id: u64,
}

impl From<&models::MedicalRoom> for MedicalRoomDto {
    fn from(value: &models::MedicalRoom) -> Self {
        Self {
            id: value.id,
            floor: value.floor,
            name: value.name.to_owned(),
            department_id: value.department_id,
        }
    }
}

impl ApiModel for models::MedicalRoom {
    type Dto = MedicalRoomDto;

    const NAME: &'static str = "medical room";
    const TAG: &'static str = "medical_rooms";
    const ITEM_PATH: &'static str = "/medical-room";
    const COLLECTION_PATH: &'static str = "/medical-rooms";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct MedicalRoomDetailsDto {
    #[serde(flatten)]
    pub room: MedicalRoomDto,
    pub department: DepartmentDto,
    pub shifts: Vec<ShiftWorkingDto>,
    /// Only visible for staff members.
    pub appointments: Vec<AppointmentDto>,
}

async fn get_medical_room_details(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<MedicalRoomDetailsDto>> {
    let session = state.session_require()?;

    let details = state
        .db
        .get_medical_room_details(id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let appointments = if Access::Staff.grants(&session) {
        details.appointments.iter().map(|a| a.into()).collect()
    } else {
        Vec::new()
    };

    Ok(Json(MedicalRoomDetailsDto {
        room: MedicalRoomDto::from(&details.room),
        department: DepartmentDto::from(&details.department),
        shifts: details.shifts.iter().map(|s| s.into()).collect(),
        appointments,
    }))
}

fn get_medical_room_details_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get a medical room with its department, shifts and appointments.")
        .tag("medical_rooms")
        .response::<200, Json<MedicalRoomDetailsDto>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested medical room does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}
