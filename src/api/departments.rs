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

use super::crud::{self, ApiModel};
use super::medical_rooms::MedicalRoomDto;
use super::staff::StaffDto;

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/departments",
            crud::list_route::<models::Department>().post_with(
                crud::create::<models::Department>,
                crud::create_docs::<models::Department>,
            ),
        )
        .api_route("/department/:id", crud::item_route::<models::Department>())
        .api_route(
            "/department/:id/details",
            get_with(get_department_details, get_department_details_docs),
        );

    crud::query_routes::<models::Department>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct DepartmentDto {
    pub id: u64,
    pub symbol: String,
    pub floor: i32,
    pub name: String,
}

impl From<&models::Department> for DepartmentDto {
    fn from(value: &models::Department) -> Self {
        Self {
            id: value.id,
            symbol: value.symbol.to_owned(),
            floor: value.floor,
            name: value.name.to_owned(),
        }
    }
}

impl ApiModel for models::Department {
    type Dto = DepartmentDto;

    const NAME: &'static str = "department";
    const TAG: &'static str = "departments";
    const ITEM_PATH: &'static str = "/department";
    const COLLECTION_PATH: &'static str = "/departments";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct DepartmentDetailsDto {
    #[serde(flatten)]
    pub department: DepartmentDto,
    pub rooms: Vec<MedicalRoomDto>,
    pub staff: Vec<StaffDto>,
}

async fn get_department_details(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<DepartmentDetailsDto>> {
    state.session_require()?;

    let details = state
        .db
        .get_department_details(id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Json(DepartmentDetailsDto {
        department: DepartmentDto::from(&details.department),
        rooms: details.rooms.iter().map(|r| r.into()).collect(),
        staff: details.staff.iter().map(|s| s.into()).collect(),
    }))
}

fn get_department_details_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get a department with its medical rooms and assigned staff.")
        .tag("departments")
        .response::<200, Json<DepartmentDetailsDto>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested department does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}
