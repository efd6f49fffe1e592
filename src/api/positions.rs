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
use super::staff::StaffDto;

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/positions",
            crud::list_route::<models::Position>().post_with(
                crud::create::<models::Position>,
                crud::create_docs::<models::Position>,
            ),
        )
        .api_route("/position/:id", crud::item_route::<models::Position>())
        .api_route(
            "/position/:id/staff",
            get_with(list_position_staff, list_position_staff_docs),
        );

    crud::query_routes::<models::Position>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct PositionDto {
    pub id: u64,
    pub name: String,
}

impl From<&models::Position> for PositionDto {
    fn from(value: &models::Position) -> Self {
        Self {
            id: value.id,
            name: value.name.to_owned(),
        }
    }
}

impl ApiModel for models::Position {
    type Dto = PositionDto;

    const NAME: &'static str = "position";
    const TAG: &'static str = "positions";
    const ITEM_PATH: &'static str = "/position";
    const COLLECTION_PATH: &'static str = "/positions";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}

async fn list_position_staff(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<Vec<StaffDto>>> {
    state.session_require()?;

    if state.db.positions().find_unique(id).await?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let staff = state.db.get_position_staff(id).await?;
    Ok(Json(staff.iter().map(|s| s.into()).collect()))
}

fn list_position_staff_docs(op: TransformOperation) -> TransformOperation {
    op.description("List all staff members holding a position.")
        .tag("positions")
        .response::<200, Json<Vec<StaffDto>>>()
        .response_with::<404, (), _>(|res| res.description("The requested position does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}
