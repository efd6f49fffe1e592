use aide::axum::routing::{get_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::Path;
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::database::schema::StaffCreate;
use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models;
use crate::request_state::{Access, RequestState};

use super::accounts::AccountDto;
use super::crud::{self, ApiModel};
use super::departments::DepartmentDto;
use super::positions::PositionDto;
use super::shift_workings::ShiftWorkingDto;

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/staff",
            crud::list_route::<models::Staff>().post_with(create_staff, create_staff_docs),
        )
        .api_route("/staff/:id", crud::item_route::<models::Staff>())
        .api_route(
            "/staff/:id/details",
            get_with(get_staff_details, get_staff_details_docs),
        )
        .api_route(
            "/staff/:id/positions",
            put_with(set_staff_positions, set_staff_positions_docs),
        )
        .api_route(
            "/staff/:id/departments",
            put_with(set_staff_departments, set_staff_departments_docs),
        );

    crud::query_routes::<models::Staff>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct StaffDto {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub education_level: String,
    pub account_id: u64,
}

impl From<&models::Staff> for StaffDto {
    fn from(value: &models::Staff) -> Self {
        Self {
            id: value.id,
            firstname: value.firstname.to_owned(),
            lastname: value.lastname.to_owned(),
            education_level: value.education_level.to_owned(),
            account_id: value.account_id,
        }
    }
}

impl ApiModel for models::Staff {
    type Dto = StaffDto;

    const NAME: &'static str = "staff member";
    const TAG: &'static str = "staff";
    const ITEM_PATH: &'static str = "/staff";
    const COLLECTION_PATH: &'static str = "/staff";

    const READ: Access = Access::Session;
    /// Staff members cannot change their own profile, eg. the education level.
    const WRITE: Access = Access::Admin;
}

async fn create_staff(
    mut state: RequestState,
    form: Json<StaffCreate>,
) -> ServiceResult<Json<StaffDto>> {
    state.session_require_admin()?;

    let staff = state.db.create_staff(form.0).await?;
    Ok(Json(StaffDto::from(&staff)))
}

fn create_staff_docs(op: TransformOperation) -> TransformOperation {
    op.description("Create the staff profile of an account.")
        .tag("staff")
        .response::<200, Json<StaffDto>>()
        .response_with::<404, (), _>(|res| res.description("The account does not exist!"))
        .response_with::<409, (), _>(|res| {
            res.description("The account already has a staff or user profile!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin"])
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct StaffDetailsDto {
    #[serde(flatten)]
    pub staff: StaffDto,
    pub account: AccountDto,
    pub positions: Vec<PositionDto>,
    pub departments: Vec<DepartmentDto>,
    pub shifts: Vec<ShiftWorkingDto>,
}

async fn get_staff_details(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<StaffDetailsDto>> {
    state.session_require()?;

    let details = state
        .db
        .get_staff_details(id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Json(StaffDetailsDto {
        staff: StaffDto::from(&details.staff),
        account: AccountDto::from(&details.account),
        positions: details.positions.iter().map(|p| p.into()).collect(),
        departments: details.departments.iter().map(|d| d.into()).collect(),
        shifts: details.shifts.iter().map(|s| s.into()).collect(),
    }))
}

fn get_staff_details_docs(op: TransformOperation) -> TransformOperation {
    op.description("Get a staff member with account, positions, departments and shifts.")
        .tag("staff")
        .response::<200, Json<StaffDetailsDto>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested staff member does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
pub struct SetLinksDto {
    pub ids: Vec<u64>,
}

async fn set_staff_positions(
    mut state: RequestState,
    Path(id): Path<u64>,
    form: Json<SetLinksDto>,
) -> ServiceResult<Json<Vec<PositionDto>>> {
    state.session_require_admin()?;

    let positions = state.db.set_staff_positions(id, &form.0.ids).await?;
    Ok(Json(positions.iter().map(|p| p.into()).collect()))
}

fn set_staff_positions_docs(op: TransformOperation) -> TransformOperation {
    op.description("Replace all positions of a staff member.")
        .tag("staff")
        .response::<200, Json<Vec<PositionDto>>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested staff member does not exist!")
        })
        .response_with::<409, (), _>(|res| res.description("A position does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin"])
}

async fn set_staff_departments(
    mut state: RequestState,
    Path(id): Path<u64>,
    form: Json<SetLinksDto>,
) -> ServiceResult<Json<Vec<DepartmentDto>>> {
    state.session_require_admin()?;

    let departments = state.db.set_staff_departments(id, &form.0.ids).await?;
    Ok(Json(departments.iter().map(|d| d.into()).collect()))
}

fn set_staff_departments_docs(op: TransformOperation) -> TransformOperation {
    op.description("Replace all departments of a staff member.")
        .tag("staff")
        .response::<200, Json<Vec<DepartmentDto>>>()
        .response_with::<404, (), _>(|res| {
            res.description("The requested staff member does not exist!")
        })
        .response_with::<409, (), _>(|res| res.description("A department does not exist!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_profiles_have_no_owner_access() {
        let staff = models::Staff {
            id: 3,
            firstname: "Gregory".to_owned(),
            lastname: "House".to_owned(),
            education_level: "MD".to_owned(),
            account_id: 7,
        };
        assert_eq!(staff.owner_account(), None);
        assert_eq!(models::Staff::WRITE, Access::Admin);
    }
}
