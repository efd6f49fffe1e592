use aide::axum::ApiRouter;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::AppState;
use crate::models;
use crate::request_state::Access;

use super::crud::{self, ApiModel};

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/shift-workings",
            crud::list_route::<models::ShiftWorking>().post_with(
                crud::create::<models::ShiftWorking>,
                crud::create_docs::<models::ShiftWorking>,
            ),
        )
        .api_route(
            "/shift-working/:id",
            crud::item_route::<models::ShiftWorking>(),
        );

    crud::query_routes::<models::ShiftWorking>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct ShiftWorkingDto {
    pub id: u64,
    pub doctor_id: Option<u64>,
    pub room_id: u64,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
}

impl From<&models::ShiftWorking> for ShiftWorkingDto {
    fn from(value: &models::ShiftWorking) -> Self {
        Self {
            id: value.id,
            doctor_id: value.doctor_id,
            room_id: value.room_id,
            from_time: value.from_time,
            to_time: value.to_time,
        }
    }
}

impl ApiModel for models::ShiftWorking {
    type Dto = ShiftWorkingDto;

    const NAME: &'static str = "shift";
    const TAG: &'static str = "shift_workings";
    const ITEM_PATH: &'static str = "/shift-working";
    const COLLECTION_PATH: &'static str = "/shift-workings";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}
