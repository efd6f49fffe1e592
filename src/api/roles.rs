use aide::axum::ApiRouter;
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::AppState;
use crate::models;
use crate::request_state::Access;

use super::crud::{self, ApiModel};

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/roles",
            crud::list_route::<models::Role>()
                .post_with(crud::create::<models::Role>, crud::create_docs::<models::Role>),
        )
        .api_route("/role/:id", crud::item_route::<models::Role>());

    crud::query_routes::<models::Role>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct RoleDto {
    pub id: u64,
    pub name: String,
    pub description: String,
}

impl From<&models::Role> for RoleDto {
    fn from(value: &models::Role) -> Self {
        Self {
            id: value.id,
            name: value.name.to_owned(),
            description: value.description.to_owned(),
        }
    }
}

impl ApiModel for models::Role {
    type Dto = RoleDto;

    const NAME: &'static str = "role";
    const TAG: &'static str = "roles";
    const ITEM_PATH: &'static str = "/role";
    const COLLECTION_PATH: &'static str = "/roles";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}
