//! Routes shared by all models: list, item access and the query endpoints.
//!
//! Entity modules compose these with their own routes, see eg. `departments.rs`.
use aide::axum::routing::{get_with, post_with, ApiMethodRouter};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::database::delegate::{
    Aggregate, AggregateResult, FindMany, FindManyArgs, GroupBy, GroupByRow,
};
use crate::database::filter::{FieldFilters, Where};
use crate::database::{AppState, Model};
use crate::error::{ServiceError, ServiceResult};
use crate::request_state::{Access, RequestState};

/// Exposes a model over the generic routes.
pub trait ApiModel: Model + 'static {
    type Dto: Serialize + JsonSchema + Send + for<'a> From<&'a Self>;

    /// Readable name used in the documentation.
    const NAME: &'static str;
    const TAG: &'static str;
    /// Path of a single record, eg. `/department`.
    const ITEM_PATH: &'static str;
    /// Path of the collection, eg. `/departments`.
    const COLLECTION_PATH: &'static str;

    const READ: Access;
    const WRITE: Access;

    /// Account that may read and change this record besides `READ` and `WRITE`.
    fn owner_account(&self) -> Option<u64> {
        None
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "W: FieldFilters + Default + DeserializeOwned"))]
pub struct CountArgsDto<W> {
    #[serde(rename = "where")]
    pub filter: Option<Where<W>>,
}

/// Bulk operations require an explicit filter, `{}` matches all records.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "W: FieldFilters + Default + DeserializeOwned, U: Deserialize<'de>"))]
pub struct UpdateManyDto<W, U> {
    #[serde(rename = "where")]
    pub filter: Where<W>,
    pub data: U,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "W: FieldFilters + Default + DeserializeOwned"))]
pub struct DeleteManyDto<W> {
    #[serde(rename = "where")]
    pub filter: Where<W>,
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct CountDto {
    pub count: u64,
}

fn to_dtos<M: ApiModel>(records: &[M]) -> Vec<M::Dto> {
    records.iter().map(|record| M::Dto::from(record)).collect()
}

/// Allows callers with `access` or the owner of `record`.
fn require_access_or_owner<M: ApiModel>(
    state: &RequestState,
    access: Access,
    record: &M,
) -> ServiceResult<()> {
    let session = state.session_require()?;
    if access.grants(&session) || record.owner_account() == Some(session.account.id) {
        return Ok(());
    }
    Err(ServiceError::Forbidden)
}

fn with_auth_responses(op: TransformOperation, access: Access) -> TransformOperation {
    let scope = match access {
        Access::Session => "session",
        Access::Staff => "staff",
        Access::Admin => "admin",
    };
    op.response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", [scope])
}

pub fn list_route<M: ApiModel>() -> ApiMethodRouter<AppState> {
    get_with(list::<M>, list_docs::<M>)
}

pub fn item_route<M: ApiModel>() -> ApiMethodRouter<AppState> {
    get_with(get::<M>, get_docs::<M>)
        .put_with(update::<M>, update_docs::<M>)
        .delete_with(delete::<M>, delete_docs::<M>)
}

/// Registers `query`, `count`, `aggregate`, `group-by`, `update-many` and `delete-many`.
pub fn query_routes<M: ApiModel>(router: ApiRouter<AppState>) -> ApiRouter<AppState> {
    search_routes::<M>(router).api_route(
        &format!("{}/delete-many", M::COLLECTION_PATH),
        post_with(delete_many::<M>, delete_many_docs::<M>),
    )
}

/// [`query_routes`] without `delete-many`, for models that own resources outside the database.
pub fn search_routes<M: ApiModel>(router: ApiRouter<AppState>) -> ApiRouter<AppState> {
    let path = M::COLLECTION_PATH;
    router
        .api_route(
            &format!("{}/query", path),
            post_with(query::<M>, query_docs::<M>),
        )
        .api_route(
            &format!("{}/count", path),
            post_with(count::<M>, count_docs::<M>),
        )
        .api_route(
            &format!("{}/aggregate", path),
            post_with(aggregate::<M>, aggregate_docs::<M>),
        )
        .api_route(
            &format!("{}/group-by", path),
            post_with(group_by::<M>, group_by_docs::<M>),
        )
        .api_route(
            &format!("{}/update-many", path),
            post_with(update_many::<M>, update_many_docs::<M>),
        )
}

pub async fn list<M: ApiModel>(mut state: RequestState) -> ServiceResult<Json<Vec<M::Dto>>> {
    state.session_require_access(M::READ)?;

    let records = state.db.model::<M>().find_many(FindManyArgs::default()).await?;
    Ok(Json(to_dtos(&records)))
}

pub fn list_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("List all {}s.", M::NAME))
        .tag(M::TAG)
        .response::<200, Json<Vec<M::Dto>>>();
    with_auth_responses(op, M::READ)
}

pub async fn create<M>(
    mut state: RequestState,
    form: Json<M::Create>,
) -> ServiceResult<Json<M::Dto>>
where
    M: ApiModel,
    M::Create: DeserializeOwned + JsonSchema,
{
    state.session_require_access(M::WRITE)?;

    let record = state.db.model::<M>().create(form.0).await?;
    Ok(Json(M::Dto::from(&record)))
}

pub fn create_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("Create a new {}.", M::NAME))
        .tag(M::TAG)
        .response::<200, Json<M::Dto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid input!"))
        .response_with::<409, (), _>(|res| {
            res.description("A unique or foreign key constraint was violated!")
        });
    with_auth_responses(op, M::WRITE)
}

pub async fn get<M: ApiModel>(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<Json<M::Dto>> {
    state.session_require()?;

    let record = state
        .db
        .model::<M>()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    require_access_or_owner(&state, M::READ, &record)?;

    Ok(Json(M::Dto::from(&record)))
}

pub fn get_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("Get a {} by id.", M::NAME))
        .tag(M::TAG)
        .response::<200, Json<M::Dto>>()
        .response_with::<404, (), _>(|res| res.description("The requested record does not exist!"));
    with_auth_responses(op, M::READ)
}

pub async fn update<M: ApiModel>(
    mut state: RequestState,
    Path(id): Path<u64>,
    form: Json<M::Update>,
) -> ServiceResult<Json<M::Dto>> {
    state.session_require()?;

    let record = state
        .db
        .model::<M>()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    require_access_or_owner(&state, M::WRITE, &record)?;

    let record = state
        .db
        .model::<M>()
        .update(id, form.0)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(M::Dto::from(&record)))
}

pub fn update_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!(
            "Update an existing {}. Omitted fields are left unchanged.",
            M::NAME
        ))
        .tag(M::TAG)
        .response::<200, Json<M::Dto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid input!"))
        .response_with::<404, (), _>(|res| res.description("The requested record does not exist!"))
        .response_with::<409, (), _>(|res| {
            res.description("A unique or foreign key constraint was violated!")
        });
    with_auth_responses(op, M::WRITE)
}

pub async fn delete<M: ApiModel>(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<StatusCode> {
    state.session_require_access(M::WRITE)?;

    state
        .db
        .model::<M>()
        .delete(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn delete_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("Delete an existing {}.", M::NAME))
        .tag(M::TAG)
        .response_with::<204, (), _>(|res| res.description("The record was successfully deleted!"))
        .response_with::<404, (), _>(|res| res.description("The requested record does not exist!"))
        .response_with::<409, (), _>(|res| res.description("The record is still referenced!"));
    with_auth_responses(op, M::WRITE)
}

async fn query<M: ApiModel>(
    mut state: RequestState,
    form: Json<FindMany<M>>,
) -> ServiceResult<Json<Vec<M::Dto>>> {
    state.session_require_access(M::READ)?;

    let records = state.db.model::<M>().find_many(form.0).await?;
    Ok(Json(to_dtos(&records)))
}

fn query_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!(
            "Find {}s matching a filter, with ordering, pagination and distinct fields.",
            M::NAME
        ))
        .tag(M::TAG)
        .response::<200, Json<Vec<M::Dto>>>()
        .response_with::<400, (), _>(|res| res.description("Invalid query!"));
    with_auth_responses(op, M::READ)
}

async fn count<M: ApiModel>(
    mut state: RequestState,
    form: Json<CountArgsDto<M::Filter>>,
) -> ServiceResult<Json<CountDto>> {
    state.session_require_access(M::READ)?;

    let filter = form.0.filter.unwrap_or_else(|| Where::new(Default::default()));
    let count = state.db.model::<M>().count(&filter).await?;
    Ok(Json(CountDto { count }))
}

fn count_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("Count {}s matching a filter.", M::NAME))
        .tag(M::TAG)
        .response::<200, Json<CountDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid filter!"));
    with_auth_responses(op, M::READ)
}

async fn aggregate<M: ApiModel>(
    mut state: RequestState,
    form: Json<Aggregate<M>>,
) -> ServiceResult<Json<AggregateResult>> {
    state.session_require_access(M::READ)?;

    let result = state.db.model::<M>().aggregate(&form.0).await?;
    Ok(Json(result))
}

fn aggregate_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!(
            "Compute count, average, sum, minimum and maximum over {}s.",
            M::NAME
        ))
        .tag(M::TAG)
        .response::<200, Json<AggregateResult>>()
        .response_with::<400, (), _>(|res| res.description("Aggregate over a non numeric field!"));
    with_auth_responses(op, M::READ)
}

async fn group_by<M: ApiModel>(
    mut state: RequestState,
    form: Json<GroupBy<M>>,
) -> ServiceResult<Json<Vec<GroupByRow>>> {
    state.session_require_access(M::READ)?;

    let rows = state.db.model::<M>().group_by(&form.0).await?;
    Ok(Json(rows))
}

fn group_by_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!("Group {}s by fields and aggregate each group.", M::NAME))
        .tag(M::TAG)
        .response::<200, Json<Vec<GroupByRow>>>()
        .response_with::<400, (), _>(|res| res.description("Invalid grouping!"));
    with_auth_responses(op, M::READ)
}

async fn update_many<M: ApiModel>(
    mut state: RequestState,
    form: Json<UpdateManyDto<M::Filter, M::Update>>,
) -> ServiceResult<Json<CountDto>> {
    state.session_require_admin()?;

    let form = form.0;
    let count = state
        .db
        .model::<M>()
        .update_many(&form.filter, form.data)
        .await?;
    Ok(Json(CountDto { count }))
}

fn update_many_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!(
            "Update all {}s matching a filter, returns the number of changed records.",
            M::NAME
        ))
        .tag(M::TAG)
        .response::<200, Json<CountDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid filter or input!"));
    with_auth_responses(op, Access::Admin)
}

async fn delete_many<M: ApiModel>(
    mut state: RequestState,
    form: Json<DeleteManyDto<M::Filter>>,
) -> ServiceResult<Json<CountDto>> {
    state.session_require_admin()?;

    let count = state.db.model::<M>().delete_many(&form.0.filter).await?;
    Ok(Json(CountDto { count }))
}

fn delete_many_docs<M: ApiModel>(op: TransformOperation) -> TransformOperation {
    let op = op
        .description(&format!(
            "Delete all {}s matching a filter, returns the number of deleted records.",
            M::NAME
        ))
        .tag(M::TAG)
        .response::<200, Json<CountDto>>()
        .response_with::<400, (), _>(|res| res.description("Invalid filter or input!"));
    with_auth_responses(op, Access::Admin)
}
