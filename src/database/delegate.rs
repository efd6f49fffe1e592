//! Generic query surface shared by all models.
//!
//! A [`Delegate`] borrows a single postgres connection, which can either be a pooled
//! connection or an open transaction.
use std::collections::BTreeMap;
use std::marker::PhantomData;

use futures::TryStreamExt;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Row};

use crate::error::{ServiceError, ServiceResult};

use super::filter::{id_to_db, Assignment, Condition, FieldFilters, OrderBy, SortOrder, Value, Where};

/// Postgres accepts at most 65535 bind parameters per statement.
const MAX_BIND_PARAMETERS: usize = 65535;

/// Enumeration of the non-relational columns of a model.
pub trait ScalarField:
    Copy + Eq + Send + Sync + Serialize + DeserializeOwned + JsonSchema + 'static
{
    const ALL: &'static [Self];

    fn column(self) -> &'static str;

    /// Whether `_avg` and `_sum` can be computed for this field.
    fn is_numeric(self) -> bool;
}

/// Table backed record type.
pub trait Model: Sized + Send + Unpin {
    const TABLE: &'static str;

    type Field: ScalarField;
    type Filter: FieldFilters + Default + Send + Sync + DeserializeOwned + JsonSchema;
    type Create: Send;
    type Update: Send + DeserializeOwned + JsonSchema;

    fn id(&self) -> u64;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    /// All insertable columns in a fixed order.
    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>>;

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>>;
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "F: Deserialize<'de>, W: FieldFilters + Default + DeserializeOwned"))]
pub struct FindManyArgs<F, W> {
    #[serde(rename = "where")]
    pub filter: Option<Where<W>>,
    #[serde(default = "Vec::<OrderBy<F>>::new")]
    pub order_by: Vec<OrderBy<F>>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    #[serde(default = "Vec::<F>::new")]
    pub distinct: Vec<F>,
}

impl<F, W> Default for FindManyArgs<F, W> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            skip: None,
            take: None,
            distinct: Vec::new(),
        }
    }
}

impl<F, W> FindManyArgs<F, W> {
    pub fn filtered(filter: Where<W>) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }
}

fn optional_condition<W: FieldFilters>(filter: &Option<Where<W>>) -> ServiceResult<Condition> {
    match filter {
        Some(filter) => filter.to_condition(),
        None => Ok(Condition::And(Vec::new())),
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Aggregates<F> {
    #[serde(default, rename = "_count")]
    pub count: bool,
    #[serde(default = "Vec::<F>::new", rename = "_avg")]
    pub avg: Vec<F>,
    #[serde(default = "Vec::<F>::new", rename = "_sum")]
    pub sum: Vec<F>,
    #[serde(default = "Vec::<F>::new", rename = "_min")]
    pub min: Vec<F>,
    #[serde(default = "Vec::<F>::new", rename = "_max")]
    pub max: Vec<F>,
}

impl<F> Default for Aggregates<F> {
    fn default() -> Self {
        Self {
            count: false,
            avg: Vec::new(),
            sum: Vec::new(),
            min: Vec::new(),
            max: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "F: Deserialize<'de>, W: FieldFilters + Default + DeserializeOwned"))]
pub struct AggregateArgs<F, W> {
    #[serde(rename = "where")]
    pub filter: Option<Where<W>>,
    #[serde(flatten)]
    pub aggregates: Aggregates<F>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "F: Deserialize<'de>, W: FieldFilters + Default + DeserializeOwned"))]
pub struct GroupByArgs<F, W> {
    pub by: Vec<F>,
    #[serde(rename = "where")]
    pub filter: Option<Where<W>>,
    #[serde(flatten)]
    pub aggregates: Aggregates<F>,
    #[serde(default = "Vec::<OrderBy<F>>::new")]
    pub order_by: Vec<OrderBy<F>>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct AggregateResult {
    #[serde(rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(rename = "_avg", skip_serializing_if = "BTreeMap::is_empty")]
    pub avg: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_sum", skip_serializing_if = "BTreeMap::is_empty")]
    pub sum: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_min", skip_serializing_if = "BTreeMap::is_empty")]
    pub min: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_max", skip_serializing_if = "BTreeMap::is_empty")]
    pub max: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct GroupByRow {
    #[serde(flatten)]
    pub keys: BTreeMap<String, serde_json::Value>,
    #[serde(flatten)]
    pub aggregates: AggregateResult,
}

pub type FindMany<M> = FindManyArgs<<M as Model>::Field, <M as Model>::Filter>;
pub type Aggregate<M> = AggregateArgs<<M as Model>::Field, <M as Model>::Filter>;
pub type GroupBy<M> = GroupByArgs<<M as Model>::Field, <M as Model>::Filter>;
pub type Filter<M> = Where<<M as Model>::Filter>;

pub struct Delegate<'c, M: Model> {
    conn: &'c mut PgConnection,
    model: PhantomData<M>,
}

impl<'c, M: Model> Delegate<'c, M> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            conn,
            model: PhantomData,
        }
    }

    pub async fn find_unique(&mut self, id: u64) -> ServiceResult<Option<M>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", M::TABLE));
        Condition::eq("id", id).push_where(&mut query);

        let row = query.build().fetch_optional(&mut *self.conn).await?;
        row.map(|row| M::from_row(&row)).transpose().map_err(Into::into)
    }

    /// Lookup by a column with a unique constraint.
    pub async fn find_unique_by(
        &mut self,
        field: M::Field,
        value: impl Into<Value>,
    ) -> ServiceResult<Option<M>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", M::TABLE));
        Condition::eq(field.column(), value).push_where(&mut query);
        query.push(" LIMIT 1");

        let row = query.build().fetch_optional(&mut *self.conn).await?;
        row.map(|row| M::from_row(&row)).transpose().map_err(Into::into)
    }

    pub async fn find_first(&mut self, args: FindMany<M>) -> ServiceResult<Option<M>> {
        let args = FindManyArgs {
            take: Some(1),
            ..args
        };
        Ok(self.find_many(args).await?.into_iter().next())
    }

    pub async fn find_many(&mut self, args: FindMany<M>) -> ServiceResult<Vec<M>> {
        let mut query = build_find_many::<M>(&args)?;

        let mut rows = query.build().fetch(&mut *self.conn);
        let mut result = Vec::new();
        while let Some(row) = rows.try_next().await? {
            result.push(M::from_row(&row)?);
        }
        Ok(result)
    }

    pub async fn create(&mut self, data: M::Create) -> ServiceResult<M> {
        let values = M::create_values(data)?;
        let mut query = build_insert::<M>(vec![values], false)?;
        query.push(" RETURNING *");

        let row = query.build().fetch_one(&mut *self.conn).await?;
        Ok(M::from_row(&row)?)
    }

    /// Inserts all rows atomically and returns the number of inserted rows.
    pub async fn create_many(
        &mut self,
        data: Vec<M::Create>,
        skip_duplicates: bool,
    ) -> ServiceResult<u64> {
        let rows = data
            .into_iter()
            .map(M::create_values)
            .collect::<ServiceResult<Vec<_>>>()?;
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let chunk_size = (MAX_BIND_PARAMETERS / first.len().max(1)).max(1);

        let mut tx = self.conn.begin().await?;
        let mut inserted = 0;
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<_> = rows.by_ref().take(chunk_size).collect();
            let mut query = build_insert::<M>(chunk, skip_duplicates)?;
            inserted += query.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }

    pub async fn update(&mut self, id: u64, data: M::Update) -> ServiceResult<Option<M>> {
        let assignments = M::update_assignments(data)?;
        if assignments.is_empty() {
            return self.find_unique(id).await;
        }

        let mut query = build_update::<M>(&assignments);
        Condition::eq("id", id).push_where(&mut query);
        query.push(" RETURNING *");

        let row = query.build().fetch_optional(&mut *self.conn).await?;
        row.map(|row| M::from_row(&row)).transpose().map_err(Into::into)
    }

    pub async fn update_many(&mut self, filter: &Filter<M>, data: M::Update) -> ServiceResult<u64> {
        let condition = filter.to_condition()?;
        let assignments = M::update_assignments(data)?;
        if assignments.is_empty() {
            return self.count(filter).await;
        }

        let mut query = build_update::<M>(&assignments);
        condition.push_where(&mut query);

        let result = query.build().execute(&mut *self.conn).await?;
        Ok(result.rows_affected())
    }

    /// Updates the row with the given id or inserts `create` if it does not exist.
    pub async fn upsert(&mut self, id: u64, create: M::Create, update: M::Update) -> ServiceResult<M> {
        let mut tx = self.conn.begin().await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT id FROM {}", M::TABLE));
        Condition::eq("id", id).push_where(&mut query);
        query.push(" FOR UPDATE");
        let exists = query.build().fetch_optional(&mut *tx).await?.is_some();

        let mut delegate = Delegate::<M>::new(&mut *tx);
        let model = if exists {
            delegate.update(id, update).await?.ok_or(ServiceError::NotFound)?
        } else {
            delegate.create(create).await?
        };

        tx.commit().await?;
        Ok(model)
    }

    pub async fn delete(&mut self, id: u64) -> ServiceResult<Option<M>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", M::TABLE));
        Condition::eq("id", id).push_where(&mut query);
        query.push(" RETURNING *");

        let row = query.build().fetch_optional(&mut *self.conn).await?;
        row.map(|row| M::from_row(&row)).transpose().map_err(Into::into)
    }

    pub async fn delete_many(&mut self, filter: &Filter<M>) -> ServiceResult<u64> {
        let condition = filter.to_condition()?;
        let mut query = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", M::TABLE));
        condition.push_where(&mut query);

        let result = query.build().execute(&mut *self.conn).await?;
        Ok(result.rows_affected())
    }

    /// Like [`Delegate::delete_many`] but returns the deleted rows.
    pub async fn delete_many_returning(&mut self, filter: &Filter<M>) -> ServiceResult<Vec<M>> {
        let condition = filter.to_condition()?;
        let mut query = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", M::TABLE));
        condition.push_where(&mut query);
        query.push(" RETURNING *");

        let mut rows = query.build().fetch(&mut *self.conn);
        let mut result = Vec::new();
        while let Some(row) = rows.try_next().await? {
            result.push(M::from_row(&row)?);
        }
        Ok(result)
    }

    pub async fn count(&mut self, filter: &Filter<M>) -> ServiceResult<u64> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", M::TABLE));
        filter.to_condition()?.push_where(&mut query);

        let row = query.build().fetch_one(&mut *self.conn).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    pub async fn aggregate(&mut self, args: &Aggregate<M>) -> ServiceResult<AggregateResult> {
        validate_aggregates(&args.aggregates)?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        push_aggregate_columns(&mut query, &args.aggregates);
        query.push(" FROM ").push(M::TABLE);
        optional_condition(&args.filter)?.push_where(&mut query);

        let row = query.build().fetch_one(&mut *self.conn).await?;
        read_aggregates(&row, &args.aggregates)
    }

    pub async fn group_by(&mut self, args: &GroupBy<M>) -> ServiceResult<Vec<GroupByRow>> {
        let mut query = build_group_by::<M>(args)?;

        let mut rows = query.build().fetch(&mut *self.conn);
        let mut result = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let mut keys = BTreeMap::new();
            for (index, field) in args.by.iter().enumerate() {
                let value: Option<serde_json::Value> = row.try_get(format!("key_{}", index).as_str())?;
                keys.insert(
                    field.column().to_owned(),
                    value.unwrap_or(serde_json::Value::Null),
                );
            }
            result.push(GroupByRow {
                keys,
                aggregates: read_aggregates(&row, &args.aggregates)?,
            });
        }
        Ok(result)
    }
}

fn push_order_by<F: ScalarField>(query: &mut QueryBuilder<'_, Postgres>, order: &[(F, SortOrder)]) {
    query.push(" ORDER BY ");
    for (index, (field, sort)) in order.iter().enumerate() {
        if index > 0 {
            query.push(", ");
        }
        query.push(field.column()).push(' ').push(sort.as_sql());
    }
}

fn push_pagination(query: &mut QueryBuilder<'_, Postgres>, skip: Option<u64>, take: Option<u64>) {
    if let Some(take) = take {
        query.push(" LIMIT ").push_bind(id_to_db(take));
    }
    if let Some(skip) = skip {
        query.push(" OFFSET ").push_bind(id_to_db(skip));
    }
}

pub(crate) fn build_find_many<M: Model>(
    args: &FindMany<M>,
) -> ServiceResult<QueryBuilder<'static, Postgres>> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT ");

    if !args.distinct.is_empty() {
        query.push("DISTINCT ON (");
        for (index, field) in args.distinct.iter().enumerate() {
            if index > 0 {
                query.push(", ");
            }
            query.push(field.column());
        }
        query.push(") ");
    }
    query.push("* FROM ").push(M::TABLE);
    optional_condition(&args.filter)?.push_where(&mut query);

    // DISTINCT ON requires the distinct columns to lead the ordering.
    let mut order: Vec<(M::Field, SortOrder)> = args
        .distinct
        .iter()
        .map(|field| {
            let sort = args
                .order_by
                .iter()
                .find(|o| o.field == *field)
                .map(|o| o.order)
                .unwrap_or_default();
            (*field, sort)
        })
        .collect();
    for OrderBy { field, order: sort } in args.order_by.iter() {
        if !order.iter().any(|(f, _)| f == field) {
            order.push((*field, *sort));
        }
    }
    let mut query_order = order;
    if let Some(id_field) = M::Field::ALL.iter().find(|f| f.column() == "id") {
        if !query_order.iter().any(|(f, _)| f == id_field) {
            query_order.push((*id_field, SortOrder::Asc));
        }
    }
    if !query_order.is_empty() {
        push_order_by(&mut query, &query_order);
    }

    push_pagination(&mut query, args.skip, args.take);
    Ok(query)
}

fn build_insert<M: Model>(
    rows: Vec<Vec<(&'static str, Value)>>,
    skip_duplicates: bool,
) -> ServiceResult<QueryBuilder<'static, Postgres>> {
    let columns: Vec<&'static str> = match rows.first() {
        Some(first) => first.iter().map(|(column, _)| *column).collect(),
        None => {
            return Err(ServiceError::BadRequest(
                "Invalid insert",
                "No rows given".to_owned(),
            ))
        }
    };

    let mut query = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} ({})",
        M::TABLE,
        columns.join(", ")
    ));
    query.push_values(rows, |mut row, values| {
        for (_, value) in values {
            match value {
                Value::BigInt(v) => row.push_bind(v),
                Value::Int(v) => row.push_bind(v),
                Value::Text(v) => row.push_bind(v),
                Value::Timestamp(v) => row.push_bind(v),
            };
        }
    });
    if skip_duplicates {
        query.push(" ON CONFLICT DO NOTHING");
    }
    Ok(query)
}

fn build_update<M: Model>(assignments: &[Assignment]) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", M::TABLE));
    for (index, assignment) in assignments.iter().enumerate() {
        if index > 0 {
            query.push(", ");
        }
        assignment.push_to(&mut query);
    }
    query
}

fn validate_aggregates<F: ScalarField>(aggregates: &Aggregates<F>) -> ServiceResult<()> {
    let non_numeric = aggregates
        .avg
        .iter()
        .chain(aggregates.sum.iter())
        .find(|field| !field.is_numeric());

    if let Some(field) = non_numeric {
        return Err(ServiceError::BadRequest(
            "Invalid aggregate",
            format!("Field '{}' is not numeric", field.column()),
        ));
    }
    Ok(())
}

fn push_aggregate_columns<F: ScalarField>(
    query: &mut QueryBuilder<'_, Postgres>,
    aggregates: &Aggregates<F>,
) {
    query.push("COUNT(*) AS _count");
    let groups = [
        ("AVG", "avg", &aggregates.avg),
        ("SUM", "sum", &aggregates.sum),
        ("MIN", "min", &aggregates.min),
        ("MAX", "max", &aggregates.max),
    ];
    for (function, prefix, fields) in groups {
        for (index, field) in fields.iter().enumerate() {
            query.push(format!(
                ", to_jsonb({}({})) AS {}_{}",
                function,
                field.column(),
                prefix,
                index
            ));
        }
    }
}

fn read_aggregates<F: ScalarField>(
    row: &PgRow,
    aggregates: &Aggregates<F>,
) -> ServiceResult<AggregateResult> {
    let mut result = AggregateResult::default();

    if aggregates.count {
        result.count = Some(row.try_get("_count")?);
    }

    let groups = [
        ("avg", &aggregates.avg, &mut result.avg),
        ("sum", &aggregates.sum, &mut result.sum),
        ("min", &aggregates.min, &mut result.min),
        ("max", &aggregates.max, &mut result.max),
    ];
    for (prefix, fields, target) in groups {
        for (index, field) in fields.iter().enumerate() {
            let value: Option<serde_json::Value> =
                row.try_get(format!("{}_{}", prefix, index).as_str())?;
            target.insert(
                field.column().to_owned(),
                value.unwrap_or(serde_json::Value::Null),
            );
        }
    }

    Ok(result)
}

pub(crate) fn build_group_by<M: Model>(
    args: &GroupBy<M>,
) -> ServiceResult<QueryBuilder<'static, Postgres>> {
    if args.by.is_empty() {
        return Err(ServiceError::BadRequest(
            "Invalid group by",
            "At least one field is required in 'by'".to_owned(),
        ));
    }
    validate_aggregates(&args.aggregates)?;
    if let Some(order) = args.order_by.iter().find(|o| !args.by.contains(&o.field)) {
        return Err(ServiceError::BadRequest(
            "Invalid group by",
            format!("Cannot order by '{}' which is not grouped", order.field.column()),
        ));
    }

    let mut query = QueryBuilder::<Postgres>::new("SELECT ");
    for (index, field) in args.by.iter().enumerate() {
        query.push(format!("to_jsonb({}) AS key_{}, ", field.column(), index));
    }
    push_aggregate_columns(&mut query, &args.aggregates);
    query.push(" FROM ").push(M::TABLE);
    optional_condition(&args.filter)?.push_where(&mut query);

    query.push(" GROUP BY ");
    for (index, field) in args.by.iter().enumerate() {
        if index > 0 {
            query.push(", ");
        }
        query.push(field.column());
    }

    let mut order: Vec<(M::Field, SortOrder)> =
        args.order_by.iter().map(|o| (o.field, o.order)).collect();
    for field in args.by.iter() {
        if !order.iter().any(|(f, _)| f == field) {
            order.push((*field, SortOrder::Asc));
        }
    }
    push_order_by(&mut query, &order);

    push_pagination(&mut query, args.skip, args.take);
    Ok(query)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Department;

    fn find_many_sql(args: serde_json::Value) -> String {
        let args: FindMany<Department> = serde_json::from_value(args).unwrap();
        build_find_many::<Department>(&args).unwrap().sql().to_owned()
    }

    fn group_by_sql(args: serde_json::Value) -> ServiceResult<String> {
        let args: GroupBy<Department> = serde_json::from_value(args).unwrap();
        build_group_by::<Department>(&args).map(|query| query.sql().to_owned())
    }

    #[test]
    fn test_find_many_orders_by_id_by_default() {
        assert_eq!(
            find_many_sql(json!({})),
            "SELECT * FROM departments ORDER BY id ASC"
        );
    }

    #[test]
    fn test_find_many_with_filter_and_pagination() {
        let sql = find_many_sql(json!({
            "where": { "symbol": { "equals": "CAR" } },
            "order_by": [{ "field": "floor", "order": "desc" }],
            "skip": 5,
            "take": 10
        }));
        assert_eq!(
            sql,
            "SELECT * FROM departments WHERE symbol = $1 ORDER BY floor DESC, id ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_distinct_columns_lead_the_ordering() {
        let sql = find_many_sql(json!({
            "distinct": ["floor"],
            "order_by": [{ "field": "name", "order": "desc" }]
        }));
        assert_eq!(
            sql,
            "SELECT DISTINCT ON (floor) * FROM departments ORDER BY floor ASC, name DESC, id ASC"
        );
    }

    #[test]
    fn test_group_by_with_aggregates() {
        let sql = group_by_sql(json!({
            "by": ["floor"],
            "_count": true,
            "_avg": ["id"],
            "_max": ["name"]
        }))
        .unwrap();
        assert_eq!(
            sql,
            "SELECT to_jsonb(floor) AS key_0, COUNT(*) AS _count, to_jsonb(AVG(id)) AS avg_0, \
             to_jsonb(MAX(name)) AS max_0 FROM departments GROUP BY floor ORDER BY floor ASC"
        );
    }

    #[test]
    fn test_group_by_rejects_invalid_arguments() {
        assert!(matches!(
            group_by_sql(json!({ "by": [] })),
            Err(ServiceError::BadRequest(_, _))
        ));
        assert!(matches!(
            group_by_sql(json!({ "by": ["floor"], "_sum": ["name"] })),
            Err(ServiceError::BadRequest(_, _))
        ));
        assert!(matches!(
            group_by_sql(json!({
                "by": ["floor"],
                "order_by": [{ "field": "symbol" }]
            })),
            Err(ServiceError::BadRequest(_, _))
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let args: Result<FindMany<Department>, _> =
            serde_json::from_value(json!({ "order_by": [{ "field": "password" }] }));
        assert!(args.is_err());

        let args: FindMany<Department> =
            serde_json::from_value(json!({ "where": { "symbl": { "equals": "CAR" } } })).unwrap();
        assert!(matches!(
            build_find_many::<Department>(&args),
            Err(ServiceError::BadRequest("Invalid filter", _))
        ));

        let args: GroupBy<Department> = serde_json::from_value(json!({
            "by": ["floor"],
            "where": { "OR": [{ "flor": { "equals": 1 } }] }
        }))
        .unwrap();
        assert!(matches!(
            build_group_by::<Department>(&args),
            Err(ServiceError::BadRequest("Invalid filter", _))
        ));
    }

    #[test]
    fn test_empty_or_filters_everything_out() {
        let sql = find_many_sql(json!({ "where": { "OR": [] } }));
        assert_eq!(sql, "SELECT * FROM departments WHERE FALSE ORDER BY id ASC");
    }
}
