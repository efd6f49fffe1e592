//! Filter and update operators shared by all models.
//!
//! Every operator is rendered into a [`QueryBuilder`] with bound parameters, the
//! SQL text only ever contains column names that come from the static field enums.
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::error::{ServiceError, ServiceResult};

/// Typed SQL parameter. `None` binds a typed `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    BigInt(Option<i64>),
    Int(Option<i32>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl Value {
    pub fn push_bind(self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Value::BigInt(v) => query.push_bind(v),
            Value::Int(v) => query.push_bind(v),
            Value::Text(v) => query.push_bind(v),
            Value::Timestamp(v) => query.push_bind(v),
        };
    }

    fn is_zero(&self) -> bool {
        matches!(self, Value::BigInt(Some(0)) | Value::Int(Some(0)))
    }
}

/// Ids are exposed as `u64` but stored as `BIGINT`.
pub fn id_to_db(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

pub fn id_from_db(id: i64) -> u64 {
    u64::try_from(id).unwrap_or_default()
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::BigInt(Some(id_to_db(value)))
    }
}

impl From<Option<u64>> for Value {
    fn from(value: Option<u64>) -> Self {
        Value::BigInt(value.map(id_to_db))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(Some(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(Some(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Some(value))
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(value))
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        Value::Timestamp(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Boolean expression over the columns of one table.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: &'static str,
        op: CompareOp,
        value: Value,
    },
    In {
        column: &'static str,
        values: Vec<Value>,
        negated: bool,
    },
    Like {
        column: &'static str,
        pattern: String,
        insensitive: bool,
    },
    IsNull {
        column: &'static str,
        negated: bool,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column,
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn push_to(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Condition::Compare { column, op, value } => {
                query.push(column).push(' ').push(op.as_sql()).push(' ');
                value.clone().push_bind(query);
            }
            Condition::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    query.push(if *negated { "TRUE" } else { "FALSE" });
                    return;
                }
                query
                    .push(column)
                    .push(if *negated { " NOT IN (" } else { " IN (" });
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        query.push(", ");
                    }
                    value.clone().push_bind(query);
                }
                query.push(')');
            }
            Condition::Like {
                column,
                pattern,
                insensitive,
            } => {
                query
                    .push(column)
                    .push(if *insensitive { " ILIKE " } else { " LIKE " })
                    .push_bind(pattern.clone());
            }
            Condition::IsNull { column, negated } => {
                query
                    .push(column)
                    .push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::And(conditions) => push_joined(query, conditions, " AND ", "TRUE"),
            Condition::Or(conditions) => push_joined(query, conditions, " OR ", "FALSE"),
            Condition::Not(condition) => {
                query.push("NOT (");
                condition.push_to(query);
                query.push(')');
            }
        }
    }

    /// Appends ` WHERE <condition>` unless the condition is trivially true.
    pub fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Condition::And(conditions) = self {
            if conditions.is_empty() {
                return;
            }
        }
        query.push(" WHERE ");
        self.push_to(query);
    }
}

fn push_joined(
    query: &mut QueryBuilder<'_, Postgres>,
    conditions: &[Condition],
    separator: &str,
    empty: &str,
) {
    match conditions {
        [] => {
            query.push(empty);
        }
        [single] => single.push_to(query),
        _ => {
            query.push('(');
            for (index, condition) in conditions.iter().enumerate() {
                if index > 0 {
                    query.push(separator);
                }
                condition.push_to(query);
            }
            query.push(')');
        }
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Operators applicable to a single column.
pub trait FieldFilter {
    fn conditions(&self, column: &'static str) -> Vec<Condition>;
}

impl<F: FieldFilter> FieldFilter for Option<F> {
    fn conditions(&self, column: &'static str) -> Vec<Condition> {
        match self {
            Some(filter) => filter.conditions(column),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ScalarFilter<T> {
    pub equals: Option<T>,
    /// `"not": null` is the same as leaving the key out, use `"is_null": false` for `IS NOT NULL`.
    pub not: Option<T>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub lt: Option<T>,
    pub lte: Option<T>,
    pub gt: Option<T>,
    pub gte: Option<T>,
    pub is_null: Option<bool>,
}

impl<T> ScalarFilter<T> {
    pub fn equals(value: T) -> Self {
        Self {
            equals: Some(value),
            not: None,
            in_list: None,
            not_in: None,
            lt: None,
            lte: None,
            gt: None,
            gte: None,
            is_null: None,
        }
    }
}

impl<T: Clone + Into<Value>> FieldFilter for ScalarFilter<T> {
    fn conditions(&self, column: &'static str) -> Vec<Condition> {
        let mut conditions = Vec::new();

        let compare = [
            (CompareOp::Eq, &self.equals),
            (CompareOp::NotEq, &self.not),
            (CompareOp::Lt, &self.lt),
            (CompareOp::Lte, &self.lte),
            (CompareOp::Gt, &self.gt),
            (CompareOp::Gte, &self.gte),
        ];
        for (op, value) in compare {
            if let Some(value) = value {
                conditions.push(Condition::Compare {
                    column,
                    op,
                    value: value.clone().into(),
                });
            }
        }

        if let Some(ref values) = self.in_list {
            conditions.push(Condition::In {
                column,
                values: values.iter().cloned().map(Into::into).collect(),
                negated: false,
            });
        }
        if let Some(ref values) = self.not_in {
            conditions.push(Condition::In {
                column,
                values: values.iter().cloned().map(Into::into).collect(),
                negated: true,
            });
        }
        if let Some(is_null) = self.is_null {
            conditions.push(Condition::IsNull {
                column,
                negated: !is_null,
            });
        }

        conditions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StringFilter {
    pub equals: Option<String>,
    /// `"not": null` is the same as leaving the key out, use `"is_null": false` for `IS NOT NULL`.
    pub not: Option<String>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<String>>,
    pub not_in: Option<Vec<String>>,
    pub lt: Option<String>,
    pub lte: Option<String>,
    pub gt: Option<String>,
    pub gte: Option<String>,
    pub is_null: Option<bool>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    #[serde(default)]
    pub mode: QueryMode,
}

impl StringFilter {
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            equals: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Default::default()
        }
    }

    fn scalar(&self) -> ScalarFilter<String> {
        ScalarFilter {
            equals: self.equals.clone(),
            not: self.not.clone(),
            in_list: self.in_list.clone(),
            not_in: self.not_in.clone(),
            lt: self.lt.clone(),
            lte: self.lte.clone(),
            gt: self.gt.clone(),
            gte: self.gte.clone(),
            is_null: self.is_null,
        }
    }
}

impl FieldFilter for StringFilter {
    fn conditions(&self, column: &'static str) -> Vec<Condition> {
        let insensitive = self.mode == QueryMode::Insensitive;
        let mut scalar = self.scalar();

        let mut conditions = if insensitive {
            // equality in insensitive mode compares lowered values through ILIKE
            let mut extra = Vec::new();
            if let Some(equals) = scalar.equals.take() {
                extra.push(Condition::Like {
                    column,
                    pattern: escape_like(&equals),
                    insensitive: true,
                });
            }
            if let Some(not) = scalar.not.take() {
                extra.push(Condition::Not(Box::new(Condition::Like {
                    column,
                    pattern: escape_like(&not),
                    insensitive: true,
                })));
            }
            let mut conditions = scalar.conditions(column);
            conditions.extend(extra);
            conditions
        } else {
            scalar.conditions(column)
        };

        if let Some(ref needle) = self.contains {
            conditions.push(Condition::Like {
                column,
                pattern: format!("%{}%", escape_like(needle)),
                insensitive,
            });
        }
        if let Some(ref prefix) = self.starts_with {
            conditions.push(Condition::Like {
                column,
                pattern: format!("{}%", escape_like(prefix)),
                insensitive,
            });
        }
        if let Some(ref suffix) = self.ends_with {
            conditions.push(Condition::Like {
                column,
                pattern: format!("%{}", escape_like(suffix)),
                insensitive,
            });
        }

        conditions
    }
}

pub type IdFilter = ScalarFilter<u64>;
pub type IntFilter = ScalarFilter<i32>;
pub type BigIntFilter = ScalarFilter<i64>;
pub type DateTimeFilter = ScalarFilter<DateTime<Utc>>;

/// The column filters of one model.
///
/// Implementors reject unknown keys (`#[serde(deny_unknown_fields)]`), a misspelled
/// field must never widen a filter to the whole table.
pub trait FieldFilters {
    fn conditions(&self) -> Vec<Condition>;
}

/// Field filters combined with nested `AND`, `OR` and `NOT` lists.
///
/// An explicit `"OR": []` matches nothing, an absent `OR` matches everything.
#[derive(Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct Where<F> {
    #[serde(flatten)]
    pub fields: F,
    #[serde(default, rename = "AND")]
    pub and: Vec<Where<F>>,
    #[serde(default, rename = "OR")]
    pub or: Option<Vec<Where<F>>>,
    #[serde(default, rename = "NOT")]
    pub not: Vec<Where<F>>,
    /// Parse error of the field filters on this level, reported as `400` before any query runs.
    #[serde(skip)]
    pub invalid: Option<String>,
}

impl<F: FieldFilters> Where<F> {
    pub fn new(fields: F) -> Self {
        Self {
            fields,
            and: Vec::new(),
            or: None,
            not: Vec::new(),
            invalid: None,
        }
    }

    pub fn to_condition(&self) -> ServiceResult<Condition> {
        if let Some(ref cause) = self.invalid {
            return Err(ServiceError::BadRequest("Invalid filter", cause.clone()));
        }

        let mut conditions = self.fields.conditions();
        for filter in self.and.iter() {
            conditions.push(filter.to_condition()?);
        }
        if let Some(ref or) = self.or {
            let alternatives = or
                .iter()
                .map(Where::to_condition)
                .collect::<ServiceResult<Vec<_>>>()?;
            conditions.push(Condition::Or(alternatives));
        }
        for filter in self.not.iter() {
            conditions.push(Condition::Not(Box::new(filter.to_condition()?)));
        }
        Ok(Condition::And(conditions))
    }
}

fn take_nested<F, E>(
    object: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<Vec<Where<F>>>, E>
where
    F: FieldFilters + Default + DeserializeOwned,
    E: de::Error,
{
    match object.remove(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(E::custom),
    }
}

// `flatten` cannot be combined with `deny_unknown_fields`, so the logical keys are split
// off by hand and the rest goes to the strict field filters. Their errors are kept on
// the node instead of failing the whole body, so callers see a `400` with the cause.
impl<'de, F> Deserialize<'de> for Where<F>
where
    F: FieldFilters + Default + DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;

        let and = take_nested::<F, D::Error>(&mut object, "AND")?;
        let or = take_nested::<F, D::Error>(&mut object, "OR")?;
        let not = take_nested::<F, D::Error>(&mut object, "NOT")?;

        let (fields, invalid) = match F::deserialize(serde_json::Value::Object(object)) {
            Ok(fields) => (fields, None),
            Err(error) => (F::default(), Some(error.to_string())),
        };

        Ok(Self {
            fields,
            and: and.unwrap_or_default(),
            or,
            not: not.unwrap_or_default(),
            invalid,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, JsonSchema)]
pub struct OrderBy<F> {
    pub field: F,
    #[serde(default)]
    pub order: SortOrder,
}

/// Column assignment of an `UPDATE` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Set(&'static str, Value),
    Increment(&'static str, Value),
    Decrement(&'static str, Value),
    Multiply(&'static str, Value),
    Divide(&'static str, Value),
}

impl Assignment {
    pub fn push_to(&self, query: &mut QueryBuilder<'_, Postgres>) {
        let (column, operator, value) = match self {
            Assignment::Set(column, value) => {
                query.push(column).push(" = ");
                value.clone().push_bind(query);
                return;
            }
            Assignment::Increment(column, value) => (column, " + ", value),
            Assignment::Decrement(column, value) => (column, " - ", value),
            Assignment::Multiply(column, value) => (column, " * ", value),
            Assignment::Divide(column, value) => (column, " / ", value),
        };
        query
            .push(column)
            .push(" = ")
            .push(column)
            .push(operator);
        value.clone().push_bind(query);
    }
}

/// Atomic number operations of an update input.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NumberUpdate<T> {
    Set(T),
    Increment(T),
    Decrement(T),
    Multiply(T),
    Divide(T),
}

impl<T: Into<Value>> NumberUpdate<T> {
    pub fn assignment(self, column: &'static str) -> ServiceResult<Assignment> {
        let assignment = match self {
            NumberUpdate::Set(v) => Assignment::Set(column, v.into()),
            NumberUpdate::Increment(v) => Assignment::Increment(column, v.into()),
            NumberUpdate::Decrement(v) => Assignment::Decrement(column, v.into()),
            NumberUpdate::Multiply(v) => Assignment::Multiply(column, v.into()),
            NumberUpdate::Divide(v) => {
                let value = v.into();
                if value.is_zero() {
                    return Err(ServiceError::BadRequest(
                        "Invalid update",
                        format!("Division of '{}' by zero", column),
                    ));
                }
                Assignment::Divide(column, value)
            }
        };
        Ok(assignment)
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(condition: &Condition) -> String {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM t");
        condition.push_where(&mut query);
        query.sql().to_owned()
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TestFields {
        name: Option<StringFilter>,
        floor: Option<IntFilter>,
    }

    impl FieldFilters for TestFields {
        fn conditions(&self) -> Vec<Condition> {
            let mut conditions = self.name.conditions("name");
            conditions.extend(self.floor.conditions("floor"));
            conditions
        }
    }

    #[test]
    fn test_empty_where_renders_nothing() {
        let filter = Where::new(TestFields::default());
        assert_eq!(render(&filter.to_condition().unwrap()), "SELECT * FROM t");
    }

    #[test]
    fn test_scalar_operators_are_bound() {
        let filter = IntFilter {
            gte: Some(1),
            lt: Some(4),
            ..Default::default()
        };
        let condition = Condition::And(filter.conditions("floor"));
        assert_eq!(
            render(&condition),
            "SELECT * FROM t WHERE (floor < $1 AND floor >= $2)"
        );
    }

    #[test]
    fn test_in_lists() {
        let empty_in = Condition::In {
            column: "id",
            values: vec![],
            negated: false,
        };
        assert_eq!(render(&empty_in), "SELECT * FROM t WHERE FALSE");

        let empty_not_in = Condition::In {
            column: "id",
            values: vec![],
            negated: true,
        };
        assert_eq!(render(&empty_not_in), "SELECT * FROM t WHERE TRUE");

        let filter = IdFilter {
            in_list: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(
            render(&Condition::And(filter.conditions("id"))),
            "SELECT * FROM t WHERE id IN ($1, $2, $3)"
        );
    }

    #[test]
    fn test_string_filter_escapes_like_patterns() {
        let filter = StringFilter::contains("50%_off");
        let conditions = filter.conditions("name");
        assert_eq!(
            conditions,
            vec![Condition::Like {
                column: "name",
                pattern: "%50\\%\\_off%".to_owned(),
                insensitive: false,
            }]
        );
    }

    #[test]
    fn test_insensitive_mode_uses_ilike() {
        let filter = StringFilter {
            equals: Some("Cardiology".to_owned()),
            starts_with: Some("car".to_owned()),
            mode: QueryMode::Insensitive,
            ..Default::default()
        };
        assert_eq!(
            render(&Condition::And(filter.conditions("name"))),
            "SELECT * FROM t WHERE (name ILIKE $1 AND name ILIKE $2)"
        );
    }

    #[test]
    fn test_nested_logic() {
        let filter: Where<TestFields> = serde_json::from_value(serde_json::json!({
            "floor": { "equals": 2 },
            "OR": [
                { "name": { "contains": "ward" } },
                { "name": { "equals": "ICU" } }
            ],
            "NOT": [ { "floor": { "is_null": true } } ]
        }))
        .unwrap();

        assert_eq!(
            render(&filter.to_condition().unwrap()),
            "SELECT * FROM t WHERE (floor = $1 AND (name LIKE $2 OR name = $3) AND NOT (floor IS NULL))"
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let typo: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "nmae": { "equals": "ICU" } })).unwrap();
        assert!(matches!(
            typo.to_condition(),
            Err(ServiceError::BadRequest("Invalid filter", _))
        ));

        let nested: Where<TestFields> = serde_json::from_value(serde_json::json!({
            "floor": { "equals": 2 },
            "NOT": [ { "flor": { "equals": 3 } } ]
        }))
        .unwrap();
        assert!(nested.to_condition().is_err());

        let operator: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "name": { "equal": "ICU" } })).unwrap();
        assert!(operator.to_condition().is_err());

        let scalar: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "floor": { "greater": 1 } })).unwrap();
        assert!(scalar.to_condition().is_err());
    }

    #[test]
    fn test_not_null_is_ignored() {
        let filter: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "floor": { "not": null } })).unwrap();
        assert_eq!(render(&filter.to_condition().unwrap()), "SELECT * FROM t");

        let filter: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "floor": { "is_null": false } })).unwrap();
        assert_eq!(
            render(&filter.to_condition().unwrap()),
            "SELECT * FROM t WHERE floor IS NOT NULL"
        );
    }

    #[test]
    fn test_empty_or_matches_nothing() {
        let filter: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "OR": [] })).unwrap();
        assert_eq!(filter.to_condition().unwrap(), Condition::And(vec![Condition::Or(vec![])]));
        assert_eq!(
            render(&filter.to_condition().unwrap()),
            "SELECT * FROM t WHERE FALSE"
        );

        let filter: Where<TestFields> =
            serde_json::from_value(serde_json::json!({ "OR": null })).unwrap();
        assert_eq!(render(&filter.to_condition().unwrap()), "SELECT * FROM t");
    }

    #[test]
    fn test_number_updates() {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE t SET ");
        NumberUpdate::Increment(2)
            .assignment("floor")
            .unwrap()
            .push_to(&mut query);
        assert_eq!(query.sql(), "UPDATE t SET floor = floor + $1");

        let result = NumberUpdate::Divide(0).assignment("floor");
        assert!(matches!(result, Err(ServiceError::BadRequest(_, _))));

        let update: NumberUpdate<i32> =
            serde_json::from_value(serde_json::json!({ "multiply": 3 })).unwrap();
        assert_eq!(update, NumberUpdate::Multiply(3));
    }

    #[test]
    fn test_sort_order_defaults_to_ascending() {
        let order: OrderBy<String> =
            serde_json::from_value(serde_json::json!({ "field": "name" })).unwrap();
        assert_eq!(order.order, SortOrder::Asc);
    }
}
