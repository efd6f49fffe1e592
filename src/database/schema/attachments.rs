use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database::delegate::{Model, ScalarField};
use crate::database::filter::{
    id_from_db, Assignment, BigIntFilter, Condition, DateTimeFilter, FieldFilter, FieldFilters,
    IdFilter, StringFilter, Value,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::Attachment;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentField {
    Id,
    FileName,
    Directory,
    Length,
    MediaType,
    CreatedAt,
}

impl ScalarField for AttachmentField {
    const ALL: &'static [Self] = &[
        AttachmentField::Id,
        AttachmentField::FileName,
        AttachmentField::Directory,
        AttachmentField::Length,
        AttachmentField::MediaType,
        AttachmentField::CreatedAt,
    ];

    fn column(self) -> &'static str {
        match self {
            AttachmentField::Id => "id",
            AttachmentField::FileName => "file_name",
            AttachmentField::Directory => "directory",
            AttachmentField::Length => "length",
            AttachmentField::MediaType => "media_type",
            AttachmentField::CreatedAt => "created_at",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, AttachmentField::Id | AttachmentField::Length)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AttachmentFilter {
    pub id: Option<IdFilter>,
    pub file_name: Option<StringFilter>,
    pub directory: Option<StringFilter>,
    pub length: Option<BigIntFilter>,
    pub media_type: Option<StringFilter>,
    pub created_at: Option<DateTimeFilter>,
}

impl FieldFilters for AttachmentFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.id.conditions("id");
        conditions.extend(self.file_name.conditions("file_name"));
        conditions.extend(self.directory.conditions("directory"));
        conditions.extend(self.length.conditions("length"));
        conditions.extend(self.media_type.conditions("media_type"));
        conditions.extend(self.created_at.conditions("created_at"));
        conditions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentCreate {
    pub file_name: String,
    pub directory: String,
    pub length: i64,
    pub media_type: String,
    /// Defaults to the time of insertion.
    pub created_at: Option<DateTime<Utc>>,
}

/// The stored file is addressed by `directory` and `file_name`, so only metadata can change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct AttachmentUpdate {
    pub media_type: Option<String>,
}

impl Model for Attachment {
    const TABLE: &'static str = "attachments";

    type Field = AttachmentField;
    type Filter = AttachmentFilter;
    type Create = AttachmentCreate;
    type Update = AttachmentUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Attachment {
            id: id_from_db(row.try_get("id")?),
            file_name: row.try_get("file_name")?,
            directory: row.try_get("directory")?,
            length: row.try_get("length")?,
            media_type: row.try_get("media_type")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn create_values(data: Self::Create) -> ServiceResult<Vec<(&'static str, Value)>> {
        validate_not_blank("file_name", &data.file_name)?;
        validate_not_blank("media_type", &data.media_type)?;
        if data.length < 0 {
            return Err(ServiceError::BadRequest(
                "Invalid attachment",
                "'length' must not be negative".to_owned(),
            ));
        }

        Ok(vec![
            ("file_name", data.file_name.into()),
            ("directory", data.directory.into()),
            ("length", data.length.into()),
            ("media_type", data.media_type.into()),
            ("created_at", data.created_at.unwrap_or_else(Utc::now).into()),
        ])
    }

    fn update_assignments(data: Self::Update) -> ServiceResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        if let Some(media_type) = data.media_type {
            validate_not_blank("media_type", &media_type)?;
            assignments.push(Assignment::Set("media_type", media_type.into()));
        }
        Ok(assignments)
    }
}
