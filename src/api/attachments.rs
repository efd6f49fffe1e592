use std::path::Path as FilePath;

use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use aide::OperationOutput;
use axum::extract::{Multipart, Path};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use log::warn;
use rand::distributions::Alphanumeric;
use rand::Rng;
use schemars::JsonSchema;
use serde::Serialize;

use crate::database::filter::Where;
use crate::database::schema::{AttachmentCreate, AttachmentFilter};
use crate::database::{AppState, DatabaseConnection};
use crate::env;
use crate::error::{ServiceError, ServiceResult};
use crate::models;
use crate::request_state::{Access, RequestState};

use super::crud::{self, ApiModel, CountDto, DeleteManyDto};

const STORED_NAME_LENGTH: usize = 24;

/// Served with their media type, everything else is offered as download only.
const INLINE_MEDIA_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
];

pub fn router(app_state: AppState) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route(
            "/attachments",
            crud::list_route::<models::Attachment>()
                .post_with(upload_attachment, upload_attachment_docs),
        )
        .api_route(
            "/attachment/:id",
            get_with(
                crud::get::<models::Attachment>,
                crud::get_docs::<models::Attachment>,
            )
            .put_with(
                crud::update::<models::Attachment>,
                crud::update_docs::<models::Attachment>,
            )
            .delete_with(delete_attachment, delete_attachment_docs),
        )
        .api_route(
            "/attachment/:id/content",
            get_with(get_attachment_content, get_attachment_content_docs),
        )
        .api_route(
            "/attachments/delete-many",
            post_with(delete_attachments, delete_attachments_docs),
        );

    crud::search_routes::<models::Attachment>(router).with_state(app_state)
}

#[derive(Debug, PartialEq, Serialize, JsonSchema)]
pub struct AttachmentDto {
    pub id: u64,
    pub file_name: String,
    pub length: i64,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&models::Attachment> for AttachmentDto {
    fn from(value: &models::Attachment) -> Self {
        Self {
            id: value.id,
            file_name: value.file_name.to_owned(),
            length: value.length,
            media_type: value.media_type.to_owned(),
            created_at: value.created_at,
        }
    }
}

impl ApiModel for models::Attachment {
    type Dto = AttachmentDto;

    const NAME: &'static str = "attachment";
    const TAG: &'static str = "attachments";
    const ITEM_PATH: &'static str = "/attachment";
    const COLLECTION_PATH: &'static str = "/attachments";

    const READ: Access = Access::Session;
    const WRITE: Access = Access::Admin;
}

/// Raw file content with its media type.
///
/// Uploads are not restricted, so only plain images are rendered by the browser. Other
/// content, eg. html or svg, is sent as `application/octet-stream` attachment.
pub struct FileResponse {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl FileResponse {
    fn is_inline(&self) -> bool {
        let media_type = self.media_type.trim().to_ascii_lowercase();
        INLINE_MEDIA_TYPES.iter().any(|t| *t == media_type)
    }
}

impl OperationOutput for FileResponse {
    type Inner = Vec<u8>;
}
impl IntoResponse for FileResponse {
    fn into_response(self) -> axum::response::Response {
        let mut header = HeaderMap::new();
        header.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );

        match HeaderValue::from_str(&self.media_type) {
            Ok(content_type) if self.is_inline() => {
                header.insert(header::CONTENT_TYPE, content_type);
            }
            _ => {
                header.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
                header.insert(
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_static("attachment"),
                );
            }
        }

        (StatusCode::OK, header, self.data).into_response()
    }
}

/// Random name for a stored file, keeps a short alphanumeric extension of the upload.
fn stored_file_name(original: &str) -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STORED_NAME_LENGTH)
        .map(char::from)
        .collect();

    let extension = FilePath::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(extension) => format!("{}.{}", random, extension.to_lowercase()),
        None => random,
    }
}

/// Writes `data` below the upload directory and records it as attachment.
pub async fn store_file(
    db: &mut DatabaseConnection,
    original_name: &str,
    media_type: String,
    data: &[u8],
) -> ServiceResult<models::Attachment> {
    if data.len() > *env::UPLOAD_MAX_BYTES {
        return Err(ServiceError::BadRequest(
            "File too large",
            format!("Uploads are limited to {} bytes", *env::UPLOAD_MAX_BYTES),
        ));
    }

    let directory = env::UPLOAD_PATH.to_owned();
    tokio::fs::create_dir_all(&directory).await?;

    let file_name = stored_file_name(original_name);
    let path = FilePath::new(&directory).join(&file_name);
    tokio::fs::write(&path, data).await?;

    let result = db
        .attachments()
        .create(AttachmentCreate {
            file_name,
            directory,
            length: i64::try_from(data.len()).unwrap_or(i64::MAX),
            media_type,
            created_at: None,
        })
        .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Could not remove orphaned upload {:?}: {}", path, e);
        }
    }
    result
}

async fn unlink(attachment: &models::Attachment) {
    if let Err(e) = tokio::fs::remove_file(attachment.path()).await {
        warn!("Could not remove file of attachment {}: {}", attachment.id, e);
    }
}

/// Deletes the attachment record and its file.
pub async fn remove_file(db: &mut DatabaseConnection, id: u64) -> ServiceResult<()> {
    let attachment = db
        .attachments()
        .delete(id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    unlink(&attachment).await;
    Ok(())
}

/// Deletes all matching attachment records and their files, returns the number of deleted records.
pub async fn remove_files(
    db: &mut DatabaseConnection,
    filter: &Where<AttachmentFilter>,
) -> ServiceResult<u64> {
    let attachments = db.attachments().delete_many_returning(filter).await?;
    for attachment in attachments.iter() {
        unlink(attachment).await;
    }
    Ok(attachments.len() as u64)
}

/// First file field of a multipart body as `(file name, media type, content)`.
pub async fn read_upload(multipart: &mut Multipart) -> ServiceResult<(String, String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceError::BadRequest("Invalid multipart body", e.body_text())
    })? {
        let Some(file_name) = field.file_name().map(|n| n.to_owned()) else {
            continue;
        };
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_lowercase();
        let data = field.bytes().await.map_err(|e| {
            ServiceError::BadRequest("Invalid multipart body", e.body_text())
        })?;

        return Ok((file_name, media_type, data.to_vec()));
    }

    Err(ServiceError::BadRequest(
        "Missing file",
        "The multipart body does not contain a file field".to_owned(),
    ))
}

async fn upload_attachment(
    mut state: RequestState,
    mut multipart: Multipart,
) -> ServiceResult<Json<AttachmentDto>> {
    state.session_require()?;

    let (file_name, media_type, data) = read_upload(&mut multipart).await?;
    let attachment = store_file(&mut state.db, &file_name, media_type, &data).await?;
    Ok(Json(AttachmentDto::from(&attachment)))
}

fn upload_attachment_docs(op: TransformOperation) -> TransformOperation {
    op.description("Upload a file as multipart form data.")
        .tag("attachments")
        .response::<200, Json<AttachmentDto>>()
        .response_with::<400, (), _>(|res| res.description("Missing or too large file!"))
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

async fn get_attachment_content(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<FileResponse> {
    state.session_require()?;

    let attachment = state
        .db
        .attachments()
        .find_unique(id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let data = tokio::fs::read(attachment.path()).await?;

    Ok(FileResponse {
        media_type: attachment.media_type,
        data,
    })
}

fn get_attachment_content_docs(op: TransformOperation) -> TransformOperation {
    op.description("Download the content of an attachment.")
        .tag("attachments")
        .response_with::<200, (), _>(|res| res.description("The file content."))
        .response_with::<404, (), _>(|res| {
            res.description("The requested attachment does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .security_requirement("SessionToken")
}

async fn delete_attachment(
    mut state: RequestState,
    Path(id): Path<u64>,
) -> ServiceResult<StatusCode> {
    state.session_require_admin()?;

    remove_file(&mut state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn delete_attachment_docs(op: TransformOperation) -> TransformOperation {
    op.description("Delete an attachment and its stored file.")
        .tag("attachments")
        .response_with::<204, (), _>(|res| {
            res.description("The attachment was successfully deleted!")
        })
        .response_with::<404, (), _>(|res| {
            res.description("The requested attachment does not exist!")
        })
        .response_with::<401, (), _>(|res| res.description("Missing login!"))
        .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
        .security_requirement_scopes("SessionToken", ["admin"])
}

async fn delete_attachments(
    mut state: RequestState,
    form: Json<DeleteManyDto<AttachmentFilter>>,
) -> ServiceResult<Json<CountDto>> {
    state.session_require_admin()?;

    let count = remove_files(&mut state.db, &form.0.filter).await?;
    Ok(Json(CountDto { count }))
}

fn delete_attachments_docs(op: TransformOperation) -> TransformOperation {
    op.description(
        "Delete all attachments matching a filter together with their stored files, returns the number of deleted records.",
    )
    .tag("attachments")
    .response::<200, Json<CountDto>>()
    .response_with::<400, (), _>(|res| res.description("Invalid filter!"))
    .response_with::<401, (), _>(|res| res.description("Missing login!"))
    .response_with::<403, (), _>(|res| res.description("Missing permissions!"))
    .security_requirement_scopes("SessionToken", ["admin"])
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::database::filter::StringFilter;
    use crate::database::AppState;

    fn headers(media_type: &str) -> HeaderMap {
        FileResponse {
            media_type: media_type.to_owned(),
            data: b"<script>alert(1)</script>".to_vec(),
        }
        .into_response()
        .headers()
        .clone()
    }

    #[test]
    fn test_only_images_are_served_inline() {
        let png = headers("image/png");
        assert_eq!(png[header::CONTENT_TYPE], "image/png");
        assert!(png.get(header::CONTENT_DISPOSITION).is_none());
        assert_eq!(png[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

        for media_type in ["text/html", "image/svg+xml", "application/javascript"] {
            let download = headers(media_type);
            assert_eq!(download[header::CONTENT_TYPE], "application/octet-stream");
            assert_eq!(download[header::CONTENT_DISPOSITION], "attachment");
        }
    }

    #[sqlx::test]
    async fn test_delete_many_removes_the_files(pool: PgPool) {
        let app_state = AppState::from_pool(pool).await.unwrap();
        let mut db = app_state.connection().await.unwrap();

        let report = store_file(&mut db, "report.pdf", "application/pdf".to_owned(), b"%PDF")
            .await
            .unwrap();
        let scan = store_file(&mut db, "scan.png", "image/png".to_owned(), b"png")
            .await
            .unwrap();

        let filter = Where::new(AttachmentFilter {
            media_type: Some(StringFilter::equals("application/pdf")),
            ..Default::default()
        });
        assert_eq!(remove_files(&mut db, &filter).await.unwrap(), 1);
        assert!(!report.path().exists());
        assert!(scan.path().exists());
        assert_eq!(db.attachments().find_unique(report.id).await.unwrap(), None);

        remove_file(&mut db, scan.id).await.unwrap();
        assert!(!scan.path().exists());
    }

    #[test]
    fn test_stored_file_names() {
        let name = stored_file_name("X-Ray Scan.PNG");
        assert_eq!(name.len(), STORED_NAME_LENGTH + 4);
        assert!(name.ends_with(".png"));

        let name = stored_file_name("../../etc/passwd");
        assert_eq!(name.len(), STORED_NAME_LENGTH);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));

        let name = stored_file_name("report.tar.g$z");
        assert_eq!(name.len(), STORED_NAME_LENGTH);

        assert_ne!(stored_file_name("a.pdf"), stored_file_name("a.pdf"));
    }
}
