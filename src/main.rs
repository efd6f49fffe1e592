use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use log::{error, info};
use tower_http::cors::CorsLayer;

use crate::database::AppState;
use crate::error::ServiceResult;

mod api;
mod database;
mod docs;
mod env;
mod error;
mod models;
mod request_state;

pub const SESSION_COOKIE_NAME: &str = "session";

/// Headroom for multipart framing on top of the upload limit.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() {
    let result = init().await;

    let exit_code = match result {
        Ok(_) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn init() -> ServiceResult<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let app_state = AppState::connect(&env::DATABASE_URL).await?;

    {
        let mut db = app_state.connection().await?;
        let admin_password = env::ADMIN_PASSWORD
            .as_deref()
            .map(api::password_hash_create)
            .transpose()?;
        db.bootstrap(admin_password, &env::ADMIN_EMAIL).await?;

        let expired = db.delete_expired_sessions().await?;
        if expired > 0 {
            info!("Removed {} expired sessions", expired);
        }
    }

    aide::gen::on_error(|error| {
        error!("{}", error);
    });
    aide::gen::extract_schemas(true);

    let mut api = OpenApi::default();
    let app = ApiRouter::new()
        .nest_api_service("/api/v1", api::init(app_state))
        .nest_api_service("/docs", docs::docs_routes())
        .finish_api_with(&mut api, docs::api_docs)
        .layer(Extension(Arc::new(api)))
        .layer(DefaultBodyLimit::max(
            *env::UPLOAD_MAX_BYTES + BODY_LIMIT_OVERHEAD,
        ))
        .layer(CorsLayer::very_permissive());

    let address = format!("{}:{}", *env::API_HOST, *env::API_PORT);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{}, documentation at /docs", address);

    axum::serve(listener, app).await?;

    Ok(())
}
