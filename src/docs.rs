use std::sync::Arc;

use aide::{
    axum::{
        routing::{get, get_with},
        ApiRouter, IntoApiResponse,
    },
    openapi::{OpenApi, Tag},
    redoc::Redoc,
    transform::TransformOpenApi,
};
use axum::{response::IntoResponse, Extension, Json};

const TAGS: [(&str, &str); 12] = [
    ("auth", "Login, logout and registration"),
    ("accounts", "Accounts, passwords and avatars"),
    ("roles", "Account roles"),
    ("positions", "Staff positions"),
    ("departments", "Hospital departments"),
    ("medical_rooms", "Medical rooms of the departments"),
    ("staff", "Staff profiles with positions and departments"),
    ("users", "Patient profiles"),
    ("shift_workings", "Shift plan of the medical rooms"),
    ("appointments", "Patient appointments"),
    ("attachments", "Uploaded files"),
    ("docs", "This documentation"),
];

pub fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    let api = api
        .title("Hospital administration API")
        .summary("Administration backend for departments, staff, rooms and appointments")
        .description(include_str!("../README.md"))
        .security_scheme(
            "SessionToken",
            aide::openapi::SecurityScheme::Http {
                scheme: "bearer".into(),
                bearer_format: None,
                description: Some(
                    "Session token of `POST /auth/password`, also accepted as session cookie."
                        .into(),
                ),
                extensions: Default::default(),
            },
        );

    TAGS.iter().fold(api, |api, (name, description)| {
        api.tag(Tag {
            name: (*name).into(),
            description: Some((*description).into()),
            ..Default::default()
        })
    })
}

pub fn docs_routes() -> ApiRouter {
    // Infer the content type of the redoc page, disabled again for the api routes.
    aide::gen::infer_responses(true);

    let router = ApiRouter::new()
        .api_route(
            "/",
            get_with(
                Redoc::new("/docs/api.json")
                    .with_title("hospital-admin")
                    .axum_handler(),
                |op| op.description("This documentation page.").tag("docs"),
            ),
        )
        .route("/api.json", get(serve_docs));

    aide::gen::infer_responses(false);

    router
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}
