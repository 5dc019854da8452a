use crate::{
    Config,
    utils::uploads::STATIC_PREFIX,
    web::{AppState, doc::ApiDoc, dto::MessageResponse},
};
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod course;
pub mod live_class;
pub mod payment;
pub mod profile;
pub mod progress;
pub mod rating;
pub mod reach;
pub mod section;

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

#[utoipa::path(
    get,
    path = "/",
    description = "Liveness probe",
    responses(
        (status = 200, description = "Server is running", body = MessageResponse),
    ),
    tag = "root"
)]
pub async fn root_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(MessageResponse::ok("Your server is up and running....")),
    )
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState, config: &Config) -> Router<S> {
    let course_routes = course::routes(state.clone())
        .merge(section::routes(state.clone(), config.app().upload_limit()))
        .merge(progress::routes(state.clone()))
        .merge(rating::routes(state.clone()))
        .merge(live_class::routes(state.clone()));

    let mut router = Router::new()
        .route("/", get(root_handler))
        .nest("/api/v1/auth", auth::routes(state.clone()))
        .nest(
            "/api/v1/profile",
            profile::routes(state.clone(), config.app().upload_limit()),
        )
        .nest("/api/v1/course", course_routes)
        .nest("/api/v1/payment", payment::routes(state.clone()))
        .nest("/api/v1/reach", reach::routes(state.clone()))
        .nest_service(STATIC_PREFIX, ServeDir::new(state.media().root()));

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
