use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::{
    model::{
        ResourceTyped, check_access,
        entity::{Course, LiveClass, LiveClassCreate, UpcomingLiveClassRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{
            ApiResponse, non_blank,
            live_class::{CreateLiveClassBody, JoinLiveClassBody, JoinLiveClassResponse},
        },
        error::ErrorResponse,
        middlewares,
        routes::course::fetch_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/live", post(live_class_create_handler))
        .route("/live/upcoming", get(live_class_upcoming_handler))
        .route("/live/join", post(live_class_join_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/course/live",
    request_body = CreateLiveClassBody,
    description = "Schedules a live class in a new room",
    responses(
        (status = 201, description = "Live class scheduled", body = ApiResponse<LiveClass>),
        (status = 400, description = "Missing topic", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructors only, or not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "live",
    security(
        ("cookie" = [])
    )
)]
pub async fn live_class_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateLiveClassBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Instructor)?;
    let topic = non_blank(Some(&payload.topic))
        .map(str::to_string)
        .ok_or_else(|| WebError::resource_bad_request(LiveClass::get_resource_type(), "Topic is required"))?;

    if let Some(course_id) = payload.course_id {
        let course = fetch_course(&state, user, course_id).await?;
        check_access(state.pool(), user, &course)
            .await
            .map_err(|e| WebError::resource_access_error(Course::get_resource_type(), e))?;
    }

    let created = LiveClass::create(
        state.pool(),
        LiveClassCreate {
            instructor_id: user.user_id(),
            course_id: payload.course_id,
            topic,
            scheduled_at: payload.scheduled_at,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(LiveClass::get_resource_type(), e))?;

    tracing::info!("live class {} scheduled in room {}", created.id(), created.room_id());
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Live class scheduled", created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/live/upcoming",
    responses(
        (status = 200, description = "Active classes that haven't started yet", body = ApiResponse<Vec<UpcomingLiveClassRow>>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "live",
    security(
        ("cookie" = [])
    )
)]
pub async fn live_class_upcoming_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let rows = UpcomingLiveClassRow::fetch(state.pool(), Utc::now())
        .await
        .map_err(|e| WebError::resource_fetch_error(LiveClass::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Upcoming live classes fetched", rows))))
}

#[utoipa::path(
    post,
    path = "/api/v1/course/live/join",
    request_body = JoinLiveClassBody,
    responses(
        (status = 200, description = "Joined the room", body = ApiResponse<JoinLiveClassResponse>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Unknown or closed room", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "live",
    security(
        ("cookie" = [])
    )
)]
pub async fn live_class_join_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<JoinLiveClassBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let live_class = LiveClass::find_by_room(state.pool(), payload.room_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LiveClass::get_resource_type(), e))?
        .filter(LiveClass::is_active)
        .ok_or_else(|| WebError::resource_not_found(LiveClass::get_resource_type()))?;

    let joined = live_class
        .join(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(LiveClass::get_resource_type(), e))?;
    if joined {
        tracing::debug!("user {} joined room {}", user.user_id(), live_class.room_id());
    }
    let attendees = live_class
        .attendee_count(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(LiveClass::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Joined live class",
            JoinLiveClassResponse {
                room_id: live_class.room_id(),
                topic: live_class.topic().to_string(),
                attendees,
            },
        )),
    ))
}
