use axum::{Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse, routing::post};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{CourseProgress, SubSection, progress_percentage},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            ApiResponse,
            progress::{CourseProgressResponse, UpdateProgressBody},
        },
        error::ErrorResponse,
        middlewares,
        routes::course::fetch_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/progress", post(update_progress_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/course/progress",
    request_body = UpdateProgressBody,
    description = "Marks a lecture of an enrolled course as watched",
    responses(
        (status = 200, description = "Lecture marked", body = ApiResponse<CourseProgressResponse>),
        (status = 400, description = "Malformed ids or lecture already completed", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not enrolled in the course", body = ErrorResponse),
        (status = 404, description = "Lecture not found in the course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
pub async fn update_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let resource = CourseProgress::get_resource_type();

    let (Ok(course_id), Ok(sub_section_id)) = (
        payload.course_id.trim().parse::<Uuid>(),
        payload.sub_section_id.trim().parse::<Uuid>(),
    ) else {
        return Err(WebError::resource_bad_request(resource, "Invalid course or sub-section id"));
    };

    let sub_section = SubSection::find_by_id(state.pool(), user, sub_section_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(SubSection::get_resource_type()))?;

    let owning_course = sub_section
        .course_id(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;
    if owning_course != course_id {
        return Err(WebError::resource_not_found(SubSection::get_resource_type()));
    }

    let course = fetch_course(&state, user, course_id).await?;
    let enrolled = course
        .is_enrolled(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(resource.clone(), e))?;
    if !enrolled {
        return Err(WebError::resource_forbidden(resource));
    }

    let progress = CourseProgress::get_or_create(state.pool(), user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(resource.clone(), e))?;

    let added = progress
        .mark_completed(state.pool(), sub_section_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(resource.clone(), e))?;
    if !added {
        return Err(WebError::resource_bad_request(
            resource,
            "Subsection already marked as complete",
        ));
    }

    let completed_videos = progress
        .completed_sub_sections(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(resource.clone(), e))?;
    let total = SubSection::count_by_course(state.pool(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    let response = CourseProgressResponse {
        course_id,
        progress_percentage: progress_percentage(completed_videos.len() as i64, total),
        completed_videos,
    };

    Ok((StatusCode::OK, Json(ApiResponse::ok("Course progress updated", response))))
}
