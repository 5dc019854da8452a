use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped, check_access, is_owner,
        entity::{
            Course, CourseCreateUpdate, CourseProgress, RatingAndReview, SubSection, UserEntity,
            progress_percentage,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            ApiResponse, MessageResponse,
            course::{
                CourseDetailsResponse, CourseFullResponse, InstructorSummary, SectionContent,
                SectionOutline,
            },
        },
        error::ErrorResponse,
        middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(course_list_handler).post(course_create_handler))
        .route("/instructor", get(instructor_courses_handler))
        .route(
            "/{id}",
            get(course_details_handler)
                .put(course_update_handler)
                .delete(course_delete_handler),
        )
        .route("/{id}/full", get(course_full_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Looks a course up, answering 404 when it doesn't exist.
pub async fn fetch_course(
    state: &AppState,
    actor: &AuthenticatedUser,
    id: Uuid,
) -> WebResult<Course> {
    Course::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/course",
    description = "Published courses, newest first",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = ApiResponse<crate::model::Page<Course>>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course"
)]
pub async fn course_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let actor = ctx.maybe_user().cloned().unwrap_or_else(AuthenticatedUser::admin);
    let courses = Course::page(state.pool(), &actor, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Courses fetched successfully", courses))))
}

#[utoipa::path(
    post,
    path = "/api/v1/course",
    request_body = CourseCreateUpdate,
    responses(
        (status = 200, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course",
    security(
        ("cookie" = [])
    )
)]
pub async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreateUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Instructor)?;
    if let Some(reason) = payload.validate() {
        return Err(WebError::resource_bad_request(Course::get_resource_type(), reason));
    }

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Course created successfully", created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/instructor",
    description = "Courses owned by the calling instructor, drafts included",
    responses(
        (status = 200, description = "Owned courses", body = ApiResponse<Vec<Course>>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course",
    security(
        ("cookie" = [])
    )
)]
pub async fn instructor_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Instructor)?;
    let courses = Course::all_by_instructor(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Courses fetched successfully", courses))))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/{course_id}",
    description = "Course outline without video links",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to get")
    ),
    responses(
        (status = 200, description = "Course found", body = ApiResponse<CourseDetailsResponse>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course"
)]
pub async fn course_details_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let actor = ctx.maybe_user().cloned().unwrap_or_else(AuthenticatedUser::admin);
    let course = fetch_course(&state, &actor, id).await?;

    // drafts are only visible to their owner
    if !course.is_published() {
        let visible = match ctx.maybe_user() {
            Some(user) => is_owner(state.pool(), user, &course)
                .await
                .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?,
            None => false,
        };
        if !visible {
            return Err(WebError::resource_not_found(Course::get_resource_type()));
        }
    }

    let content = SectionContent::load_for_course(state.pool(), &actor, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    let instructor = UserEntity::find_by_id(state.pool(), &actor, course.instructor_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let total_students = course
        .student_count(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let average_rating = RatingAndReview::average_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(RatingAndReview::get_resource_type(), e))?;

    let response = CourseDetailsResponse {
        instructor: instructor.as_ref().map(InstructorSummary::from),
        total_lectures: content.iter().map(|s| s.sub_sections.len()).sum(),
        sections: content.iter().map(SectionOutline::from).collect(),
        total_students,
        average_rating,
        course,
    };

    Ok((StatusCode::OK, Json(ApiResponse::ok("Course details fetched successfully", response))))
}

#[utoipa::path(
    put,
    path = "/api/v1/course/{course_id}",
    request_body = CourseCreateUpdate,
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to update")
    ),
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course",
    security(
        ("cookie" = [])
    )
)]
pub async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreateUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, id).await?;

    check_access(state.pool(), user, &course)
        .await
        .map_err(|e| WebError::resource_access_error(Course::get_resource_type(), e))?;

    if let Some(reason) = payload.validate() {
        return Err(WebError::resource_bad_request(Course::get_resource_type(), reason));
    }

    let updated = course
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Course updated successfully", updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/course/{course_id}",
    description = "Deletes the course with its content and uploaded videos",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to delete")
    ),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course",
    security(
        ("cookie" = [])
    )
)]
pub async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, id).await?;

    check_access(state.pool(), user, &course)
        .await
        .map_err(|e| WebError::resource_access_error(Course::get_resource_type(), e))?;

    let lectures = SubSection::all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    course
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    for lecture in lectures {
        if let Err(e) = state.media().remove(lecture.video_url()).await {
            tracing::warn!("unable to remove video {}: {}", lecture.video_url(), e);
        }
    }

    Ok((StatusCode::OK, Json(MessageResponse::ok("Course deleted successfully"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/{course_id}/full",
    description = "Full course content with video links and the caller's progress",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to get")
    ),
    responses(
        (status = 200, description = "Course content", body = ApiResponse<CourseFullResponse>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not enrolled in the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "course",
    security(
        ("cookie" = [])
    )
)]
pub async fn course_full_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, id).await?;

    let owner = is_owner(state.pool(), user, &course)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    if !owner {
        let enrolled = course
            .is_enrolled(state.pool(), user.user_id())
            .await
            .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
        if !enrolled {
            return Err(WebError::resource_forbidden(Course::get_resource_type()));
        }
    }

    let sections = SectionContent::load_for_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    let progress = CourseProgress::find_for(state.pool(), user.user_id(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseProgress::get_resource_type(), e))?;

    let completed_videos = match progress {
        Some(progress) => progress
            .completed_sub_sections(state.pool())
            .await
            .map_err(|e| WebError::resource_fetch_error(CourseProgress::get_resource_type(), e))?,
        None => vec![],
    };

    let total: usize = sections.iter().map(|s| s.sub_sections.len()).sum();
    let response = CourseFullResponse {
        progress_percentage: progress_percentage(completed_videos.len() as i64, total as i64),
        completed_videos,
        sections,
        course,
    };

    Ok((StatusCode::OK, Json(ApiResponse::ok("Course content fetched successfully", response))))
}
