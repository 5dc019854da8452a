use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, put},
};
use tower_cookies::{Cookie, Cookies};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            Course, CourseProgress, InstructorCourseStatsRow, SubSection, UserEntity,
            UserEntityCreateUpdate, progress_percentage,
        },
    },
    utils::uploads::MediaFolder,
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{
            ApiResponse, MessageResponse,
            course::read_file_field,
            profile::{EnrolledCourseResponse, UpdateProfileBody},
        },
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

pub fn routes<S>(state: AppState, upload_limit: usize) -> Router<S> {
    Router::new()
        .route("/getUserDetails", get(get_user_details_handler))
        .route("/updateProfile", put(update_profile_handler))
        .route("/deleteProfile", delete(delete_profile_handler))
        .route("/getEnrolledCourses", get(enrolled_courses_handler))
        .route("/instructorDashboard", get(instructor_dashboard_handler))
        .route(
            "/updateDisplayPicture",
            put(update_display_picture_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/getUserDetails",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn get_user_details_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("User data fetched successfully", found)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile/updateProfile",
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn update_profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let data = payload.apply(UserEntityCreateUpdate::from(&found));
    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Profile updated successfully", updated)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/profile/deleteProfile",
    description = "Deletes the account together with its enrollments, progress and reviews",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn delete_profile_handler(
    ctx: RequestContext,
    cookies: Cookies,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let image = found.image().to_string();
    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if let Err(e) = state.media().remove(&image).await {
        tracing::warn!("unable to remove display picture {}: {}", image, e);
    }

    let mut cookie = Cookie::new(AUTH_TOKEN, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok((StatusCode::OK, Json(MessageResponse::ok("User deleted successfully"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/getEnrolledCourses",
    responses(
        (status = 200, description = "Enrolled courses with progress", body = ApiResponse<Vec<EnrolledCourseResponse>>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn enrolled_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let courses = Course::all_enrolled(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let mut response = Vec::with_capacity(courses.len());
    for course in courses {
        let total = SubSection::count_by_course(state.pool(), course.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

        let progress = CourseProgress::find_for(state.pool(), user.user_id(), course.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(CourseProgress::get_resource_type(), e))?;

        let completed = match progress {
            Some(progress) => progress.count_completed(state.pool()).await.map_err(|e| {
                WebError::resource_fetch_error(CourseProgress::get_resource_type(), e)
            })?,
            None => 0,
        };

        response.push(EnrolledCourseResponse {
            course,
            total_sub_sections: total,
            completed_sub_sections: completed,
            progress_percentage: progress_percentage(completed, total),
        });
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Enrolled courses fetched successfully", response)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/instructorDashboard",
    description = "Students and revenue per course of the calling instructor",
    responses(
        (status = 200, description = "Dashboard rows", body = ApiResponse<Vec<InstructorCourseStatsRow>>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn instructor_dashboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Instructor)?;
    let rows = InstructorCourseStatsRow::fetch_for_instructor(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Dashboard fetched successfully", rows))))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile/updateDisplayPicture",
    description = "Uploads a new display picture (multipart field `display_picture`)",
    responses(
        (status = 200, description = "Picture updated", body = ApiResponse<UserEntity>),
        (status = 400, description = "Missing or non-image file", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profile",
    security(
        ("cookie" = [])
    )
)]
pub async fn update_display_picture_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let resource = UserEntity::get_resource_type();

    let file = read_file_field(multipart, "display_picture")
        .await?
        .ok_or_else(|| WebError::resource_bad_request(resource.clone(), "Display picture is required"))?;

    if !file.has_media_type("image/") {
        return Err(WebError::resource_bad_request(resource, "Display picture must be an image"));
    }

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let url = state
        .media()
        .save(MediaFolder::Pictures, &file.file_name, &file.bytes)
        .await
        .map_err(WebError::server_io_error)?;

    let previous = found.image().to_string();
    let data = UserEntityCreateUpdate {
        image: url,
        ..UserEntityCreateUpdate::from(&found)
    };
    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if let Err(e) = state.media().remove(&previous).await {
        tracing::warn!("unable to remove previous display picture {}: {}", previous, e);
    }

    Ok((StatusCode::OK, Json(ApiResponse::ok("Image updated successfully", updated))))
}
