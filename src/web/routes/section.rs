use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{Section, SectionCreateUpdate, SubSection, SubSectionCreateUpdate},
    },
    utils::uploads::MediaFolder,
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            ApiResponse, non_blank,
            course::{SectionBody, SectionContent, SubSectionForm, SubSectionUpload, UploadedFile},
        },
        error::ErrorResponse,
        middlewares,
        routes::course::fetch_course,
    },
};

pub fn routes<S>(state: AppState, upload_limit: usize) -> Router<S> {
    Router::new()
        .route("/{id}/sections", post(section_create_handler))
        .route(
            "/sections/{section_id}",
            put(section_update_handler).delete(section_delete_handler),
        )
        .route(
            "/sections/{section_id}/sub-sections",
            post(sub_section_create_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/sub-sections/{id}",
            put(sub_section_update_handler)
                .layer(DefaultBodyLimit::max(upload_limit))
                .delete(sub_section_delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn fetch_section(state: &AppState, actor: &AuthenticatedUser, id: Uuid) -> WebResult<Section> {
    let section = Section::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Section::get_resource_type()))?;

    check_access(state.pool(), actor, &section)
        .await
        .map_err(|e| WebError::resource_access_error(Section::get_resource_type(), e))?;

    Ok(section)
}

async fn fetch_sub_section(
    state: &AppState,
    actor: &AuthenticatedUser,
    id: Uuid,
) -> WebResult<SubSection> {
    let sub_section = SubSection::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(SubSection::get_resource_type()))?;

    check_access(state.pool(), actor, &sub_section)
        .await
        .map_err(|e| WebError::resource_access_error(SubSection::get_resource_type(), e))?;

    Ok(sub_section)
}

async fn course_content(
    state: &AppState,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> WebResult<Vec<SectionContent>> {
    SectionContent::load_for_course(state.pool(), actor, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))
}

async fn section_content(
    state: &AppState,
    actor: &AuthenticatedUser,
    section: &Section,
) -> WebResult<SectionContent> {
    SectionContent::load_for_section(state.pool(), actor, section)
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))
}

async fn store_video(state: &AppState, video: &UploadedFile) -> WebResult<String> {
    if !video.has_media_type("video/") {
        return Err(WebError::resource_bad_request(
            SubSection::get_resource_type(),
            "Lecture must be a video file",
        ));
    }

    state
        .media()
        .save(MediaFolder::Videos, &video.file_name, &video.bytes)
        .await
        .map_err(WebError::server_io_error)
}

async fn discard_video(state: &AppState, url: &str) {
    if let Err(e) = state.media().remove(url).await {
        tracing::warn!("unable to remove video {}: {}", url, e);
    }
}

fn section_name(payload: &SectionBody) -> WebResult<String> {
    non_blank(Some(&payload.section_name))
        .map(str::to_string)
        .ok_or_else(|| {
            WebError::resource_bad_request(Section::get_resource_type(), "Missing required properties")
        })
}

#[utoipa::path(
    post,
    path = "/api/v1/course/{course_id}/sections",
    request_body = SectionBody,
    description = "Appends a section to the course",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Updated course content", body = ApiResponse<Vec<SectionContent>>),
        (status = 400, description = "Missing section name", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn section_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<SectionBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let section_name = section_name(&payload)?;
    let course = fetch_course(&state, user, course_id).await?;

    check_access(state.pool(), user, &course)
        .await
        .map_err(|e| WebError::resource_access_error(Section::get_resource_type(), e))?;

    Section::create(
        state.pool(),
        user,
        SectionCreateUpdate {
            course_id: course.id(),
            section_name,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    let content = course_content(&state, user, course.id()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Section created successfully", content))))
}

#[utoipa::path(
    put,
    path = "/api/v1/course/sections/{section_id}",
    request_body = SectionBody,
    params(
        ("section_id" = Uuid, Path, description = "ID of the section to rename")
    ),
    responses(
        (status = 200, description = "Updated course content", body = ApiResponse<Vec<SectionContent>>),
        (status = 400, description = "Missing section name", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn section_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<SectionBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let section_name = section_name(&payload)?;
    let section = fetch_section(&state, user, section_id).await?;

    let course_id = section.course_id();
    section
        .update(
            state.pool(),
            user,
            SectionCreateUpdate {
                course_id,
                section_name,
            },
        )
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    let content = course_content(&state, user, course_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Section updated successfully", content))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/course/sections/{section_id}",
    description = "Deletes the section and its lectures",
    params(
        ("section_id" = Uuid, Path, description = "ID of the section to delete")
    ),
    responses(
        (status = 200, description = "Updated course content", body = ApiResponse<Vec<SectionContent>>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn section_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let section = fetch_section(&state, user, section_id).await?;
    let course_id = section.course_id();

    let lectures = SubSection::all_by_section(state.pool(), user, section.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    section
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    for lecture in &lectures {
        discard_video(&state, lecture.video_url()).await;
    }

    let content = course_content(&state, user, course_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Section deleted", content))))
}

#[utoipa::path(
    post,
    path = "/api/v1/course/sections/{section_id}/sub-sections",
    description = "Uploads a lecture video into the section",
    params(
        ("section_id" = Uuid, Path, description = "ID of the parent section")
    ),
    request_body(content = SubSectionUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated section", body = ApiResponse<SectionContent>),
        (status = 400, description = "Missing fields or not a video", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn sub_section_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let section = fetch_section(&state, user, section_id).await?;
    let form = SubSectionForm::from_multipart(multipart).await?;

    let (Some(title), Some(description), Some(time_duration), Some(video)) =
        (form.title, form.description, form.time_duration, form.video)
    else {
        return Err(WebError::resource_bad_request(
            SubSection::get_resource_type(),
            "All Fields are Required",
        ));
    };

    let video_url = store_video(&state, &video).await?;
    let created = SubSection::create(
        state.pool(),
        user,
        SubSectionCreateUpdate {
            section_id: section.id(),
            title,
            description,
            time_duration,
            video_url: video_url.clone(),
        },
    )
    .await;

    if let Err(e) = created {
        discard_video(&state, &video_url).await;
        return Err(WebError::resource_fetch_error(SubSection::get_resource_type(), e));
    }

    let content = section_content(&state, user, &section).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Sub-section created successfully", content))))
}

#[utoipa::path(
    put,
    path = "/api/v1/course/sub-sections/{sub_section_id}",
    description = "Updates any subset of the lecture fields, the video included",
    params(
        ("sub_section_id" = Uuid, Path, description = "ID of the lecture")
    ),
    request_body(content = SubSectionUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated section", body = ApiResponse<SectionContent>),
        (status = 400, description = "Not a video", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn sub_section_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let sub_section = fetch_sub_section(&state, user, id).await?;
    let form = SubSectionForm::from_multipart(multipart).await?;

    let mut data = SubSectionCreateUpdate::from(&sub_section);
    if let Some(title) = form.title {
        data.title = title;
    }
    if let Some(description) = form.description {
        data.description = description;
    }
    if let Some(time_duration) = form.time_duration {
        data.time_duration = time_duration;
    }

    let previous_video = sub_section.video_url().to_string();
    let replaced = match form.video {
        Some(video) => {
            data.video_url = store_video(&state, &video).await?;
            true
        }
        None => false,
    };

    let stored_video = data.video_url.clone();
    let updated = match sub_section.update(state.pool(), user, data).await {
        Ok(updated) => updated,
        Err(e) => {
            if replaced {
                discard_video(&state, &stored_video).await;
            }
            return Err(WebError::resource_fetch_error(SubSection::get_resource_type(), e));
        }
    };

    if replaced {
        discard_video(&state, &previous_video).await;
    }

    let section = fetch_section(&state, user, updated.section_id()).await?;
    let content = section_content(&state, user, &section).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Sub-section updated successfully", content))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/course/sub-sections/{sub_section_id}",
    params(
        ("sub_section_id" = Uuid, Path, description = "ID of the lecture")
    ),
    responses(
        (status = 200, description = "Updated section", body = ApiResponse<SectionContent>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "section",
    security(
        ("cookie" = [])
    )
)]
pub async fn sub_section_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let sub_section = fetch_sub_section(&state, user, id).await?;
    let section_id = sub_section.section_id();
    let video_url = sub_section.video_url().to_string();

    sub_section
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(SubSection::get_resource_type(), e))?;

    discard_video(&state, &video_url).await;

    let section = fetch_section(&state, user, section_id).await?;
    let content = section_content(&state, user, &section).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Sub-section deleted successfully", content))))
}
