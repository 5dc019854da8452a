use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        Page, ResourceTyped,
        entity::{RatingAndReview, RatingAndReviewCreate, ReviewWithAuthorRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{
            ApiResponse,
            rating::{AverageRatingResponse, CreateRatingBody},
        },
        error::ErrorResponse,
        middlewares,
        routes::{PaginationQuery, course::fetch_course},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/ratings", get(reviews_list_handler))
        .route("/{id}/ratings", post(rating_create_handler))
        .route("/{id}/ratings/average", get(rating_average_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/course/{course_id}/ratings",
    request_body = CreateRatingBody,
    description = "Rates an enrolled course, once per student",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to rate")
    ),
    responses(
        (status = 200, description = "Review stored", body = ApiResponse<RatingAndReview>),
        (status = 400, description = "Rating out of range or empty review", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not a student or not enrolled", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Course already reviewed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "rating",
    security(
        ("cookie" = [])
    )
)]
pub async fn rating_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateRatingBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Student)?;
    let data = RatingAndReviewCreate {
        user_id: user.user_id(),
        course_id,
        rating: payload.rating,
        review: payload.review,
    };
    if let Some(reason) = data.validate() {
        return Err(WebError::resource_bad_request(RatingAndReview::get_resource_type(), reason));
    }

    let course = fetch_course(&state, user, course_id).await?;
    let enrolled = course
        .is_enrolled(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(RatingAndReview::get_resource_type(), e))?;
    if !enrolled {
        return Err(WebError::resource_forbidden(RatingAndReview::get_resource_type()));
    }

    let created = RatingAndReview::create(state.pool(), data).await.map_err(|e| {
        if e.is_unique_violation() {
            WebError::resource_conflict(
                RatingAndReview::get_resource_type(),
                "Course already reviewed by user",
            )
        } else {
            WebError::resource_fetch_error(RatingAndReview::get_resource_type(), e)
        }
    })?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("Rating and review created successfully", created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/{course_id}/ratings/average",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Average rating, 0 without reviews", body = ApiResponse<AverageRatingResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "rating"
)]
pub async fn rating_average_handler(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let average_rating = RatingAndReview::average_for_course(state.pool(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(RatingAndReview::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Average rating fetched successfully",
            AverageRatingResponse { average_rating },
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/course/ratings",
    description = "All reviews, newest first",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = ApiResponse<Page<ReviewWithAuthorRow>>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "rating"
)]
pub async fn reviews_list_handler(
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let reviews = ReviewWithAuthorRow::page(state.pool(), page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(RatingAndReview::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ApiResponse::ok("All reviews fetched successfully", reviews))))
}
