use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    Config,
    mail::{self, templates},
    model::{
        CrudRepository, ResourceTyped, is_owner,
        entity::{Course, EnrollmentOutcome, PaymentOrder, PaymentOrderCreate, UserEntity},
    },
    payment::{self, OrderRequest},
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            ApiResponse, MessageResponse,
            payment::{
                CapturePaymentBody, CapturePaymentResponse, KeyResponse, PaymentSuccessEmailBody,
                VerifyPaymentBody,
            },
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/capturePayment", post(capture_payment_handler))
        .route("/verifyPayment", post(verify_payment_handler))
        .route("/sendPaymentSuccessEmail", post(payment_success_email_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/getKey", get(get_key_handler))
        .merge(protected)
        .with_state(state)
}

/// Sorted, de-duplicated copy of `ids`.
fn course_set(ids: &[Uuid]) -> Vec<Uuid> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/capturePayment",
    request_body = CapturePaymentBody,
    description = "Opens a gateway order for the given courses",
    responses(
        (status = 200, description = "Order created", body = ApiResponse<CapturePaymentResponse>),
        (status = 400, description = "No courses or nothing to pay", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 502, description = "Gateway refused the order", body = ErrorResponse),
    ),
    tag = "payment",
    security(
        ("cookie" = [])
    )
)]
pub async fn capture_payment_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CapturePaymentBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Student)?;
    let resource = PaymentOrder::get_resource_type();

    let course_ids = payload
        .course_ids()
        .map(|ids| course_set(&ids))
        .ok_or_else(|| WebError::payment_failed("malformed course id"))?;
    if course_ids.is_empty() {
        return Err(WebError::resource_bad_request(resource, "Please provide valid course IDs"));
    }

    let courses = Course::find_many(state.pool(), user, &course_ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    // drafts can't be bought
    if courses.len() != course_ids.len() || !courses.iter().all(Course::is_published) {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let mut total: i64 = 0;
    for course in &courses {
        let enrolled = course
            .is_enrolled(state.pool(), user.user_id())
            .await
            .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
        if enrolled {
            return Err(WebError::resource_conflict(
                Course::get_resource_type(),
                "Student is already Enrolled",
            ));
        }
        total = total
            .checked_add(course.price())
            .ok_or_else(|| WebError::payment_failed("order total overflows"))?;
    }

    if total == 0 {
        return Err(WebError::resource_bad_request(resource, "Nothing to pay for these courses"));
    }

    let amount =
        payment::to_subunits(total).ok_or_else(|| WebError::payment_failed("order total overflows"))?;
    let currency = Config::get_or_init(false).await.payment().currency().to_string();
    let receipt = payment::generate_receipt();

    let order = state
        .gateway()
        .create_order(OrderRequest {
            amount,
            currency: currency.clone(),
            receipt: receipt.clone(),
        })
        .await
        .map_err(WebError::payment_gateway_error)?;

    PaymentOrder::create(
        state.pool(),
        PaymentOrderCreate {
            id: order.id.clone(),
            user_id: user.user_id(),
            amount,
            currency,
            receipt,
            course_ids,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(PaymentOrder::get_resource_type(), e))?;

    tracing::info!("order {} opened for {} sub-units", order.id, amount);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Order created",
            CapturePaymentResponse {
                key: state.gateway().key_id().to_string(),
                order,
            },
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/verifyPayment",
    request_body = VerifyPaymentBody,
    description = "Checks the gateway signature and enrolls the student",
    responses(
        (status = 200, description = "Payment verified, student enrolled", body = MessageResponse),
        (status = 400, description = "Payment Failed", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payment",
    security(
        ("cookie" = [])
    )
)]
pub async fn verify_payment_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_with_role(UserRole::Student)?;

    let fields = payload
        .fields()
        .ok_or_else(|| WebError::payment_failed("missing verification fields"))?;

    if !state
        .gateway()
        .verify_signature(fields.order_id, fields.payment_id, fields.signature)
    {
        return Err(WebError::payment_failed("signature mismatch"));
    }

    let order = PaymentOrder::find_by_id(state.pool(), fields.order_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(PaymentOrder::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(PaymentOrder::get_resource_type()))?;

    // someone else's order is reported as missing
    let owner = is_owner(state.pool(), user, &order)
        .await
        .map_err(|e| WebError::resource_fetch_error(PaymentOrder::get_resource_type(), e))?;
    if !owner {
        return Err(WebError::resource_not_found(PaymentOrder::get_resource_type()));
    }

    if course_set(order.course_ids()) != course_set(&fields.course_ids) {
        return Err(WebError::resource_bad_request(
            PaymentOrder::get_resource_type(),
            "Courses do not match the order",
        ));
    }

    let outcome = if order.is_paid() {
        EnrollmentOutcome::AlreadyCompleted
    } else {
        order
            .complete(state.pool(), fields.payment_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(PaymentOrder::get_resource_type(), e))?
    };

    if let EnrollmentOutcome::Enrolled(course_ids) = outcome {
        tracing::info!("order {} paid, {} sub-units", order.id(), order.amount());
        notify_enrollment(&state, user, order.user_id(), &course_ids).await;
    }

    Ok((StatusCode::OK, Json(MessageResponse::ok("Payment Verified"))))
}

/// One best-effort confirmation mail per newly enrolled course.
async fn notify_enrollment(
    state: &AppState,
    user: &AuthenticatedUser,
    student_id: Uuid,
    course_ids: &[Uuid],
) {
    let student = match UserEntity::find_by_id(state.pool(), user, student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("unable to load student for enrollment mail: {}", e);
            return;
        }
    };

    let courses = match Course::find_many(state.pool(), user, course_ids).await {
        Ok(courses) => courses,
        Err(e) => {
            tracing::warn!("unable to load courses for enrollment mail: {}", e);
            return;
        }
    };

    for course in &courses {
        mail::send_best_effort(
            state.mailer(),
            templates::course_enrollment(student.email(), course.course_name(), &student.full_name()),
        )
        .await;
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/sendPaymentSuccessEmail",
    request_body = PaymentSuccessEmailBody,
    responses(
        (status = 200, description = "Receipt sent", body = MessageResponse),
        (status = 400, description = "Missing details or a non-positive amount", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 502, description = "Mail could not be sent", body = ErrorResponse),
    ),
    tag = "payment",
    security(
        ("cookie" = [])
    )
)]
pub async fn payment_success_email_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<PaymentSuccessEmailBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (Some(order_id), Some(payment_id), Some(amount)) =
        (payload.order_id, payload.payment_id, payload.amount)
    else {
        return Err(WebError::resource_bad_request(
            PaymentOrder::get_resource_type(),
            "Please provide all the details",
        ));
    };
    if amount <= 0 {
        return Err(WebError::resource_bad_request(
            PaymentOrder::get_resource_type(),
            "Amount must be positive",
        ));
    }
    let currency = Config::get_or_init(false).await.payment().currency().to_string();

    let student = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    state
        .mailer()
        .send(templates::payment_success(
            student.email(),
            &student.full_name(),
            amount,
            &currency,
            &order_id,
            &payment_id,
        ))
        .await
        .map_err(WebError::server_mail_error)?;

    Ok((StatusCode::OK, Json(MessageResponse::ok("Payment success email sent"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payment/getKey",
    description = "Public key id for the browser checkout",
    responses(
        (status = 200, description = "Key id", body = ApiResponse<KeyResponse>),
    ),
    tag = "payment"
)]
pub async fn get_key_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Key fetched",
            KeyResponse {
                key: state.gateway().key_id().to_string(),
            },
        )),
    ))
}
