use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    Config,
    auth::{self, UserClaims, hash_password, verify_password},
    mail::{self, templates},
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            ApiResponse, MessageResponse,
            auth::{
                AuthResponse, ChangePasswordBody, LoginBody, ResetPasswordBody,
                ResetPasswordTokenBody, SignupBody,
            },
        },
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

/// How long a password reset link stays valid.
const RESET_TOKEN_LIFETIME_MINUTES: i64 = 5;

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/verify", get(verify_handler))
        .route("/changepassword", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/reset-password-token", post(reset_password_token_handler))
        .route("/reset-password", post(reset_password_handler))
        .merge(protected)
        .with_state(state)
}

/// Signs a session token for `user_id` and stores it in the auth cookie.
async fn issue_session(cookies: &Cookies, user_id: Uuid) -> WebResult<String> {
    let key = Config::get_or_init(false).await.app().jwt();
    let token = auth::generate_token(UserClaims::for_user(user_id), key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token.clone());
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(token)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupBody,
    description = "Registers a student or instructor and signs them in",
    responses(
        (status = 200, description = "User registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid registration data", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    if let Some(reason) = payload.validate() {
        return Err(WebError::registration_invalid(reason));
    }

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreateUpdate::new(
        payload.first_name.trim().to_string(),
        payload.last_name.trim().to_string(),
        payload.email.trim().to_lowercase(),
        hash,
        payload.account_type,
    );

    let created = UserEntity::create(state.pool(), &admin, data)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::registration_conflict()
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    let token = issue_session(&cookies, created.id()).await?;
    tracing::info!("registered {} {}", created.role(), created.id());

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "User registered successfully",
            AuthResponse {
                token,
                user: created,
            },
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    description = "Authorizes user in the system",
    request_body = LoginBody,
    responses(
        (status = 200, description = "User signed in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let token = issue_session(&cookies, found.id()).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "User Login Success",
            AuthResponse { token, user: found },
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    description = "Removes the session cookie",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
    ),
    tag = "auth",
)]
pub async fn logout_handler(cookies: Cookies) -> WebResult<impl IntoResponse> {
    let mut cookie = Cookie::new(AUTH_TOKEN, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok((StatusCode::OK, Json(MessageResponse::ok("Logged out successfully"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    description = "Checks whether the request carries a valid session",
    responses(
        (status = 200, description = "Session is valid", body = MessageResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("cookie" = [])
    )
)]
pub async fn verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    Ok((StatusCode::OK, Json(MessageResponse::ok("Token is valid"))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/changepassword",
    request_body = ChangePasswordBody,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New passwords do not match", body = ErrorResponse),
        (status = 401, description = "Old password is wrong or not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("cookie" = [])
    )
)]
pub async fn change_password_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let is_verified = verify_password(found.hash(), &payload.old_password)
        .map_err(WebError::server_crypt_error)?;
    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    if payload.new_password.is_empty() || payload.new_password != payload.confirm_new_password {
        return Err(WebError::resource_bad_request(
            UserEntity::get_resource_type(),
            "The password and confirm password does not match",
        ));
    }

    let hash = hash_password(&payload.new_password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreateUpdate {
        password_hash: hash,
        ..UserEntityCreateUpdate::from(&found)
    };

    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    mail::send_best_effort(
        state.mailer(),
        templates::password_updated(updated.email(), &updated.full_name()),
    )
    .await;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::ok("Password updated successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password-token",
    request_body = ResetPasswordTokenBody,
    description = "Mails a password reset link when the address is registered",
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn reset_password_token_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordTokenBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    // same answer either way, so addresses can't be enumerated
    if let Some(found) = found {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_LIFETIME_MINUTES);
        found
            .set_reset_token(state.pool(), &admin, &token, expires_at)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

        let url = format!(
            "{}/update-password/{}",
            Config::get_or_init(false).await.app().client_url(),
            token
        );
        mail::send_best_effort(state.mailer(), templates::password_reset(found.email(), &url)).await;
    }

    Ok((
        StatusCode::OK,
        Json(MessageResponse::ok(
            "If the email is registered, a password reset link has been sent",
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Mismatch, unknown or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordBody>,
) -> WebResult<impl IntoResponse> {
    let resource = UserEntity::get_resource_type();
    if payload.password.is_empty() || payload.password != payload.confirm_password {
        return Err(WebError::resource_bad_request(
            resource,
            "Password and Confirm Password Does not Match",
        ));
    }

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_reset_token(state.pool(), &admin, &payload.token)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_bad_request(UserEntity::get_resource_type(), "Token is Invalid"))?;

    let expired = found
        .reset_token_expires()
        .map(|expires| *expires < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(WebError::resource_bad_request(
            resource,
            "Token is Expired, Please Regenerate Your Token",
        ));
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    found
        .reset_password(state.pool(), &admin, &hash)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::ok("Password Reset Successful"))))
}
