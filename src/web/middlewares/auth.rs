use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    Config, auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "token";

/// Session token from the `token` cookie, falling back to a bearer header.
fn find_token(cookies: &Cookies, req: &Request) -> Option<String> {
    if let Some(cookie) = cookies.get(AUTH_TOKEN) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match find_token(&cookies, &req) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_token(&token, Config::get_or_init(false).await.app().jwt())
        .map_err(|e| WebError::auth_token_invalid(AUTH_TOKEN, e))?;

    let id = claims
        .claims
        .user_id()
        .ok_or_else(|| WebError::auth_token_malformed(AUTH_TOKEN))?;

    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    match user {
        Some(user) => {
            let role = user.role();
            req.extensions_mut()
                .insert(RequestContext::new(Some(AuthenticatedUser::new(id, role))));

            Ok(next.run(req).await)
        }
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            Ok(next.run(req).await)
        }
    }
}
