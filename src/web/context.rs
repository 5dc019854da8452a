//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // admin ID
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    /// Admins pass every role guard.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.user_role == role || self.user_role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "Admin" => Self::Admin,
            "Instructor" => Self::Instructor,
            _ => Self::Student,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Instructor => write!(f, "Instructor"),
            Self::Student => write!(f, "Student"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    /// The authenticated user, provided they hold `role` (or are an admin).
    pub fn user_with_role(&self, role: UserRole) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if user.has_role(role) {
            Ok(user)
        } else {
            Err(WebError::role_forbidden(role))
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_parsing_test() {
        assert_eq!(UserRole::from("Admin"), UserRole::Admin);
        assert_eq!(UserRole::from("Instructor"), UserRole::Instructor);
        assert_eq!(UserRole::from("Student"), UserRole::Student);
        assert_eq!(UserRole::from("something"), UserRole::Student);
        assert_eq!(UserRole::Instructor.to_string(), "Instructor");

        let parsed: UserRole = serde_json::from_str("\"Instructor\"").unwrap();
        assert_eq!(parsed, UserRole::Instructor);
    }

    #[test]
    fn role_guard_test() {
        let id = uuid::Uuid::new_v4();
        let student = RequestContext::new(Some(AuthenticatedUser::new(id, UserRole::Student)));
        let instructor =
            RequestContext::new(Some(AuthenticatedUser::new(id, UserRole::Instructor)));
        let anonymous = RequestContext::new(None);

        assert!(student.user_with_role(UserRole::Student).is_ok());
        assert!(student.user_with_role(UserRole::Instructor).is_err());
        assert!(instructor.user_with_role(UserRole::Instructor).is_ok());
        assert!(RequestContext::admin().user_with_role(UserRole::Student).is_ok());
        assert!(RequestContext::admin().user_with_role(UserRole::Instructor).is_ok());

        let err = student.user_with_role(UserRole::Instructor).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        let err = anonymous.user_with_role(UserRole::Student).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
