use serde::{Deserialize, Serialize};

use crate::{model::entity::UserEntity, web::UserRole};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default = "default_account_type")]
    pub account_type: UserRole,
}

fn default_account_type() -> UserRole {
    UserRole::Student
}

impl SignupBody {
    pub fn validate(&self) -> Option<&'static str> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Some("all fields are required");
        }
        if !self.email.contains('@') {
            return Some("email is invalid");
        }
        if self.password != self.confirm_password {
            return Some("password and confirm password do not match");
        }
        if self.account_type == UserRole::Admin {
            return Some("admin accounts cannot be self-registered");
        }
        None
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserEntity,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordBody {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordTokenBody {
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordBody {
    pub password: String,
    pub confirm_password: String,
    pub token: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(password: &str, confirm: &str, role: UserRole) -> SignupBody {
        SignupBody {
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            email: String::from("ada@example.com"),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            account_type: role,
        }
    }

    #[test]
    fn signup_validation_test() {
        assert_eq!(body("pw", "pw", UserRole::Student).validate(), None);
        assert_eq!(body("pw", "pw", UserRole::Instructor).validate(), None);
        assert!(body("pw", "other", UserRole::Student).validate().is_some());
        assert!(body("pw", "pw", UserRole::Admin).validate().is_some());
        assert!(body("", "", UserRole::Student).validate().is_some());
    }

    #[test]
    fn signup_defaults_to_student_test() {
        let parsed: SignupBody = serde_json::from_str(
            r#"{"first_name":"a","last_name":"b","email":"a@b.c","password":"p","confirm_password":"p"}"#,
        )
        .unwrap();
        assert_eq!(parsed.account_type, UserRole::Student);
    }
}
