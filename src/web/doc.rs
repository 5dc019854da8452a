use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user, also accepted as a Bearer header",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::root_handler,
        crate::web::routes::auth::signup_handler,
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::logout_handler,
        crate::web::routes::auth::verify_handler,
        crate::web::routes::auth::change_password_handler,
        crate::web::routes::auth::reset_password_token_handler,
        crate::web::routes::auth::reset_password_handler,
        crate::web::routes::profile::get_user_details_handler,
        crate::web::routes::profile::update_profile_handler,
        crate::web::routes::profile::delete_profile_handler,
        crate::web::routes::profile::enrolled_courses_handler,
        crate::web::routes::profile::instructor_dashboard_handler,
        crate::web::routes::profile::update_display_picture_handler,
        crate::web::routes::course::course_list_handler,
        crate::web::routes::course::course_create_handler,
        crate::web::routes::course::instructor_courses_handler,
        crate::web::routes::course::course_details_handler,
        crate::web::routes::course::course_update_handler,
        crate::web::routes::course::course_delete_handler,
        crate::web::routes::course::course_full_handler,
        crate::web::routes::section::section_create_handler,
        crate::web::routes::section::section_update_handler,
        crate::web::routes::section::section_delete_handler,
        crate::web::routes::section::sub_section_create_handler,
        crate::web::routes::section::sub_section_update_handler,
        crate::web::routes::section::sub_section_delete_handler,
        crate::web::routes::progress::update_progress_handler,
        crate::web::routes::rating::rating_create_handler,
        crate::web::routes::rating::rating_average_handler,
        crate::web::routes::rating::reviews_list_handler,
        crate::web::routes::live_class::live_class_create_handler,
        crate::web::routes::live_class::live_class_upcoming_handler,
        crate::web::routes::live_class::live_class_join_handler,
        crate::web::routes::payment::capture_payment_handler,
        crate::web::routes::payment::verify_payment_handler,
        crate::web::routes::payment::payment_success_email_handler,
        crate::web::routes::payment::get_key_handler,
        crate::web::routes::reach::contact_handler,
    ),
    tags(
        (name = "root", description = "Liveness"),
        (name = "auth", description = "Signup, login and password recovery"),
        (name = "profile", description = "The signed-in user's own account"),
        (name = "course", description = "Catalog and course authoring"),
        (name = "section", description = "Sections and video lectures"),
        (name = "progress", description = "Lecture completion"),
        (name = "rating", description = "Ratings and reviews"),
        (name = "live", description = "Live class rooms"),
        (name = "payment", description = "Checkout and enrollment"),
        (name = "reach", description = "Contact form"),
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_document_test() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/payment/verifyPayment"));
        assert!(doc.paths.paths.contains_key("/api/v1/course/{course_id}/ratings"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("cookie"));
    }
}
