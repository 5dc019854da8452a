mod common;
use axum_test::multipart::{MultipartForm, Part};
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{Action, CONTACT_INBOX, Flow, PASSWORD, login_action, setup_app, setup_test_db, signup_action};

fn picture(mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "display_picture",
        Part::bytes(b"\x89PNG fake".to_vec())
            .file_name("me.png")
            .mime_type(mime.to_string()),
    )
}

#[tokio::test]
async fn route_profile_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    Flow::new()
        .step(
            Action::new("details_anonymous", "GET", "/api/v1/profile/getUserDetails")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("Mia", "mia@example.com", "Student"))
        .step(
            Action::new("update", "PUT", "/api/v1/profile/updateProfile")
                .with_body(json!({
                    "first_name": "  ",
                    "about": "Learning Rust",
                    "date_of_birth": "2000-02-29",
                    "contact_number": "5550100",
                }))
                .assert_json(|body| {
                    assert_eq!(body["data"]["first_name"], json!("Mia"));
                    assert_eq!(body["data"]["about"], json!("Learning Rust"));
                    assert_eq!(body["data"]["date_of_birth"], json!("2000-02-29"));
                }),
        )
        .step(
            Action::new("details", "GET", "/api/v1/profile/getUserDetails").assert_json(|body| {
                assert_eq!(body["data"]["email"], json!("mia@example.com"));
                assert_eq!(body["data"]["contact_number"], json!("5550100"));
            }),
        )
        .step(
            Action::new("picture_not_image", "PUT", "/api/v1/profile/updateDisplayPicture")
                .with_form(|_| picture("text/plain"))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("picture", "PUT", "/api/v1/profile/updateDisplayPicture")
                .with_form(|_| picture("image/png"))
                .assert_json(|body| {
                    let image = body["data"]["image"].as_str().unwrap();
                    assert!(image.starts_with("/api/v1/static/pictures/"));
                    assert!(image.ends_with(".png"));
                })
                .with_save_as("picture"),
        )
        .step(
            Action::new("picture_served", "GET", "")
                .with_dyn_path(|ctx| ctx.data_str("picture", "image")),
        )
        .step(
            Action::new("dashboard_as_student", "GET", "/api/v1/profile/instructorDashboard")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(Action::new("delete", "DELETE", "/api/v1/profile/deleteProfile"))
        .step(
            login_action("mia@example.com", PASSWORD)
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut app.server, pool)
        .await;
}

#[tokio::test]
async fn route_contact_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;
    let outbox = app.outbox.clone();

    Flow::new()
        .step(
            Action::new("contact_incomplete", "POST", "/api/v1/reach/contact")
                .with_body(json!({ "first_name": "Vic", "last_name": "Tor", "message": "hi" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("contact", "POST", "/api/v1/reach/contact").with_body(json!({
                "first_name": "Vic",
                "last_name": "Tor",
                "email": "vic@example.com",
                "message": "Do you offer <b>group</b> discounts?",
                "phone_no": "5550199",
                "country_code": "+1",
            })),
        )
        .run_with(&mut app.server)
        .await;

    let confirmation = outbox.sent_to("vic@example.com");
    assert_eq!(confirmation.len(), 1);
    assert!(confirmation[0].html.contains("&lt;b&gt;group&lt;/b&gt;"));

    let forwarded = outbox.sent_to(CONTACT_INBOX);
    assert_eq!(forwarded.len(), 1);
    assert!(forwarded[0].subject.contains("vic@example.com"));
    assert!(forwarded[0].html.contains("+1 5550199"));

    drop(pool);
}

#[tokio::test]
async fn route_root_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    Flow::new()
        .step(
            Action::new("root", "GET", "/")
                .assert_json(|body| assert_eq!(body["message"], json!("Your server is up and running...."))),
        )
        .run(&mut app.server, pool)
        .await;
}
