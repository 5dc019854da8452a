mod common;
use axum_test::multipart::{MultipartForm, Part};
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, PASSWORD, create_course_action, create_section_action, create_sub_section_action,
    lecture_form, login_action, setup_app, setup_test_db, signup_action,
};

fn course_path(suffix: &'static str) -> impl Fn(&common::FlowContext) -> String + Send + Sync {
    move |ctx| format!("/api/v1/course/{}{}", ctx.data_str("course", "id"), suffix)
}

#[tokio::test]
async fn route_course_authoring_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    Flow::new()
        .step(signup_action("Stu", "stu@example.com", "Student"))
        .step(
            create_course_action("Nope", 10, "Published")
                .with_save_as("rejected")
                .assert_body(|body| assert!(body.contains("protected route for Instructors")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(signup_action("Ina", "ina@example.com", "Instructor").with_clear_cookies(true))
        .step(
            Action::new("create_invalid", "POST", "/api/v1/course")
                .with_body(json!({ "course_name": " ", "course_description": "x", "price": 1 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(create_course_action("Rust 101", 499, "Draft").assert_json(|body| {
            assert_eq!(body["data"]["status"], json!("Draft"));
            assert_eq!(body["data"]["price"], json!(499));
        }))
        // drafts stay out of the catalog
        .step(
            Action::new("catalog_empty", "GET", "/api/v1/course")
                .with_clear_cookies(true)
                .with_save_cookies(false)
                .assert_json(|body| assert_eq!(body["data"]["total"], json!(0))),
        )
        .step(
            Action::new("draft_hidden", "GET", "")
                .with_dyn_path(course_path(""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(login_action("ina@example.com", PASSWORD))
        .step(
            Action::new("draft_visible_to_owner", "GET", "").with_dyn_path(course_path("")),
        )
        .step(create_section_action("Getting started").assert_json(|body| {
            assert_eq!(body["data"][0]["section_name"], json!("Getting started"));
        }))
        .step(
            Action::new("section_blank", "POST", "")
                .with_dyn_path(course_path("/sections"))
                .with_body(json!({ "section_name": "" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(create_sub_section_action("Hello, world").assert_json(|body| {
            let lecture = &body["data"]["sub_sections"][0];
            assert_eq!(lecture["title"], json!("Hello, world"));
            assert!(lecture["video_url"].as_str().unwrap().starts_with("/api/v1/static/videos/"));
        }))
        .step(
            Action::new("sub_section_not_video", "POST", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/course/sections/{}/sub-sections",
                        ctx.get("sections")["data"][0]["id"].as_str().unwrap()
                    )
                })
                .with_form(|_| lecture_form("Slides", "application/pdf"))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("publish", "PUT", "")
                .with_dyn_path(course_path(""))
                .with_body(json!({
                    "course_name": "Rust 101",
                    "course_description": "All about Rust 101",
                    "price": 499,
                    "status": "Published",
                }))
                .assert_json(|body| assert_eq!(body["data"]["status"], json!("Published"))),
        )
        .step(
            Action::new("instructor_courses", "GET", "/api/v1/course/instructor")
                .assert_json(|body| assert_eq!(body["data"].as_array().unwrap().len(), 1)),
        )
        // outline is public and hides the video links
        .step(
            Action::new("details", "GET", "")
                .with_clear_cookies(true)
                .with_save_cookies(false)
                .with_dyn_path(course_path(""))
                .assert_json(|body| {
                    let data = &body["data"];
                    assert_eq!(data["course_name"], json!("Rust 101"));
                    assert_eq!(data["total_lectures"], json!(1));
                    assert_eq!(data["total_students"], json!(0));
                    assert_eq!(data["average_rating"], json!(0.0));
                    assert_eq!(data["instructor"]["first_name"], json!("Ina"));
                    assert!(data["sections"][0]["sub_sections"][0].get("video_url").is_none());
                }),
        )
        .step(
            Action::new("catalog", "GET", "/api/v1/course")
                .with_save_cookies(false)
                .assert_json(|body| assert_eq!(body["data"]["total"], json!(1))),
        )
        .run(&mut app.server, pool)
        .await;
}

#[tokio::test]
async fn route_course_ownership_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    Flow::new()
        .step(signup_action("Owner", "owner@example.com", "Instructor"))
        .step(create_course_action("Owned", 0, "Published"))
        .step(create_section_action("Only section"))
        .step(signup_action("Rival", "rival@example.com", "Instructor").with_clear_cookies(true))
        .step(
            Action::new("rival_update", "PUT", "")
                .with_dyn_path(course_path(""))
                .with_body(json!({
                    "course_name": "Stolen",
                    "course_description": "mine now",
                    "price": 1,
                }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("rival_section", "POST", "")
                .with_dyn_path(course_path("/sections"))
                .with_body(json!({ "section_name": "Extra" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("rival_rename_section", "PUT", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/course/sections/{}",
                        ctx.get("sections")["data"][0]["id"].as_str().unwrap()
                    )
                })
                .with_body(json!({ "section_name": "Renamed" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("rival_full", "GET", "")
                .with_dyn_path(course_path("/full"))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("rival_delete", "DELETE", "")
                .with_dyn_path(course_path(""))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_action("owner@example.com", PASSWORD))
        .step(
            Action::new("rename_section", "PUT", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/course/sections/{}",
                        ctx.get("sections")["data"][0]["id"].as_str().unwrap()
                    )
                })
                .with_body(json!({ "section_name": "Renamed" }))
                .assert_json(|body| assert_eq!(body["data"][0]["section_name"], json!("Renamed"))),
        )
        .step(Action::new("delete", "DELETE", "").with_dyn_path(course_path("")))
        .step(
            Action::new("deleted", "GET", "")
                .with_dyn_path(course_path(""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut app.server, pool)
        .await;
}

#[tokio::test]
async fn route_live_class_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    Flow::new()
        .step(signup_action("Host", "host@example.com", "Instructor"))
        .step(
            Action::new("schedule_blank", "POST", "/api/v1/course/live")
                .with_body(json!({ "topic": "  ", "scheduled_at": "2099-01-01T10:00:00Z" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("schedule", "POST", "/api/v1/course/live")
                .with_body(json!({ "topic": "Office hours", "scheduled_at": "2099-01-01T10:00:00Z" }))
                .with_save_as("live")
                .with_expect(StatusCode::CREATED),
        )
        .step(signup_action("Guest", "guest@example.com", "Student").with_clear_cookies(true))
        .step(
            Action::new("schedule_as_student", "POST", "/api/v1/course/live")
                .with_body(json!({ "topic": "Mine", "scheduled_at": "2099-01-01T10:00:00Z" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("upcoming", "GET", "/api/v1/course/live/upcoming").assert_json(|body| {
                let rows = body["data"].as_array().unwrap();
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["topic"], json!("Office hours"));
            }),
        )
        .step(
            Action::new("join", "POST", "/api/v1/course/live/join")
                .with_dyn_body(|ctx| json!({ "room_id": ctx.data_str("live", "room_id") }))
                .assert_json(|body| {
                    assert_eq!(body["data"]["topic"], json!("Office hours"));
                    assert_eq!(body["data"]["attendees"], json!(1));
                }),
        )
        // joining twice keeps a single seat
        .step(
            Action::new("join_again", "POST", "/api/v1/course/live/join")
                .with_dyn_body(|ctx| json!({ "room_id": ctx.data_str("live", "room_id") }))
                .assert_json(|body| assert_eq!(body["data"]["attendees"], json!(1))),
        )
        .step(
            Action::new("join_unknown", "POST", "/api/v1/course/live/join")
                .with_body(json!({ "room_id": "00000000-0000-0000-0000-000000000000" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut app.server, pool)
        .await;
}

fn video_count(app: &common::TestApp) -> usize {
    std::fs::read_dir(app.media.path().join("videos"))
        .map(|dir| dir.count())
        .unwrap_or(0)
}

fn replacement_form(title: &str) -> MultipartForm {
    MultipartForm::new().add_text("title", title.to_string()).add_part(
        "video",
        Part::bytes(b"a newer take".to_vec())
            .file_name("retake.mp4")
            .mime_type("video/mp4"),
    )
}

fn lecture_path(ctx: &common::FlowContext) -> String {
    format!(
        "/api/v1/course/sub-sections/{}",
        ctx.get("section")["data"]["sub_sections"][0]["id"].as_str().unwrap()
    )
}

#[tokio::test]
async fn route_lecture_video_replace_test() {
    let pool = setup_test_db().await;
    let mut app = setup_app(&pool).await;

    let ctx = Flow::new()
        .step(signup_action("Vid", "vid@example.com", "Instructor"))
        .step(create_course_action("Filming", 10, "Draft"))
        .step(create_section_action("Takes"))
        .step(create_sub_section_action("First take"))
        .step(
            Action::new("replace_video", "PUT", "")
                .with_dyn_path(lecture_path)
                .with_form(|_| replacement_form("Second take"))
                .assert_json(|body| {
                    assert_eq!(body["data"]["sub_sections"][0]["title"], json!("Second take"));
                })
                .with_save_as("replaced"),
        )
        .run_with(&mut app.server)
        .await;

    // the old video is gone, the new one is kept
    assert_eq!(video_count(&app), 1);
    let current = ctx.get("replaced")["data"]["sub_sections"][0]["video_url"]
        .as_str()
        .unwrap()
        .to_string();

    sqlx::query("ALTER TABLE sub_sections ADD CONSTRAINT sub_sections_no_broken CHECK (title <> 'Broken')")
        .execute(pool.pool())
        .await
        .unwrap();

    let path = lecture_path(&ctx);
    app.server
        .put(&path)
        .multipart(replacement_form("Broken"))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    // a failed update leaves no stray upload behind
    assert_eq!(video_count(&app), 1);
    app.server.get(&current).await.assert_status_ok();

    drop(pool);
}
