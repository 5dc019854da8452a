use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};

use crate::{
    mail::templates,
    model::ResourceType,
    web::{
        AppState, WebError, WebResult,
        dto::{MessageResponse, non_blank, reach::ContactBody},
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/contact", post(contact_handler))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/reach/contact",
    request_body = ContactBody,
    description = "Confirms a contact-form message to its sender and forwards it to the team",
    responses(
        (status = 200, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Missing email or message", body = ErrorResponse),
        (status = 502, description = "Mail could not be sent", body = ErrorResponse),
    ),
    tag = "reach"
)]
pub async fn contact_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContactBody>,
) -> WebResult<impl IntoResponse> {
    let (Some(email), Some(message)) = (
        non_blank(payload.email.as_deref()),
        non_blank(payload.message.as_deref()),
    ) else {
        return Err(WebError::resource_bad_request(
            ResourceType::User,
            "Email and message are required",
        ));
    };

    let phone = payload.phone();
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();

    state
        .mailer()
        .send(templates::contact_confirmation(email, first_name, last_name, message, &phone))
        .await
        .map_err(WebError::server_mail_error)?;

    if let Some(inbox) = state.mailer().contact_inbox() {
        state
            .mailer()
            .send(templates::contact_forward(inbox, email, first_name, last_name, message, &phone))
            .await
            .map_err(WebError::server_mail_error)?;
    }

    Ok((StatusCode::OK, Json(MessageResponse::ok("Email send successfully"))))
}
