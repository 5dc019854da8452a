use serde::{Deserialize, Serialize};

pub mod auth;
pub mod course;
pub mod live_class;
pub mod payment;
pub mod profile;
pub mod progress;
pub mod rating;
pub mod reach;

/// Envelope every successful response is wrapped in.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok<S: Into<String>>(message: S, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Envelope without a payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Trimmed value, `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn envelope_shape_test() {
        let json = serde_json::to_value(ApiResponse::ok("done", 5)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "done", "data": 5}));

        let json = serde_json::to_value(MessageResponse::ok("bye")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "bye"}));
    }

    #[test]
    fn non_blank_test() {
        assert_eq!(non_blank(Some("  a ")), Some("a"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
