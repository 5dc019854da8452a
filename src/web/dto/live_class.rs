use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateLiveClassBody {
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct JoinLiveClassBody {
    pub room_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JoinLiveClassResponse {
    pub room_id: Uuid,
    pub topic: String,
    pub attendees: i64,
}
