use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ids arrive as plain strings so malformed ones can be rejected with a 400.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProgressBody {
    pub course_id: String,
    pub sub_section_id: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseProgressResponse {
    pub course_id: Uuid,
    pub completed_videos: Vec<Uuid>,
    pub progress_percentage: f64,
}
