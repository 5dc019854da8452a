use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateRatingBody {
    pub rating: i32,
    pub review: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AverageRatingResponse {
    pub average_rating: f64,
}
