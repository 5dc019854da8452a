use crate::impl_resource_typed;
use crate::model::{ModelManager, Page, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct RatingAndReview {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    rating: i32,
    review: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RatingAndReviewCreate {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i32,
    pub review: String,
}

impl RatingAndReviewCreate {
    pub fn validate(&self) -> Option<&'static str> {
        if !(1..=5).contains(&self.rating) {
            return Some("rating must be between 1 and 5");
        }
        if self.review.trim().is_empty() {
            return Some("review is required");
        }
        None
    }
}

impl_resource_typed!(RatingAndReview, RatingAndReview);

impl RatingAndReview {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Fails with a unique violation when the user already reviewed the course.
    pub async fn create(mm: &ModelManager, data: RatingAndReviewCreate) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO rating_and_reviews (id, user_id, course_id, rating, review)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(data.rating)
        .bind(data.review.trim())
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    /// Mean rating of a course, 0 when nobody rated it yet.
    pub async fn average_for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<f64> {
        let result: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(rating)::FLOAT8 FROM rating_and_reviews WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result.unwrap_or(0.0))
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct ReviewWithAuthorRow {
    pub id: Uuid,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub course_id: Uuid,
    pub course_name: String,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
}

impl ReviewWithAuthorRow {
    pub async fn page(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Page<Self>> {
        let items = sqlx::query_as(
            r#"
            SELECT
                r.id, r.rating, r.review, r.created_at,
                c.id AS course_id, c.course_name,
                u.id AS user_id, u.first_name, u.last_name, u.image
            FROM rating_and_reviews r
            JOIN courses c ON c.id = r.course_id
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC, r.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor());

        let total = sqlx::query_scalar("SELECT COUNT(*) FROM rating_and_reviews")
            .fetch_one(mm.executor());

        let (items, total): (Vec<Self>, i64) = tokio::try_join!(items, total)?;
        Ok(Page::new(items, total, limit, offset))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(rating: i32, review: &str) -> RatingAndReviewCreate {
        RatingAndReviewCreate {
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            rating,
            review: review.to_string(),
        }
    }

    #[test]
    fn validate_test() {
        assert_eq!(body(1, "fine").validate(), None);
        assert_eq!(body(5, "great").validate(), None);
        assert!(body(0, "meh").validate().is_some());
        assert!(body(6, "wow").validate().is_some());
        assert!(body(4, "   ").validate().is_some());
    }
}
