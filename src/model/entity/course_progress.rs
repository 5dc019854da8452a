use crate::impl_resource_typed;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One student's progress through one course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseProgress {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    created_at: DateTime<Utc>,
}

impl_resource_typed!(CourseProgress, CourseProgress);

impl CourseProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub async fn find_for(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM course_progress WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    /// Returns the existing record or creates an empty one.
    pub async fn get_or_create(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            INSERT INTO course_progress (id, user_id, course_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .execute(mm.executor())
        .await?;

        let result =
            sqlx::query_as("SELECT * FROM course_progress WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn completed_sub_sections(&self, mm: &ModelManager) -> DatabaseResult<Vec<Uuid>> {
        let result: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT sub_section_id FROM course_progress_completions
            WHERE progress_id = $1
            ORDER BY completed_at, sub_section_id
            "#,
        )
        .bind(self.id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Records a completed lecture. `false` means it was already recorded.
    pub async fn mark_completed(
        &self,
        mm: &ModelManager,
        sub_section_id: Uuid,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO course_progress_completions (progress_id, sub_section_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(sub_section_id)
        .execute(mm.executor())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_completed(&self, mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM course_progress_completions WHERE progress_id = $1",
        )
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

/// Share of completed lectures, rounded to two decimals. A course without
/// lectures counts as fully complete.
pub fn progress_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 100.0;
    }
    let completed = completed.clamp(0, total);
    let raw = completed as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_percentage_test() {
        assert_eq!(progress_percentage(0, 0), 100.0);
        assert_eq!(progress_percentage(0, 4), 0.0);
        assert_eq!(progress_percentage(1, 4), 25.0);
        assert_eq!(progress_percentage(1, 3), 33.33);
        assert_eq!(progress_percentage(2, 3), 66.67);
        assert_eq!(progress_percentage(3, 3), 100.0);
        assert_eq!(progress_percentage(5, 3), 100.0);
    }
}
