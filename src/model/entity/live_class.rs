use crate::impl_resource_typed;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LiveClass {
    id: Uuid,
    instructor_id: Uuid,
    course_id: Option<Uuid>,
    room_id: Uuid,
    topic: String,
    scheduled_at: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LiveClassCreate {
    pub instructor_id: Uuid,
    pub course_id: Option<Uuid>,
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
}

impl_resource_typed!(LiveClass, LiveClass);

impl LiveClass {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Schedules a class in a freshly generated room.
    pub async fn create(mm: &ModelManager, data: LiveClassCreate) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO live_classes (id, instructor_id, course_id, room_id, topic, scheduled_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.instructor_id)
        .bind(data.course_id)
        .bind(Uuid::new_v4())
        .bind(data.topic.trim())
        .bind(data.scheduled_at)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_by_room(mm: &ModelManager, room_id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM live_classes WHERE room_id = $1")
            .bind(room_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Adds the student to the attendee list. `false` if already there.
    pub async fn join(&self, mm: &ModelManager, student_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO live_class_students (live_class_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(student_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn attendee_count(&self, mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM live_class_students WHERE live_class_id = $1")
                .bind(self.id)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct UpcomingLiveClassRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
    pub course_id: Option<Uuid>,
    pub instructor_id: Uuid,
    pub instructor_first_name: String,
    pub instructor_last_name: String,
}

impl UpcomingLiveClassRow {
    pub async fn fetch(mm: &ModelManager, now: DateTime<Utc>) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                l.id, l.room_id, l.topic, l.scheduled_at, l.course_id,
                u.id AS instructor_id,
                u.first_name AS instructor_first_name,
                u.last_name AS instructor_last_name
            FROM live_classes l
            JOIN users u ON u.id = l.instructor_id
            WHERE l.is_active AND l.scheduled_at >= $1
            ORDER BY l.scheduled_at ASC, l.id
            "#,
        )
        .bind(now)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
