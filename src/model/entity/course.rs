use crate::impl_resource_typed;
use crate::model::access::HasOwner;
use crate::model::{
    ModelManager,
    error::DatabaseResult,
    repo::{CrudRepository, PaginatableRepository},
};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum CourseStatus {
    Draft,
    Published,
}

impl From<&str> for CourseStatus {
    fn from(value: &str) -> Self {
        match value {
            "Published" => Self::Published,
            _ => Self::Draft,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Published => write!(f, "Published"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    instructor_id: Uuid,
    course_name: String,
    course_description: String,
    what_you_will_learn: String,
    /// Whole currency units.
    price: i64,
    thumbnail: String,
    tags: Vec<String>,
    instructions: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreateUpdate {
    pub course_name: String,
    pub course_description: String,
    #[serde(default)]
    pub what_you_will_learn: String,
    pub price: i64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
}

impl CourseCreateUpdate {
    /// First validation problem, if any.
    pub fn validate(&self) -> Option<&'static str> {
        if self.course_name.trim().is_empty() {
            return Some("course name is required");
        }
        if self.course_description.trim().is_empty() {
            return Some("course description is required");
        }
        if self.price < 0 {
            return Some("price must not be negative");
        }
        None
    }
}

impl_resource_typed!(Course, Course);

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn status(&self) -> CourseStatus {
        CourseStatus::from(self.status.as_str())
    }

    pub fn is_published(&self) -> bool {
        self.status() == CourseStatus::Published
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreateUpdate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO courses
                (id, instructor_id, course_name, course_description, what_you_will_learn,
                 price, thumbnail, tags, instructions, status)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(data.course_name.trim())
        .bind(data.course_description.trim())
        .bind(&data.what_you_will_learn)
        .bind(data.price)
        .bind(data.thumbnail.unwrap_or_default())
        .bind(&data.tags)
        .bind(&data.instructions)
        .bind(data.status.unwrap_or(CourseStatus::Draft).to_string())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE courses SET
                course_name = $1, course_description = $2, what_you_will_learn = $3,
                price = $4, thumbnail = $5, tags = $6, instructions = $7, status = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(data.course_name.trim())
        .bind(data.course_description.trim())
        .bind(&data.what_you_will_learn)
        .bind(data.price)
        .bind(data.thumbnail.unwrap_or(self.thumbnail))
        .bind(&data.tags)
        .bind(&data.instructions)
        .bind(data.status.unwrap_or_else(|| CourseStatus::from(self.status.as_str())).to_string())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

}

#[async_trait]
impl PaginatableRepository for Course {
    /// Published catalogue, newest first.
    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE status = 'Published' ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE status = 'Published'")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Course {
    async fn get_owner_id(&self, _mm: &ModelManager) -> DatabaseResult<Uuid> {
        Ok(self.instructor_id)
    }
}

impl Course {
    pub async fn all_by_instructor(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        instructor_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE instructor_id = $1 ORDER BY created_at DESC",
        )
        .bind(instructor_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_enrolled(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT c.* FROM courses c
            JOIN course_enrollments e ON e.course_id = c.id
            WHERE e.user_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_many(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        ids: &[Uuid],
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn is_enrolled(&self, mm: &ModelManager, user_id: Uuid) -> DatabaseResult<bool> {
        let result: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM course_enrollments WHERE course_id = $1 AND user_id = $2)",
        )
        .bind(self.id)
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn student_count(&self, mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1")
                .bind(self.id)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct InstructorCourseStatsRow {
    pub id: Uuid,
    pub course_name: String,
    pub course_description: String,
    pub price: i64,
    pub status: String,
    pub total_students_enrolled: i64,
    pub total_amount_generated: i64,
}

impl InstructorCourseStatsRow {
    pub async fn fetch_for_instructor(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        instructor_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.course_name,
                c.course_description,
                c.price,
                c.status,
                COUNT(e.user_id) AS total_students_enrolled,
                COUNT(e.user_id) * c.price AS total_amount_generated
            FROM courses c
            LEFT JOIN course_enrollments e ON e.course_id = c.id
            WHERE c.instructor_id = $1
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(instructor_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(name: &str, description: &str, price: i64) -> CourseCreateUpdate {
        CourseCreateUpdate {
            course_name: name.to_string(),
            course_description: description.to_string(),
            what_you_will_learn: String::new(),
            price,
            thumbnail: None,
            tags: vec![],
            instructions: vec![],
            status: None,
        }
    }

    #[test]
    fn validate_test() {
        assert_eq!(body("Rust", "Systems", 499).validate(), None);
        assert_eq!(body("Free", "Zero cost", 0).validate(), None);
        assert!(body("  ", "Systems", 499).validate().is_some());
        assert!(body("Rust", "", 499).validate().is_some());
        assert!(body("Rust", "Systems", -1).validate().is_some());
    }

    #[test]
    fn status_parsing_test() {
        assert_eq!(CourseStatus::from("Published"), CourseStatus::Published);
        assert_eq!(CourseStatus::from("Draft"), CourseStatus::Draft);
        assert_eq!(CourseStatus::from("garbage"), CourseStatus::Draft);
        assert_eq!(CourseStatus::Published.to_string(), "Published");

        let parsed: CourseCreateUpdate = serde_json::from_str(
            r#"{"course_name":"a","course_description":"b","price":1,"status":"Published"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, Some(CourseStatus::Published));
        assert!(parsed.tags.is_empty());
    }
}
