use crate::impl_resource_typed;
use crate::model::access::HasOwner;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A single lecture: one video plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct SubSection {
    id: Uuid,
    section_id: Uuid,
    title: String,
    description: String,
    time_duration: String,
    video_url: String,
    order_index: i32,
}

#[derive(Debug, Clone)]
pub struct SubSectionCreateUpdate {
    pub section_id: Uuid,
    pub title: String,
    pub description: String,
    pub time_duration: String,
    pub video_url: String,
}

impl From<&SubSection> for SubSectionCreateUpdate {
    fn from(value: &SubSection) -> Self {
        Self {
            section_id: value.section_id,
            title: value.title.clone(),
            description: value.description.clone(),
            time_duration: value.time_duration.clone(),
            video_url: value.video_url.clone(),
        }
    }
}

impl_resource_typed!(SubSection, SubSection);

impl SubSection {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn section_id(&self) -> Uuid {
        self.section_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn time_duration(&self) -> &str {
        &self.time_duration
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }
}

#[async_trait]
impl CrudRepository<SubSection, SubSectionCreateUpdate, Uuid> for SubSection {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SubSectionCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO sub_sections (id, section_id, title, description, time_duration, video_url, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, (
                SELECT COALESCE(MAX(order_index) + 1, 0) FROM sub_sections WHERE section_id = $2
            ))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.section_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.time_duration)
        .bind(&data.video_url)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SubSectionCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE sub_sections
            SET title = $1, description = $2, time_duration = $3, video_url = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.time_duration)
        .bind(&data.video_url)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM sub_sections WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM sub_sections WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl SubSection {
    pub async fn all_by_section(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        section_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM sub_sections WHERE section_id = $1 ORDER BY order_index, id",
        )
        .bind(section_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Every lecture of a course in section order.
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT ss.* FROM sub_sections ss
            JOIN sections s ON s.id = ss.section_id
            WHERE s.course_id = $1
            ORDER BY s.order_index, s.id, ss.order_index, ss.id
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sub_sections ss
            JOIN sections s ON s.id = ss.section_id
            WHERE s.course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    /// Course the lecture belongs to.
    pub async fn course_id(&self, mm: &ModelManager) -> DatabaseResult<Uuid> {
        let course_id: Uuid = sqlx::query_scalar("SELECT course_id FROM sections WHERE id = $1")
            .bind(self.section_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(course_id)
    }
}

#[async_trait]
impl HasOwner for SubSection {
    async fn get_owner_id(&self, mm: &ModelManager) -> DatabaseResult<Uuid> {
        let owner: Uuid = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id FROM sections s
            JOIN courses c ON c.id = s.course_id
            WHERE s.id = $1
            "#,
        )
        .bind(self.section_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}
