use crate::impl_resource_typed;
use crate::model::access::HasOwner;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Section {
    id: Uuid,
    course_id: Uuid,
    section_name: String,
    order_index: i32,
}

#[derive(Debug, Clone)]
pub struct SectionCreateUpdate {
    pub course_id: Uuid,
    pub section_name: String,
}

impl_resource_typed!(Section, Section);

impl Section {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn section_name(&self) -> &str {
        &self.section_name
    }
}

#[async_trait]
impl CrudRepository<Section, SectionCreateUpdate, Uuid> for Section {
    /// Appends the section after the course's last one.
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SectionCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO sections (id, course_id, section_name, order_index)
            VALUES ($1, $2, $3, (
                SELECT COALESCE(MAX(order_index) + 1, 0) FROM sections WHERE course_id = $2
            ))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(data.section_name.trim())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SectionCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE sections SET section_name = $1 WHERE id = $2")
            .bind(data.section_name.trim())
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.section_name = data.section_name.trim().to_string();
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM sections WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM sections WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Section {
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM sections WHERE course_id = $1 ORDER BY order_index, id",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Section {
    async fn get_owner_id(&self, mm: &ModelManager) -> DatabaseResult<Uuid> {
        let owner: Uuid = sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(self.course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(owner)
    }
}
