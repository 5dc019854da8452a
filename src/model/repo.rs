use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone)]
pub enum ResourceType {
    User,
    Course,
    Section,
    SubSection,
    CourseProgress,
    RatingAndReview,
    LiveClass,
    PaymentOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

#[async_trait::async_trait]
pub trait CrudRepository<T, CreateUpdate, V>
where
    T: ResourceTyped,
    V: Clone + Copy,
{
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CreateUpdate,
    ) -> DatabaseResult<T>;
    async fn update(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CreateUpdate,
    ) -> DatabaseResult<T>
    where
        Self: Sized;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: V,
    ) -> DatabaseResult<Option<T>>;
}

/// Listing side of a repository. `page` runs the slice and the total
/// concurrently.
#[async_trait::async_trait]
pub trait PaginatableRepository: Sized + Send + 'static {
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>>;
    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;

    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<Self>> {
        let (items, total) = tokio::try_join!(
            Self::list(mm, actor, limit, offset),
            Self::count(mm, actor),
        )?;
        Ok(Page::new(items, total, limit, offset))
    }
}

#[macro_export]
macro_rules! impl_resource_typed {
    ($ent:ident, $variant:ident) => {
        impl $crate::model::ResourceTyped for $ent {
            fn get_resource_type() -> $crate::model::ResourceType {
                $crate::model::ResourceType::$variant
            }
        }
    };
}
