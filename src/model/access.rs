use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// Resources that belong to a user. For course content the owner is the
/// instructor of the enclosing course, which may need a lookup.
#[async_trait::async_trait]
pub trait HasOwner {
    async fn get_owner_id(&self, mm: &ModelManager) -> DatabaseResult<uuid::Uuid>;
}

/// `true` when `ctx` owns `resource` or is an admin.
pub async fn is_owner<T: HasOwner + Sync>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
) -> DatabaseResult<bool> {
    // admin can get all resources
    if ctx.user_role() == UserRole::Admin {
        return Ok(true);
    }

    let actual_owner = resource.get_owner_id(mm).await?;
    Ok(actual_owner == ctx.user_id())
}

pub async fn check_access<T: HasOwner + Sync>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
) -> DatabaseResult<()> {
    if is_owner(mm, ctx, resource).await? {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}
