use crate::impl_resource_typed;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(skip)]
    password_hash: String,
    account_type: String,
    image: String,
    gender: Option<String>,
    date_of_birth: Option<NaiveDate>,
    about: Option<String>,
    contact_number: Option<String>,
    #[serde(skip)]
    reset_token: Option<String>,
    #[serde(skip)]
    reset_token_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Every writable column of a user. Start from [`UserEntityCreateUpdate::from`]
/// an existing entity to change a subset.
#[derive(Debug, Clone)]
pub struct UserEntityCreateUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: UserRole,
    pub image: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub about: Option<String>,
    pub contact_number: Option<String>,
}

impl UserEntityCreateUpdate {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        account_type: UserRole,
    ) -> Self {
        let image = default_avatar(&first_name, &last_name);
        Self {
            first_name,
            last_name,
            email,
            password_hash,
            account_type,
            image,
            gender: None,
            date_of_birth: None,
            about: None,
            contact_number: None,
        }
    }
}

impl From<&UserEntity> for UserEntityCreateUpdate {
    fn from(user: &UserEntity) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            account_type: user.role(),
            image: user.image.clone(),
            gender: user.gender.clone(),
            date_of_birth: user.date_of_birth,
            about: user.about.clone(),
            contact_number: user.contact_number.clone(),
        }
    }
}

/// Initials avatar used until a display picture is uploaded.
pub fn default_avatar(first_name: &str, last_name: &str) -> String {
    let seed: String = format!("{first_name} {last_name}")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '+' })
        .collect();
    format!("https://api.dicebear.com/5.x/initials/svg?seed={seed}")
}

impl_resource_typed!(UserEntity, User);

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.account_type.as_str())
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn reset_token_expires(&self) -> Option<&DateTime<Utc>> {
        self.reset_token_expires.as_ref()
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO users
                (id, first_name, last_name, email, password_hash, account_type, image,
                 gender, date_of_birth, about, contact_number)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.account_type.to_string())
        .bind(&data.image)
        .bind(&data.gender)
        .bind(data.date_of_birth)
        .bind(&data.about)
        .bind(&data.contact_number)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE users SET
                first_name = $1, last_name = $2, email = $3, password_hash = $4,
                account_type = $5, image = $6, gender = $7, date_of_birth = $8,
                about = $9, contact_number = $10
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.account_type.to_string())
        .bind(&data.image)
        .bind(&data.gender)
        .bind(data.date_of_birth)
        .bind(&data.about)
        .bind(&data.contact_number)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl UserEntity {
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_reset_token(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        token: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE reset_token = $1")
            .bind(token)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn set_reset_token(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        sqlx::query("UPDATE users SET reset_token = $1, reset_token_expires = $2 WHERE id = $3")
            .bind(token)
            .bind(expires_at)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    /// Stores a new password hash and invalidates any pending reset token.
    pub async fn reset_password(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        password_hash: &str,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE users
            SET password_hash = $1, reset_token = NULL, reset_token_expires = NULL
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_avatar_test() {
        assert_eq!(
            default_avatar("Ada", "Lovelace"),
            "https://api.dicebear.com/5.x/initials/svg?seed=Ada+Lovelace"
        );
        assert!(!default_avatar("a&b", "<c>").contains('&'));
    }

    #[test]
    fn serialization_hides_secrets_test() {
        let user = UserEntity {
            id: Uuid::new_v4(),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            email: String::from("ada@example.com"),
            password_hash: String::from("$argon2id$secret"),
            account_type: String::from("Instructor"),
            image: String::new(),
            gender: None,
            date_of_birth: None,
            about: None,
            contact_number: None,
            reset_token: Some(String::from("reset-me")),
            reset_token_expires: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("reset-me"));
        assert_eq!(user.role(), UserRole::Instructor);
        assert_eq!(user.full_name(), "Ada Lovelace");

        let update = UserEntityCreateUpdate::from(&user);
        assert_eq!(update.password_hash, "$argon2id$secret");
        assert_eq!(update.account_type, UserRole::Instructor);
    }
}
