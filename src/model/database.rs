use sqlx::{PgPool, Postgres, Transaction};

use crate::model::error::DatabaseResult;

#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // cloning is cheap, pool is just a wrapper around Arc<>
}

impl DbConnection {
    pub fn connect(connection_str: &str) -> DatabaseResult<Self> {
        let pool = PgPool::connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> DatabaseResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }
}
