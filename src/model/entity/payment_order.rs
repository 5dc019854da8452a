use crate::impl_resource_typed;
use crate::model::access::HasOwner;
use crate::model::{ModelManager, error::DatabaseResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A gateway order opened by `capturePayment`, keyed by the gateway's order id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PaymentOrder {
    id: String,
    user_id: Uuid,
    /// Currency sub-units.
    amount: i64,
    currency: String,
    receipt: String,
    /// Courses paid for, as captured.
    course_ids: Vec<Uuid>,
    status: String,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PaymentOrderCreate {
    pub id: String,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub course_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentOutcome {
    /// The order had been verified before; nothing changed.
    AlreadyCompleted,
    /// Courses the student was enrolled into by this call.
    Enrolled(Vec<Uuid>),
}

impl_resource_typed!(PaymentOrder, PaymentOrder);

impl PaymentOrder {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }

    pub fn course_ids(&self) -> &[Uuid] {
        &self.course_ids
    }

    /// Stores the order together with the courses it pays for.
    pub async fn create(mm: &ModelManager, data: PaymentOrderCreate) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO payment_orders (id, user_id, amount, currency, receipt, course_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.id)
        .bind(data.user_id)
        .bind(data.amount)
        .bind(&data.currency)
        .bind(&data.receipt)
        .bind(&data.course_ids)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_by_id(mm: &ModelManager, id: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM payment_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Marks the order paid and enrolls its owner into every course of the
    /// order that still exists, creating the progress records, all in one
    /// transaction. Only the first call for an order enrolls anybody.
    #[tracing::instrument(skip(self, mm), fields(order_id = %self.id))]
    pub async fn complete(&self, mm: &ModelManager, payment_id: &str) -> DatabaseResult<EnrollmentOutcome> {
        let mut tx = mm.begin().await?;

        let claimed = sqlx::query(
            "UPDATE payment_orders SET status = 'paid', payment_id = $1 WHERE id = $2 AND status = 'created'",
        )
        .bind(payment_id)
        .bind(&self.id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!("order already completed");
            return Ok(EnrollmentOutcome::AlreadyCompleted);
        }

        let mut enrolled = Vec::with_capacity(self.course_ids.len());
        for course_id in &self.course_ids {
            // courses removed since capture are skipped
            let inserted = sqlx::query(
                r#"
                INSERT INTO course_enrollments (course_id, user_id)
                SELECT id, $2 FROM courses WHERE id = $1
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(course_id)
            .bind(self.user_id)
            .execute(&mut *tx)
            .await?;
            if inserted.rows_affected() == 0 {
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO course_progress (id, user_id, course_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, course_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(self.user_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;
            enrolled.push(*course_id);
        }

        tx.commit().await?;
        tracing::info!("enrolled user {} into {} course(s)", self.user_id, enrolled.len());
        Ok(EnrollmentOutcome::Enrolled(enrolled))
    }
}

#[async_trait]
impl HasOwner for PaymentOrder {
    async fn get_owner_id(&self, _mm: &ModelManager) -> DatabaseResult<Uuid> {
        Ok(self.user_id)
    }
}
