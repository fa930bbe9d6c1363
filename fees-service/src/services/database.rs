//! Database service for fees-service.

use crate::models::{
    format_receipt_number, AuditAction, AuditEntry, CreateFeeStructure, CreatePayment,
    DailyCollectionRow, FeePayment, FeeStructure, ListFeeStructuresFilter, ListPaymentsFilter,
    PaymentStatus, RecordAudit, Student, StudentStatus, TransportRoute, UpdateFeeStructure,
};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::{NaiveDate, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "fees-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // =========================================================================
    // Fee Structure Operations
    // =========================================================================

    /// Create a fee structure line item.
    #[instrument(skip(self, input), fields(school_id = %input.school_id, class_id = %input.class_id))]
    pub async fn create_fee_structure(
        &self,
        input: &CreateFeeStructure,
    ) -> Result<FeeStructure, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_fee_structure"])
            .start_timer();

        let fee_id = Uuid::new_v4();
        let fee = sqlx::query_as::<_, FeeStructure>(
            r#"
            INSERT INTO fee_structures (fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
            "#,
        )
        .bind(fee_id)
        .bind(input.school_id)
        .bind(input.class_id)
        .bind(&input.name)
        .bind(input.fee_type.as_str())
        .bind(input.frequency.as_str())
        .bind(input.amount)
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create fee structure: {}", e)))?;

        timer.observe_duration();
        info!(fee_id = %fee.fee_id, name = %fee.name, "Fee structure created");

        Ok(fee)
    }

    /// Get a fee structure by ID.
    #[instrument(skip(self), fields(school_id = %school_id, fee_id = %fee_id))]
    pub async fn get_fee_structure(
        &self,
        school_id: Uuid,
        fee_id: Uuid,
    ) -> Result<Option<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_fee_structure"])
            .start_timer();

        let fee = sqlx::query_as::<_, FeeStructure>(
            r#"
            SELECT fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
            FROM fee_structures
            WHERE school_id = $1 AND fee_id = $2
            "#,
        )
        .bind(school_id)
        .bind(fee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get fee structure: {}", e)))?;

        timer.observe_duration();

        Ok(fee)
    }

    /// List fee structures for a school.
    #[instrument(skip(self, filter), fields(school_id = %school_id))]
    pub async fn list_fee_structures(
        &self,
        school_id: Uuid,
        filter: &ListFeeStructuresFilter,
    ) -> Result<Vec<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_fee_structures"])
            .start_timer();

        let limit = filter.page_size.clamp(1, 100) as i64;

        let fees = if let Some(cursor) = filter.page_token {
            sqlx::query_as::<_, FeeStructure>(
                r#"
                SELECT fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
                FROM fee_structures
                WHERE school_id = $1
                  AND ($2::uuid IS NULL OR class_id = $2)
                  AND ($3::bool = TRUE OR is_archived = FALSE)
                  AND fee_id > $4
                ORDER BY fee_id
                LIMIT $5
                "#,
            )
            .bind(school_id)
            .bind(filter.class_id)
            .bind(filter.include_archived)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, FeeStructure>(
                r#"
                SELECT fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
                FROM fee_structures
                WHERE school_id = $1
                  AND ($2::uuid IS NULL OR class_id = $2)
                  AND ($3::bool = TRUE OR is_archived = FALSE)
                ORDER BY fee_id
                LIMIT $4
                "#,
            )
            .bind(school_id)
            .bind(filter.class_id)
            .bind(filter.include_archived)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list fee structures: {}", e)))?;

        timer.observe_duration();

        Ok(fees)
    }

    /// Get the active fee structures applicable to a class, ordered by due date.
    #[instrument(skip(self), fields(school_id = %school_id, class_id = %class_id))]
    pub async fn active_fee_structures_for_class(
        &self,
        school_id: Uuid,
        class_id: Uuid,
    ) -> Result<Vec<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["active_fee_structures_for_class"])
            .start_timer();

        let fees = sqlx::query_as::<_, FeeStructure>(
            r#"
            SELECT fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
            FROM fee_structures
            WHERE school_id = $1 AND class_id = $2 AND is_archived = FALSE
            ORDER BY due_date, name
            "#,
        )
        .bind(school_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load class fee structures: {}", e)))?;

        timer.observe_duration();

        Ok(fees)
    }

    /// Update a fee structure. Archived rows are not updatable.
    #[instrument(skip(self, input), fields(school_id = %school_id, fee_id = %fee_id))]
    pub async fn update_fee_structure(
        &self,
        school_id: Uuid,
        fee_id: Uuid,
        input: &UpdateFeeStructure,
    ) -> Result<Option<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_fee_structure"])
            .start_timer();

        let fee = sqlx::query_as::<_, FeeStructure>(
            r#"
            UPDATE fee_structures
            SET name = COALESCE($3, name),
                amount = COALESCE($4, amount),
                due_date = COALESCE($5, due_date),
                updated_utc = now()
            WHERE school_id = $1 AND fee_id = $2 AND is_archived = FALSE
            RETURNING fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
            "#,
        )
        .bind(school_id)
        .bind(fee_id)
        .bind(&input.name)
        .bind(input.amount)
        .bind(input.due_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update fee structure: {}", e)))?;

        timer.observe_duration();

        Ok(fee)
    }

    /// Archive a fee structure, removing it from dues calculation.
    #[instrument(skip(self), fields(school_id = %school_id, fee_id = %fee_id))]
    pub async fn archive_fee_structure(
        &self,
        school_id: Uuid,
        fee_id: Uuid,
    ) -> Result<Option<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["archive_fee_structure"])
            .start_timer();

        let fee = sqlx::query_as::<_, FeeStructure>(
            r#"
            UPDATE fee_structures
            SET is_archived = TRUE, updated_utc = now()
            WHERE school_id = $1 AND fee_id = $2 AND is_archived = FALSE
            RETURNING fee_id, school_id, class_id, name, fee_type, frequency, amount, due_date, is_archived, created_utc, updated_utc
            "#,
        )
        .bind(school_id)
        .bind(fee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to archive fee structure: {}", e)))?;

        timer.observe_duration();

        if let Some(ref f) = fee {
            info!(fee_id = %f.fee_id, "Fee structure archived");
        }

        Ok(fee)
    }

    // =========================================================================
    // Student Operations (read-only; records owned by admissions)
    // =========================================================================

    /// Get a student by ID within a school.
    #[instrument(skip(self), fields(school_id = %school_id, student_id = %student_id))]
    pub async fn get_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Student>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_student"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, school_id, class_id, admission_no, first_name, last_name, status, primary_guardian_id, transport_route_id, created_utc, updated_utc
            FROM students
            WHERE school_id = $1 AND student_id = $2
            "#,
        )
        .bind(school_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get student: {}", e)))?;

        timer.observe_duration();

        Ok(student)
    }

    /// Whether another admitted student in the school shares the same first
    /// guardian.
    #[instrument(skip(self), fields(school_id = %school_id, student_id = %student_id))]
    pub async fn has_admitted_sibling(
        &self,
        school_id: Uuid,
        student_id: Uuid,
        guardian_id: Uuid,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["has_admitted_sibling"])
            .start_timer();

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM students
                WHERE school_id = $1
                  AND primary_guardian_id = $2
                  AND student_id <> $3
                  AND status = $4
            )
            "#,
        )
        .bind(school_id)
        .bind(guardian_id)
        .bind(student_id)
        .bind(StudentStatus::Admitted.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check siblings: {}", e)))?;

        timer.observe_duration();

        Ok(exists)
    }

    /// Get an active transport route by ID.
    #[instrument(skip(self), fields(school_id = %school_id, route_id = %route_id))]
    pub async fn get_transport_route(
        &self,
        school_id: Uuid,
        route_id: Uuid,
    ) -> Result<Option<TransportRoute>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_transport_route"])
            .start_timer();

        let route = sqlx::query_as::<_, TransportRoute>(
            r#"
            SELECT route_id, school_id, name, monthly_cost, is_active, created_utc
            FROM transport_routes
            WHERE school_id = $1 AND route_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(school_id)
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get transport route: {}", e)))?;

        timer.observe_duration();

        Ok(route)
    }

    // =========================================================================
    // Payment Ledger Operations
    // =========================================================================

    /// Append a payment or waiver to the ledger.
    ///
    /// The daily receipt sequence increment, the ledger insert and the audit
    /// entry commit in one transaction, so a receipt number can never be
    /// minted twice or orphaned.
    #[instrument(skip(self, input), fields(school_id = %input.school_id, student_id = %input.student_id))]
    pub async fn collect_payment(&self, input: &CreatePayment) -> Result<FeePayment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["collect_payment"])
            .start_timer();

        let payment_date = Utc::now().date_naive();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e)))?;

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO receipt_sequences (school_id, seq_date, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (school_id, seq_date)
            DO UPDATE SET value = receipt_sequences.value + 1
            RETURNING value
            "#,
        )
        .bind(input.school_id)
        .bind(payment_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to advance receipt sequence: {}", e)))?;

        let receipt_number = format_receipt_number(input.method, payment_date, sequence);

        let payment_id = Uuid::new_v4();
        let payment = sqlx::query_as::<_, FeePayment>(
            r#"
            INSERT INTO fee_payments (payment_id, school_id, student_id, receipt_number, amount_paid, payment_date, method, status, remarks, collected_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING payment_id, school_id, student_id, receipt_number, amount_paid, payment_date, method, status, remarks, collected_by, created_utc
            "#,
        )
        .bind(payment_id)
        .bind(input.school_id)
        .bind(input.student_id)
        .bind(&receipt_number)
        .bind(input.amount)
        .bind(payment_date)
        .bind(input.method.as_str())
        .bind(PaymentStatus::Completed.as_str())
        .bind(&input.remarks)
        .bind(input.collected_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Duplicate receipt number"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to record payment: {}", e)),
        })?;

        let action = if input.method.is_waiver() {
            AuditAction::FeeWaived
        } else {
            AuditAction::FeeCollected
        };

        sqlx::query(
            r#"
            INSERT INTO audit_log (entry_id, school_id, actor_id, actor_role, action, student_id, receipt_number, amount, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.school_id)
        .bind(input.collected_by)
        .bind(input.collected_by_role.as_str())
        .bind(action.as_str())
        .bind(input.student_id)
        .bind(&receipt_number)
        .bind(input.amount)
        .bind(serde_json::json!({
            "method": input.method.as_str(),
            "remarks": input.remarks,
        }))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to write audit entry: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to commit payment: {}", e)))?;

        timer.observe_duration();
        info!(
            receipt_number = %payment.receipt_number,
            amount = %payment.amount_paid,
            method = %payment.method,
            "Ledger entry recorded"
        );

        Ok(payment)
    }

    /// List ledger entries for a school.
    #[instrument(skip(self, filter), fields(school_id = %school_id))]
    pub async fn list_payments(
        &self,
        school_id: Uuid,
        filter: &ListPaymentsFilter,
    ) -> Result<Vec<FeePayment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payments"])
            .start_timer();

        let limit = filter.page_size.clamp(1, 100) as i64;

        let payments = if let Some(cursor) = filter.page_token {
            sqlx::query_as::<_, FeePayment>(
                r#"
                SELECT payment_id, school_id, student_id, receipt_number, amount_paid, payment_date, method, status, remarks, collected_by, created_utc
                FROM fee_payments
                WHERE school_id = $1
                  AND ($2::uuid IS NULL OR student_id = $2)
                  AND ($3::date IS NULL OR payment_date >= $3)
                  AND ($4::date IS NULL OR payment_date <= $4)
                  AND payment_id > $5
                ORDER BY payment_id
                LIMIT $6
                "#,
            )
            .bind(school_id)
            .bind(filter.student_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, FeePayment>(
                r#"
                SELECT payment_id, school_id, student_id, receipt_number, amount_paid, payment_date, method, status, remarks, collected_by, created_utc
                FROM fee_payments
                WHERE school_id = $1
                  AND ($2::uuid IS NULL OR student_id = $2)
                  AND ($3::date IS NULL OR payment_date >= $3)
                  AND ($4::date IS NULL OR payment_date <= $4)
                ORDER BY payment_id
                LIMIT $5
                "#,
            )
            .bind(school_id)
            .bind(filter.student_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }

    /// Full payment history for a student, oldest first.
    #[instrument(skip(self), fields(school_id = %school_id, student_id = %student_id))]
    pub async fn payments_for_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<FeePayment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["payments_for_student"])
            .start_timer();

        let payments = sqlx::query_as::<_, FeePayment>(
            r#"
            SELECT payment_id, school_id, student_id, receipt_number, amount_paid, payment_date, method, status, remarks, collected_by, created_utc
            FROM fee_payments
            WHERE school_id = $1 AND student_id = $2
            ORDER BY payment_date, created_utc
            "#,
        )
        .bind(school_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load payment history: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }

    /// Per-method ledger totals for one school-day.
    #[instrument(skip(self), fields(school_id = %school_id))]
    pub async fn daily_collections(
        &self,
        school_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyCollectionRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["daily_collections"])
            .start_timer();

        let rows = sqlx::query_as::<_, DailyCollectionRow>(
            r#"
            SELECT method, COUNT(*) AS receipt_count, COALESCE(SUM(amount_paid), 0) AS total_amount
            FROM fee_payments
            WHERE school_id = $1 AND payment_date = $2
            GROUP BY method
            ORDER BY method
            "#,
        )
        .bind(school_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to aggregate collections: {}", e)))?;

        timer.observe_duration();

        Ok(rows)
    }

    // =========================================================================
    // Audit Log Operations
    // =========================================================================

    /// Append an audit entry outside a ledger transaction (catalog changes).
    #[instrument(skip(self, input), fields(school_id = %input.school_id))]
    pub async fn record_audit(&self, input: &RecordAudit) -> Result<AuditEntry, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_audit"])
            .start_timer();

        let entry_id = Uuid::new_v4();
        let entry = sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO audit_log (entry_id, school_id, actor_id, actor_role, action, student_id, receipt_number, amount, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING entry_id, school_id, actor_id, actor_role, action, student_id, receipt_number, amount, details, created_utc
            "#,
        )
        .bind(entry_id)
        .bind(input.school_id)
        .bind(input.actor_id)
        .bind(&input.actor_role)
        .bind(input.action.as_str())
        .bind(input.student_id)
        .bind(&input.receipt_number)
        .bind(input.amount)
        .bind(&input.details)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record audit entry: {}", e)))?;

        timer.observe_duration();

        Ok(entry)
    }

    /// Most recent audit entries for a school.
    #[instrument(skip(self), fields(school_id = %school_id))]
    pub async fn list_audit_entries(
        &self,
        school_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_audit_entries"])
            .start_timer();

        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT entry_id, school_id, actor_id, actor_role, action, student_id, receipt_number, amount, details, created_utc
            FROM audit_log
            WHERE school_id = $1
            ORDER BY created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(school_id)
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list audit entries: {}", e)))?;

        timer.observe_duration();

        Ok(entries)
    }
}
