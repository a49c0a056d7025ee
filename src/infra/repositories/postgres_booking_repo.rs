use crate::domain::models::booking::{status, BookedInterval, Booking};
use crate::domain::ports::{BookingRepository, CapacityCheck, CapacityRule};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serializes concurrent capacity checks for one service by locking its
    /// row, then verifies the slot still has room. Runs inside the caller's
    /// transaction so the check and the write commit atomically.
    async fn assert_capacity(
        tx: &mut Transaction<'_, Postgres>,
        booking: &Booking,
        check: CapacityCheck,
        exclude_id: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("SELECT id FROM services WHERE id = $1 FOR UPDATE")
            .bind(&booking.service_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::Database)?;

        let exclude = exclude_id.unwrap_or("");

        if check.rule == CapacityRule::ExactMatch {
            let conflicts = sqlx::query(
                "SELECT COUNT(*) AS n FROM bookings
                 WHERE service_id = $1 AND appointment_date = $2
                 AND status IN ('confirmed', 'changed')
                 AND start_time < $3 AND end_time > $4
                 AND NOT (start_time = $4 AND end_time = $3)
                 AND id != $5",
            )
            .bind(&booking.service_id)
            .bind(booking.appointment_date)
            .bind(booking.end_time)
            .bind(booking.start_time)
            .bind(exclude)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::Database)?
            .get::<i64, _>("n");

            if conflicts > 0 {
                return Err(AppError::CapacityExceeded);
            }
        }

        let booked = match check.rule {
            CapacityRule::Overlap => sqlx::query(
                "SELECT COALESCE(SUM(participants), 0) AS total FROM bookings
                 WHERE service_id = $1 AND appointment_date = $2
                 AND status IN ('confirmed', 'changed')
                 AND start_time < $3 AND end_time > $4
                 AND id != $5",
            )
            .bind(&booking.service_id)
            .bind(booking.appointment_date)
            .bind(booking.end_time)
            .bind(booking.start_time)
            .bind(exclude),
            CapacityRule::ExactMatch => sqlx::query(
                "SELECT COALESCE(SUM(participants), 0) AS total FROM bookings
                 WHERE service_id = $1 AND appointment_date = $2
                 AND status IN ('confirmed', 'changed')
                 AND start_time = $3 AND end_time = $4
                 AND id != $5",
            )
            .bind(&booking.service_id)
            .bind(booking.appointment_date)
            .bind(booking.start_time)
            .bind(booking.end_time)
            .bind(exclude),
        }
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)?
        .get::<i64, _>("total");

        if booked + booking.participants as i64 > check.capacity {
            return Err(AppError::CapacityExceeded);
        }

        Ok(())
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking, check: CapacityCheck) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        Self::assert_capacity(&mut tx, booking, check, None).await?;

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, service_id, appointment_date, start_time, end_time, participants, customer_name, customer_email, customer_phone, notes, status, token, modification_count, last_modification, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING *",
        )
        .bind(&booking.id)
        .bind(&booking.service_id)
        .bind(booking.appointment_date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.participants)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.notes)
        .bind(&booking.status)
        .bind(&booking.token)
        .bind(booking.modification_count)
        .bind(booking.last_modification)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn reschedule(&self, booking: &Booking, check: CapacityCheck) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        Self::assert_capacity(&mut tx, booking, check, Some(&booking.id)).await?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings
             SET appointment_date = $1, start_time = $2, end_time = $3, status = $4,
                 modification_count = $5, last_modification = $6, updated_at = $7
             WHERE id = $8
             RETURNING *",
        )
        .bind(booking.appointment_date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(&booking.status)
        .bind(booking.modification_count)
        .bind(booking.last_modification)
        .bind(booking.updated_at)
        .bind(&booking.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_service(&self, service_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE service_id = $1 ORDER BY appointment_date ASC, start_time ASC",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_for_date(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, AppError> {
        sqlx::query_as::<_, BookedInterval>(
            "SELECT start_time, end_time, participants FROM bookings
             WHERE service_id = $1 AND appointment_date = $2
             AND status IN ('confirmed', 'changed')
             ORDER BY start_time ASC",
        )
        .bind(service_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn sum_overlapping(
        &self,
        service_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(participants), 0) AS total FROM bookings
             WHERE service_id = $1 AND appointment_date = $2
             AND status IN ('confirmed', 'changed')
             AND start_time < $3 AND end_time > $4",
        )
        .bind(service_id)
        .bind(date)
        .bind(end)
        .bind(start)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("total"))
    }

    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status::CANCELLED)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking not found".into()));
        }
        Ok(())
    }
}
