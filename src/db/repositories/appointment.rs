//! Appointment repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Appointment, AppointmentStatus, NewAppointment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: &NewAppointment) -> Result<Appointment>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Appointment>>;

    /// Soonest booking first, optionally filtered by status
    async fn list(&self, status: Option<AppointmentStatus>) -> Result<Vec<Appointment>>;

    /// Set the host without touching status; returns false when no row matched
    async fn assign_host(&self, id: i64, host_id: i64) -> Result<bool>;
}

pub struct SqlxAppointmentRepository {
    pool: DynDatabasePool,
}

impl SqlxAppointmentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AppointmentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AppointmentRepository for SqlxAppointmentRepository {
    async fn create(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_APPOINTMENT)
                .bind(&appointment.name)
                .bind(&appointment.phone_number)
                .bind(&appointment.email)
                .bind(appointment.date_of_booking)
                .bind(appointment.time)
                .bind(&appointment.link_meet)
                .bind(appointment.status.as_str())
                .bind(&appointment.pdf_file)
                .bind(&appointment.img)
                .bind(now)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_APPOINTMENT)
                .bind(&appointment.name)
                .bind(&appointment.phone_number)
                .bind(&appointment.email)
                .bind(appointment.date_of_booking)
                .bind(appointment.time)
                .bind(&appointment.link_meet)
                .bind(appointment.status.as_str())
                .bind(&appointment.pdf_file)
                .bind(&appointment.img)
                .bind(now)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create appointment")?;

        Ok(Appointment {
            id,
            name: appointment.name.clone(),
            phone_number: appointment.phone_number.clone(),
            email: appointment.email.clone(),
            date_of_booking: appointment.date_of_booking,
            time: appointment.time,
            link_meet: appointment.link_meet.clone(),
            host_id: None,
            status: appointment.status,
            pdf_file: appointment.pdf_file.clone(),
            img: appointment.img.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let sql = format!("{SELECT_APPOINTMENT} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get appointment by ID")?;
                Ok(row.as_ref().map(row_to_appointment_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get appointment by ID")?;
                Ok(row.as_ref().map(row_to_appointment_mysql))
            }
        }
    }

    async fn list(&self, status: Option<AppointmentStatus>) -> Result<Vec<Appointment>> {
        let filter = if status.is_some() { " WHERE status = ?" } else { "" };
        let sql = format!("{SELECT_APPOINTMENT}{filter} ORDER BY date_of_booking, time, id");
        let status = status.map(AppointmentStatus::as_str);

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                if let Some(status) = status {
                    query = query.bind(status);
                }
                let rows = query
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list appointments")?;
                Ok(rows.iter().map(row_to_appointment_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                if let Some(status) = status {
                    query = query.bind(status);
                }
                let rows = query
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list appointments")?;
                Ok(rows.iter().map(row_to_appointment_mysql).collect())
            }
        }
    }

    async fn assign_host(&self, id: i64, host_id: i64) -> Result<bool> {
        let now = Utc::now();
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(ASSIGN_HOST)
                .bind(host_id)
                .bind(now)
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query(ASSIGN_HOST)
                .bind(host_id)
                .bind(now)
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to assign appointment host")?;

        Ok(affected > 0)
    }
}

const INSERT_APPOINTMENT: &str = r#"
    INSERT INTO appointments (
        name, phone_number, email, date_of_booking, time, link_meet,
        status, pdf_file, img, created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const ASSIGN_HOST: &str = "UPDATE appointments SET host_id = ?, updated_at = ? WHERE id = ?";

const SELECT_APPOINTMENT: &str = r#"
    SELECT id, name, phone_number, email, date_of_booking, time, link_meet,
           host_id, status, pdf_file, img, created_at, updated_at
    FROM appointments"#;

fn row_to_appointment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Appointment {
    let status: String = row.get("status");
    Appointment {
        id: row.get("id"),
        name: row.get("name"),
        phone_number: row.get("phone_number"),
        email: row.get("email"),
        date_of_booking: row.get("date_of_booking"),
        time: row.get("time"),
        link_meet: row.get("link_meet"),
        host_id: row.get("host_id"),
        status: status.parse().unwrap_or_default(),
        pdf_file: row.get("pdf_file"),
        img: row.get("img"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_appointment_mysql(row: &sqlx::mysql::MySqlRow) -> Appointment {
    let status: String = row.get("status");
    Appointment {
        id: row.get("id"),
        name: row.get("name"),
        phone_number: row.get("phone_number"),
        email: row.get("email"),
        date_of_booking: row.get("date_of_booking"),
        time: row.get("time"),
        link_meet: row.get("link_meet"),
        host_id: row.get("host_id"),
        status: status.parse().unwrap_or_default(),
        pdf_file: row.get("pdf_file"),
        img: row.get("img"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::models::UserRole;
    use chrono::{NaiveDate, NaiveTime};

    fn booking(day: u32) -> NewAppointment {
        NewAppointment {
            name: "Budi".into(),
            phone_number: "+628111".into(),
            email: "budi@example.com".into(),
            date_of_booking: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            link_meet: None,
            status: AppointmentStatus::Pending,
            pdf_file: None,
            img: Some("https://cdn.example.com/a.png".into()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_appointment() {
        let pool = setup_pool().await;
        let repo = SqlxAppointmentRepository::new(pool);

        let created = repo.create(&booking(1)).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.date_of_booking, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(fetched.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(fetched.status, AppointmentStatus::Pending);
        assert!(fetched.host_id.is_none());
        assert_eq!(fetched.img.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[tokio::test]
    async fn test_assign_host_leaves_status() {
        let pool = setup_pool().await;
        let host = insert_user(&pool, "host@example.com", UserRole::Staff).await;
        let repo = SqlxAppointmentRepository::new(pool);

        let created = repo.create(&booking(1)).await.unwrap();
        assert!(repo.assign_host(created.id, host).await.unwrap());
        assert!(!repo.assign_host(999, host).await.unwrap());

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.host_id, Some(host));
        assert_eq!(fetched.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_list_orders_by_booking_date() {
        let pool = setup_pool().await;
        let repo = SqlxAppointmentRepository::new(pool.clone());

        let later = repo.create(&booking(20)).await.unwrap();
        let sooner = repo.create(&booking(2)).await.unwrap();
        pool.execute(&format!(
            "UPDATE appointments SET status = 'confirmed' WHERE id = {}",
            later.id
        ))
        .await
        .unwrap();

        let all: Vec<_> = repo.list(None).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(all, vec![sooner.id, later.id]);

        let pending = repo.list(Some(AppointmentStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, sooner.id);
    }
}
