use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::debug;

use super::{Store, StoreError};
use crate::appointments::repo_types::{
    Appointment, AppointmentRow, CustomerLink, NewAppointment,
};
use crate::customers::repo_types::{Customer, NewCustomer};

const APPOINTMENT_SELECT: &str = r#"
    SELECT a.id, a.date, a.time_slot, a.status, a.customer_id,
           c.nic AS customer_nic, c.name AS customer_name
      FROM appointments a
      JOIN customers c ON c.id = a.customer_id
"#;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

async fn insert_customer_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewCustomer,
) -> Result<Customer, StoreError> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (nic, name)
        VALUES ($1, $2)
        RETURNING id, nic, name
        "#,
    )
    .bind(&new.nic)
    .bind(&new.name)
    .fetch_one(&mut **tx)
    .await?;
    debug!(customer_id = customer.id, nic = %customer.nic, "customer inserted");
    Ok(customer)
}

#[async_trait]
impl Store for PgStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, nic, name
              FROM customers
             ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_customer(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, Customer>(
            r#"SELECT id, nic, name FROM customers WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_customer_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, Customer>(
            r#"SELECT id, nic, name FROM customers WHERE nic = $1"#,
        )
        .bind(nic)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let mut tx = self.db.begin().await?;
        let customer = insert_customer_tx(&mut tx, &new).await?;
        tx.commit().await?;
        Ok(customer)
    }

    async fn list_appointments(&self, nic: Option<&str>) -> Result<Vec<Appointment>, StoreError> {
        let rows = match nic {
            Some(nic) => {
                sqlx::query_as::<_, AppointmentRow>(&format!(
                    "{APPOINTMENT_SELECT} WHERE c.nic = $1 ORDER BY a.date DESC, a.id DESC"
                ))
                .bind(nic)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, AppointmentRow>(&format!(
                    "{APPOINTMENT_SELECT} ORDER BY a.date DESC, a.id DESC"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };
        rows.into_iter().map(Appointment::try_from).collect()
    }

    async fn find_appointment(&self, id: i32) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "{APPOINTMENT_SELECT} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Appointment::try_from).transpose()
    }

    async fn insert_appointment(
        &self,
        new: NewAppointment,
        customer: CustomerLink,
    ) -> Result<Appointment, StoreError> {
        let mut tx = self.db.begin().await?;

        let customer = match customer {
            CustomerLink::Existing(id) => sqlx::query_as::<_, Customer>(
                r#"SELECT id, nic, name FROM customers WHERE id = $1"#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                StoreError::ForeignKeyViolation(format!("customer {id} does not exist"))
            })?,
            CustomerLink::New(new_customer) => insert_customer_tx(&mut tx, &new_customer).await?,
        };

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO appointments (date, time_slot, status, customer_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new.date)
        .bind(new.time_slot.as_str())
        .bind(new.status.as_str())
        .bind(customer.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Appointment {
            id,
            date: new.date,
            time_slot: new.time_slot,
            status: new.status,
            customer_id: customer.id,
            customer: Some(customer),
        })
    }
}
