use async_trait::async_trait;
use thiserror::Error;

use crate::appointments::repo_types::{Appointment, CustomerLink, NewAppointment};
use crate::customers::repo_types::{Customer, NewCustomer};

pub mod memory;
pub mod postgres;
#[cfg(test)]
pub mod testing;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write (customer NIC).
    #[error("{0}")]
    UniqueViolation(String),

    /// The referenced customer does not exist.
    #[error("{0}")]
    ForeignKeyViolation(String),

    /// A stored value could not be read back into the domain types.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(format!(
                    "customer already exists ({})",
                    db.constraint().unwrap_or("unique constraint")
                ));
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(
                    "referenced customer does not exist".into(),
                );
            }
        }
        StoreError::Database(e)
    }
}

/// Persistence for customers and appointments.
///
/// Implementations enforce NIC uniqueness and the appointment → customer
/// foreign key themselves; services rely on those errors rather than on their
/// own pre-checks.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
    async fn find_customer(&self, id: i32) -> Result<Option<Customer>, StoreError>;
    async fn find_customer_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError>;
    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer, StoreError>;

    /// Appointments with customers populated, newest date first. `nic`
    /// restricts the result to one customer.
    async fn list_appointments(&self, nic: Option<&str>) -> Result<Vec<Appointment>, StoreError>;
    async fn find_appointment(&self, id: i32) -> Result<Option<Appointment>, StoreError>;

    /// Insert an appointment, creating the customer first when `customer` is
    /// [`CustomerLink::New`]. Both writes succeed or neither does.
    async fn insert_appointment(
        &self,
        new: NewAppointment,
        customer: CustomerLink,
    ) -> Result<Appointment, StoreError>;
}
