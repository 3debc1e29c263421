use async_trait::async_trait;

use super::{MemoryStore, Store, StoreError};
use crate::appointments::repo_types::{Appointment, CustomerLink, NewAppointment};
use crate::customers::repo_types::{Customer, NewCustomer};

/// Store whose NIC lookups always miss, so callers hit the unique constraint
/// the way a request losing a concurrent check-then-insert race would.
pub struct BlindNicStore(pub MemoryStore);

#[async_trait]
impl Store for BlindNicStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.0.list_customers().await
    }

    async fn find_customer(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        self.0.find_customer(id).await
    }

    async fn find_customer_by_nic(&self, _nic: &str) -> Result<Option<Customer>, StoreError> {
        Ok(None)
    }

    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        self.0.insert_customer(new).await
    }

    async fn list_appointments(&self, nic: Option<&str>) -> Result<Vec<Appointment>, StoreError> {
        self.0.list_appointments(nic).await
    }

    async fn find_appointment(&self, id: i32) -> Result<Option<Appointment>, StoreError> {
        self.0.find_appointment(id).await
    }

    async fn insert_appointment(
        &self,
        new: NewAppointment,
        customer: CustomerLink,
    ) -> Result<Appointment, StoreError> {
        self.0.insert_appointment(new, customer).await
    }
}
